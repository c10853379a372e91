use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sas_cli::listing::{RecordEntry, format_size};
use sas_core::ReconcileAction;

pub fn print_records(root: &Path, entries: &[RecordEntry]) {
    println!("Temp folder: {}", root.display());
    if entries.is_empty() {
        println!("No autosave records.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Record"),
        header_cell("Saved"),
        header_cell("Size"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total = 0u64;
    for (index, entry) in entries.iter().enumerate() {
        total += entry.size;
        let saved = match entry.saved_at {
            Some(at) => Cell::new(at.format("%Y-%m-%d %H:%M:%S")),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&entry.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            saved,
            Cell::new(format_size(entry.size)),
        ]);
    }
    table.add_row(vec![
        dim_cell(""),
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} records", entries.len())).add_attribute(Attribute::Bold),
        Cell::new(format_size(total)).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

/// Decisions made during `review`, one row per record.
pub fn print_review(decisions: &[(String, ReconcileAction)]) {
    if decisions.is_empty() {
        println!("No autosave records to review.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Record"), header_cell("Decision")]);
    apply_review_table_style(&mut table);
    for (name, action) in decisions {
        table.add_row(vec![Cell::new(name), action_cell(action)]);
    }
    println!("{table}");
}

fn action_cell(action: &ReconcileAction) -> Cell {
    match action {
        ReconcileAction::SaveAndKeep => Cell::new("kept")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        ReconcileAction::DiscardToTrash(_) => Cell::new("trashed").fg(Color::Yellow),
        ReconcileAction::Reopen(_) => dim_cell("left open"),
        ReconcileAction::None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_review_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
