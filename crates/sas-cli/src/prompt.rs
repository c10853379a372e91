//! Interactive Yes/No/Cancel prompt for closing temp-backed records.

use std::io::{self, IsTerminal, Write};

use dialoguer::{Select, theme::ColorfulTheme};
use sas_core::{PromptChoice, PromptRequest, UserPrompt};

const OPTIONS: [&str; 3] = ["Yes, keep it", "No, move it to the trash", "Cancel"];

fn use_dialoguer() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Asks through `dialoguer` on a terminal, or reads `y`/`n`/`c` lines
/// otherwise. Anything that fails to produce an answer counts as Cancel.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl UserPrompt for TerminalPrompt {
    fn ask(&mut self, request: &PromptRequest) -> PromptChoice {
        let result = if use_dialoguer() {
            ask_select(request)
        } else {
            ask_line(request)
        };
        match result {
            Ok(choice) => choice,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt failed, treating as cancel");
                PromptChoice::Cancel
            }
        }
    }
}

fn ask_select(request: &PromptRequest) -> anyhow::Result<PromptChoice> {
    let theme = ColorfulTheme::default();
    let label = format!(
        "{} {}\n  {}",
        request.title,
        request.detail,
        request.path.display()
    );
    let selection = Select::with_theme(&theme)
        .with_prompt(label)
        .items(&OPTIONS[..])
        .default(0)
        .interact_opt()?;
    Ok(match selection {
        Some(0) => PromptChoice::Yes,
        Some(1) => PromptChoice::No,
        _ => PromptChoice::Cancel,
    })
}

fn ask_line(request: &PromptRequest) -> anyhow::Result<PromptChoice> {
    let mut stderr = io::stderr();
    write!(
        stderr,
        "{} {} {} (y/n/c) [c]: ",
        request.title,
        request.detail,
        request.path.display()
    )?;
    stderr.flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(parse_choice(&line).unwrap_or(PromptChoice::Cancel))
}

/// Parse a typed answer; empty input means Cancel.
pub fn parse_choice(input: &str) -> Option<PromptChoice> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "keep" => Some(PromptChoice::Yes),
        "n" | "no" | "trash" => Some(PromptChoice::No),
        "" | "c" | "cancel" => Some(PromptChoice::Cancel),
        _ => None,
    }
}
