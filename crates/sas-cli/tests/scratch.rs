//! End-to-end runs of the scratch host against a real temp folder.

use std::path::Path;

use sas_cli::listing::collect_entries;
use sas_cli::scratch::{ScratchHost, run_scratch};
use sas_core::{
    AutoSaveConfig, AutosaveSession, CommandTrash, ConfigProvider, PromptChoice, PromptRequest,
    UserPrompt,
};
use tempfile::TempDir;

struct NeverAsked;

impl UserPrompt for NeverAsked {
    fn ask(&mut self, request: &PromptRequest) -> PromptChoice {
        panic!("unexpected prompt for {}", request.path.display());
    }
}

fn session_for(root: &Path, debounce_ms: u64) -> AutosaveSession {
    let config = AutoSaveConfig {
        temp_folder: root.to_str().unwrap().to_string(),
        debounce_ms,
        ..Default::default()
    };
    AutosaveSession::new(
        ConfigProvider::Default(config),
        Box::new(NeverAsked),
        Box::new(CommandTrash::new("false", Vec::<String>::new())),
    )
}

#[test]
fn typed_lines_end_up_in_a_record() {
    let root = TempDir::new().unwrap();
    let mut session = session_for(root.path(), 20);
    let mut host = ScratchHost::new();

    let (tx, rx) = crossbeam_channel::unbounded();
    tx.send("first line".to_string()).unwrap();
    tx.send("second line".to_string()).unwrap();
    drop(tx);

    let outcome = run_scratch(&mut session, &mut host, &rx);

    assert_eq!(outcome.lines, 2);
    assert_eq!(outcome.restored, 0);
    let location = outcome.location.unwrap();
    assert!(location.starts_with(root.path()));
    assert_eq!(
        std::fs::read_to_string(&location).unwrap(),
        "first line\nsecond line\n"
    );
    assert!(!session.is_window_active(host.window()));
}

#[test]
fn empty_input_writes_nothing() {
    let root = TempDir::new().unwrap();
    let mut session = session_for(root.path(), 20);
    let mut host = ScratchHost::new();

    let (tx, rx) = crossbeam_channel::unbounded::<String>();
    drop(tx);

    let outcome = run_scratch(&mut session, &mut host, &rx);

    assert_eq!(outcome.location, None);
    assert!(collect_entries(root.path()).unwrap().is_empty());
}

#[test]
fn leftover_records_are_reopened_first() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("20240101110000.txt"), "old").unwrap();
    std::fs::write(root.path().join("20240101100000.md"), "older").unwrap();
    let mut session = session_for(root.path(), 20);
    let mut host = ScratchHost::new();

    let (tx, rx) = crossbeam_channel::unbounded();
    tx.send("new".to_string()).unwrap();
    drop(tx);

    let outcome = run_scratch(&mut session, &mut host, &rx);

    assert_eq!(outcome.restored, 2);
    assert_eq!(host.tab_count(), 3);
    let entries = collect_entries(root.path()).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].name, "20240101100000.md");
    assert_eq!(
        std::fs::read_to_string(outcome.location.unwrap()).unwrap(),
        "new\n"
    );
}
