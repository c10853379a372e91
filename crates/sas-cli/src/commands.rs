use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use sas_cli::listing::{RecordEntry, collect_entries, resolve_record};
use sas_cli::scratch::{ScratchHost, ScratchOutcome, run_scratch, spawn_stdin_reader};
use sas_core::{
    AutoSaveConfig, AutosavePolicy, AutosaveSession, BufferDocument, CloseReason, CommandTrash,
    ConfigProvider, Document, DocumentId, OrphanReconciler, ReconcileAction, SaveDecision,
    SessionRestorer, Settings, SettingsStore, TrashFacility, is_in_temp_root, read_record,
    remove_record,
};

use crate::cli::{ConfigCommand, DiscardArgs, RestoreArgs, ScratchArgs};
use crate::prompt::TerminalPrompt;

/// Where settings come from for this run.
pub struct Options {
    pub config: Option<PathBuf>,
    pub temp_folder: Option<String>,
}

impl Options {
    /// Settings file from `--config`, else the platform one, with a
    /// `--temp-folder` override applied on top.
    pub fn provider(&self) -> ConfigProvider {
        let base = match &self.config {
            Some(path) => ConfigProvider::Backed(SettingsStore::new(path)),
            None => ConfigProvider::detect(),
        };
        match &self.temp_folder {
            Some(folder) => ConfigProvider::Default(AutoSaveConfig {
                temp_folder: folder.clone(),
                ..base.autosave()
            }),
            None => base,
        }
    }

    fn store(&self) -> Result<SettingsStore> {
        match &self.config {
            Some(path) => Ok(SettingsStore::new(path)),
            None => SettingsStore::locate().context("no configuration directory on this system"),
        }
    }
}

pub fn run_list(options: &Options) -> Result<(PathBuf, Vec<RecordEntry>)> {
    let root = options.provider().temp_root();
    let entries = collect_entries(&root)
        .with_context(|| format!("list records in {}", root.display()))?;
    Ok((root, entries))
}

pub fn run_restore(options: &Options, args: &RestoreArgs) -> Result<()> {
    let restorer = SessionRestorer::new(options.provider().temp_root());
    for path in restorer.restore() {
        println!("{}", path.display());
        if args.contents {
            let text = read_record(&path).with_context(|| format!("read {}", path.display()))?;
            println!("{text}");
        }
    }
    Ok(())
}

pub fn run_capture(options: &Options) -> Result<PathBuf> {
    let config = options.provider().autosave();
    if !config.enabled {
        bail!("autosave is disabled; enable it with `smart-autosave config enable`");
    }

    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("read standard input")?;

    let mut document = BufferDocument::untitled(DocumentId(1));
    document.set_text(text);
    let root = config.temp_root();
    match AutosavePolicy::new().run(&mut document, &root) {
        SaveDecision::SaveTo(path) => {
            if document.is_modified() {
                bail!("could not write {}", path.display());
            }
            info!(path = %path.display(), "Captured input");
            Ok(path)
        }
        SaveDecision::Skip(reason) => bail!("input was not saved: {reason}"),
    }
}

pub fn run_scratch_command(options: &Options, args: &ScratchArgs) -> Result<ScratchOutcome> {
    let mut provider = options.provider();
    if let Some(millis) = args.debounce_ms {
        provider = ConfigProvider::Default(AutoSaveConfig {
            debounce_ms: millis,
            ..provider.autosave()
        });
    }

    let span = info_span!("scratch", root = %provider.temp_root().display());
    let _guard = span.enter();
    let mut session = AutosaveSession::new(
        provider,
        Box::new(TerminalPrompt),
        Box::new(CommandTrash::default()),
    );
    let mut host = ScratchHost::new();
    let input = spawn_stdin_reader();
    Ok(run_scratch(&mut session, &mut host, &input))
}

pub fn run_review(options: &Options) -> Result<Vec<(String, ReconcileAction)>> {
    let root = options.provider().temp_root();
    let records =
        sas_core::list_records(&root).with_context(|| format!("scan {}", root.display()))?;

    let mut reconciler =
        OrphanReconciler::new(Box::new(TerminalPrompt), Box::new(CommandTrash::default()));
    let mut decisions = Vec::with_capacity(records.len());
    for (index, path) in records.iter().enumerate() {
        let name = file_name(path);
        let id = DocumentId(u64::try_from(index).unwrap_or(u64::MAX));
        let mut document = match BufferDocument::open(id, path) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(error = %e, "{}", e.user_message());
                continue;
            }
        };
        print_preview(&name, document.text());
        let action = reconciler.on_tab_closing(&mut document, CloseReason::TabClosed, &root);
        decisions.push((name, action));
    }
    Ok(decisions)
}

pub fn run_discard(options: &Options, args: &DiscardArgs) -> Result<PathBuf> {
    let root = options.provider().temp_root();
    let path = resolve_record(&root, &args.record);
    if !path.is_file() {
        bail!("no record at {}", path.display());
    }
    if !is_in_temp_root(&path, &root) {
        bail!(
            "{} is not inside the temp folder {}",
            path.display(),
            root.display()
        );
    }

    if args.delete {
        remove_record(&path).map_err(|e| anyhow::anyhow!(e.user_message()))?;
        info!(path = %path.display(), "Deleted record");
    } else {
        CommandTrash::default()
            .move_to_trash(&path)
            .map_err(|e| match e.suggestion() {
                Some(hint) => anyhow::anyhow!("{} {hint}", e.user_message()),
                None => anyhow::anyhow!(e.user_message()),
            })?;
        info!(path = %path.display(), "Moved record to the trash");
    }
    Ok(path)
}

pub fn run_config(options: &Options, command: &ConfigCommand) -> Result<()> {
    if let ConfigCommand::Show = command {
        let provider = options.provider();
        match provider.store() {
            Some(store) => println!("Settings file: {}", store.path().display()),
            None => println!("Settings file: (none, built-in settings)"),
        }
        let config = provider.autosave();
        println!("Enabled: {}", config.enabled);
        println!("Temp folder: {}", config.temp_folder);
        println!("  resolves to: {}", config.temp_root().display());
        println!("Debounce: {} ms", config.debounce_ms);
        println!("Delete superseded records: {}", config.delete_superseded_records);
        return Ok(());
    }

    let store = options.store()?;
    let mut settings = store.load();
    update_settings(&mut settings, command);
    store
        .save(&settings)
        .with_context(|| format!("write {}", store.path().display()))?;
    println!("Saved {}", store.path().display());
    Ok(())
}

fn update_settings(settings: &mut Settings, command: &ConfigCommand) {
    match command {
        ConfigCommand::Show => {}
        ConfigCommand::SetTempFolder { folder } => settings.autosave.temp_folder.clone_from(folder),
        ConfigCommand::SetDebounce { millis } => settings.autosave.debounce_ms = *millis,
        ConfigCommand::Enable => settings.autosave.enabled = true,
        ConfigCommand::Disable => settings.autosave.enabled = false,
        ConfigCommand::Reset => *settings = Settings::default(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_preview(name: &str, text: &str) {
    const PREVIEW_LINES: usize = 5;
    eprintln!("--- {name}");
    for line in text.lines().take(PREVIEW_LINES) {
        eprintln!("  {line}");
    }
    let total = text.lines().count();
    if total > PREVIEW_LINES {
        eprintln!("  ... {} more lines", total - PREVIEW_LINES);
    }
}
