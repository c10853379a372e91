//! Autosave engine for editor scratch buffers.
//!
//! This crate keeps unsaved editor buffers safe: it saves them into a temp
//! folder shortly after each burst of edits, reopens those records when the
//! editor starts again, and asks the user what to do with a record when its
//! tab is closed.
//!
//! # Features
//!
//! - **Autosave policy** that skips read-only, externally modified, remote
//!   and unmodified documents, and gives location-less documents a
//!   timestamp-named record in the temp folder
//! - **Debounce** of edit bursts, one pending timer per document
//! - **Session restore** of leftover records, oldest first
//! - **Orphan reconciliation** (keep / trash / reopen) when a temp tab closes
//!
//! # Records
//!
//! ```text
//! ~/Documents/.gedit/
//!   20240101110000.txt     first buffer saved at 11:00:00
//!   20240101120000.txt
//!   20240101120000_01.txt  second buffer that got a location in the same second
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sas_core::{AutosaveSession, CommandTrash, ConfigProvider, HostEvent};
//!
//! let mut session = AutosaveSession::new(
//!     ConfigProvider::detect(),
//!     Box::new(my_prompt),
//!     Box::new(CommandTrash::default()),
//! );
//! session.activate_window(&mut host, window);
//! session.handle_event(&mut host, HostEvent::WindowShown { window });
//! // ... on every idle iteration:
//! session.tick(&mut host, std::time::Instant::now());
//! ```
//!
//! # Architecture
//!
//! The crate is organized into:
//!
//! - `autosave/` - Policy, debounce scheduler, config
//! - `host/` - Traits the editor implements, plus `BufferDocument` and `CommandTrash`
//! - `io/` - Record writes (atomic), reads and removal
//! - `record.rs` - Record naming
//! - `restore.rs` - Session restore
//! - `reconcile.rs` - Orphan reconciliation
//! - `session.rs` - Event wiring and per-window state
//! - `settings.rs` - Persisted settings and the config provider
//! - `error.rs` - Error types with user-friendly messages

mod autosave;
mod error;
pub mod host;
mod io;
mod reconcile;
pub mod record;
mod restore;
mod session;
mod settings;

// Re-export main types
pub use autosave::{
    AutoSaveConfig, AutosavePolicy, DEFAULT_DEBOUNCE_MS, DEFAULT_TEMP_FOLDER, DebounceScheduler,
    SaveDecision, SkipReason, apply,
};
pub use error::{AutosaveError, Result};
pub use host::{
    BufferDocument, CommandTrash, Document, DocumentId, HostEvent, HostEventKind, PromptChoice,
    PromptRequest, Subscription, TabHost, TrashFacility, UserPrompt, WindowId, WindowRegistry,
};
pub use io::{read_record, remove_record, write_record, write_record_async};
pub use reconcile::{CloseReason, OrphanReconciler, ReconcileAction, is_in_temp_root};
pub use restore::{SessionRestorer, list_records};
pub use session::{AutosaveSession, DocumentKey};
pub use settings::{ConfigProvider, Settings, SettingsStore, expand_home};
