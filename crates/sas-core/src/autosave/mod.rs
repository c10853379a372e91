//! Auto-save functionality for documents.
//!
//! Provides:
//! - `AutosavePolicy` - Decides whether and where a document is saved
//! - `DebounceScheduler` - Coalesces edit bursts into one delayed evaluation
//! - `AutoSaveConfig` - User settings for auto-save behavior

mod config;
mod debounce;
mod policy;

pub use config::{AutoSaveConfig, DEFAULT_DEBOUNCE_MS, DEFAULT_TEMP_FOLDER};
pub use debounce::DebounceScheduler;
pub use policy::{AutosavePolicy, SaveDecision, SkipReason, apply};
