//! Auto-save configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::settings::expand_home;

/// Folder used for autosave records when nothing else is configured.
pub const DEFAULT_TEMP_FOLDER: &str = "~/Documents/.gedit/";

/// Default debounce window after the last edit.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether auto-save is enabled.
    pub enabled: bool,

    /// Debounce delay in milliseconds.
    ///
    /// After a change, the engine waits this long before evaluating the
    /// document. Additional changes reset the timer.
    pub debounce_ms: u64,

    /// Folder that holds autosave records for documents without a location.
    ///
    /// A leading `~` is expanded to the user's home directory.
    pub temp_folder: String,

    /// Delete a document's autosave record once the document has been
    /// saved somewhere outside the temp folder.
    pub delete_superseded_records: bool,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            temp_folder: DEFAULT_TEMP_FOLDER.to_string(),
            delete_superseded_records: true,
        }
    }
}

impl AutoSaveConfig {
    /// Create a disabled auto-save config.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Absolute temp root, with `~` expanded.
    pub fn temp_root(&self) -> PathBuf {
        expand_home(&self.temp_folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AutoSaveConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert!(config.delete_superseded_records);
    }

    #[test]
    fn test_disabled_keeps_other_defaults() {
        let config = AutoSaveConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.temp_folder, DEFAULT_TEMP_FOLDER);
    }

    #[test]
    fn test_absolute_temp_folder_is_kept() {
        let config = AutoSaveConfig {
            temp_folder: "/var/tmp/scratch".into(),
            ..Default::default()
        };
        assert_eq!(config.temp_root(), PathBuf::from("/var/tmp/scratch"));
    }
}
