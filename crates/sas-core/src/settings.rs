//! Persisted user preferences and the config provider.
//!
//! Settings are stored as TOML in the user's config directory. The engine
//! never caches them: every read goes back to the store, so a changed temp
//! folder applies to the next save without a restart.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::autosave::AutoSaveConfig;
use crate::error::{AutosaveError, Result};

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Auto-save behavior.
    pub autosave: AutoSaveConfig,
}

impl Settings {
    /// Load settings from a specific path.
    ///
    /// A missing file yields the defaults. A file that exists but does not
    /// parse is an error so the caller can report it.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(AutosaveError::Io {
                    operation: "read settings",
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        toml::from_str(&content).map_err(|e| AutosaveError::SettingsParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AutosaveError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AutosaveError::SettingsSerialize { source: e })?;

        std::fs::write(path, content).map_err(|e| AutosaveError::Io {
            operation: "write settings",
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path, if the platform has a config dir.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "SmartAutosave", "smart-autosave")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }
}

/// A settings file on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Use the settings file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locate the settings file in the platform config directory.
    pub fn locate() -> Option<Self> {
        Settings::config_path().map(Self::new)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current settings, falling back to defaults on any failure.
    pub fn load(&self) -> Settings {
        match Settings::load_from(&self.path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Using default settings");
                Settings::default()
            }
        }
    }

    /// Write settings back to the store.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings.save_to(&self.path)?;
        tracing::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Where the engine reads its configuration from.
///
/// Chosen once at startup. `Backed` re-reads the store on every access;
/// `Default` always answers with a fixed value.
#[derive(Debug, Clone)]
pub enum ConfigProvider {
    /// A persisted settings store.
    Backed(SettingsStore),
    /// No store available; use this value.
    Default(AutoSaveConfig),
}

impl ConfigProvider {
    /// Use the platform settings file when a config directory exists.
    pub fn detect() -> Self {
        match SettingsStore::locate() {
            Some(store) => Self::Backed(store),
            None => {
                tracing::warn!("No config directory available, using built-in autosave settings");
                Self::Default(AutoSaveConfig::default())
            }
        }
    }

    /// Current auto-save settings.
    pub fn autosave(&self) -> AutoSaveConfig {
        match self {
            Self::Backed(store) => store.load().autosave,
            Self::Default(config) => config.clone(),
        }
    }

    /// Current temp root, with `~` expanded.
    pub fn temp_root(&self) -> PathBuf {
        self.autosave().temp_root()
    }

    /// The backing store, if any.
    pub fn store(&self) -> Option<&SettingsStore> {
        match self {
            Self::Backed(store) => Some(store),
            Self::Default(_) => None,
        }
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or systems without a home directory, are
/// returned unchanged.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        ""
    } else if let Some(rest) = raw.strip_prefix("~/") {
        rest
    } else {
        return PathBuf::from(raw);
    };

    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => PathBuf::from(raw),
    }
}
