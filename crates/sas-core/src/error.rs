//! Autosave error types.
//!
//! Environment failures (directory creation, record writes, trash moves,
//! settings I/O) are reported through [`AutosaveError`]. None of them is
//! allowed to abort the host event loop: callers log them and carry on.

use std::path::PathBuf;
use thiserror::Error;

/// Autosave operation error.
#[derive(Debug, Error)]
pub enum AutosaveError {
    /// File I/O error.
    #[error("Failed to {operation}: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file exists but is not valid TOML for [`crate::Settings`].
    #[error("Invalid settings file: {path}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be serialized.
    #[error("Failed to serialize settings")]
    SettingsSerialize {
        #[source]
        source: toml::ser::Error,
    },

    /// Moving a file to the platform trash failed.
    #[error("Failed to move {path} to the trash: {reason}")]
    Trash { path: PathBuf, reason: String },

    /// A document was asked to save but has no location yet.
    #[error("Document has no location")]
    NoLocation,
}

impl AutosaveError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} at {}", operation, path.display())
            }
            Self::SettingsParse { path, .. } => {
                format!(
                    "The settings file at {} could not be read; defaults are used instead.",
                    path.display()
                )
            }
            Self::SettingsSerialize { .. } => {
                "An error occurred while writing the settings.".to_string()
            }
            Self::Trash { path, .. } => {
                format!(
                    "The autosave file '{}' could not be moved to the trash and was left in place.",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown")
                )
            }
            Self::NoLocation => "The document has not been given a location yet.".to_string(),
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if operation.starts_with("read") || operation.starts_with("list") {
                    Some("Check that the folder exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to the temporary folder.".into())
                }
            }
            Self::SettingsParse { .. } => {
                Some("Fix or delete the settings file to restore the defaults.".into())
            }
            Self::SettingsSerialize { .. } => None,
            Self::Trash { .. } => {
                Some("Make sure the `gio` tool is installed, or delete the file manually.".into())
            }
            Self::NoLocation => None,
        }
    }
}

/// Result type alias for autosave operations.
pub type Result<T> = std::result::Result<T, AutosaveError>;
