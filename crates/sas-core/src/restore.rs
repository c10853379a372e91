//! Session restore from the temp root.

use std::path::{Path, PathBuf};

use crate::error::{AutosaveError, Result};
use crate::record::is_restorable;

/// Lists all restorable records (`.txt`, `.md`) directly inside `dir`.
///
/// Returns paths sorted lexicographically, which is chronological for
/// timestamp-named records. A missing directory yields an empty list.
pub fn list_records(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|e| AutosaveError::Io {
        operation: "list directory",
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut records = Vec::new();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if !is_restorable(&path) {
            continue;
        }
        // Listing and existence check are not atomic; a record deleted in
        // between is simply dropped.
        if !path.is_file() {
            continue;
        }
        records.push(path);
    }

    records.sort();
    Ok(records)
}

/// Finds autosave records left by earlier sessions.
#[derive(Debug, Clone)]
pub struct SessionRestorer {
    temp_root: PathBuf,
}

impl SessionRestorer {
    pub fn new(temp_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
        }
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Records to reopen, oldest first.
    ///
    /// Never fails: an unreadable temp root is logged and treated as empty.
    pub fn restore(&self) -> Vec<PathBuf> {
        match list_records(&self.temp_root) {
            Ok(records) => {
                tracing::debug!(
                    count = records.len(),
                    root = %self.temp_root.display(),
                    "Found autosave records"
                );
                records
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not scan autosave folder");
                Vec::new()
            }
        }
    }
}
