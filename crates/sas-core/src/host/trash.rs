//! Trash through an external command (`gio trash` by default).

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use crate::error::{AutosaveError, Result};
use crate::host::TrashFacility;

/// Runs `<program> <args...> <path>` to trash a file.
#[derive(Debug, Clone)]
pub struct CommandTrash {
    program: OsString,
    args: Vec<OsString>,
}

impl Default for CommandTrash {
    fn default() -> Self {
        Self::new("gio", ["trash"])
    }
}

impl CommandTrash {
    pub fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl TrashFacility for CommandTrash {
    fn move_to_trash(&mut self, path: &Path) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .map_err(|e| AutosaveError::Trash {
                path: path.to_path_buf(),
                reason: format!("could not run {}: {e}", self.program.to_string_lossy()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AutosaveError::Trash {
                path: path.to_path_buf(),
                reason: format!("{} ({})", output.status, stderr.trim()),
            });
        }

        tracing::info!("Moved {} to the trash", path.display());
        Ok(())
    }
}
