//! Decides whether and where a document is autosaved.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::host::Document;
use crate::record::RecordNamer;

/// Why a document was not saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ReadOnly,
    ExternalModification,
    NonLocal,
    Unmodified,
    /// The temp root could not be created; the document was left untouched.
    TempRootUnavailable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::ExternalModification => "external_modification",
            Self::NonLocal => "non_local",
            Self::Unmodified => "unmodified",
            Self::TempRootUnavailable => "temp_root_unavailable",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`AutosavePolicy::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveDecision {
    Skip(SkipReason),
    SaveTo(PathBuf),
}

/// Autosave rules.
///
/// Checks, in order: read-only, externally modified, missing location
/// (assigns a fresh record path in the temp root and continues), non-local,
/// unmodified. A document that passes all of them is saved to its location.
/// The location assigned in the third step sticks even if a later check
/// skips the save.
#[derive(Debug, Clone, Default)]
pub struct AutosavePolicy {
    namer: RecordNamer,
}

impl AutosavePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `document` against the rules, using the local clock.
    pub fn evaluate(&mut self, document: &mut dyn Document, temp_root: &Path) -> SaveDecision {
        self.evaluate_at(document, temp_root, Local::now().naive_local())
    }

    /// Evaluate `document` as if the current local time were `now`.
    pub fn evaluate_at(
        &mut self,
        document: &mut dyn Document,
        temp_root: &Path,
        now: NaiveDateTime,
    ) -> SaveDecision {
        if document.is_read_only() {
            return SaveDecision::Skip(SkipReason::ReadOnly);
        }
        if document.is_externally_modified() {
            return SaveDecision::Skip(SkipReason::ExternalModification);
        }

        let location = match document.location() {
            Some(location) => location,
            None => {
                if let Err(e) = std::fs::create_dir_all(temp_root) {
                    tracing::warn!(
                        path = %temp_root.display(),
                        error = %e,
                        "Could not create autosave folder"
                    );
                    return SaveDecision::Skip(SkipReason::TempRootUnavailable);
                }
                let location = self.namer.allocate(temp_root, now);
                tracing::debug!(
                    document = %document.id(),
                    location = %location.display(),
                    "Assigned autosave location"
                );
                document.set_location(location.clone());
                location
            }
        };

        if !document.is_local() {
            return SaveDecision::Skip(SkipReason::NonLocal);
        }
        if !document.is_modified() {
            return SaveDecision::Skip(SkipReason::Unmodified);
        }

        SaveDecision::SaveTo(location)
    }

    /// Evaluate and, on [`SaveDecision::SaveTo`], start the host save.
    pub fn run(&mut self, document: &mut dyn Document, temp_root: &Path) -> SaveDecision {
        let decision = self.evaluate(document, temp_root);
        apply(&decision, document);
        decision
    }
}

/// Carry out a decision: start a save for `SaveTo`, nothing for `Skip`.
pub fn apply(decision: &SaveDecision, document: &mut dyn Document) {
    match decision {
        SaveDecision::SaveTo(path) => {
            tracing::debug!(document = %document.id(), path = %path.display(), "Autosaving");
            document.save_async();
        }
        SaveDecision::Skip(reason) => {
            tracing::trace!(document = %document.id(), %reason, "Autosave skipped");
        }
    }
}
