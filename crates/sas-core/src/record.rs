//! Autosave record naming.
//!
//! Records are flat files in the temp root named after the moment a
//! location was first assigned: `YYYYMMDDHHMMSS.txt`. Two documents that
//! get a location within the same second receive `_01` to `_99` suffixes;
//! past that, names spill into the following second. `_` sorts after `.`,
//! so lexicographic order stays chronological.

use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, SubsecRound, TimeDelta};

/// `chrono` format of the timestamp part of a record name.
pub const RECORD_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Extension of newly created records.
pub const RECORD_EXTENSION: &str = "txt";

/// Extensions picked up when restoring a session.
pub const RESTORABLE_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// File name for a record created at `timestamp`, with collision index `seq`.
pub fn record_file_name(timestamp: NaiveDateTime, seq: u32) -> String {
    let stamp = timestamp.format(RECORD_TIMESTAMP_FORMAT);
    if seq == 0 {
        format!("{stamp}.{RECORD_EXTENSION}")
    } else {
        format!("{stamp}_{seq:02}.{RECORD_EXTENSION}")
    }
}

/// Parse the creation time out of a record file name.
///
/// Accepts both plain and suffixed names; returns `None` for anything else.
pub fn parse_record_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stem = file_name.split_once('.').map_or(file_name, |(stem, _)| stem);
    let stamp = stem.split_once('_').map_or(stem, |(stamp, _)| stamp);
    if stamp.len() != 14 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, RECORD_TIMESTAMP_FORMAT).ok()
}

/// Whether `path` has one of the [`RESTORABLE_EXTENSIONS`].
pub fn is_restorable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| RESTORABLE_EXTENSIONS.contains(&ext))
}

/// Highest collision index; `_99` is the last suffix of a second.
pub const MAX_COLLISION_SEQ: u32 = 99;

/// Hands out unique record paths.
///
/// Remembers how many names were issued for the current second, and also
/// skips names that already exist on disk (records left by an earlier run).
/// Once a second has used all its suffixes, allocation moves on to the next
/// second, so names never go backwards in time and always sort in the
/// order they were handed out.
#[derive(Debug, Clone, Default)]
pub struct RecordNamer {
    /// Second of the last name handed out.
    last: Option<NaiveDateTime>,
    issued: u32,
}

impl RecordNamer {
    /// Create a namer with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free record path inside `root` for a document created at `now`.
    pub fn allocate(&mut self, root: &Path, now: NaiveDateTime) -> PathBuf {
        let now = now.trunc_subsecs(0);
        let mut at = match self.last {
            Some(last) if last > now => last,
            _ => now,
        };
        let mut seq = self.first_free_seq(at);

        loop {
            if seq > MAX_COLLISION_SEQ {
                let Some(next) = at.checked_add_signed(TimeDelta::seconds(1)) else {
                    break;
                };
                at = next;
                seq = self.first_free_seq(at);
                continue;
            }
            if !root.join(record_file_name(at, seq)).exists() {
                break;
            }
            seq += 1;
        }

        self.last = Some(at);
        self.issued = seq + 1;
        root.join(record_file_name(at, seq))
    }

    fn first_free_seq(&self, at: NaiveDateTime) -> u32 {
        if self.last == Some(at) { self.issued } else { 0 }
    }
}
