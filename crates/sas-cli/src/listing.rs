//! Record inventory of a temp folder.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use sas_core::list_records;
use sas_core::record::parse_record_timestamp;

/// One restorable file in the temp folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub path: PathBuf,
    pub name: String,
    /// Creation time encoded in the name; `None` for hand-made files.
    pub saved_at: Option<NaiveDateTime>,
    pub size: u64,
}

/// Collect the records of `root`, oldest first.
pub fn collect_entries(root: &Path) -> sas_core::Result<Vec<RecordEntry>> {
    let entries = list_records(root)?
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let saved_at = parse_record_timestamp(&name);
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            RecordEntry {
                path,
                name,
                saved_at,
                size,
            }
        })
        .collect();
    Ok(entries)
}

/// Resolve a record argument: a bare file name is looked up in `root`,
/// anything with a directory part is taken as a path.
pub fn resolve_record(root: &Path, record: &str) -> PathBuf {
    let candidate = Path::new(record);
    if candidate.components().count() == 1 {
        root.join(candidate)
    } else {
        candidate.to_path_buf()
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_entries_parses_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("20240101120000_01.txt"), "abc").unwrap();
        std::fs::write(dir.path().join("20240101120000.txt"), "a").unwrap();
        std::fs::write(dir.path().join("todo.md"), "").unwrap();

        let entries = collect_entries(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["20240101120000.txt", "20240101120000_01.txt", "todo.md"]
        );
        assert_eq!(entries[1].size, 3);
        assert_eq!(entries[0].saved_at, entries[1].saved_at);
        assert!(entries[2].saved_at.is_none());
    }

    #[test]
    fn test_resolve_record() {
        let root = Path::new("/tmp/.gedit");
        assert_eq!(
            resolve_record(root, "20240101120000.txt"),
            root.join("20240101120000.txt")
        );
        assert_eq!(
            resolve_record(root, "/elsewhere/a.txt"),
            PathBuf::from("/elsewhere/a.txt")
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
