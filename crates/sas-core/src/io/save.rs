//! Record writing operations.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AutosaveError, Result};

/// Write `contents` to `path`.
///
/// Uses atomic write (temp file + rename) so a crash mid-save never leaves
/// a truncated record behind. Every write gets its own temp file, so
/// overlapping saves of one record do not trip over each other.
pub fn write_record(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| AutosaveError::Io {
        operation: "create directory",
        path: parent.to_path_buf(),
        source: e,
    })?;

    // Hidden ".partial" files stay out of session restore
    let mut temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(|e| AutosaveError::Io {
            operation: "create file",
            path: parent.to_path_buf(),
            source: e,
        })?;

    temp.write_all(contents.as_bytes())
        .map_err(|e| AutosaveError::Io {
            operation: "write file",
            path: temp.path().to_path_buf(),
            source: e,
        })?;

    temp.as_file().sync_all().map_err(|e| AutosaveError::Io {
        operation: "sync file",
        path: temp.path().to_path_buf(),
        source: e,
    })?;

    temp.persist(path).map_err(|e| AutosaveError::Io {
        operation: "rename file",
        path: path.to_path_buf(),
        source: e.error,
    })?;

    tracing::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Write a record on the blocking thread pool.
pub async fn write_record_async(path: PathBuf, contents: String) -> Result<()> {
    tokio::task::spawn_blocking(move || write_record(&path, &contents))
        .await
        .map_err(|e| AutosaveError::Io {
            operation: "join save task",
            path: PathBuf::new(),
            source: std::io::Error::other(e),
        })?
}

/// Read a record's contents.
pub fn read_record(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| AutosaveError::Io {
        operation: "read file",
        path: path.to_path_buf(),
        source: e,
    })
}

/// Delete a record. A record that is already gone is not an error.
pub fn remove_record(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("Removed autosave record {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AutosaveError::Io {
            operation: "remove file",
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_record_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("20240101120000.txt");

        write_record(&path, "hello").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_record_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.txt");

        write_record(&path, "one").unwrap();
        write_record(&path, "two").unwrap();

        assert_eq!(read_record(&path).unwrap(), "two");
    }

    #[test]
    fn test_remove_missing_record_is_ok() {
        let dir = tempdir().unwrap();
        remove_record(&dir.path().join("gone.txt")).unwrap();
    }

    #[tokio::test]
    async fn test_write_record_async() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("async.txt");

        write_record_async(path.clone(), "later".to_string())
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "later");
    }

    #[test]
    fn test_records_sharing_a_stem_do_not_collide() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("20240101120000.txt");
        let md = dir.path().join("20240101120000.md");

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..50 {
                    write_record(&txt, "text").unwrap();
                }
            });
            scope.spawn(|| {
                for _ in 0..50 {
                    write_record(&md, "# markdown").unwrap();
                }
            });
        });

        assert_eq!(read_record(&txt).unwrap(), "text");
        assert_eq!(read_record(&md).unwrap(), "# markdown");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_overlapping_writes_of_one_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("20240101120000.txt");

        std::thread::scope(|scope| {
            for n in 0..4 {
                let path = &path;
                scope.spawn(move || {
                    for _ in 0..25 {
                        write_record(path, &format!("writer {n}")).unwrap();
                    }
                });
            }
        });

        assert!(read_record(&path).unwrap().starts_with("writer "));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
