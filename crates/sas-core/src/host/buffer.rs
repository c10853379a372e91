//! A plain text buffer implementing [`Document`].
//!
//! Used by terminal hosts and tests. Saving writes the whole buffer to the
//! location with [`write_record`]; inside a Tokio runtime the write goes to
//! the blocking pool and the call returns immediately. The buffer stays
//! modified until that write has landed, and the file's new modification
//! time is handed back so external changes are still noticed afterwards.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::error::{AutosaveError, Result};
use crate::host::{Document, DocumentId};
use crate::io::{read_record, write_record, write_record_async};

/// State of a background write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteState {
    Running,
    /// Landed; carries the file's modification time right after the write.
    Written(Option<SystemTime>),
    Failed,
}

/// The latest background write, shared with the task performing it.
#[derive(Debug)]
struct BackgroundWrite {
    ticket: u64,
    /// Buffer revision the write captured.
    revision: u64,
    location: PathBuf,
    state: WriteState,
}

#[derive(Debug)]
pub struct BufferDocument {
    id: DocumentId,
    text: String,
    location: Option<PathBuf>,
    modified: bool,
    read_only: bool,
    local: bool,
    /// Modification time of the file as of our last load or synchronous
    /// save. `None` when unknown.
    disk_mtime: Option<SystemTime>,
    /// Bumped on every edit.
    revision: u64,
    tickets: u64,
    background: Arc<Mutex<Option<BackgroundWrite>>>,
}

impl BufferDocument {
    /// An empty buffer with no location.
    pub fn untitled(id: DocumentId) -> Self {
        Self {
            id,
            text: String::new(),
            location: None,
            modified: false,
            read_only: false,
            local: true,
            disk_mtime: None,
            revision: 0,
            tickets: 0,
            background: Arc::new(Mutex::new(None)),
        }
    }

    /// Load a buffer from `path`.
    pub fn open(id: DocumentId, path: &Path) -> Result<Self> {
        let text = read_record(path)?;
        Ok(Self {
            text,
            location: Some(path.to_path_buf()),
            disk_mtime: mtime(path),
            ..Self::untitled(id)
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole buffer.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.touch();
    }

    /// Append to the buffer.
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
        self.touch();
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Mark the buffer as backed by a remote resource.
    pub fn set_local(&mut self, local: bool) {
        self.local = local;
    }

    /// Save synchronously to the current location.
    pub fn save(&mut self) -> Result<()> {
        let path = self.location.clone().ok_or(AutosaveError::NoLocation)?;
        write_record(&path, &self.text)?;
        self.forget_background();
        self.modified = false;
        self.disk_mtime = mtime(&path);
        Ok(())
    }

    /// A background save is still running.
    pub fn is_saving(&self) -> bool {
        self.with_background(|write| write.state == WriteState::Running)
            .unwrap_or(false)
    }

    fn touch(&mut self) {
        self.modified = true;
        self.revision += 1;
    }

    fn forget_background(&mut self) {
        if let Ok(mut guard) = self.background.lock() {
            *guard = None;
        }
    }

    /// Look at the latest background write, if it targeted the current
    /// location.
    fn with_background<T>(&self, f: impl FnOnce(&BackgroundWrite) -> T) -> Option<T> {
        let guard = self.background.lock().ok()?;
        let write = guard.as_ref()?;
        if self.location.as_ref() != Some(&write.location) {
            return None;
        }
        Some(f(write))
    }
}

impl Document for BufferDocument {
    fn id(&self) -> DocumentId {
        self.id
    }

    fn is_modified(&self) -> bool {
        if !self.modified {
            return false;
        }
        let landed = self.with_background(|write| {
            matches!(write.state, WriteState::Written(_)) && write.revision == self.revision
        });
        !landed.unwrap_or(false)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn is_externally_modified(&self) -> bool {
        let Some(path) = &self.location else {
            return false;
        };
        let known = match self.with_background(|write| write.state) {
            // Our own write is touching the file
            Some(WriteState::Running) => return false,
            Some(WriteState::Written(at)) => at,
            Some(WriteState::Failed) | None => self.disk_mtime,
        };
        known.is_some_and(|known| mtime(path).is_some_and(|current| current != known))
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn location(&self) -> Option<PathBuf> {
        self.location.clone()
    }

    fn set_location(&mut self, location: PathBuf) {
        self.forget_background();
        self.location = Some(location);
        self.disk_mtime = None;
    }

    fn save_async(&mut self) {
        let Some(path) = self.location.clone() else {
            tracing::warn!(document = %self.id, "Save requested for a document without location");
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                self.tickets += 1;
                let ticket = self.tickets;
                if let Ok(mut guard) = self.background.lock() {
                    *guard = Some(BackgroundWrite {
                        ticket,
                        revision: self.revision,
                        location: path.clone(),
                        state: WriteState::Running,
                    });
                }

                let slot = Arc::clone(&self.background);
                let contents = self.text.clone();
                let id = self.id;
                handle.spawn(async move {
                    let state = match write_record_async(path.clone(), contents).await {
                        Ok(()) => WriteState::Written(mtime(&path)),
                        Err(e) => {
                            tracing::warn!(document = %id, error = %e, "Background save failed");
                            WriteState::Failed
                        }
                    };
                    if let Ok(mut guard) = slot.lock()
                        && let Some(write) = guard.as_mut()
                        && write.ticket == ticket
                    {
                        write.state = state;
                    }
                });
            }
            Err(_) => {
                if let Err(e) = self.save() {
                    tracing::warn!(document = %self.id, error = %e, "Save failed");
                }
            }
        }
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_untitled_buffer() {
        let mut doc = BufferDocument::untitled(DocumentId(1));
        assert!(!doc.is_modified());
        assert!(doc.location().is_none());

        doc.push_str("abc");
        assert!(doc.is_modified());
        assert_eq!(doc.text(), "abc");
    }

    #[test]
    fn test_save_without_location_fails() {
        let mut doc = BufferDocument::untitled(DocumentId(1));
        doc.set_text("x");
        assert!(matches!(doc.save(), Err(AutosaveError::NoLocation)));
        assert!(doc.is_modified());
    }

    #[test]
    fn test_save_async_outside_runtime_writes_inline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        let mut doc = BufferDocument::untitled(DocumentId(1));
        doc.set_text("hello");
        doc.set_location(path.clone());
        doc.save_async();

        assert!(!doc.is_modified());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
        assert!(!doc.is_externally_modified());
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# title").unwrap();

        let doc = BufferDocument::open(DocumentId(4), &path).unwrap();
        assert_eq!(doc.text(), "# title");
        assert_eq!(doc.location(), Some(path));
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_external_change_is_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "one").unwrap();
        let doc = BufferDocument::open(DocumentId(1), &path).unwrap();

        let later = SystemTime::now() + std::time::Duration::from_secs(60);
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(later).unwrap();

        assert!(doc.is_externally_modified());
    }

    fn wait_for_background(doc: &BufferDocument) {
        for _ in 0..200 {
            if !doc.is_saving() {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        panic!("background save did not finish");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_background_save_keeps_tracking_external_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        let mut doc = BufferDocument::untitled(DocumentId(1));
        doc.set_text("draft");
        doc.set_location(path.clone());
        doc.save_async();
        wait_for_background(&doc);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "draft");
        assert!(!doc.is_modified());
        assert!(!doc.is_externally_modified());

        std::fs::write(&path, "changed elsewhere").unwrap();
        let later = SystemTime::now() + std::time::Duration::from_secs(60);
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(later).unwrap();

        assert!(doc.is_externally_modified());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failed_background_save_leaves_buffer_dirty() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut doc = BufferDocument::untitled(DocumentId(2));
        doc.set_text("precious");
        doc.set_location(blocker.join("doc.txt"));
        doc.save_async();

        assert!(doc.is_modified());
        wait_for_background(&doc);
        assert!(doc.is_modified());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_edit_during_background_save_stays_dirty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.txt");

        let mut doc = BufferDocument::untitled(DocumentId(3));
        doc.set_text("one");
        doc.set_location(path.clone());
        doc.save_async();
        doc.push_str(" two");
        wait_for_background(&doc);

        assert!(doc.is_modified());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");
    }
}
