//! Terminal host for a single scratch window.
//!
//! [`ScratchHost`] plays the editor: it owns the buffers of one window and
//! implements the host traits the engine needs. [`run_scratch`] is its
//! event loop. Input lines arrive over a channel from a reader thread; the
//! loop sleeps until the next debounce deadline and ticks the session.

use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use sas_core::{
    AutosaveSession, BufferDocument, Document, DocumentId, HostEvent, HostEventKind,
    Subscription, TabHost, WindowId, WindowRegistry,
};

/// How long the loop waits for input when no timer is pending.
const IDLE_WAIT: Duration = Duration::from_secs(1);

/// The only window of the scratch host.
pub const SCRATCH_WINDOW: WindowId = WindowId(1);

#[derive(Debug)]
pub struct ScratchHost {
    window: WindowId,
    tabs: Vec<BufferDocument>,
    active: Option<DocumentId>,
    next_id: u64,
}

impl Default for ScratchHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchHost {
    pub fn new() -> Self {
        Self {
            window: SCRATCH_WINDOW,
            tabs: Vec::new(),
            active: None,
            next_id: 1,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    /// Open an empty untitled tab and make it active.
    pub fn new_buffer(&mut self) -> DocumentId {
        let id = self.allocate_id();
        self.tabs.push(BufferDocument::untitled(id));
        self.active = Some(id);
        id
    }

    pub fn buffer(&self, id: DocumentId) -> Option<&BufferDocument> {
        self.tabs.iter().find(|doc| doc.id() == id)
    }

    pub fn buffer_mut(&mut self, id: DocumentId) -> Option<&mut BufferDocument> {
        self.tabs.iter_mut().find(|doc| doc.id() == id)
    }

    pub fn active(&self) -> Option<DocumentId> {
        self.active
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Drop a tab after the engine has seen its `TabRemoved` event.
    pub fn close(&mut self, id: DocumentId) -> Option<BufferDocument> {
        let index = self.tabs.iter().position(|doc| doc.id() == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.tabs.remove(index))
    }

    fn allocate_id(&mut self) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl WindowRegistry for ScratchHost {
    fn windows(&self) -> Vec<WindowId> {
        vec![self.window]
    }
}

impl TabHost for ScratchHost {
    fn unsaved_documents(&mut self, window: WindowId) -> Vec<&mut dyn Document> {
        if window != self.window {
            return Vec::new();
        }
        self.tabs
            .iter_mut()
            .filter(|doc| doc.is_modified())
            .map(|doc| doc as &mut dyn Document)
            .collect()
    }

    fn document_mut(&mut self, id: DocumentId) -> Option<&mut dyn Document> {
        self.buffer_mut(id).map(|doc| doc as &mut dyn Document)
    }

    fn documents(&self, window: WindowId) -> Vec<DocumentId> {
        if window != self.window {
            return Vec::new();
        }
        self.tabs.iter().map(|doc| doc.id()).collect()
    }

    fn open_locations(&mut self, window: WindowId, locations: &[PathBuf]) -> Vec<DocumentId> {
        if window != self.window {
            return Vec::new();
        }
        let mut opened = Vec::with_capacity(locations.len());
        for path in locations {
            let id = self.allocate_id();
            match BufferDocument::open(id, path) {
                Ok(doc) => {
                    self.tabs.push(doc);
                    opened.push(id);
                }
                Err(e) => tracing::warn!(error = %e, "{}", e.user_message()),
            }
        }
        opened
    }

    fn set_active(&mut self, window: WindowId, document: DocumentId) {
        if window == self.window {
            self.active = Some(document);
        }
    }

    fn subscribe(&mut self, window: WindowId, kind: HostEventKind) -> Subscription {
        Subscription::new(kind, move || {
            tracing::trace!(%window, ?kind, "Subscription released");
        })
    }
}

/// What a scratch run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchOutcome {
    /// Where the scratch buffer ended up, if it was ever saved.
    pub location: Option<PathBuf>,
    /// Records reopened from earlier sessions.
    pub restored: usize,
    /// Lines read from input.
    pub lines: usize,
    /// Debounced saves that fired while typing.
    pub debounced_saves: usize,
}

/// Read standard input line by line on a background thread.
///
/// The channel disconnects at end of input or on a read error.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stopped reading input");
                    break;
                }
            }
        }
    });
    rx
}

/// Drive `session` with lines from `input` until the channel disconnects.
///
/// The window is shown first, which restores leftover records on a first
/// run. A fresh scratch buffer receives every line. When input ends the
/// window loses focus, which saves whatever is still unsaved, and the
/// window is deactivated.
pub fn run_scratch(
    session: &mut AutosaveSession,
    host: &mut ScratchHost,
    input: &Receiver<String>,
) -> ScratchOutcome {
    let window = host.window();
    session.activate_window(host, window);
    session.handle_event(host, HostEvent::WindowShown { window });
    let restored = host.tab_count();

    let document = host.new_buffer();
    session.attach_document(host, window, document);
    session.handle_event(host, HostEvent::ActiveTabChanged { window });

    let mut lines = 0;
    let mut debounced_saves = 0;
    loop {
        let wait = session
            .next_deadline()
            .map_or(IDLE_WAIT, |deadline| {
                deadline.saturating_duration_since(Instant::now())
            });

        match input.recv_timeout(wait) {
            Ok(line) => {
                if let Some(buffer) = host.buffer_mut(document) {
                    buffer.push_str(&line);
                    buffer.push_str("\n");
                }
                lines += 1;
                session.handle_event(host, HostEvent::DocumentChanged { window, document });
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
        debounced_saves += session.tick(host, Instant::now());
    }

    session.handle_event(host, HostEvent::FocusLost { window });
    session.deactivate_window(window);

    let location = host.buffer(document).and_then(|doc| doc.location());
    tracing::debug!(lines, debounced_saves, "Scratch input finished");
    ScratchOutcome {
        location,
        restored,
        lines,
        debounced_saves,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_becomes_active() {
        let mut host = ScratchHost::new();
        let first = host.new_buffer();
        let second = host.new_buffer();

        assert_ne!(first, second);
        assert_eq!(host.active(), Some(second));
        assert_eq!(host.documents(SCRATCH_WINDOW), vec![first, second]);
    }

    #[test]
    fn test_unsaved_documents_only_lists_modified() {
        let mut host = ScratchHost::new();
        let clean = host.new_buffer();
        let dirty = host.new_buffer();
        host.buffer_mut(dirty).unwrap().push_str("x");

        let unsaved: Vec<_> = host
            .unsaved_documents(SCRATCH_WINDOW)
            .iter()
            .map(|doc| doc.id())
            .collect();
        assert_eq!(unsaved, vec![dirty]);
        assert!(!unsaved.contains(&clean));
        assert!(host.unsaved_documents(WindowId(9)).is_empty());
    }

    #[test]
    fn test_open_locations_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("20240101110000.txt");
        std::fs::write(&good, "kept").unwrap();
        let missing = dir.path().join("20240101120000.txt");

        let mut host = ScratchHost::new();
        let opened = host.open_locations(SCRATCH_WINDOW, &[good.clone(), missing]);

        assert_eq!(opened.len(), 1);
        assert_eq!(host.buffer(opened[0]).unwrap().text(), "kept");
        assert_eq!(host.buffer(opened[0]).unwrap().location(), Some(good));
    }

    #[test]
    fn test_close_clears_active() {
        let mut host = ScratchHost::new();
        let id = host.new_buffer();
        assert!(host.close(id).is_some());
        assert_eq!(host.active(), None);
        assert!(host.close(id).is_none());
    }
}
