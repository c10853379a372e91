//! Interfaces the host editor provides to the engine.
//!
//! The engine never owns documents or windows. It reads document state,
//! assigns locations, asks the host to save, and opens tabs through these
//! traits. Two reusable adapters live here as well: [`BufferDocument`] and
//! [`CommandTrash`].

mod buffer;
mod trash;

use std::fmt;
use std::path::{Path, PathBuf};

pub use buffer::BufferDocument;
pub use trash::CommandTrash;

use crate::error::Result;

/// Identifier of a top-level editor window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Identifier of an open document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// An open editable buffer, owned by the host.
pub trait Document {
    fn id(&self) -> DocumentId;

    /// Buffer differs from what was last saved.
    fn is_modified(&self) -> bool;

    fn is_read_only(&self) -> bool;

    /// The file on disk changed behind the editor's back.
    fn is_externally_modified(&self) -> bool;

    /// Location is a local file (not a remote or virtual resource).
    fn is_local(&self) -> bool;

    fn location(&self) -> Option<PathBuf>;

    fn set_location(&mut self, location: PathBuf);

    /// Start saving to the current location. Fire-and-forget.
    fn save_async(&mut self);
}

/// Enumerates the host's top-level windows.
pub trait WindowRegistry {
    fn windows(&self) -> Vec<WindowId>;
}

/// Host events the engine can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    DocumentChanged,
    ActiveTabChanged,
    FocusLost,
    TabRemoved,
    WindowClosing,
    WindowShown,
}

/// An event delivered by the host to [`crate::AutosaveSession::handle_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    DocumentChanged {
        window: WindowId,
        document: DocumentId,
    },
    ActiveTabChanged {
        window: WindowId,
    },
    FocusLost {
        window: WindowId,
    },
    /// A tab was closed. The host keeps the document reachable through
    /// [`TabHost::document_mut`] until the handler returns.
    TabRemoved {
        window: WindowId,
        document: DocumentId,
    },
    WindowClosing {
        window: WindowId,
    },
    WindowShown {
        window: WindowId,
    },
}

impl HostEvent {
    /// Window the event belongs to.
    pub fn window(&self) -> WindowId {
        match *self {
            Self::DocumentChanged { window, .. }
            | Self::ActiveTabChanged { window }
            | Self::FocusLost { window }
            | Self::TabRemoved { window, .. }
            | Self::WindowClosing { window }
            | Self::WindowShown { window } => window,
        }
    }

    pub fn kind(&self) -> HostEventKind {
        match self {
            Self::DocumentChanged { .. } => HostEventKind::DocumentChanged,
            Self::ActiveTabChanged { .. } => HostEventKind::ActiveTabChanged,
            Self::FocusLost { .. } => HostEventKind::FocusLost,
            Self::TabRemoved { .. } => HostEventKind::TabRemoved,
            Self::WindowClosing { .. } => HostEventKind::WindowClosing,
            Self::WindowShown { .. } => HostEventKind::WindowShown,
        }
    }
}

/// A registered host callback.
///
/// The release closure supplied by the host runs exactly once, either on
/// [`Subscription::release`] or when the handle is dropped.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    kind: HostEventKind,
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(kind: HostEventKind, release: impl FnOnce() + 'static) -> Self {
        Self {
            kind,
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached(kind: HostEventKind) -> Self {
        Self {
            kind,
            release: None,
        }
    }

    pub fn kind(&self) -> HostEventKind {
        self.kind
    }

    /// Release now instead of at drop.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Tabs and documents of the host's windows.
pub trait TabHost {
    /// Documents of `window` with unsaved changes.
    fn unsaved_documents(&mut self, window: WindowId) -> Vec<&mut dyn Document>;

    fn document_mut(&mut self, id: DocumentId) -> Option<&mut dyn Document>;

    /// All documents of `window`, in tab order.
    fn documents(&self, window: WindowId) -> Vec<DocumentId>;

    /// Open each location as a tab; returns the new documents in order.
    fn open_locations(&mut self, window: WindowId, locations: &[PathBuf]) -> Vec<DocumentId>;

    fn set_active(&mut self, window: WindowId, document: DocumentId);

    fn subscribe(&mut self, window: WindowId, kind: HostEventKind) -> Subscription;
}

/// Answer to a [`PromptRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptChoice {
    Yes,
    No,
    Cancel,
}

/// A modal question shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub title: String,
    pub detail: String,
    /// The file the question is about.
    pub path: PathBuf,
}

impl PromptRequest {
    /// The "keep this autosaved document?" question for `path`.
    pub fn keep_autosave(path: &Path) -> Self {
        Self {
            title: "Save document?".to_string(),
            detail: "Do you want to keep the changes made to this document?".to_string(),
            path: path.to_path_buf(),
        }
    }
}

/// Shows modal questions and returns the user's choice synchronously.
pub trait UserPrompt {
    fn ask(&mut self, request: &PromptRequest) -> PromptChoice;
}

/// Moves files to the platform trash.
pub trait TrashFacility {
    fn move_to_trash(&mut self, path: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_subscription_releases_once_on_drop() {
        let released = Rc::new(Cell::new(0));
        let counter = Rc::clone(&released);
        let sub = Subscription::new(HostEventKind::FocusLost, move || {
            counter.set(counter.get() + 1)
        });
        assert_eq!(released.get(), 0);
        drop(sub);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_explicit_release_does_not_double_release() {
        let released = Rc::new(Cell::new(0));
        let counter = Rc::clone(&released);
        let sub = Subscription::new(HostEventKind::TabRemoved, move || {
            counter.set(counter.get() + 1)
        });
        sub.release();
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_event_window_and_kind() {
        let event = HostEvent::TabRemoved {
            window: WindowId(3),
            document: DocumentId(9),
        };
        assert_eq!(event.window(), WindowId(3));
        assert_eq!(event.kind(), HostEventKind::TabRemoved);
    }
}
