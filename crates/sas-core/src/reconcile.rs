//! What to do with an autosave record when its tab is closed.

use std::path::{Path, PathBuf};

use crate::host::{Document, PromptChoice, PromptRequest, TrashFacility, UserPrompt};

/// Why a tab is going away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The user closed this tab.
    TabClosed,
    /// The whole window is closing; temp tabs are not prompted for.
    WindowClosing,
}

/// Outcome of [`OrphanReconciler::on_tab_closing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Not a temp-backed tab, or the window is closing.
    None,
    /// The record was sent to the trash (or the attempt was reported).
    DiscardToTrash(PathBuf),
    /// The user backed out; the caller reopens this location as a tab.
    Reopen(PathBuf),
    /// The document was saved to its temp location and kept.
    SaveAndKeep,
}

/// Whether `path` is an autosave record location.
///
/// True when `path` is under `temp_root`, or when one of its segments
/// equals the temp root's own directory name (e.g. `.gedit`), which also
/// catches records reached through another mount or symlink.
pub fn is_in_temp_root(path: &Path, temp_root: &Path) -> bool {
    if path.starts_with(temp_root) {
        return true;
    }
    match temp_root.file_name() {
        Some(marker) => path
            .parent()
            .is_some_and(|parent| parent.components().any(|c| c.as_os_str() == marker)),
        None => false,
    }
}

/// Asks the user about temp-backed tabs as they close.
pub struct OrphanReconciler {
    prompt: Box<dyn UserPrompt>,
    trash: Box<dyn TrashFacility>,
}

impl OrphanReconciler {
    pub fn new(prompt: Box<dyn UserPrompt>, trash: Box<dyn TrashFacility>) -> Self {
        Self { prompt, trash }
    }

    /// Decide and carry out the fate of `document`'s record.
    ///
    /// Yes saves the document in place, No trashes the record, Cancel asks
    /// the caller to reopen it. A failed trash move is logged and the file
    /// stays where it is.
    pub fn on_tab_closing(
        &mut self,
        document: &mut dyn Document,
        reason: CloseReason,
        temp_root: &Path,
    ) -> ReconcileAction {
        if reason == CloseReason::WindowClosing {
            return ReconcileAction::None;
        }
        let Some(location) = document.location() else {
            return ReconcileAction::None;
        };
        if !is_in_temp_root(&location, temp_root) {
            return ReconcileAction::None;
        }

        let choice = self.prompt.ask(&PromptRequest::keep_autosave(&location));
        tracing::debug!(document = %document.id(), ?choice, "Closing temp-backed tab");

        match choice {
            PromptChoice::Yes => {
                document.save_async();
                ReconcileAction::SaveAndKeep
            }
            PromptChoice::No => {
                if let Err(e) = self.trash.move_to_trash(&location) {
                    tracing::error!(
                        path = %location.display(),
                        error = %e,
                        "{}",
                        e.user_message()
                    );
                }
                ReconcileAction::DiscardToTrash(location)
            }
            PromptChoice::Cancel => ReconcileAction::Reopen(location),
        }
    }
}

impl std::fmt::Debug for OrphanReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrphanReconciler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AutosaveError, Result};
    use crate::host::{BufferDocument, DocumentId};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Scripted(PromptChoice, Rc<RefCell<usize>>);

    impl UserPrompt for Scripted {
        fn ask(&mut self, _request: &PromptRequest) -> PromptChoice {
            *self.1.borrow_mut() += 1;
            self.0
        }
    }

    #[derive(Default, Clone)]
    struct RecordingTrash {
        moved: Rc<RefCell<Vec<PathBuf>>>,
        fail: bool,
    }

    impl TrashFacility for RecordingTrash {
        fn move_to_trash(&mut self, path: &Path) -> Result<()> {
            if self.fail {
                return Err(AutosaveError::Trash {
                    path: path.to_path_buf(),
                    reason: "permission denied".into(),
                });
            }
            self.moved.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    fn temp_doc(root: &Path) -> BufferDocument {
        let mut doc = BufferDocument::untitled(DocumentId(1));
        doc.set_location(root.join("20240101120000.txt"));
        doc
    }

    fn reconciler(choice: PromptChoice, trash: RecordingTrash) -> (OrphanReconciler, Rc<RefCell<usize>>) {
        let asked = Rc::new(RefCell::new(0));
        let reconciler =
            OrphanReconciler::new(Box::new(Scripted(choice, Rc::clone(&asked))), Box::new(trash));
        (reconciler, asked)
    }

    #[test]
    fn test_membership() {
        let root = Path::new("/home/u/Documents/.gedit");
        assert!(is_in_temp_root(Path::new("/home/u/Documents/.gedit/1.txt"), root));
        assert!(is_in_temp_root(Path::new("/mnt/home/u/Documents/.gedit/1.txt"), root));
        assert!(!is_in_temp_root(Path::new("/home/u/notes/1.txt"), root));
        assert!(!is_in_temp_root(Path::new("/home/u/.gedit-notes/1.txt"), root));
    }

    #[test]
    fn test_no_trashes_record() {
        let trash = RecordingTrash::default();
        let (mut reconciler, _) = reconciler(PromptChoice::No, trash.clone());
        let root = Path::new("/tmp/.gedit");
        let mut doc = temp_doc(root);

        let action = reconciler.on_tab_closing(&mut doc, CloseReason::TabClosed, root);

        let expected = root.join("20240101120000.txt");
        assert_eq!(action, ReconcileAction::DiscardToTrash(expected.clone()));
        assert_eq!(*trash.moved.borrow(), vec![expected]);
    }

    #[test]
    fn test_failed_trash_is_still_reported_as_discard() {
        let trash = RecordingTrash {
            fail: true,
            ..Default::default()
        };
        let (mut reconciler, _) = reconciler(PromptChoice::No, trash.clone());
        let root = Path::new("/tmp/.gedit");
        let mut doc = temp_doc(root);

        let action = reconciler.on_tab_closing(&mut doc, CloseReason::TabClosed, root);

        assert!(matches!(action, ReconcileAction::DiscardToTrash(_)));
        assert!(trash.moved.borrow().is_empty());
    }

    #[test]
    fn test_cancel_asks_for_reopen() {
        let (mut reconciler, _) = reconciler(PromptChoice::Cancel, RecordingTrash::default());
        let root = Path::new("/tmp/.gedit");
        let mut doc = temp_doc(root);

        let action = reconciler.on_tab_closing(&mut doc, CloseReason::TabClosed, root);

        assert_eq!(action, ReconcileAction::Reopen(root.join("20240101120000.txt")));
    }

    #[test]
    fn test_yes_saves_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let (mut reconciler, _) = reconciler(PromptChoice::Yes, RecordingTrash::default());
        let mut doc = temp_doc(dir.path());
        doc.set_text("keep me");

        let action = reconciler.on_tab_closing(&mut doc, CloseReason::TabClosed, dir.path());

        assert_eq!(action, ReconcileAction::SaveAndKeep);
        let saved = std::fs::read_to_string(dir.path().join("20240101120000.txt")).unwrap();
        assert_eq!(saved, "keep me");
    }

    #[test]
    fn test_window_closing_never_prompts() {
        let trash = RecordingTrash::default();
        let (mut reconciler, asked) = reconciler(PromptChoice::No, trash.clone());
        let root = Path::new("/tmp/.gedit");
        let mut doc = temp_doc(root);

        let action = reconciler.on_tab_closing(&mut doc, CloseReason::WindowClosing, root);

        assert_eq!(action, ReconcileAction::None);
        assert_eq!(*asked.borrow(), 0);
        assert!(trash.moved.borrow().is_empty());
    }

    #[test]
    fn test_documents_outside_temp_root_are_ignored() {
        let (mut reconciler, asked) = reconciler(PromptChoice::No, RecordingTrash::default());
        let mut doc = BufferDocument::untitled(DocumentId(2));
        doc.set_location(PathBuf::from("/home/u/notes.txt"));

        let action =
            reconciler.on_tab_closing(&mut doc, CloseReason::TabClosed, Path::new("/tmp/.gedit"));

        assert_eq!(action, ReconcileAction::None);
        assert_eq!(*asked.borrow(), 0);

        let mut untitled = BufferDocument::untitled(DocumentId(3));
        let action =
            reconciler.on_tab_closing(&mut untitled, CloseReason::TabClosed, Path::new("/tmp/.gedit"));
        assert_eq!(action, ReconcileAction::None);
    }
}
