//! The engine object a host drives.
//!
//! One [`AutosaveSession`] lives for the whole editor process. The host
//! activates it for each window, attaches each document view, forwards
//! events and calls [`AutosaveSession::tick`] from its idle loop. Per-window
//! state (subscriptions, closing flag) lives in a side table keyed by
//! [`WindowId`] rather than on the host's window objects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::autosave::{AutoSaveConfig, AutosavePolicy, DebounceScheduler, apply};
use crate::host::{
    Document, DocumentId, HostEvent, HostEventKind, Subscription, TabHost, TrashFacility,
    UserPrompt, WindowId, WindowRegistry,
};
use crate::io::remove_record;
use crate::reconcile::{CloseReason, OrphanReconciler, ReconcileAction, is_in_temp_root};
use crate::restore::SessionRestorer;
use crate::settings::ConfigProvider;

/// Debounce key: one timer per document view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub window: WindowId,
    pub document: DocumentId,
}

/// Window-level events the session listens to.
const WINDOW_EVENTS: [HostEventKind; 5] = [
    HostEventKind::ActiveTabChanged,
    HostEventKind::FocusLost,
    HostEventKind::TabRemoved,
    HostEventKind::WindowClosing,
    HostEventKind::WindowShown,
];

#[derive(Debug, Default)]
struct WindowState {
    subscriptions: Vec<Subscription>,
    documents: HashMap<DocumentId, Subscription>,
    closing: bool,
}

#[derive(Debug)]
pub struct AutosaveSession {
    config: ConfigProvider,
    policy: AutosavePolicy,
    debounce: DebounceScheduler<DocumentKey>,
    reconciler: OrphanReconciler,
    windows: HashMap<WindowId, WindowState>,
    /// Temp records this session assigned or restored, per document.
    records: HashMap<DocumentId, PathBuf>,
    restored: bool,
}

impl AutosaveSession {
    pub fn new(
        config: ConfigProvider,
        prompt: Box<dyn UserPrompt>,
        trash: Box<dyn TrashFacility>,
    ) -> Self {
        let delay = config.autosave().debounce();
        Self {
            config,
            policy: AutosavePolicy::new(),
            debounce: DebounceScheduler::new(delay),
            reconciler: OrphanReconciler::new(prompt, trash),
            windows: HashMap::new(),
            records: HashMap::new(),
            restored: false,
        }
    }

    pub fn config(&self) -> &ConfigProvider {
        &self.config
    }

    /// Start tracking `window` and subscribe to its events.
    pub fn activate_window<H>(&mut self, host: &mut H, window: WindowId)
    where
        H: TabHost + ?Sized,
    {
        if self.windows.contains_key(&window) {
            return;
        }
        let subscriptions = WINDOW_EVENTS
            .iter()
            .map(|kind| host.subscribe(window, *kind))
            .collect();
        self.windows.insert(
            window,
            WindowState {
                subscriptions,
                ..Default::default()
            },
        );
        tracing::debug!(%window, "Window activated");
    }

    /// Stop tracking `window`: releases its subscriptions and cancels its
    /// pending timers.
    pub fn deactivate_window(&mut self, window: WindowId) {
        let cancelled = self.debounce.cancel_where(|key| key.window == window);
        if let Some(state) = self.windows.remove(&window) {
            tracing::debug!(
                %window,
                subscriptions = state.subscriptions.len() + state.documents.len(),
                cancelled,
                "Window deactivated"
            );
        }
    }

    /// Watch `document` in `window` for edits.
    pub fn attach_document<H>(&mut self, host: &mut H, window: WindowId, document: DocumentId)
    where
        H: TabHost + ?Sized,
    {
        let Some(state) = self.windows.get_mut(&window) else {
            tracing::warn!(%window, %document, "Attach to inactive window ignored");
            return;
        };
        if state.documents.contains_key(&document) {
            return;
        }
        let subscription = host.subscribe(window, HostEventKind::DocumentChanged);
        state.documents.insert(document, subscription);
    }

    /// Stop watching `document`; a pending timer for it is cancelled.
    pub fn detach_document(&mut self, window: WindowId, document: DocumentId) {
        self.debounce.cancel(&DocumentKey { window, document });
        if let Some(state) = self.windows.get_mut(&window) {
            state.documents.remove(&document);
        }
    }

    /// Handle a host event at the current instant.
    pub fn handle_event<H>(&mut self, host: &mut H, event: HostEvent)
    where
        H: TabHost + WindowRegistry + ?Sized,
    {
        self.handle_event_at(host, event, Instant::now());
    }

    /// Handle a host event as if it arrived at `now`.
    pub fn handle_event_at<H>(&mut self, host: &mut H, event: HostEvent, now: Instant)
    where
        H: TabHost + WindowRegistry + ?Sized,
    {
        let window = event.window();
        let Some(state) = self.windows.get(&window) else {
            tracing::trace!(?event, "Event for inactive window ignored");
            return;
        };

        match event {
            HostEvent::DocumentChanged { document, .. } => {
                if !state.documents.contains_key(&document) {
                    return;
                }
                let config = self.config.autosave();
                self.debounce.set_delay(config.debounce());
                self.debounce
                    .on_document_changed(DocumentKey { window, document }, now);
            }
            HostEvent::ActiveTabChanged { .. } | HostEvent::FocusLost { .. } => {
                self.autosave_window(host, window);
            }
            HostEvent::TabRemoved { document, .. } => {
                self.on_tab_removed(host, window, document);
            }
            HostEvent::WindowClosing { .. } => {
                if let Some(state) = self.windows.get_mut(&window) {
                    state.closing = true;
                }
            }
            HostEvent::WindowShown { .. } => {
                self.on_window_shown(host, window);
            }
        }
    }

    /// Fire every debounce timer due at `now`. Returns how many fired.
    pub fn tick<H>(&mut self, host: &mut H, now: Instant) -> usize
    where
        H: TabHost + ?Sized,
    {
        let due = self.debounce.poll_due(now);
        if due.is_empty() {
            return 0;
        }

        let config = self.config.autosave();
        if config.enabled {
            let root = config.temp_root();
            for key in &due {
                if let Some(document) = host.document_mut(key.document) {
                    self.autosave_document(document, &root, &config);
                }
            }
        }
        due.len()
    }

    /// Earliest pending timer, so a host can sleep until then.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.next_deadline()
    }

    pub fn is_pending(&self, window: WindowId, document: DocumentId) -> bool {
        self.debounce.is_pending(&DocumentKey { window, document })
    }

    pub fn is_window_active(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    /// Temp record this session knows for `document`.
    pub fn record_for(&self, document: DocumentId) -> Option<&Path> {
        self.records.get(&document).map(PathBuf::as_path)
    }

    fn autosave_window<H>(&mut self, host: &mut H, window: WindowId)
    where
        H: TabHost + ?Sized,
    {
        let config = self.config.autosave();
        let root = config.temp_root();
        if config.enabled {
            for document in host.unsaved_documents(window) {
                self.autosave_document(document, &root, &config);
            }
        }

        // Saved-as documents are no longer unsaved, so sweep them separately
        for id in host.documents(window) {
            if !self.records.contains_key(&id) {
                continue;
            }
            if let Some(document) = host.document_mut(id) {
                self.drop_superseded_record(document, &root, &config);
            }
        }
    }

    fn autosave_document(
        &mut self,
        document: &mut dyn Document,
        root: &Path,
        config: &AutoSaveConfig,
    ) {
        let had_location = document.location().is_some();
        let decision = self.policy.evaluate(document, root);
        if !had_location && let Some(location) = document.location() {
            self.records.insert(document.id(), location);
        }
        apply(&decision, document);
        self.drop_superseded_record(document, root, config);
    }

    /// Delete the temp record of a document that now lives elsewhere.
    fn drop_superseded_record(
        &mut self,
        document: &dyn Document,
        root: &Path,
        config: &AutoSaveConfig,
    ) {
        let id = document.id();
        let Some(record) = self.records.get(&id) else {
            return;
        };
        let Some(location) = document.location() else {
            return;
        };
        if location == *record || is_in_temp_root(&location, root) {
            return;
        }

        if config.delete_superseded_records {
            if let Err(e) = remove_record(record) {
                tracing::warn!(error = %e, "Could not remove superseded autosave record");
            }
        } else {
            tracing::debug!(record = %record.display(), "Keeping superseded autosave record");
        }
        self.records.remove(&id);
    }

    fn on_tab_removed<H>(&mut self, host: &mut H, window: WindowId, document: DocumentId)
    where
        H: TabHost + ?Sized,
    {
        self.detach_document(window, document);
        let closing = self.windows.get(&window).is_some_and(|state| state.closing);
        let config = self.config.autosave();
        let root = config.temp_root();

        let action = match host.document_mut(document) {
            Some(doc) => {
                self.drop_superseded_record(doc, &root, &config);
                if closing {
                    ReconcileAction::None
                } else {
                    self.reconciler
                        .on_tab_closing(doc, CloseReason::TabClosed, &root)
                }
            }
            None => ReconcileAction::None,
        };
        self.records.remove(&document);

        if let ReconcileAction::Reopen(path) = action {
            tracing::info!(path = %path.display(), "Reopening autosaved document");
            self.open_records(host, window, std::slice::from_ref(&path));
        }
    }

    fn on_window_shown<H>(&mut self, host: &mut H, window: WindowId)
    where
        H: TabHost + WindowRegistry + ?Sized,
    {
        if self.restored || host.windows().len() > 1 {
            return;
        }
        self.restored = true;

        let locations = SessionRestorer::new(self.config.temp_root()).restore();
        if locations.is_empty() {
            return;
        }
        tracing::info!(count = locations.len(), "Restoring autosaved documents");
        let opened = self.open_records(host, window, &locations);

        if let Some(first) = opened.first() {
            host.set_active(window, *first);
        }
    }

    /// Open temp records as tabs and start tracking them. Returns the new
    /// tabs in the order of `locations`.
    fn open_records<H>(
        &mut self,
        host: &mut H,
        window: WindowId,
        locations: &[PathBuf],
    ) -> Vec<DocumentId>
    where
        H: TabHost + ?Sized,
    {
        let opened = host.open_locations(window, locations);
        for &id in &opened {
            if let Some(location) = host.document_mut(id).and_then(|doc| doc.location()) {
                self.records.insert(id, location);
            }
            self.attach_document(host, window, id);
        }
        opened
    }
}
