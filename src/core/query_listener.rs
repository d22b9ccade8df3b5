use std::sync::Arc;

use crate::core::{DocumentViewChangeType, ListenOptions, Query, ViewSnapshot};
use crate::error::SyncViewError;
use crate::model::OnlineState;

/// Observer callback invoked with either a snapshot or a terminal error.
pub type ViewSnapshotHandler =
    Arc<dyn Fn(Result<ViewSnapshot, SyncViewError>) + Send + Sync>;

/// Takes a series of internal view snapshots and decides when to raise
/// user-facing events.
///
/// Initial snapshots (e.g. from cache) may be withheld until they are safe
/// to surface; later snapshots are suppressed unless they carry a change
/// the listener's options consider user visible. After an error the
/// listener is terminal and ignores every further event.
pub struct QueryListener {
    query: Query,
    options: ListenOptions,
    handler: ViewSnapshotHandler,
    raised_initial_event: bool,
    terminated: bool,
    online_state: OnlineState,
    snapshot: Option<ViewSnapshot>,
}

impl QueryListener {
    pub fn new(query: Query, options: ListenOptions, handler: ViewSnapshotHandler) -> Self {
        Self {
            query,
            options,
            handler,
            raised_initial_event: false,
            terminated: false,
            online_state: OnlineState::Unknown,
            snapshot: None,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The last received view snapshot, delivered or buffered.
    pub fn snapshot(&self) -> Option<&ViewSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn on_view_snapshot(&mut self, snapshot: ViewSnapshot) {
        if self.terminated {
            return;
        }
        let snapshot = self.apply_metadata_filter(snapshot);

        if !self.raised_initial_event {
            if self.should_raise_initial_event(&snapshot, self.online_state) {
                self.raise_initial_event(&snapshot);
            } else {
                log::debug!(
                    "buffering initial snapshot for {}",
                    self.query.canonical_id()
                );
            }
        } else if self.should_raise_event(&snapshot) {
            (self.handler)(Ok(snapshot.clone()));
        }
        self.snapshot = Some(snapshot);
    }

    /// Relays an upstream error to the observer, exactly once; the
    /// listener processes no events of any kind afterwards.
    pub fn on_error(&mut self, error: SyncViewError) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        log::warn!(
            "listener for {} terminated: {}",
            self.query.canonical_id(),
            error
        );
        (self.handler)(Err(error));
    }

    pub fn on_online_state_changed(&mut self, online_state: OnlineState) {
        if self.terminated {
            return;
        }
        self.online_state = online_state;
        // A buffered cache-only result may become safe to surface, e.g.
        // when the client learns that no server round trip can happen.
        if !self.raised_initial_event {
            if let Some(snapshot) = self.snapshot.clone() {
                if self.should_raise_initial_event(&snapshot, online_state) {
                    self.raise_initial_event(&snapshot);
                }
            }
        }
    }

    /// Strips metadata-only document changes when the listener did not opt
    /// into them; the resulting snapshot is marked as excluding them.
    fn apply_metadata_filter(&self, snapshot: ViewSnapshot) -> ViewSnapshot {
        if self.options.include_document_metadata_changes()
            || snapshot
                .document_changes()
                .iter()
                .all(|change| change.change_type() != DocumentViewChangeType::Metadata)
        {
            return snapshot;
        }
        let changes = snapshot
            .document_changes()
            .iter()
            .filter(|change| change.change_type() != DocumentViewChangeType::Metadata)
            .cloned()
            .collect();
        ViewSnapshot::new(
            snapshot.query().clone(),
            snapshot.documents().clone(),
            snapshot.old_documents().clone(),
            changes,
            snapshot.from_cache(),
            snapshot.has_pending_writes(),
            snapshot.sync_state_changed(),
            true,
        )
    }

    fn should_raise_initial_event(&self, snapshot: &ViewSnapshot, online_state: OnlineState) -> bool {
        debug_assert!(
            !self.raised_initial_event,
            "initial event decision after the initial event was raised"
        );

        // A server-confirmed result is always safe to surface.
        if !snapshot.from_cache() {
            return true;
        }

        // Unknown counts as possibly online; it resolves to Online or
        // Offline once the sync layer has evidence.
        let maybe_online = online_state != OnlineState::Offline;
        if self.options.wait_for_sync_when_online() && maybe_online {
            return false;
        }

        // Cache data is surfaced when there is something to show, or when
        // no server round trip can improve on it. An empty cache result
        // stays buffered until connectivity is confirmed lost.
        !snapshot.documents().is_empty() || online_state == OnlineState::Offline
    }

    fn should_raise_event(&self, snapshot: &ViewSnapshot) -> bool {
        // Metadata-only document changes were already stripped unless the
        // listener opted in, so any surviving change is deliverable.
        if !snapshot.document_changes().is_empty() {
            return true;
        }
        if snapshot.sync_state_changed() {
            return true;
        }
        if self.options.include_query_metadata_changes() {
            if let Some(prior) = self.snapshot.as_ref() {
                if prior.from_cache() != snapshot.from_cache()
                    || prior.has_pending_writes() != snapshot.has_pending_writes()
                {
                    return true;
                }
            }
        }
        false
    }

    fn raise_initial_event(&mut self, snapshot: &ViewSnapshot) {
        debug_assert!(!self.raised_initial_event, "initial event raised twice");
        let initial = ViewSnapshot::from_initial_documents(
            snapshot.query().clone(),
            snapshot.documents().clone(),
            snapshot.from_cache(),
            snapshot.has_pending_writes(),
            snapshot.excludes_metadata_changes(),
        );
        self.raised_initial_event = true;
        (self.handler)(Ok(initial));
    }
}
