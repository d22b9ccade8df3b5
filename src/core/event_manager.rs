use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use crate::core::{ListenOptions, Query, QueryListener, ViewSnapshot, ViewSnapshotHandler};
use crate::error::SyncViewError;
use crate::model::OnlineState;

/// Implemented by the query/sync pipeline; told when a query gains its
/// first listener or loses its last one so the underlying watch can be
/// started or stopped.
pub trait QueryEventSource: Send + Sync {
    fn listen(&self, query: &Query);
    fn unlisten(&self, query: &Query);
}

struct ListenerEntry {
    id: u64,
    listener: Arc<Mutex<QueryListener>>,
}

struct QueryListenersInfo {
    query: Query,
    view_snapshot: Option<ViewSnapshot>,
    listeners: Vec<ListenerEntry>,
}

struct EventManagerState {
    queries: BTreeMap<String, QueryListenersInfo>,
    online_state: OnlineState,
    next_listener_id: u64,
}

/// Routes view snapshots, errors, and online-state transitions from the
/// query/sync pipeline to the query listeners registered against it.
///
/// Listeners on equivalent queries (same canonical id) share one entry and
/// one buffered snapshot; a listener added after the first snapshot is
/// replayed the current state immediately. All fan-out is sequential and
/// synchronous.
#[derive(Clone)]
pub struct EventManager {
    inner: Arc<EventManagerInner>,
}

struct EventManagerInner {
    state: Mutex<EventManagerState>,
    event_source: Option<Arc<dyn QueryEventSource>>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::new_internal(None)
    }

    pub fn with_event_source(event_source: Arc<dyn QueryEventSource>) -> Self {
        Self::new_internal(Some(event_source))
    }

    fn new_internal(event_source: Option<Arc<dyn QueryEventSource>>) -> Self {
        Self {
            inner: Arc::new(EventManagerInner {
                state: Mutex::new(EventManagerState {
                    queries: BTreeMap::new(),
                    online_state: OnlineState::Unknown,
                    next_listener_id: 1,
                }),
                event_source,
            }),
        }
    }

    /// Registers `handler` for `query`. The handler is invoked with either
    /// a `ViewSnapshot` or a terminal error, honoring `options`. Dropping
    /// (or detaching) the returned registration stops delivery.
    pub fn listen(
        &self,
        query: Query,
        options: ListenOptions,
        handler: ViewSnapshotHandler,
    ) -> ListenerRegistration {
        let canonical_id = query.canonical_id();
        let mut listener = QueryListener::new(query.clone(), options, handler);

        let (listener_id, replay, first_for_query) = {
            let mut state = self.inner.state.lock().unwrap();
            let listener_id = state.next_listener_id;
            state.next_listener_id += 1;

            // Seed the listener with the current connectivity belief; a
            // fresh listener has no buffered snapshot, so nothing fires.
            listener.on_online_state_changed(state.online_state);

            let info = state
                .queries
                .entry(canonical_id.clone())
                .or_insert_with(|| QueryListenersInfo {
                    query: query.clone(),
                    view_snapshot: None,
                    listeners: Vec::new(),
                });
            let first_for_query = info.listeners.is_empty();
            let shared = Arc::new(Mutex::new(listener));
            info.listeners.push(ListenerEntry {
                id: listener_id,
                listener: Arc::clone(&shared),
            });
            let replay = info
                .view_snapshot
                .clone()
                .map(|snapshot| (shared, snapshot));
            (listener_id, replay, first_for_query)
        };

        if first_for_query {
            if let Some(source) = &self.inner.event_source {
                source.listen(&query);
            }
        }
        if let Some((listener, snapshot)) = replay {
            listener.lock().unwrap().on_view_snapshot(snapshot);
        }
        log::debug!("listener {listener_id} registered for {canonical_id}");

        ListenerRegistration {
            inner: Arc::downgrade(&self.inner),
            canonical_id,
            listener_id,
            detached: false,
        }
    }

    /// Routes freshly computed snapshots to their queries' listeners, in
    /// order. Snapshots for queries without listeners are dropped.
    pub fn on_view_snapshots(&self, snapshots: Vec<ViewSnapshot>) {
        for snapshot in snapshots {
            let canonical_id = snapshot.query().canonical_id();
            let targets = {
                let mut state = self.inner.state.lock().unwrap();
                match state.queries.get_mut(&canonical_id) {
                    None => {
                        log::debug!("dropping snapshot for unwatched query {canonical_id}");
                        continue;
                    }
                    Some(info) => {
                        info.view_snapshot = Some(snapshot.clone());
                        info.listeners
                            .iter()
                            .map(|entry| Arc::clone(&entry.listener))
                            .collect::<Vec<_>>()
                    }
                }
            };
            for listener in targets {
                listener.lock().unwrap().on_view_snapshot(snapshot.clone());
            }
        }
    }

    /// Relays an upstream error to every listener of `query` and removes
    /// the query; each listener receives the error exactly once.
    pub fn on_error(&self, query: &Query, error: SyncViewError) {
        let canonical_id = query.canonical_id();
        let removed = {
            let mut state = self.inner.state.lock().unwrap();
            state.queries.remove(&canonical_id)
        };
        if let Some(info) = removed {
            for entry in info.listeners {
                entry.listener.lock().unwrap().on_error(error.clone());
            }
        }
    }

    /// Applies a connectivity transition to every registered listener.
    pub fn handle_online_state_change(&self, online_state: OnlineState) {
        let listeners = {
            let mut state = self.inner.state.lock().unwrap();
            state.online_state = online_state;
            state
                .queries
                .values()
                .flat_map(|info| info.listeners.iter().map(|entry| Arc::clone(&entry.listener)))
                .collect::<Vec<_>>()
        };
        for listener in listeners {
            listener.lock().unwrap().on_online_state_changed(online_state);
        }
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManagerInner {
    fn remove_listener(self: &Arc<Self>, canonical_id: &str, listener_id: u64) {
        let unlisten = {
            let mut state = self.state.lock().unwrap();
            let mut emptied_query = None;
            if let Some(info) = state.queries.get_mut(canonical_id) {
                info.listeners.retain(|entry| entry.id != listener_id);
                if info.listeners.is_empty() {
                    emptied_query = Some(info.query.clone());
                }
            }
            if emptied_query.is_some() {
                state.queries.remove(canonical_id);
            }
            emptied_query
        };
        if let Some(query) = unlisten {
            if let Some(source) = &self.event_source {
                source.unlisten(&query);
            }
        }
        log::debug!("listener {listener_id} removed from {canonical_id}");
    }
}

/// Handle returned by `EventManager::listen`; removes the listener on
/// `detach` or when dropped.
pub struct ListenerRegistration {
    inner: Weak<EventManagerInner>,
    canonical_id: String,
    listener_id: u64,
    detached: bool,
}

impl ListenerRegistration {
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        if let Some(inner) = self.inner.upgrade() {
            inner.remove_listener(&self.canonical_id, self.listener_id);
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.detach();
    }
}
