use std::sync::{Arc, Mutex};

use serde_json::json;
use syncview::core::{DocumentViewChange, DocumentViewChangeType};
use syncview::error::unavailable;
use syncview::{
    Document, DocumentKey, DocumentSet, EventManager, ListenOptions, OnlineState, OrderDirection,
    Query, SyncViewError, ViewSnapshot, ViewSnapshotHandler,
};

type Events = Arc<Mutex<Vec<Result<ViewSnapshot, SyncViewError>>>>;

fn capture() -> (Events, ViewSnapshotHandler) {
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&events);
    let handler: ViewSnapshotHandler = Arc::new(move |event| {
        captured.lock().unwrap().push(event);
    });
    (events, handler)
}

fn cities_by_population() -> Query {
    Query::from_string("cities")
        .unwrap()
        .order_by("population", OrderDirection::Ascending)
}

fn city(id: &str, population: i64, revision: i64) -> Document {
    Document::from_json(
        DocumentKey::from_string(&format!("cities/{id}")).unwrap(),
        syncview::model::Timestamp::new(revision, 0),
        &json!({ "population": population }),
    )
    .unwrap()
}

fn document_set(query: &Query, documents: &[Document]) -> DocumentSet {
    let mut set = DocumentSet::new(query.comparator());
    for document in documents {
        set = set.insert(document.clone());
    }
    set
}

fn snapshot(
    query: &Query,
    previous: &DocumentSet,
    documents: &[Document],
    changes: Vec<DocumentViewChange>,
    from_cache: bool,
    sync_state_changed: bool,
) -> ViewSnapshot {
    ViewSnapshot::new(
        query.clone(),
        document_set(query, documents),
        previous.clone(),
        changes,
        from_cache,
        false,
        sync_state_changed,
        false,
    )
}

fn added(document: Document) -> DocumentViewChange {
    DocumentViewChange::new(document, DocumentViewChangeType::Added)
}

fn modified(document: Document) -> DocumentViewChange {
    DocumentViewChange::new(document, DocumentViewChangeType::Modified)
}

#[test]
fn cache_then_server_round_trip_delivers_ordered_views() {
    let manager = EventManager::new();
    let query = cities_by_population();
    let (events, handler) = capture();
    let _registration = manager.listen(query.clone(), ListenOptions::default(), handler);

    let empty = DocumentSet::new(query.comparator());

    // Cache-only result while connectivity is still unknown: delivered,
    // because there is data to show and the listener is not waiting for
    // sync.
    let sf = city("sf", 870_000, 1);
    let cached = snapshot(
        &query,
        &empty,
        &[sf.clone()],
        vec![added(sf.clone())],
        true,
        true,
    );
    manager.on_view_snapshots(vec![cached]);

    {
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        let initial = events[0].as_ref().unwrap();
        assert!(initial.from_cache());
        assert!(initial.sync_state_changed());
        assert_eq!(initial.document_changes().len(), 1);
    }

    // The server confirms and adds a second document; both arrive in
    // comparator order.
    manager.handle_online_state_change(OnlineState::Online);
    let nyc = city("nyc", 8_800_000, 2);
    let previous = document_set(&query, &[sf.clone()]);
    let confirmed = snapshot(
        &query,
        &previous,
        &[sf.clone(), nyc.clone()],
        vec![added(nyc)],
        false,
        true,
    );
    manager.on_view_snapshots(vec![confirmed]);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    let update = events[1].as_ref().unwrap();
    assert!(!update.from_cache());
    let ids: Vec<_> = update
        .documents()
        .iter()
        .map(|d| d.key().id().to_string())
        .collect();
    assert_eq!(ids, vec!["sf", "nyc"]);
}

#[test]
fn reordering_update_moves_document_without_duplicating_it() {
    let manager = EventManager::new();
    let query = cities_by_population();
    let (events, handler) = capture();
    let _registration = manager.listen(query.clone(), ListenOptions::default(), handler);

    let sf = city("sf", 870_000, 1);
    let nyc = city("nyc", 8_800_000, 1);
    let empty = DocumentSet::new(query.comparator());
    manager.on_view_snapshots(vec![snapshot(
        &query,
        &empty,
        &[sf.clone(), nyc.clone()],
        vec![added(sf.clone()), added(nyc.clone())],
        false,
        true,
    )]);

    // sf's population now exceeds nyc's; the update must reposition it.
    let grown_sf = city("sf", 9_000_000, 2);
    let previous = document_set(&query, &[sf, nyc.clone()]);
    manager.on_view_snapshots(vec![snapshot(
        &query,
        &previous,
        &[nyc, grown_sf.clone()],
        vec![modified(grown_sf)],
        false,
        false,
    )]);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    let update = events[1].as_ref().unwrap();
    assert_eq!(update.documents().len(), 2);
    let ids: Vec<_> = update
        .documents()
        .iter()
        .map(|d| d.key().id().to_string())
        .collect();
    assert_eq!(ids, vec!["nyc", "sf"]);
    assert_eq!(
        update
            .documents()
            .index_of(&DocumentKey::from_string("cities/sf").unwrap()),
        Some(1)
    );
}

#[test]
fn wait_for_sync_listener_coexists_with_default_listener() {
    let manager = EventManager::new();
    let query = cities_by_population();

    let (eager_events, eager_handler) = capture();
    let _eager = manager.listen(query.clone(), ListenOptions::default(), eager_handler);
    let (patient_events, patient_handler) = capture();
    let _patient = manager.listen(
        query.clone(),
        ListenOptions::default().with_wait_for_sync_when_online(true),
        patient_handler,
    );

    manager.handle_online_state_change(OnlineState::Online);

    let sf = city("sf", 870_000, 1);
    let empty = DocumentSet::new(query.comparator());
    manager.on_view_snapshots(vec![snapshot(
        &query,
        &empty,
        &[sf.clone()],
        vec![added(sf.clone())],
        true,
        true,
    )]);

    // The default listener sees the cached result; the waiting listener
    // holds out for server confirmation.
    assert_eq!(eager_events.lock().unwrap().len(), 1);
    assert!(patient_events.lock().unwrap().is_empty());

    let previous = document_set(&query, &[sf.clone()]);
    manager.on_view_snapshots(vec![snapshot(
        &query,
        &previous,
        &[sf],
        vec![],
        false,
        true,
    )]);

    assert_eq!(eager_events.lock().unwrap().len(), 2);
    let patient = patient_events.lock().unwrap();
    assert_eq!(patient.len(), 1);
    assert!(!patient[0].as_ref().unwrap().from_cache());
}

#[test]
fn upstream_error_reaches_observer_once_and_silences_the_query() {
    let manager = EventManager::new();
    let query = cities_by_population();
    let (events, handler) = capture();
    let _registration = manager.listen(query.clone(), ListenOptions::default(), handler);

    let sf = city("sf", 870_000, 1);
    let empty = DocumentSet::new(query.comparator());
    manager.on_view_snapshots(vec![snapshot(
        &query,
        &empty,
        &[sf.clone()],
        vec![added(sf.clone())],
        false,
        true,
    )]);
    manager.on_error(&query, unavailable("watch stream broken"));
    manager.on_error(&query, unavailable("watch stream broken"));
    manager.on_view_snapshots(vec![snapshot(
        &query,
        &empty,
        &[sf],
        vec![],
        false,
        true,
    )]);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].is_ok());
    assert_eq!(
        events[1].as_ref().unwrap_err().code_str(),
        "syncview/unavailable"
    );
}

#[test]
fn offline_transition_surfaces_empty_cache_result() {
    let manager = EventManager::new();
    let query = cities_by_population();
    let (events, handler) = capture();
    let _registration = manager.listen(query.clone(), ListenOptions::default(), handler);

    let empty = DocumentSet::new(query.comparator());
    manager.on_view_snapshots(vec![snapshot(&query, &empty, &[], vec![], true, true)]);
    assert!(events.lock().unwrap().is_empty());

    manager.handle_online_state_change(OnlineState::Offline);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    let raised = events[0].as_ref().unwrap();
    assert!(raised.from_cache());
    assert!(raised.documents().is_empty());
    assert!(raised.sync_state_changed());
}
