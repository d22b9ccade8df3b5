pub mod event_manager;
pub mod listen_options;
pub mod query;
pub mod query_listener;
pub mod view_snapshot;

pub use event_manager::{EventManager, ListenerRegistration, QueryEventSource};
pub use listen_options::ListenOptions;
pub use query::{OrderBy, OrderDirection, Query};
pub use query_listener::{QueryListener, ViewSnapshotHandler};
pub use view_snapshot::{
    DocumentViewChange, DocumentViewChangeSet, DocumentViewChangeType, ViewSnapshot,
};
