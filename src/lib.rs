//! Client-side view consistency core for an offline-capable document
//! database.
//!
//! The crate keeps an ordered, deduplicated view of query results
//! ([`model::DocumentSet`]) and decides when that view is stable enough to
//! report to application code ([`core::QueryListener`]). Snapshots are
//! computed upstream by a query engine and arrive together with
//! connectivity transitions from a sync layer; this crate only gates and
//! fans out delivery, it performs no I/O of its own.

pub mod core;
pub mod error;
pub mod immutable;
pub mod model;
pub mod value;

pub use crate::core::{
    EventManager, ListenOptions, ListenerRegistration, OrderDirection, Query, QueryEventSource,
    QueryListener, ViewSnapshot, ViewSnapshotHandler,
};
pub use crate::error::{SyncViewError, SyncViewErrorCode, SyncViewResult};
pub use crate::model::{Document, DocumentComparator, DocumentKey, DocumentSet, OnlineState};
