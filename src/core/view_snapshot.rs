use crate::core::Query;
use crate::immutable::SortedMap;
use crate::model::{Document, DocumentKey, DocumentSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentViewChangeType {
    Added,
    Removed,
    Modified,
    /// The document's provenance flags changed without a value change.
    Metadata,
}

/// One document's transition between two snapshots of a view.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentViewChange {
    document: Document,
    change_type: DocumentViewChangeType,
}

impl DocumentViewChange {
    pub fn new(document: Document, change_type: DocumentViewChangeType) -> Self {
        Self {
            document,
            change_type,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn change_type(&self) -> DocumentViewChangeType {
        self.change_type
    }

    fn into_document(self) -> Document {
        self.document
    }
}

/// Accumulates per-document changes, collapsing successive changes for the
/// same key into the single logical change an observer should see.
#[derive(Clone, Debug, Default)]
pub struct DocumentViewChangeSet {
    change_map: SortedMap<DocumentKey, DocumentViewChange>,
}

impl DocumentViewChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_change(&mut self, change: DocumentViewChange) {
        use DocumentViewChangeType::{Added, Metadata, Modified, Removed};

        let key = change.document().key().clone();
        let old = match self.change_map.get(&key) {
            None => {
                self.change_map = self.change_map.insert(key, change);
                return;
            }
            Some(old) => old.clone(),
        };

        let merged = match (old.change_type(), change.change_type()) {
            // A metadata-only change is superseded by any real change.
            (Metadata, incoming) if incoming != Added => Some(change),
            // A metadata change on a live document keeps the pending type.
            (previous, Metadata) if previous != Removed => {
                Some(DocumentViewChange::new(change.into_document(), previous))
            }
            (Modified, Modified) => Some(DocumentViewChange::new(change.into_document(), Modified)),
            (Added, Modified) => Some(DocumentViewChange::new(change.into_document(), Added)),
            (Added, Removed) => None,
            (Modified, Removed) => Some(DocumentViewChange::new(old.document().clone(), Removed)),
            (Removed, Added) => Some(DocumentViewChange::new(change.into_document(), Modified)),
            (previous, incoming) => {
                debug_assert!(
                    false,
                    "unexpected change {:?} after {:?} for {}",
                    incoming,
                    previous,
                    key.path()
                );
                Some(change)
            }
        };

        self.change_map = match merged {
            Some(merged) => self.change_map.insert(key, merged),
            None => self.change_map.erase(&key),
        };
    }

    /// The collapsed changes in key order.
    pub fn changes(&self) -> Vec<DocumentViewChange> {
        self.change_map.values().cloned().collect()
    }
}

/// One consistent state of a query's results plus provenance metadata.
///
/// Snapshots are produced by the query engine and consumed by
/// `QueryListener`; this crate never mutates them.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSnapshot {
    query: Query,
    documents: DocumentSet,
    old_documents: DocumentSet,
    document_changes: Vec<DocumentViewChange>,
    from_cache: bool,
    has_pending_writes: bool,
    sync_state_changed: bool,
    excludes_metadata_changes: bool,
}

impl ViewSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        query: Query,
        documents: DocumentSet,
        old_documents: DocumentSet,
        document_changes: Vec<DocumentViewChange>,
        from_cache: bool,
        has_pending_writes: bool,
        sync_state_changed: bool,
        excludes_metadata_changes: bool,
    ) -> Self {
        Self {
            query,
            documents,
            old_documents,
            document_changes,
            from_cache,
            has_pending_writes,
            sync_state_changed,
            excludes_metadata_changes,
        }
    }

    /// Synthesizes the first snapshot delivered to an observer: every
    /// current document appears as an addition against an empty baseline,
    /// and the sync state is considered changed.
    pub fn from_initial_documents(
        query: Query,
        documents: DocumentSet,
        from_cache: bool,
        has_pending_writes: bool,
        excludes_metadata_changes: bool,
    ) -> Self {
        let document_changes = documents
            .iter()
            .map(|document| {
                DocumentViewChange::new(document.clone(), DocumentViewChangeType::Added)
            })
            .collect();
        let old_documents = DocumentSet::new(documents.comparator().clone());
        Self {
            query,
            documents,
            old_documents,
            document_changes,
            from_cache,
            has_pending_writes,
            sync_state_changed: true,
            excludes_metadata_changes,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn old_documents(&self) -> &DocumentSet {
        &self.old_documents
    }

    pub fn document_changes(&self) -> &[DocumentViewChange] {
        &self.document_changes
    }

    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    pub fn has_pending_writes(&self) -> bool {
        self.has_pending_writes
    }

    pub fn sync_state_changed(&self) -> bool {
        self.sync_state_changed
    }

    pub fn excludes_metadata_changes(&self) -> bool {
        self.excludes_metadata_changes
    }
}
