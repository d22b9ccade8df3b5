use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::immutable::{SortedMap, SortedSet};
use crate::model::{Document, DocumentKey};

/// Caller-supplied ordering between documents, usually derived from a
/// query's order-by clauses.
#[derive(Clone)]
pub struct DocumentComparator {
    delegate: Arc<dyn Fn(&Document, &Document) -> Ordering + Send + Sync>,
}

impl DocumentComparator {
    pub fn new<F>(delegate: F) -> Self
    where
        F: Fn(&Document, &Document) -> Ordering + Send + Sync + 'static,
    {
        Self {
            delegate: Arc::new(delegate),
        }
    }

    /// Orders documents purely by key.
    pub fn by_key() -> Self {
        Self::new(|left, right| left.key().cmp(right.key()))
    }

    pub fn compare(&self, left: &Document, right: &Document) -> Ordering {
        (self.delegate.as_ref())(left, right)
    }
}

impl Debug for DocumentComparator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("DocumentComparator")
    }
}

/// An immutable collection of documents, indexed by key and ordered by a
/// comparator chained with a key tie-break.
///
/// Two persistent containers are kept in lockstep: `index` guarantees key
/// uniqueness and O(log n) lookup, `sorted_set` gives deterministic
/// traversal order and rank queries. Every mutating operation rebuilds
/// both consistently and returns a new set; the original remains a valid
/// snapshot.
#[derive(Clone, Debug)]
pub struct DocumentSet {
    comparator: DocumentComparator,
    index: SortedMap<DocumentKey, Document>,
    sorted_set: SortedSet<Document>,
}

impl DocumentSet {
    /// Creates an empty set ordered by `comparator`, then by key.
    pub fn new(comparator: DocumentComparator) -> Self {
        let combined = comparator.clone();
        let sorted_set = SortedSet::with_comparator(move |left: &Document, right: &Document| {
            combined
                .compare(left, right)
                .then_with(|| left.key().cmp(right.key()))
        });
        Self {
            comparator,
            index: SortedMap::new(),
            sorted_set,
        }
    }

    pub fn comparator(&self) -> &DocumentComparator {
        &self.comparator
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains_key(&self, key: &DocumentKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn get_document(&self, key: &DocumentKey) -> Option<&Document> {
        self.index.get(key)
    }

    /// The first document in traversal order, or `None` if empty.
    pub fn first_document(&self) -> Option<&Document> {
        self.sorted_set.first()
    }

    /// The last document in traversal order, or `None` if empty.
    pub fn last_document(&self) -> Option<&Document> {
        self.sorted_set.last()
    }

    /// The position of the key's document in traversal order, or `None`
    /// if the key is absent.
    pub fn index_of(&self, key: &DocumentKey) -> Option<usize> {
        let document = self.index.get(key)?;
        self.sorted_set.index_of(document)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> + '_ {
        self.sorted_set.iter()
    }

    /// Materializes the documents in traversal order. O(n).
    pub fn to_vec(&self) -> Vec<Document> {
        self.iter().cloned().collect()
    }

    /// The key→document index. O(1); shares the persistent container.
    pub fn as_map(&self) -> &SortedMap<DocumentKey, Document> {
        &self.index
    }

    /// Returns a new set containing `document`. An existing document with
    /// the same key is erased first so the new document's position
    /// reflects its current comparator rank.
    pub fn insert(&self, document: Document) -> Self {
        let base = self.erase(document.key());
        Self {
            comparator: base.comparator,
            index: base.index.insert(document.key().clone(), document.clone()),
            sorted_set: base.sorted_set.insert(document),
        }
    }

    /// Returns a new set without the document at `key`; no-op when the key
    /// is absent. The document is resolved through the index first, since
    /// the comparator alone cannot locate it in the sorted set.
    pub fn erase(&self, key: &DocumentKey) -> Self {
        match self.index.get(key) {
            None => self.clone(),
            Some(existing) => Self {
                comparator: self.comparator.clone(),
                index: self.index.erase(key),
                sorted_set: self.sorted_set.erase(existing),
            },
        }
    }
}

impl PartialEq for DocumentSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Hash for DocumentSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for document in self.iter() {
            document.hash(state);
        }
    }
}

impl Display for DocumentSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[ ")?;
        for document in self.iter() {
            write!(f, "{} ", document)?;
        }
        write!(f, "]")
    }
}
