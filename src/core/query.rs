use std::cmp::Ordering;

use crate::error::{invalid_argument, SyncViewResult};
use crate::model::{DocumentComparator, DocumentKey, ResourcePath};
use crate::value::FieldValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// A single order-by clause: a dotted field path and a direction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderBy {
    field: String,
    direction: OrderDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }
}

/// A query over one collection, with optional order-by clauses.
///
/// The view layer only needs the query's identity, its result ordering,
/// and collection membership; filters, limits, and cursors live in the
/// query engine that computes snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Query {
    collection_path: ResourcePath,
    order_by: Vec<OrderBy>,
}

impl Query {
    pub fn collection(collection_path: ResourcePath) -> SyncViewResult<Self> {
        if collection_path.is_empty() || collection_path.len() % 2 == 0 {
            return Err(invalid_argument(
                "Queries must reference a collection (odd number of path segments)",
            ));
        }
        Ok(Self {
            collection_path,
            order_by: Vec::new(),
        })
    }

    pub fn from_string(path: &str) -> SyncViewResult<Self> {
        Self::collection(ResourcePath::from_string(path)?)
    }

    /// Appends an order-by clause; clauses apply in the order added.
    pub fn order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by.push(OrderBy::new(field, direction));
        self
    }

    pub fn collection_path(&self) -> &ResourcePath {
        &self.collection_path
    }

    pub fn collection_id(&self) -> &str {
        self.collection_path
            .last_segment()
            .expect("Collection path always ends with an identifier")
    }

    pub fn order_by_clauses(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Whether a document with this key belongs to the queried collection.
    pub fn matches(&self, key: &DocumentKey) -> bool {
        key.collection_path() == self.collection_path
    }

    /// A stable identifier used to group listeners on equivalent queries.
    pub fn canonical_id(&self) -> String {
        let mut id = self.collection_path.canonical_string();
        if !self.order_by.is_empty() {
            id.push_str("|ob:");
            for (position, clause) in self.order_by.iter().enumerate() {
                if position > 0 {
                    id.push(',');
                }
                id.push_str(clause.field());
                id.push_str(match clause.direction() {
                    OrderDirection::Ascending => ":asc",
                    OrderDirection::Descending => ":desc",
                });
            }
        }
        id
    }

    /// The result ordering induced by the order-by clauses. Documents
    /// missing an ordered field sort as null; `DocumentSet` chains the key
    /// tie-break.
    pub fn comparator(&self) -> DocumentComparator {
        let clauses = self.order_by.clone();
        DocumentComparator::new(move |left, right| {
            let null = FieldValue::null();
            for clause in &clauses {
                let left_value = left.field(clause.field()).unwrap_or(&null);
                let right_value = right.field(clause.field()).unwrap_or(&null);
                let mut ordering = left_value.compare(right_value);
                if clause.direction() == OrderDirection::Descending {
                    ordering = ordering.reverse();
                }
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        })
    }
}
