use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use serde_json::Value as JsonValue;

use crate::error::{invalid_argument, SyncViewResult};
use crate::model::{DocumentKey, Timestamp};
use crate::value::{FieldValue, MapValue, ValueKind};

/// A document as seen by the view layer: key, version, field data, and
/// whether uncommitted local mutations are reflected in it.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    key: DocumentKey,
    version: Timestamp,
    data: MapValue,
    has_local_mutations: bool,
}

impl Document {
    pub fn new(key: DocumentKey, version: Timestamp, data: MapValue) -> Self {
        Self {
            key,
            version,
            data,
            has_local_mutations: false,
        }
    }

    /// Builds a document from plain JSON field data; the value must be a
    /// JSON object.
    pub fn from_json(
        key: DocumentKey,
        version: Timestamp,
        data: &JsonValue,
    ) -> SyncViewResult<Self> {
        match FieldValue::from_json(data).kind() {
            ValueKind::Map(map) => Ok(Self::new(key, version, map.clone())),
            _ => Err(invalid_argument("Document data must be a JSON object")),
        }
    }

    /// Marks the document as carrying local mutations not yet acknowledged
    /// by the backend.
    pub fn with_local_mutations(mut self) -> Self {
        self.has_local_mutations = true;
        self
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn version(&self) -> Timestamp {
        self.version
    }

    pub fn data(&self) -> &MapValue {
        &self.data
    }

    pub fn has_local_mutations(&self) -> bool {
        self.has_local_mutations
    }

    /// Looks up a field by dotted path (`"address.city"`), descending
    /// through nested maps.
    pub fn field(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let mut current = self.data.get(segments.next()?)?;
        for segment in segments {
            match current.kind() {
                ValueKind::Map(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

// Hashing covers key and version only; equal documents always agree on
// both, so the hash stays consistent with `PartialEq` without hashing
// floating-point field data.
impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
        self.version.hash(state);
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}.{}", self.key.path(), self.version.seconds, self.version.nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(path: &str, data: JsonValue) -> Document {
        Document::from_json(
            DocumentKey::from_string(path).unwrap(),
            Timestamp::new(1, 0),
            &data,
        )
        .unwrap()
    }

    #[test]
    fn rejects_non_object_data() {
        let key = DocumentKey::from_string("cities/sf").unwrap();
        let err = Document::from_json(key, Timestamp::zero(), &json!(42)).unwrap_err();
        assert_eq!(err.code_str(), "syncview/invalid-argument");
    }

    #[test]
    fn looks_up_nested_fields() {
        let doc = document(
            "cities/sf",
            json!({"name": "sf", "address": {"state": "CA"}}),
        );
        assert_eq!(doc.field("name"), Some(&FieldValue::from_string("sf")));
        assert_eq!(
            doc.field("address.state"),
            Some(&FieldValue::from_string("CA"))
        );
        assert_eq!(doc.field("address.zip"), None);
        assert_eq!(doc.field("name.oops"), None);
    }

    #[test]
    fn local_mutation_flag() {
        let doc = document("cities/sf", json!({}));
        assert!(!doc.has_local_mutations());
        assert!(doc.with_local_mutations().has_local_mutations());
    }
}
