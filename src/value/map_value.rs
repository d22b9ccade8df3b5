use std::collections::BTreeMap;

use crate::value::FieldValue;

/// An ordered map of named field values, the payload of a document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapValue {
    fields: BTreeMap<String, FieldValue>,
}

impl MapValue {
    pub fn new(fields: BTreeMap<String, FieldValue>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_map_entries() {
        let mut fields = BTreeMap::new();
        fields.insert("foo".to_string(), FieldValue::from_integer(1));
        let value = MapValue::new(fields.clone());
        assert_eq!(value.get("foo"), fields.get("foo"));
        assert_eq!(value.get("bar"), None);
    }
}
