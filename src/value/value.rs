use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use crate::model::Timestamp;
use crate::value::MapValue;

/// A typed document field value.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldValue {
    kind: ValueKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(Timestamp),
    String(String),
    Array(Vec<FieldValue>),
    Map(MapValue),
}

impl FieldValue {
    pub fn null() -> Self {
        Self {
            kind: ValueKind::Null,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Self {
            kind: ValueKind::Boolean(value),
        }
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            kind: ValueKind::Integer(value),
        }
    }

    pub fn from_double(value: f64) -> Self {
        Self {
            kind: ValueKind::Double(value),
        }
    }

    pub fn from_timestamp(value: Timestamp) -> Self {
        Self {
            kind: ValueKind::Timestamp(value),
        }
    }

    pub fn from_string(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::String(value.into()),
        }
    }

    pub fn from_array(values: Vec<FieldValue>) -> Self {
        Self {
            kind: ValueKind::Array(values),
        }
    }

    pub fn from_map(fields: BTreeMap<String, FieldValue>) -> Self {
        Self {
            kind: ValueKind::Map(MapValue::new(fields)),
        }
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Rank of the value's type in the canonical cross-type order.
    fn type_order(&self) -> u8 {
        match &self.kind {
            ValueKind::Null => 0,
            ValueKind::Boolean(_) => 1,
            ValueKind::Integer(_) | ValueKind::Double(_) => 2,
            ValueKind::Timestamp(_) => 3,
            ValueKind::String(_) => 4,
            ValueKind::Array(_) => 5,
            ValueKind::Map(_) => 6,
        }
    }

    /// Total order over all field values: values of different types sort
    /// by type rank (null < boolean < number < timestamp < string < array
    /// < map), numbers compare numerically across integer/double.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (&self.kind, &other.kind) {
            (ValueKind::Null, ValueKind::Null) => Ordering::Equal,
            (ValueKind::Boolean(left), ValueKind::Boolean(right)) => left.cmp(right),
            (ValueKind::Integer(left), ValueKind::Integer(right)) => left.cmp(right),
            (ValueKind::Double(left), ValueKind::Double(right)) => left.total_cmp(right),
            (ValueKind::Integer(left), ValueKind::Double(right)) => {
                (*left as f64).total_cmp(right)
            }
            (ValueKind::Double(left), ValueKind::Integer(right)) => {
                left.total_cmp(&(*right as f64))
            }
            (ValueKind::Timestamp(left), ValueKind::Timestamp(right)) => left.cmp(right),
            (ValueKind::String(left), ValueKind::String(right)) => left.cmp(right),
            (ValueKind::Array(left), ValueKind::Array(right)) => {
                for (l, r) in left.iter().zip(right.iter()) {
                    match l.compare(r) {
                        Ordering::Equal => continue,
                        non_eq => return non_eq,
                    }
                }
                left.len().cmp(&right.len())
            }
            (ValueKind::Map(left), ValueKind::Map(right)) => {
                for ((lk, lv), (rk, rv)) in left.fields().iter().zip(right.fields().iter()) {
                    match lk.cmp(rk).then_with(|| lv.compare(rv)) {
                        Ordering::Equal => continue,
                        non_eq => return non_eq,
                    }
                }
                left.fields().len().cmp(&right.fields().len())
            }
            _ => self.type_order().cmp(&other.type_order()),
        }
    }

    /// Builds a field value from plain JSON. Numbers become integers when
    /// they fit `i64`, doubles otherwise.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::null(),
            JsonValue::Bool(flag) => Self::from_bool(*flag),
            JsonValue::Number(number) => match number.as_i64() {
                Some(integer) => Self::from_integer(integer),
                None => Self::from_double(number.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(text) => Self::from_string(text.clone()),
            JsonValue::Array(values) => {
                Self::from_array(values.iter().map(Self::from_json).collect())
            }
            JsonValue::Object(fields) => Self::from_map(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match &self.kind {
            ValueKind::Null => JsonValue::Null,
            ValueKind::Boolean(flag) => JsonValue::Bool(*flag),
            ValueKind::Integer(integer) => JsonValue::Number(Number::from(*integer)),
            ValueKind::Double(double) => Number::from_f64(*double)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ValueKind::Timestamp(timestamp) => {
                let mut object = JsonMap::new();
                object.insert("seconds".into(), JsonValue::Number(timestamp.seconds.into()));
                object.insert("nanos".into(), JsonValue::Number(timestamp.nanos.into()));
                JsonValue::Object(object)
            }
            ValueKind::String(text) => JsonValue::String(text.clone()),
            ValueKind::Array(values) => {
                JsonValue::Array(values.iter().map(FieldValue::to_json).collect())
            }
            ValueKind::Map(map) => JsonValue::Object(
                map.fields()
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}
