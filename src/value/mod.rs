pub mod map_value;
pub mod value;

pub use map_value::MapValue;
pub use value::{FieldValue, ValueKind};
