pub mod document;
pub mod document_key;
pub mod document_set;
pub mod online_state;
pub mod resource_path;
pub mod timestamp;

pub use document::Document;
pub use document_key::DocumentKey;
pub use document_set::{DocumentComparator, DocumentSet};
pub use online_state::OnlineState;
pub use resource_path::ResourcePath;
pub use timestamp::Timestamp;
