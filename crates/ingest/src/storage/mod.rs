//! Storage backends for credentials, messages, and discovered links

mod memory;
mod sqlite;
mod traits;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{MessageFilter, TrackerStore};
