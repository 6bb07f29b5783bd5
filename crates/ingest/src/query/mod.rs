//! Read views exposed to the HTTP layer and the application linker

mod messages;

pub use messages::{MessageSummary, get_message, list_messages};
