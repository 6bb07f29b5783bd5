//! Domain models for the ingestion engine

mod credential;
mod link;
mod message;

pub use credential::Credential;
pub use link::{CrawlStatus, DiscoveredLink};
pub use message::{Category, EmailAddress, GmailId, Message, MessageBuilder, SubCategory};
