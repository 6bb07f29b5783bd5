//! Storage trait definitions

use anyhow::Result;

use crate::models::{Category, CrawlStatus, Credential, DiscoveredLink, GmailId, Message, SubCategory};

/// Filters for listing a user's messages
#[derive(Debug, Clone)]
pub struct MessageFilter {
    /// Only messages with this classification
    pub category: Option<Category>,
    /// Case-insensitive substring match on subject or sender
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Trait for tracker storage operations
///
/// Abstracts over different storage backends (in-memory, SQLite) and
/// provides the persistence operations the engine and its collaborators
/// need. All message operations are scoped to an owning user.
pub trait TrackerStore: Send + Sync {
    // === Credentials (one row per user) ===

    /// Get the stored credential for a user
    fn get_credential(&self, user_id: i64) -> Result<Option<Credential>>;

    /// Insert or overwrite the credential for a user
    fn save_credential(&self, user_id: i64, credential: &Credential) -> Result<()>;

    /// Remove the credential when the account is unlinked
    fn delete_credential(&self, user_id: i64) -> Result<()>;

    // === Messages ===

    /// Insert a message unless its (user, gmail_id) is already stored
    ///
    /// The message row, its labels, and pending links for `link_urls`
    /// commit in one transaction. Returns the new surrogate id, or None
    /// when the message already exists, including when a concurrent run
    /// won the insert race; the duplicate is coalesced, never an error.
    fn insert_message_if_new(&self, message: &Message, link_urls: &[String])
    -> Result<Option<i64>>;

    /// Check whether a provider message is already stored for a user
    fn has_message(&self, user_id: i64, gmail_id: &GmailId) -> Result<bool>;

    /// Get a message by surrogate id
    fn get_message(&self, user_id: i64, message_id: i64) -> Result<Option<Message>>;

    /// List messages, newest received first
    fn list_messages(&self, user_id: i64, filter: &MessageFilter) -> Result<Vec<Message>>;

    /// Count all stored messages for a user
    fn count_messages(&self, user_id: i64) -> Result<usize>;

    /// Attach an application record to a message
    ///
    /// Returns false when the message does not exist for this user.
    fn link_message_to_application(
        &self,
        user_id: i64,
        message_id: i64,
        application_id: i64,
    ) -> Result<bool>;

    /// Overwrite a message's classification
    fn set_message_category(
        &self,
        user_id: i64,
        message_id: i64,
        category: Option<Category>,
        sub_category: Option<SubCategory>,
    ) -> Result<bool>;

    /// Replace the local mirror of a message's provider labels
    fn update_message_labels(
        &self,
        user_id: i64,
        message_id: i64,
        label_ids: &[String],
    ) -> Result<()>;

    // === Discovered links ===

    /// List links discovered in a message's body
    fn list_links_for_message(&self, message_id: i64) -> Result<Vec<DiscoveredLink>>;

    /// Advance a link through the crawler pipeline
    fn update_link_crawl(
        &self,
        link_id: i64,
        status: CrawlStatus,
        error_message: Option<&str>,
    ) -> Result<()>;

    /// Attach an application record to a discovered link
    fn link_application_to_link(&self, link_id: i64, application_id: i64) -> Result<bool>;
}
