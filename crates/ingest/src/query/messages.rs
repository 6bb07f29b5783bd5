//! Message query functions

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Category, EmailAddress, GmailId, Message, SubCategory};
use crate::storage::{MessageFilter, TrackerStore};

/// Summary information for displaying a message in a list
///
/// Bodies are omitted; fetch the full [`Message`] via [`get_message`]
/// when rendering a detail view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSummary {
    /// Surrogate storage key
    pub id: i64,
    /// Provider message ID
    pub gmail_id: GmailId,
    /// Subject line
    pub subject: String,
    /// Sender address
    pub sender: EmailAddress,
    /// Provider-supplied preview snippet
    pub snippet: String,
    /// When the message was received
    pub received_at: DateTime<Utc>,
    /// Classification, when assigned
    pub category: Option<Category>,
    /// Finer classification of an application response
    pub sub_category: Option<SubCategory>,
    /// Linked application record
    pub application_id: Option<i64>,
    /// Whether the provider still marks the message unread
    pub is_unread: bool,
}

impl From<Message> for MessageSummary {
    fn from(message: Message) -> Self {
        let is_unread = message.is_unread();
        Self {
            id: message.id,
            gmail_id: message.gmail_id,
            subject: message.subject,
            sender: message.sender,
            snippet: message.snippet,
            received_at: message.received_at,
            category: message.category,
            sub_category: message.sub_category,
            application_id: message.application_id,
            is_unread,
        }
    }
}

/// Get one stored message with bodies
pub fn get_message(
    store: &dyn TrackerStore,
    user_id: i64,
    message_id: i64,
) -> Result<Option<Message>> {
    store.get_message(user_id, message_id)
}

/// List a user's messages, newest received first
pub fn list_messages(
    store: &dyn TrackerStore,
    user_id: i64,
    filter: &MessageFilter,
) -> Result<Vec<MessageSummary>> {
    let messages = store.list_messages(user_id, filter)?;
    Ok(messages.into_iter().map(MessageSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use chrono::Duration;

    fn setup_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        for i in 0..5 {
            let msg = Message::builder(1, GmailId::new(format!("g{i}")), format!("t{i}"))
                .subject(format!("Subject {i}"))
                .sender(EmailAddress::new("jobs@corp.example"))
                .snippet(format!("Snippet {i}"))
                .received_at(Utc::now() - Duration::hours(i as i64))
                .label_ids(if i % 2 == 0 {
                    vec!["INBOX".into(), "UNREAD".into()]
                } else {
                    vec!["INBOX".into()]
                })
                .build();
            store.insert_message_if_new(&msg, &[]).unwrap();
        }
        store
    }

    #[test]
    fn test_list_newest_first() {
        let store = setup_store();

        let listed = list_messages(&store, 1, &MessageFilter::default()).unwrap();
        assert_eq!(listed.len(), 5);
        assert_eq!(listed[0].subject, "Subject 0");
        assert_eq!(listed[4].subject, "Subject 4");
        assert!(listed[0].is_unread);
        assert!(!listed[1].is_unread);
    }

    #[test]
    fn test_list_pagination() {
        let store = setup_store();

        let page1 = list_messages(
            &store,
            1,
            &MessageFilter {
                limit: 2,
                offset: 0,
                ..MessageFilter::default()
            },
        )
        .unwrap();
        let page2 = list_messages(
            &store,
            1,
            &MessageFilter {
                limit: 2,
                offset: 2,
                ..MessageFilter::default()
            },
        )
        .unwrap();

        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 2);
        assert_ne!(page1[0].id, page2[0].id);
    }

    #[test]
    fn test_get_message_not_found() {
        let store = setup_store();
        assert!(get_message(&store, 1, 999).unwrap().is_none());
        // Another user's view of an existing id is a miss
        assert!(get_message(&store, 2, 1).unwrap().is_none());
    }
}
