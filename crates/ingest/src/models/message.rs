//! Message model representing one ingested Gmail message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier assigned by the provider (Gmail message ID)
///
/// Globally unique and immutable; unique per owning user in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GmailId(pub String);

impl GmailId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for GmailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GmailId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name (e.g., "Jane Recruiter")
    pub name: Option<String>,
    /// Email address (e.g., "jane@example.com")
    pub email: String,
}

impl EmailAddress {
    /// Create a new email address with just the email
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create a new email address with a display name
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Parse an email address from a header value like "Jane <jane@example.com>"
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        // Try to parse "Name <email>" format
        if let Some(angle_start) = s.rfind('<')
            && let Some(angle_end) = s.rfind('>')
            && angle_start < angle_end
        {
            let name = s[..angle_start].trim();
            let email = s[angle_start + 1..angle_end].trim();
            return Self {
                name: if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                },
                email: email.to_string(),
            };
        }

        // Otherwise, treat the whole string as an email
        Self {
            name: None,
            email: s.to_string(),
        }
    }

    /// Format the email address for display
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// Coarse classification assigned by the keyword gate or the linker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// A single job prospect (one listing, typically one link)
    ProspectSingle,
    /// A digest carrying several job links
    JobLinkList,
    /// A reply to an application the user already submitted
    ApplicationResponse,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ProspectSingle => "PROSPECT_SINGLE",
            Category::JobLinkList => "JOB_LINK_LIST",
            Category::ApplicationResponse => "APPLICATION_RESPONSE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROSPECT_SINGLE" => Some(Category::ProspectSingle),
            "JOB_LINK_LIST" => Some(Category::JobLinkList),
            "APPLICATION_RESPONSE" => Some(Category::ApplicationResponse),
            _ => None,
        }
    }
}

/// Finer classification of an application response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubCategory {
    Denial,
    Interested,
}

impl SubCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubCategory::Denial => "DENIAL",
            SubCategory::Interested => "INTERESTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DENIAL" => Some(SubCategory::Denial),
            "INTERESTED" => Some(SubCategory::Interested),
            _ => None,
        }
    }
}

/// A persisted, deduplicated representation of one provider email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Surrogate storage key (0 until the row is inserted)
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Provider message ID, unique per owning user
    pub gmail_id: GmailId,
    /// Provider thread ID
    pub thread_id: String,
    /// Subject line (empty when the header is missing)
    pub subject: String,
    /// Sender, parsed from the From header
    pub sender: EmailAddress,
    /// Recipient, parsed from the To header
    pub recipient: EmailAddress,
    /// Provider-supplied preview snippet
    pub snippet: String,
    /// When the message was received
    pub received_at: DateTime<Utc>,
    /// Provider's internal timestamp (milliseconds since epoch)
    pub internal_date: i64,
    /// Extracted plain-text body
    pub body_plain: String,
    /// Extracted HTML body, when the message carried one
    pub body_html: Option<String>,
    /// Provider label IDs (e.g., "INBOX", "UNREAD")
    pub label_ids: Vec<String>,
    /// Classification from the keyword gate or the linker
    pub category: Option<Category>,
    /// Finer classification of an application response
    pub sub_category: Option<SubCategory>,
    /// Linked application record, when the linker attached one
    pub application_id: Option<i64>,
}

impl Message {
    /// Create a new message builder
    pub fn builder(user_id: i64, gmail_id: GmailId, thread_id: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(user_id, gmail_id, thread_id.into())
    }

    /// Whether the linker has attached an application record
    pub fn is_linked(&self) -> bool {
        self.application_id.is_some()
    }

    /// Whether the provider still marks the message unread
    pub fn is_unread(&self) -> bool {
        self.label_ids.iter().any(|l| l == "UNREAD")
    }
}

/// Builder for creating Message instances
pub struct MessageBuilder {
    user_id: i64,
    gmail_id: GmailId,
    thread_id: String,
    subject: String,
    sender: Option<EmailAddress>,
    recipient: Option<EmailAddress>,
    snippet: String,
    received_at: Option<DateTime<Utc>>,
    internal_date: i64,
    body_plain: String,
    body_html: Option<String>,
    label_ids: Vec<String>,
    category: Option<Category>,
    sub_category: Option<SubCategory>,
}

impl MessageBuilder {
    fn new(user_id: i64, gmail_id: GmailId, thread_id: String) -> Self {
        Self {
            user_id,
            gmail_id,
            thread_id,
            subject: String::new(),
            sender: None,
            recipient: None,
            snippet: String::new(),
            received_at: None,
            internal_date: 0,
            body_plain: String::new(),
            body_html: None,
            label_ids: Vec::new(),
            category: None,
            sub_category: None,
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn sender(mut self, sender: EmailAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn recipient(mut self, recipient: EmailAddress) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = Some(received_at);
        self
    }

    pub fn internal_date(mut self, internal_date: i64) -> Self {
        self.internal_date = internal_date;
        self
    }

    pub fn body_plain(mut self, body_plain: impl Into<String>) -> Self {
        self.body_plain = body_plain.into();
        self
    }

    pub fn body_html(mut self, body_html: Option<String>) -> Self {
        self.body_html = body_html;
        self
    }

    pub fn label_ids(mut self, label_ids: Vec<String>) -> Self {
        self.label_ids = label_ids;
        self
    }

    pub fn category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn sub_category(mut self, sub_category: Option<SubCategory>) -> Self {
        self.sub_category = sub_category;
        self
    }

    pub fn build(self) -> Message {
        Message {
            id: 0,
            user_id: self.user_id,
            gmail_id: self.gmail_id,
            thread_id: self.thread_id,
            subject: self.subject,
            sender: self
                .sender
                .unwrap_or_else(|| EmailAddress::new("unknown@unknown.com")),
            recipient: self
                .recipient
                .unwrap_or_else(|| EmailAddress::new("unknown@unknown.com")),
            snippet: self.snippet,
            received_at: self.received_at.unwrap_or_else(Utc::now),
            internal_date: self.internal_date,
            body_plain: self.body_plain,
            body_html: self.body_html,
            label_ids: self.label_ids,
            category: self.category,
            sub_category: self.sub_category,
            application_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_with_name() {
        let addr = EmailAddress::parse("Jane Recruiter <jane@example.com>");
        assert_eq!(addr.name, Some("Jane Recruiter".to_string()));
        assert_eq!(addr.email, "jane@example.com");
    }

    #[test]
    fn test_parse_email_without_name() {
        let addr = EmailAddress::parse("jane@example.com");
        assert_eq!(addr.name, None);
        assert_eq!(addr.email, "jane@example.com");
    }

    #[test]
    fn test_parse_email_with_angle_brackets_no_name() {
        let addr = EmailAddress::parse("<jane@example.com>");
        assert_eq!(addr.name, None);
        assert_eq!(addr.email, "jane@example.com");
    }

    #[test]
    fn test_display_with_name() {
        let addr = EmailAddress::with_name("Jane", "jane@example.com");
        assert_eq!(addr.display(), "Jane <jane@example.com>");
    }

    #[test]
    fn test_category_round_trip() {
        for cat in [
            Category::ProspectSingle,
            Category::JobLinkList,
            Category::ApplicationResponse,
        ] {
            assert_eq!(Category::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(Category::parse("UNKNOWN"), None);
    }

    #[test]
    fn test_builder_defaults() {
        let msg = Message::builder(1, GmailId::new("g1"), "t1").build();
        assert_eq!(msg.id, 0);
        assert_eq!(msg.subject, "");
        assert!(msg.body_html.is_none());
        assert!(!msg.is_linked());
    }

    #[test]
    fn test_is_unread() {
        let msg = Message::builder(1, GmailId::new("g1"), "t1")
            .label_ids(vec!["INBOX".into(), "UNREAD".into()])
            .build();
        assert!(msg.is_unread());
    }
}
