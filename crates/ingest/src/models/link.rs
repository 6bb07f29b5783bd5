//! Job links discovered inside ingested message bodies

use serde::{Deserialize, Serialize};

/// Where a discovered link is in the external crawler's pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlStatus {
    Pending,
    Fetched,
    Error,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlStatus::Pending => "PENDING",
            CrawlStatus::Fetched => "FETCHED",
            CrawlStatus::Error => "ERROR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(CrawlStatus::Pending),
            "FETCHED" => Some(CrawlStatus::Fetched),
            "ERROR" => Some(CrawlStatus::Error),
            _ => None,
        }
    }
}

/// A URL found in a message body, unique per (source message, URL)
///
/// Created by the ingestion coordinator for newly saved messages; the
/// crawl fields are advanced by the external crawler collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredLink {
    /// Surrogate storage key (0 until the row is inserted)
    pub id: i64,
    /// Source message row
    pub message_id: i64,
    pub url: String,
    pub crawl_status: CrawlStatus,
    /// Company name pulled out of the fetched listing
    pub extracted_company: Option<String>,
    /// Role title pulled out of the fetched listing
    pub extracted_role: Option<String>,
    /// How confident the crawler is that this is a real listing, 0-100
    pub confidence_score: Option<u8>,
    /// Application record the listing was attached to
    pub application_id: Option<i64>,
    /// Crawler failure detail, set when crawl_status is Error
    pub error_message: Option<String>,
}

impl DiscoveredLink {
    /// A freshly discovered link awaiting the crawler
    pub fn pending(message_id: i64, url: impl Into<String>) -> Self {
        Self {
            id: 0,
            message_id,
            url: url.into(),
            crawl_status: CrawlStatus::Pending,
            extracted_company: None,
            extracted_role: None,
            confidence_score: None,
            application_id: None,
            error_message: None,
        }
    }
}
