//! Mailbox ingestion engine for the job tracker
//!
//! This crate provides the platform-independent core that mines a user's
//! Gmail mailbox for job-related messages:
//! - Credential lifecycle (OAuth refresh with expiry tracking)
//! - Search query construction over a fixed keyword taxonomy
//! - Paginated search + per-message detail fetching
//! - Recursive multi-part body extraction
//! - Idempotent persistence keyed on (user, provider message id)
//! - Best-effort label/read-state write-back to the provider
//!
//! The HTTP API, session issuance, and UI are external collaborators
//! consuming [`Engine`] and the [`storage::TrackerStore`] views.

pub mod config;
pub mod engine;
pub mod error;
pub mod gmail;
pub mod links;
pub mod models;
pub mod query;
pub mod storage;
pub mod sync;
pub mod taxonomy;

pub use config::GoogleCredentials;
pub use engine::Engine;
pub use error::{EngineError, SyncWarning};
pub use gmail::{
    FlowStates, GmailApi, GmailHttp, JOB_KEYWORDS, TokenManager, build_query, extract_bodies,
    normalize_message,
};
pub use models::{
    Category, CrawlStatus, Credential, DiscoveredLink, EmailAddress, GmailId, Message, SubCategory,
};
pub use query::{MessageSummary, get_message, list_messages};
pub use storage::{InMemoryStore, MessageFilter, SqliteStore, TrackerStore};
pub use sync::{CancelFlag, IngestOptions, IngestReport, PROCESSED_LABEL, ingest_mailbox};
