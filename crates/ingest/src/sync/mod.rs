//! Ingestion engine for fetching and storing job-related mail
//!
//! Provides an idempotent ingest operation that can be safely retried,
//! plus best-effort label write-back to the provider.

mod ingest;
mod labels;

pub use ingest::{CancelFlag, IngestOptions, IngestReport, ingest_mailbox};
pub use labels::{PROCESSED_LABEL, add_label, label_ids, mark_read};
