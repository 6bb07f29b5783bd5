//! Ingestion coordinator: search, fetch, extract, persist
//!
//! One ingestion run is a single logical unit of work. Detail fetches fan
//! out across a bounded worker pool; persistence serializes through the
//! store, where the unique (user, gmail_id) index keeps reruns and
//! concurrent runs idempotent.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{Duration, Utc};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::{EngineError, SyncWarning};
use crate::gmail::api::GmailMessage;
use crate::gmail::{GmailApi, JOB_KEYWORDS, build_query, normalize_message};
use crate::links::discover_links;
use crate::models::Credential;
use crate::storage::TrackerStore;
use crate::taxonomy::categorize;

/// Detail-fetch retry budget per message
const FETCH_RETRIES: u32 = 3;

/// Tuning knobs for one ingestion run
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// How many days of mailbox history to search
    pub days_back: u32,
    /// Upper bound on search results for the run
    pub max_results: u32,
    /// Bounded worker count for concurrent detail fetches
    pub fetch_workers: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            days_back: 7,
            max_results: 100,
            fetch_workers: 4,
        }
    }
}

/// Statistics from one ingestion run
///
/// `fetched` counts messages successfully retrieved from the provider;
/// `saved` counts genuinely new rows. The gap between them is the
/// expected idempotence signal, not an error.
#[derive(Debug, Default, Clone)]
pub struct IngestReport {
    /// Messages successfully retrieved from the provider
    pub fetched: usize,
    /// New messages persisted
    pub saved: usize,
    /// Messages already stored from an earlier run
    pub skipped: usize,
    /// Per-message failures (fetch, normalize, persist)
    pub errors: usize,
    /// Details for the per-message failures
    pub warnings: Vec<SyncWarning>,
    /// Duration of the run
    pub duration_ms: u64,
}

/// Cooperative cancellation for an in-flight ingestion run
///
/// Cancelling stops new detail fetches from being issued; in-flight
/// fetches complete and progress already persisted stands.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

enum FetchOutcome {
    Fetched(Box<GmailMessage>),
    Failed(String, EngineError),
    Cancelled,
}

/// Run one ingestion pass for a user
///
/// The credential must already be valid (see
/// [`crate::gmail::TokenManager::ensure_valid`]). Per-message failures are
/// contained and reported in the returned counters and warnings; only the
/// search call itself can abort the run.
pub fn ingest_mailbox(
    api: &dyn GmailApi,
    store: &dyn TrackerStore,
    credential: &Credential,
    user_id: i64,
    options: &IngestOptions,
    cancel: &CancelFlag,
) -> Result<IngestReport, EngineError> {
    let start = Instant::now();
    let mut report = IngestReport::default();

    let since = (Utc::now() - Duration::days(options.days_back as i64)).date_naive();
    let query = build_query(JOB_KEYWORDS, since);
    debug!("searching mailbox for user {user_id}: {query}");

    let refs = api.search_messages(&credential.access_token, &query, options.max_results)?;
    if refs.is_empty() {
        report.duration_ms = start.elapsed().as_millis() as u64;
        return Ok(report);
    }

    // Fan detail fetches out across a bounded pool; a partial page from
    // the provider was already accepted as-is by search_messages
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.fetch_workers.max(1))
        .build()
        .map_err(|e| EngineError::TransientProvider(format!("fetch pool: {e}")))?;

    let access_token = credential.access_token.as_str();
    let outcomes: Vec<FetchOutcome> = pool.install(|| {
        refs.par_iter()
            .map(|msg_ref| {
                if cancel.is_cancelled() {
                    return FetchOutcome::Cancelled;
                }
                match api.get_message_with_retry(access_token, &msg_ref.id, FETCH_RETRIES) {
                    Ok(raw) => FetchOutcome::Fetched(Box::new(raw)),
                    Err(e) => FetchOutcome::Failed(msg_ref.id.clone(), e),
                }
            })
            .collect()
    });

    // Persistence is serial per user to preserve the dedupe invariant
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Cancelled => {}
            FetchOutcome::Failed(id, e) => {
                warn!("failed to fetch message {id} for user {user_id}: {e}");
                report.errors += 1;
                report
                    .warnings
                    .push(SyncWarning::new(format!("fetch {id}"), e.to_string()));
            }
            FetchOutcome::Fetched(raw) => {
                report.fetched += 1;
                let gmail_id = raw.id.clone();

                let mut message = match normalize_message(*raw, user_id) {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("failed to normalize message {gmail_id}: {e}");
                        report.errors += 1;
                        report
                            .warnings
                            .push(SyncWarning::new(format!("extract {gmail_id}"), e.to_string()));
                        continue;
                    }
                };

                let link_urls = discover_links(&message.body_plain, message.body_html.as_deref());
                let (category, sub_category) =
                    categorize(&message.subject, &message.body_plain, link_urls.len());
                message.category = category;
                message.sub_category = sub_category;

                match store.insert_message_if_new(&message, &link_urls) {
                    Ok(Some(_)) => report.saved += 1,
                    Ok(None) => report.skipped += 1,
                    Err(e) => {
                        warn!("failed to persist message {gmail_id}: {e}");
                        report.errors += 1;
                        report
                            .warnings
                            .push(SyncWarning::new(format!("persist {gmail_id}"), e.to_string()));
                    }
                }
            }
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "ingest complete for user {user_id}: fetched={} saved={} skipped={} errors={}",
        report.fetched, report.saved, report.skipped, report.errors
    );
    Ok(report)
}
