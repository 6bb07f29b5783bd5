//! Credential lifecycle management
//!
//! Keeps stored OAuth credentials valid: checks expiry before every
//! provider call, performs the refresh exchange, and persists the result.
//! Refresh is mutually exclusive per user so concurrent ingestion runs
//! never race a duplicate token exchange.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};

use super::client::GmailApi;
use crate::error::EngineError;
use crate::models::Credential;
use crate::storage::TrackerStore;

/// Lifetime Google grants an access token when expires_in is omitted
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// Decides when a credential is stale and refreshes it
pub struct TokenManager {
    api: Arc<dyn GmailApi>,
    store: Arc<dyn TrackerStore>,
    /// One refresh lock per user; waiters re-read the store under the
    /// lock and observe the refreshed credential instead of exchanging
    /// the refresh token a second time.
    refresh_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl TokenManager {
    pub fn new(api: Arc<dyn GmailApi>, store: Arc<dyn TrackerStore>) -> Self {
        Self {
            api,
            store,
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Return a valid credential for the user, refreshing if expired
    ///
    /// The stored credential is only overwritten on a successful
    /// exchange; transient failures leave it untouched so a retry can
    /// reuse it. A rejected refresh token surfaces as
    /// [`EngineError::CredentialRevoked`] and requires the user to
    /// re-link the account.
    pub fn ensure_valid(&self, user_id: i64) -> Result<Credential, EngineError> {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().unwrap();

        let credential = self
            .store
            .get_credential(user_id)?
            .ok_or(EngineError::CredentialNotFound(user_id))?;

        if !credential.is_expired(Utc::now()) {
            return Ok(credential);
        }

        debug!("access token expired for user {user_id}, refreshing");
        let response = self.api.refresh_token(&credential.refresh_token)?;

        let refreshed = Credential {
            access_token: response.access_token,
            // The provider may omit the refresh token; retain the prior
            // one, never clear it
            refresh_token: response
                .refresh_token
                .unwrap_or(credential.refresh_token),
            expires_at: Utc::now()
                + Duration::seconds(
                    response.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS) as i64
                ),
        };

        self.store.save_credential(user_id, &refreshed)?;
        info!("refreshed Google token for user {user_id}");
        Ok(refreshed)
    }

    fn lock_for(&self, user_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().unwrap();
        locks.entry(user_id).or_default().clone()
    }
}

/// Short-lived OAuth flow state tokens for the account-link flow
///
/// Issued when the link flow starts and consumed exactly once when the
/// provider calls back, to reject forged callbacks. Expired entries are
/// pruned opportunistically on issue.
pub struct FlowStates {
    ttl: Duration,
    pending: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl FlowStates {
    /// How long a pending link flow stays valid
    const DEFAULT_TTL_SECS: i64 = 600;

    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(Self::DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh state token for a new link flow
    pub fn issue(&self) -> String {
        let token = random_token();
        let now = Utc::now();

        let mut pending = self.pending.lock().unwrap();
        pending.retain(|_, expires| *expires > now);
        pending.insert(token.clone(), now + self.ttl);
        token
    }

    /// Consume a state token; true only for a known, unexpired token
    pub fn verify(&self, state: &str) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.remove(state) {
            Some(expires) => expires > Utc::now(),
            None => false,
        }
    }
}

impl Default for FlowStates {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an unguessable hex token from the thread-local hasher seed
fn random_token() -> String {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut token = String::with_capacity(64);
    for _ in 0..4 {
        let hasher = RandomState::new().build_hasher();
        token.push_str(&format!("{:016x}", hasher.finish()));
    }
    token
}
