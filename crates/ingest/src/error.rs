//! Error taxonomy for the ingestion engine
//!
//! Failures split into three domains: credential-level errors abort a call,
//! provider errors may be retried, and per-message failures are contained
//! as warnings beside an otherwise-successful result.

use std::fmt;

/// Errors surfaced by the engine's public operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The provider rejected the refresh token. The account must be
    /// re-linked by the user; never retried automatically.
    #[error("Google credential revoked; the account must be reconnected")]
    CredentialRevoked,

    /// No credential is stored for this user (account never linked or
    /// already unlinked).
    #[error("no Google credential stored for user {0}")]
    CredentialNotFound(i64),

    /// Transient failure talking to the token endpoint. The stored
    /// credential is untouched; the caller may retry with backoff.
    #[error("transient auth failure: {0}")]
    TransientAuth(String),

    /// Transient failure talking to the provider API (network, 5xx, 429).
    #[error("transient provider failure: {0}")]
    TransientProvider(String),

    /// The provider rejected a request for a non-transient reason.
    #[error("provider rejected the request: {0}")]
    Provider(String),

    /// A linker operation referenced a message that is not stored.
    #[error("message {message_id} not found for user {user_id}")]
    MessageNotFound { user_id: i64, message_id: i64 },

    /// Storage layer failure.
    #[error("storage failure: {0}")]
    Storage(anyhow::Error),
}

impl EngineError {
    /// Whether the caller may retry the operation with backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::TransientAuth(_) | EngineError::TransientProvider(_)
        )
    }
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Storage(err)
    }
}

/// A non-fatal failure captured alongside an otherwise-successful result
///
/// Used for per-message fetch failures during ingestion and for label or
/// read-state write-back failures, which must never roll back the
/// persistence that triggered them.
#[derive(Debug, Clone)]
pub struct SyncWarning {
    /// What was being attempted (e.g. "fetch 18c2a4", "add_label")
    pub context: String,
    /// Why it failed
    pub detail: String,
}

impl SyncWarning {
    pub fn new(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.context, self.detail)
    }
}
