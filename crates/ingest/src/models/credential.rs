//! OAuth credential stored per linked account

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The access/refresh token pair authorizing provider calls for one account
///
/// Created when the account is linked, mutated in place on every refresh,
/// deleted when the account is unlinked. The tokens are opaque secrets;
/// never log their values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Short-lived bearer token for API calls
    pub access_token: String,
    /// Long-lived token exchanged for new access tokens
    pub refresh_token: String,
    /// When the access token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_at,
        }
    }

    /// Whether the access token must be refreshed before use
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
