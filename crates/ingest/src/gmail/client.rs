//! Gmail API HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic. The provider
//! surface is a trait so the engine can run against a fake in tests.

use std::time::Duration;

use log::warn;

use super::api::{
    CreateLabelRequest, GmailLabel, GmailMessage, ListLabelsResponse, ListMessagesResponse,
    MessageRef, ModifyMessageRequest, TokenResponse,
};
use crate::config::GoogleCredentials;
use crate::error::EngineError;

/// The provider operations this engine consumes
///
/// One provider's API shape is assumed; this is a seam for testing, not a
/// multi-provider abstraction.
pub trait GmailApi: Send + Sync {
    /// Exchange a refresh token for a new access token
    ///
    /// `CredentialRevoked` when the provider rejects the token,
    /// `TransientAuth` on transport or 5xx failures.
    fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, EngineError>;

    /// Search message IDs matching a query, bounded by `max_results`
    ///
    /// A single paginated call; a partial page (rate limiting) is returned
    /// as-is, never treated as an error.
    fn search_messages(
        &self,
        access_token: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<MessageRef>, EngineError>;

    /// Fetch full message details by ID (one network round trip)
    fn get_message(&self, access_token: &str, id: &str) -> Result<GmailMessage, EngineError>;

    /// List all labels in the user's mailbox
    fn list_labels(&self, access_token: &str) -> Result<Vec<GmailLabel>, EngineError>;

    /// Create a user label with default visibility settings
    fn create_label(&self, access_token: &str, name: &str) -> Result<GmailLabel, EngineError>;

    /// Add and remove label IDs on a message
    fn modify_message(
        &self,
        access_token: &str,
        id: &str,
        add_label_ids: &[&str],
        remove_label_ids: &[&str],
    ) -> Result<(), EngineError>;

    /// Fetch a message with exponential backoff on transient failures
    fn get_message_with_retry(
        &self,
        access_token: &str,
        id: &str,
        max_retries: u32,
    ) -> Result<GmailMessage, EngineError> {
        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..max_retries {
            match self.get_message(access_token, id) {
                Ok(msg) => return Ok(msg),
                Err(e) if e.is_transient() => {
                    warn!("transient failure fetching message {id} (attempt {attempt}): {e}");
                    last_error = Some(e);
                    if attempt < max_retries - 1 {
                        // Add jitter to delay
                        let jitter = Duration::from_millis(rand_jitter());
                        std::thread::sleep(delay + jitter);
                        delay *= 2;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            EngineError::TransientProvider(format!("message {id}: retries exhausted"))
        }))
    }
}

/// Gmail API client over HTTPS
pub struct GmailHttp {
    client_id: String,
    client_secret: String,
}

impl GmailHttp {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";
    /// OAuth token endpoint
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Maximum page size the messages.list endpoint accepts
    const MAX_PAGE_SIZE: u32 = 500;

    pub fn new(credentials: GoogleCredentials) -> Self {
        Self {
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
        }
    }

    fn bearer(access_token: &str) -> String {
        format!("Bearer {}", access_token)
    }

    /// Map a failed provider API call to the engine taxonomy
    fn api_error(what: &str, err: ureq::Error) -> EngineError {
        match err {
            ureq::Error::StatusCode(code) if code == 429 || code >= 500 => {
                EngineError::TransientProvider(format!("{what}: HTTP {code}"))
            }
            ureq::Error::StatusCode(code) => {
                EngineError::Provider(format!("{what}: HTTP {code}"))
            }
            other => EngineError::TransientProvider(format!("{what}: {other}")),
        }
    }
}

impl GmailApi for GmailHttp {
    fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, EngineError> {
        let result = ureq::post(Self::TOKEN_URL).send_form([
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ]);

        match result {
            Ok(mut response) => response
                .body_mut()
                .read_json()
                .map_err(|e| EngineError::TransientAuth(format!("malformed token response: {e}"))),
            Err(ureq::Error::StatusCode(429)) => Err(EngineError::TransientAuth(
                "token endpoint: HTTP 429".to_string(),
            )),
            // Google answers invalid_grant (revoked or expired refresh
            // token) with a 4xx from the token endpoint
            Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => {
                Err(EngineError::CredentialRevoked)
            }
            Err(e) => Err(EngineError::TransientAuth(e.to_string())),
        }
    }

    fn search_messages(
        &self,
        access_token: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<MessageRef>, EngineError> {
        let url = format!(
            "{}/users/me/messages?maxResults={}&q={}",
            Self::BASE_URL,
            max_results.min(Self::MAX_PAGE_SIZE),
            urlencoding::encode(query),
        );

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(access_token))
            .call()
            .map_err(|e| Self::api_error("search messages", e))?;

        let list: ListMessagesResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| EngineError::Provider(format!("malformed search response: {e}")))?;

        Ok(list.messages.unwrap_or_default())
    }

    fn get_message(&self, access_token: &str, id: &str) -> Result<GmailMessage, EngineError> {
        let url = format!("{}/users/me/messages/{}?format=full", Self::BASE_URL, id);

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(access_token))
            .call()
            .map_err(|e| Self::api_error("get message", e))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| EngineError::Provider(format!("malformed message response: {e}")))
    }

    fn list_labels(&self, access_token: &str) -> Result<Vec<GmailLabel>, EngineError> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(access_token))
            .call()
            .map_err(|e| Self::api_error("list labels", e))?;

        let list: ListLabelsResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| EngineError::Provider(format!("malformed labels response: {e}")))?;

        Ok(list.labels.unwrap_or_default())
    }

    fn create_label(&self, access_token: &str, name: &str) -> Result<GmailLabel, EngineError> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);
        let body = CreateLabelRequest {
            name: name.to_string(),
            label_list_visibility: "labelShow".to_string(),
            message_list_visibility: "show".to_string(),
        };

        let mut response = ureq::post(&url)
            .header("Authorization", &Self::bearer(access_token))
            .send_json(&body)
            .map_err(|e| Self::api_error("create label", e))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| EngineError::Provider(format!("malformed label response: {e}")))
    }

    fn modify_message(
        &self,
        access_token: &str,
        id: &str,
        add_label_ids: &[&str],
        remove_label_ids: &[&str],
    ) -> Result<(), EngineError> {
        let url = format!("{}/users/me/messages/{}/modify", Self::BASE_URL, id);
        let body = ModifyMessageRequest {
            add_label_ids: add_label_ids.iter().map(|s| s.to_string()).collect(),
            remove_label_ids: remove_label_ids.iter().map(|s| s.to_string()).collect(),
        };

        ureq::post(&url)
            .header("Authorization", &Self::bearer(access_token))
            .send_json(&body)
            .map_err(|e| Self::api_error("modify message", e))?;

        Ok(())
    }
}

/// Generate a random jitter value (0-100ms)
fn rand_jitter() -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let hasher = RandomState::new().build_hasher();
    hasher.finish() % 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider stub that fails transiently a configured number of times
    struct FlakyApi {
        failures_left: Mutex<u32>,
        calls: Mutex<u32>,
    }

    impl GmailApi for FlakyApi {
        fn refresh_token(&self, _: &str) -> Result<TokenResponse, EngineError> {
            panic!("not used")
        }

        fn search_messages(
            &self,
            _: &str,
            _: &str,
            _: u32,
        ) -> Result<Vec<MessageRef>, EngineError> {
            panic!("not used")
        }

        fn get_message(&self, _: &str, id: &str) -> Result<GmailMessage, EngineError> {
            *self.calls.lock().unwrap() += 1;
            let mut left = self.failures_left.lock().unwrap();
            if *left > 0 {
                *left -= 1;
                return Err(EngineError::TransientProvider("HTTP 503".into()));
            }
            Ok(GmailMessage {
                id: id.to_string(),
                thread_id: "t".to_string(),
                label_ids: None,
                snippet: String::new(),
                internal_date: String::new(),
                payload: None,
            })
        }

        fn list_labels(&self, _: &str) -> Result<Vec<GmailLabel>, EngineError> {
            panic!("not used")
        }

        fn create_label(&self, _: &str, _: &str) -> Result<GmailLabel, EngineError> {
            panic!("not used")
        }

        fn modify_message(&self, _: &str, _: &str, _: &[&str], _: &[&str]) -> Result<(), EngineError> {
            panic!("not used")
        }
    }

    #[test]
    fn test_retry_recovers_from_transient_failures() {
        let api = FlakyApi {
            failures_left: Mutex::new(2),
            calls: Mutex::new(0),
        };

        let msg = api.get_message_with_retry("token", "m1", 3).unwrap();
        assert_eq!(msg.id, "m1");
        assert_eq!(*api.calls.lock().unwrap(), 3);
    }

    #[test]
    fn test_retry_gives_up_after_max_attempts() {
        let api = FlakyApi {
            failures_left: Mutex::new(10),
            calls: Mutex::new(0),
        };

        let err = api.get_message_with_retry("token", "m1", 3).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(*api.calls.lock().unwrap(), 3);
    }

    #[test]
    fn test_non_transient_errors_are_not_retried() {
        struct Rejecting;
        impl GmailApi for Rejecting {
            fn refresh_token(&self, _: &str) -> Result<TokenResponse, EngineError> {
                panic!("not used")
            }
            fn search_messages(
                &self,
                _: &str,
                _: &str,
                _: u32,
            ) -> Result<Vec<MessageRef>, EngineError> {
                panic!("not used")
            }
            fn get_message(&self, _: &str, _: &str) -> Result<GmailMessage, EngineError> {
                Err(EngineError::Provider("HTTP 404".into()))
            }
            fn list_labels(&self, _: &str) -> Result<Vec<GmailLabel>, EngineError> {
                panic!("not used")
            }
            fn create_label(&self, _: &str, _: &str) -> Result<GmailLabel, EngineError> {
                panic!("not used")
            }
            fn modify_message(
                &self,
                _: &str,
                _: &str,
                _: &[&str],
                _: &[&str],
            ) -> Result<(), EngineError> {
                panic!("not used")
            }
        }

        let err = Rejecting.get_message_with_retry("token", "m1", 3).unwrap_err();
        assert!(!err.is_transient());
    }
}
