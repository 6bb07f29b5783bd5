//! Engine facade wiring the ingestion components together
//!
//! This is the surface the HTTP layer and the application linker consume:
//! ingest, read views, mark-processed, and account disconnect. It owns the
//! token manager so every provider call starts from a valid credential.

use std::sync::Arc;

use log::warn;

use crate::error::{EngineError, SyncWarning};
use crate::gmail::{GmailApi, TokenManager};
use crate::models::{Category, Message};
use crate::query::{self, MessageSummary};
use crate::storage::{MessageFilter, TrackerStore};
use crate::sync::{
    CancelFlag, IngestOptions, IngestReport, PROCESSED_LABEL, add_label, ingest_mailbox,
    label_ids, mark_read,
};

/// The mailbox ingestion engine for one provider
pub struct Engine {
    api: Arc<dyn GmailApi>,
    store: Arc<dyn TrackerStore>,
    tokens: TokenManager,
    fetch_workers: usize,
}

impl Engine {
    pub fn new(api: Arc<dyn GmailApi>, store: Arc<dyn TrackerStore>) -> Self {
        let tokens = TokenManager::new(api.clone(), store.clone());
        Self {
            api,
            store,
            tokens,
            fetch_workers: IngestOptions::default().fetch_workers,
        }
    }

    /// Override the bounded worker count for detail fetches
    pub fn with_fetch_workers(mut self, fetch_workers: usize) -> Self {
        self.fetch_workers = fetch_workers;
        self
    }

    /// The credential lifecycle manager
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Run one ingestion pass for a user
    ///
    /// Always returns a report (counts plus per-message warnings) unless
    /// the credential itself is invalid, in which case the single error
    /// distinguishes "reconnect your account" (CredentialRevoked /
    /// CredentialNotFound) from "try again shortly" (transient).
    pub fn ingest(
        &self,
        user_id: i64,
        days_back: u32,
        max_results: u32,
    ) -> Result<IngestReport, EngineError> {
        self.ingest_cancellable(user_id, days_back, max_results, &CancelFlag::new())
    }

    /// Run one ingestion pass that can be cancelled mid-run
    pub fn ingest_cancellable(
        &self,
        user_id: i64,
        days_back: u32,
        max_results: u32,
        cancel: &CancelFlag,
    ) -> Result<IngestReport, EngineError> {
        let credential = self.tokens.ensure_valid(user_id)?;
        let options = IngestOptions {
            days_back,
            max_results,
            fetch_workers: self.fetch_workers,
        };
        ingest_mailbox(
            self.api.as_ref(),
            self.store.as_ref(),
            &credential,
            user_id,
            &options,
            cancel,
        )
    }

    /// Get one stored message with bodies
    pub fn get_message(
        &self,
        user_id: i64,
        message_id: i64,
    ) -> Result<Option<Message>, EngineError> {
        Ok(query::get_message(self.store.as_ref(), user_id, message_id)?)
    }

    /// List a user's messages, newest received first
    pub fn list_messages(
        &self,
        user_id: i64,
        filter: &MessageFilter,
    ) -> Result<Vec<MessageSummary>, EngineError> {
        Ok(query::list_messages(self.store.as_ref(), user_id, filter)?)
    }

    /// Link a message to an application record and write the processed
    /// state back to the provider
    ///
    /// Persistence comes first and is authoritative; the provider
    /// write-back (mark read, apply the processed label) is best-effort
    /// and its failures come back as warnings, never as errors.
    pub fn mark_processed(
        &self,
        user_id: i64,
        message_id: i64,
        application_id: i64,
    ) -> Result<Vec<SyncWarning>, EngineError> {
        let message = self
            .store
            .get_message(user_id, message_id)?
            .ok_or(EngineError::MessageNotFound {
                user_id,
                message_id,
            })?;

        self.store
            .link_message_to_application(user_id, message_id, application_id)?;
        if message.category.is_none() {
            self.store.set_message_category(
                user_id,
                message_id,
                Some(Category::ApplicationResponse),
                message.sub_category,
            )?;
        }

        let mut warnings = Vec::new();
        self.write_back_processed(user_id, &message, &mut warnings);
        Ok(warnings)
    }

    /// Remove the stored credential when the account is unlinked
    pub fn disconnect(&self, user_id: i64) -> Result<(), EngineError> {
        Ok(self.store.delete_credential(user_id)?)
    }

    fn write_back_processed(
        &self,
        user_id: i64,
        message: &Message,
        warnings: &mut Vec<SyncWarning>,
    ) {
        let credential = match self.tokens.ensure_valid(user_id) {
            Ok(c) => c,
            Err(e) => {
                warn!("skipping provider write-back for user {user_id}: {e}");
                warnings.push(SyncWarning::new("write-back", e.to_string()));
                return;
            }
        };

        let gmail_id = message.gmail_id.as_str();
        let mut labels = message.label_ids.clone();

        match mark_read(self.api.as_ref(), &credential.access_token, gmail_id) {
            Ok(()) => labels.retain(|l| l != label_ids::UNREAD),
            Err(e) => {
                warn!("failed to mark message {gmail_id} read: {e}");
                warnings.push(SyncWarning::new("mark_read", e.to_string()));
            }
        }

        match add_label(
            self.api.as_ref(),
            &credential.access_token,
            gmail_id,
            PROCESSED_LABEL,
        ) {
            Ok(label_id) => {
                if !labels.contains(&label_id) {
                    labels.push(label_id);
                }
            }
            Err(e) => {
                warn!("failed to label message {gmail_id}: {e}");
                warnings.push(SyncWarning::new("add_label", e.to_string()));
            }
        }

        // Mirror whatever succeeded locally; a failure here is still
        // only a warning
        if let Err(e) = self.store.update_message_labels(user_id, message.id, &labels) {
            warnings.push(SyncWarning::new("label mirror", e.to_string()));
        }
    }
}
