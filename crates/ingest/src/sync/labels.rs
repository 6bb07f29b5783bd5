//! Best-effort label and read-state write-back to the provider
//!
//! These calls run after persistence has already succeeded; callers catch
//! failures into [`crate::error::SyncWarning`] lists and never let them
//! roll back or block the primary result.

use log::info;

use crate::error::EngineError;
use crate::gmail::GmailApi;

/// Label applied to messages the linker has processed
pub const PROCESSED_LABEL: &str = "Job Tracker/Processed";

/// Provider label IDs for common states
pub mod label_ids {
    pub const INBOX: &str = "INBOX";
    pub const UNREAD: &str = "UNREAD";
}

/// Mark a message read in the provider mailbox
pub fn mark_read(
    api: &dyn GmailApi,
    access_token: &str,
    gmail_id: &str,
) -> Result<(), EngineError> {
    api.modify_message(access_token, gmail_id, &[], &[label_ids::UNREAD])
}

/// Apply a label by name, creating it when absent
///
/// Label lookup is an exact, case-sensitive name match over the mailbox's
/// labels; a miss creates the label with default visibility. Returns the
/// label ID so callers can mirror it locally.
pub fn add_label(
    api: &dyn GmailApi,
    access_token: &str,
    gmail_id: &str,
    label_name: &str,
) -> Result<String, EngineError> {
    let label_id = get_or_create_label(api, access_token, label_name)?;
    api.modify_message(access_token, gmail_id, &[label_id.as_str()], &[])?;
    Ok(label_id)
}

fn get_or_create_label(
    api: &dyn GmailApi,
    access_token: &str,
    name: &str,
) -> Result<String, EngineError> {
    let labels = api.list_labels(access_token)?;
    if let Some(existing) = labels.iter().find(|l| l.name == name) {
        return Ok(existing.id.clone());
    }

    let created = api.create_label(access_token, name)?;
    info!("created provider label {:?} ({})", name, created.id);
    Ok(created.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{GmailLabel, GmailMessage, MessageRef, TokenResponse};
    use std::sync::Mutex;

    /// Provider stub tracking label state and modify calls
    struct LabelFake {
        labels: Mutex<Vec<GmailLabel>>,
        created: Mutex<usize>,
        modifications: Mutex<Vec<(String, Vec<String>, Vec<String>)>>,
    }

    impl LabelFake {
        fn new() -> Self {
            Self {
                labels: Mutex::new(Vec::new()),
                created: Mutex::new(0),
                modifications: Mutex::new(Vec::new()),
            }
        }
    }

    impl GmailApi for LabelFake {
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
            panic!("not used")
        }

        fn list_labels(&self, _: &str) -> Result<Vec<GmailLabel>, EngineError> {
            Ok(self.labels.lock().unwrap().clone())
        }

        fn create_label(&self, _: &str, name: &str) -> Result<GmailLabel, EngineError> {
            let mut created = self.created.lock().unwrap();
            *created += 1;
            let label = GmailLabel {
                id: format!("Label_{}", *created),
                name: name.to_string(),
                label_list_visibility: Some("labelShow".to_string()),
                message_list_visibility: Some("show".to_string()),
            };
            self.labels.lock().unwrap().push(label.clone());
            Ok(label)
        }

        fn modify_message(
            &self,
            _: &str,
            id: &str,
            add: &[&str],
            remove: &[&str],
        ) -> Result<(), EngineError> {
            self.modifications.lock().unwrap().push((
                id.to_string(),
                add.iter().map(|s| s.to_string()).collect(),
                remove.iter().map(|s| s.to_string()).collect(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_add_label_creates_once() {
        let api = LabelFake::new();

        let first = add_label(&api, "token", "m1", PROCESSED_LABEL).unwrap();
        let second = add_label(&api, "token", "m2", PROCESSED_LABEL).unwrap();

        assert_eq!(first, second);
        assert_eq!(*api.created.lock().unwrap(), 1);
    }

    #[test]
    fn test_label_match_is_case_sensitive() {
        let api = LabelFake::new();
        add_label(&api, "token", "m1", "Processed").unwrap();
        add_label(&api, "token", "m2", "processed").unwrap();

        assert_eq!(*api.created.lock().unwrap(), 2);
    }

    #[test]
    fn test_mark_read_removes_unread() {
        let api = LabelFake::new();
        mark_read(&api, "token", "m1").unwrap();

        let mods = api.modifications.lock().unwrap();
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].0, "m1");
        assert!(mods[0].1.is_empty());
        assert_eq!(mods[0].2, vec!["UNREAD".to_string()]);
    }
}
