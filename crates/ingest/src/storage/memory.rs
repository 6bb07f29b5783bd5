//! In-memory storage implementation
//!
//! Used for testing and as a stub where no durable storage is wired up.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::RwLock;

use super::traits::{MessageFilter, TrackerStore};
use crate::models::{
    Category, CrawlStatus, Credential, DiscoveredLink, GmailId, Message, SubCategory,
};

#[derive(Default)]
struct Inner {
    credentials: HashMap<i64, Credential>,
    messages: Vec<Message>,
    links: Vec<DiscoveredLink>,
    next_message_id: i64,
    next_link_id: i64,
}

/// In-memory implementation of TrackerStore
///
/// A single RwLock over the whole state makes the existence check and
/// insert in [`TrackerStore::insert_message_if_new`] atomic, matching the
/// unique-constraint behavior of the SQLite store.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_message_id: 1,
                next_link_id: 1,
                ..Inner::default()
            }),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackerStore for InMemoryStore {
    fn get_credential(&self, user_id: i64) -> Result<Option<Credential>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.credentials.get(&user_id).cloned())
    }

    fn save_credential(&self, user_id: i64, credential: &Credential) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.credentials.insert(user_id, credential.clone());
        Ok(())
    }

    fn delete_credential(&self, user_id: i64) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.credentials.remove(&user_id);
        Ok(())
    }

    fn insert_message_if_new(
        &self,
        message: &Message,
        link_urls: &[String],
    ) -> Result<Option<i64>> {
        let mut inner = self.inner.write().unwrap();

        let exists = inner
            .messages
            .iter()
            .any(|m| m.user_id == message.user_id && m.gmail_id == message.gmail_id);
        if exists {
            return Ok(None);
        }

        let id = inner.next_message_id;
        inner.next_message_id += 1;

        let mut stored = message.clone();
        stored.id = id;
        inner.messages.push(stored);

        for url in link_urls {
            let duplicate = inner
                .links
                .iter()
                .any(|l| l.message_id == id && l.url == *url);
            if duplicate {
                continue;
            }
            let mut link = DiscoveredLink::pending(id, url.clone());
            link.id = inner.next_link_id;
            inner.next_link_id += 1;
            inner.links.push(link);
        }

        Ok(Some(id))
    }

    fn has_message(&self, user_id: i64, gmail_id: &GmailId) -> Result<bool> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .messages
            .iter()
            .any(|m| m.user_id == user_id && m.gmail_id == *gmail_id))
    }

    fn get_message(&self, user_id: i64, message_id: i64) -> Result<Option<Message>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .messages
            .iter()
            .find(|m| m.user_id == user_id && m.id == message_id)
            .cloned())
    }

    fn list_messages(&self, user_id: i64, filter: &MessageFilter) -> Result<Vec<Message>> {
        let inner = self.inner.read().unwrap();
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());

        let mut matches: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter(|m| filter.category.is_none_or(|c| m.category == Some(c)))
            .filter(|m| {
                needle.as_ref().is_none_or(|needle| {
                    m.subject.to_lowercase().contains(needle)
                        || m.sender.email.to_lowercase().contains(needle)
                        || m.sender
                            .name
                            .as_ref()
                            .is_some_and(|n| n.to_lowercase().contains(needle))
                })
            })
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.received_at.cmp(&a.received_at));

        Ok(matches
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit)
            .collect())
    }

    fn count_messages(&self, user_id: i64) -> Result<usize> {
        let inner = self.inner.read().unwrap();
        Ok(inner.messages.iter().filter(|m| m.user_id == user_id).count())
    }

    fn link_message_to_application(
        &self,
        user_id: i64,
        message_id: i64,
        application_id: i64,
    ) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        match inner
            .messages
            .iter_mut()
            .find(|m| m.user_id == user_id && m.id == message_id)
        {
            Some(m) => {
                m.application_id = Some(application_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_message_category(
        &self,
        user_id: i64,
        message_id: i64,
        category: Option<Category>,
        sub_category: Option<SubCategory>,
    ) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        match inner
            .messages
            .iter_mut()
            .find(|m| m.user_id == user_id && m.id == message_id)
        {
            Some(m) => {
                m.category = category;
                m.sub_category = sub_category;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_message_labels(
        &self,
        user_id: i64,
        message_id: i64,
        label_ids: &[String],
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if let Some(m) = inner
            .messages
            .iter_mut()
            .find(|m| m.user_id == user_id && m.id == message_id)
        {
            m.label_ids = label_ids.to_vec();
        }
        Ok(())
    }

    fn list_links_for_message(&self, message_id: i64) -> Result<Vec<DiscoveredLink>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .links
            .iter()
            .filter(|l| l.message_id == message_id)
            .cloned()
            .collect())
    }

    fn update_link_crawl(
        &self,
        link_id: i64,
        status: CrawlStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        if let Some(link) = inner.links.iter_mut().find(|l| l.id == link_id) {
            link.crawl_status = status;
            link.error_message = error_message.map(|s| s.to_string());
        }
        Ok(())
    }

    fn link_application_to_link(&self, link_id: i64, application_id: i64) -> Result<bool> {
        let mut inner = self.inner.write().unwrap();
        match inner.links.iter_mut().find(|l| l.id == link_id) {
            Some(link) => {
                link.application_id = Some(application_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
