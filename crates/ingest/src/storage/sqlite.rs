//! SQLite-based tracker storage
//!
//! Queryable metadata lives in columns; message bodies are stored as
//! zstd-compressed blobs inline. The unique index on (user_id, gmail_id)
//! enforces the per-user dedupe invariant at the storage layer.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::types::ToSql;
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::traits::{MessageFilter, TrackerStore};
use crate::models::{
    Category, CrawlStatus, Credential, DiscoveredLink, EmailAddress, GmailId, Message, SubCategory,
};

/// zstd level for body blobs (balance of speed vs compression)
const BODY_COMPRESSION_LEVEL: i32 = 3;

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks
/// which migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- OAuth credential, one row per linked account
            CREATE TABLE credentials (
                user_id INTEGER PRIMARY KEY,
                access_token TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- Ingested messages with zstd-compressed bodies
            CREATE TABLE messages (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                gmail_id TEXT NOT NULL,
                thread_id TEXT NOT NULL,
                subject TEXT NOT NULL,
                sender_name TEXT,
                sender_email TEXT NOT NULL,
                recipient_name TEXT,
                recipient_email TEXT NOT NULL,
                snippet TEXT NOT NULL,
                received_at TEXT NOT NULL,
                internal_date INTEGER NOT NULL,
                body_plain BLOB,  -- zstd compressed
                body_html BLOB,   -- zstd compressed, NULL when absent
                category TEXT,
                sub_category TEXT,
                application_id INTEGER,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (user_id, gmail_id)
            );

            CREATE INDEX idx_messages_user_received
                ON messages(user_id, received_at DESC);

            -- Provider labels on messages (local mirror)
            CREATE TABLE message_labels (
                message_id INTEGER NOT NULL,
                label_id TEXT NOT NULL,
                PRIMARY KEY (message_id, label_id),
                FOREIGN KEY (message_id) REFERENCES messages(id) ON DELETE CASCADE
            );

            -- Job links discovered in message bodies
            CREATE TABLE discovered_links (
                id INTEGER PRIMARY KEY,
                message_id INTEGER NOT NULL,
                url TEXT NOT NULL,
                crawl_status TEXT NOT NULL DEFAULT 'PENDING',
                extracted_company TEXT,
                extracted_role TEXT,
                confidence_score INTEGER,
                application_id INTEGER,
                error_message TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (message_id, url),
                FOREIGN KEY (message_id) REFERENCES messages(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_links_message ON discovered_links(message_id);
            "#,
        ),
    ])
}

/// SQLite-based tracker storage
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and run migrations
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;

        // WAL for concurrent readers during writes; NORMAL sync is safe
        // under WAL; foreign_keys required for ON DELETE CASCADE
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn compress(text: &str) -> Result<Vec<u8>> {
        zstd::encode_all(text.as_bytes(), BODY_COMPRESSION_LEVEL)
            .context("Failed to compress body")
    }

    fn decompress(blob: &[u8]) -> Result<String> {
        let bytes = zstd::decode_all(blob).context("Failed to decompress body")?;
        String::from_utf8(bytes).context("Stored body is not valid UTF-8")
    }

    fn load_labels(conn: &Connection, message_id: i64) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT label_id FROM message_labels WHERE message_id = ? ORDER BY label_id")?;
        let labels = stmt
            .query_map([message_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(labels)
    }

    fn load_message(conn: &Connection, message_id: i64) -> Result<Option<Message>> {
        type Row = (
            i64,
            i64,
            String,
            String,
            String,
            Option<String>,
            String,
            Option<String>,
            String,
            String,
            String,
            i64,
            Option<Vec<u8>>,
            Option<Vec<u8>>,
            Option<String>,
            Option<String>,
            Option<i64>,
        );

        let row: Option<Row> = conn
            .query_row(
                "SELECT id, user_id, gmail_id, thread_id, subject,
                        sender_name, sender_email, recipient_name, recipient_email,
                        snippet, received_at, internal_date, body_plain, body_html,
                        category, sub_category, application_id
                 FROM messages WHERE id = ?",
                [message_id],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                        row.get(8)?,
                        row.get(9)?,
                        row.get(10)?,
                        row.get(11)?,
                        row.get(12)?,
                        row.get(13)?,
                        row.get(14)?,
                        row.get(15)?,
                        row.get(16)?,
                    ))
                },
            )
            .optional()?;

        let Some((
            id,
            user_id,
            gmail_id,
            thread_id,
            subject,
            sender_name,
            sender_email,
            recipient_name,
            recipient_email,
            snippet,
            received_at_str,
            internal_date,
            body_plain,
            body_html,
            category,
            sub_category,
            application_id,
        )) = row
        else {
            return Ok(None);
        };

        let received_at = chrono::DateTime::parse_from_rfc3339(&received_at_str)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(|_| chrono::Utc::now());

        let body_plain = match body_plain {
            Some(blob) => Self::decompress(&blob)?,
            None => String::new(),
        };
        let body_html = match body_html {
            Some(blob) => Some(Self::decompress(&blob)?),
            None => None,
        };

        let label_ids = Self::load_labels(conn, id)?;

        Ok(Some(Message {
            id,
            user_id,
            gmail_id: GmailId::new(gmail_id),
            thread_id,
            subject,
            sender: EmailAddress {
                name: sender_name,
                email: sender_email,
            },
            recipient: EmailAddress {
                name: recipient_name,
                email: recipient_email,
            },
            snippet,
            received_at,
            internal_date,
            body_plain,
            body_html,
            label_ids,
            category: category.as_deref().and_then(Category::parse),
            sub_category: sub_category.as_deref().and_then(SubCategory::parse),
            application_id,
        }))
    }

    fn load_link(row: &rusqlite::Row<'_>) -> rusqlite::Result<DiscoveredLink> {
        let status: String = row.get(3)?;
        Ok(DiscoveredLink {
            id: row.get(0)?,
            message_id: row.get(1)?,
            url: row.get(2)?,
            crawl_status: CrawlStatus::parse(&status).unwrap_or(CrawlStatus::Pending),
            extracted_company: row.get(4)?,
            extracted_role: row.get(5)?,
            confidence_score: row.get::<_, Option<i64>>(6)?.map(|v| v.clamp(0, 100) as u8),
            application_id: row.get(7)?,
            error_message: row.get(8)?,
        })
    }
}

impl TrackerStore for SqliteStore {
    fn get_credential(&self, user_id: i64) -> Result<Option<Credential>> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT access_token, refresh_token, expires_at
                 FROM credentials WHERE user_id = ?",
                [user_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let Some((access_token, refresh_token, expires_at)) = row else {
            return Ok(None);
        };

        let expires_at = chrono::DateTime::parse_from_rfc3339(&expires_at)
            .with_context(|| format!("Corrupt credential expiry for user {user_id}"))?
            .with_timezone(&chrono::Utc);

        Ok(Some(Credential {
            access_token,
            refresh_token,
            expires_at,
        }))
    }

    fn save_credential(&self, user_id: i64, credential: &Credential) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO credentials (user_id, access_token, refresh_token, expires_at, updated_at)
             VALUES (?, ?, ?, ?, datetime('now'))
             ON CONFLICT(user_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at",
            params![
                user_id,
                credential.access_token,
                credential.refresh_token,
                credential.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete_credential(&self, user_id: i64) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM credentials WHERE user_id = ?", [user_id])?;
        Ok(())
    }

    fn insert_message_if_new(
        &self,
        message: &Message,
        link_urls: &[String],
    ) -> Result<Option<i64>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let body_plain = Self::compress(&message.body_plain)?;
        let body_html = message
            .body_html
            .as_deref()
            .map(Self::compress)
            .transpose()?;

        // A concurrent run that won the insert race leaves zero changed
        // rows; the duplicate is coalesced, not an error
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO messages
                (user_id, gmail_id, thread_id, subject,
                 sender_name, sender_email, recipient_name, recipient_email,
                 snippet, received_at, internal_date, body_plain, body_html,
                 category, sub_category, application_id)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                message.user_id,
                message.gmail_id.as_str(),
                message.thread_id,
                message.subject,
                message.sender.name,
                message.sender.email,
                message.recipient.name,
                message.recipient.email,
                message.snippet,
                message.received_at.to_rfc3339(),
                message.internal_date,
                body_plain,
                body_html,
                message.category.map(|c| c.as_str()),
                message.sub_category.map(|c| c.as_str()),
                message.application_id,
            ],
        )?;

        if inserted == 0 {
            tx.commit()?;
            return Ok(None);
        }

        let message_id = tx.last_insert_rowid();

        {
            let mut label_stmt = tx.prepare(
                "INSERT OR IGNORE INTO message_labels (message_id, label_id) VALUES (?, ?)",
            )?;
            for label in &message.label_ids {
                label_stmt.execute(params![message_id, label])?;
            }

            let mut link_stmt = tx.prepare(
                "INSERT OR IGNORE INTO discovered_links (message_id, url) VALUES (?, ?)",
            )?;
            for url in link_urls {
                link_stmt.execute(params![message_id, url])?;
            }
        }

        tx.commit()?;
        Ok(Some(message_id))
    }

    fn has_message(&self, user_id: i64, gmail_id: &GmailId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM messages WHERE user_id = ? AND gmail_id = ?",
                params![user_id, gmail_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn get_message(&self, user_id: i64, message_id: i64) -> Result<Option<Message>> {
        let conn = self.conn.lock().unwrap();
        match Self::load_message(&conn, message_id)? {
            Some(m) if m.user_id == user_id => Ok(Some(m)),
            _ => Ok(None),
        }
    }

    fn list_messages(&self, user_id: i64, filter: &MessageFilter) -> Result<Vec<Message>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from("SELECT id FROM messages WHERE user_id = ?");
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];

        if let Some(category) = filter.category {
            sql.push_str(" AND category = ?");
            values.push(Box::new(category.as_str().to_string()));
        }

        if let Some(search) = &filter.search {
            sql.push_str(
                " AND (lower(subject) LIKE ?
                   OR lower(sender_email) LIKE ?
                   OR lower(coalesce(sender_name, '')) LIKE ?)",
            );
            let pattern = format!("%{}%", search.to_lowercase());
            values.push(Box::new(pattern.clone()));
            values.push(Box::new(pattern.clone()));
            values.push(Box::new(pattern));
        }

        sql.push_str(" ORDER BY received_at DESC LIMIT ? OFFSET ?");
        values.push(Box::new(filter.limit as i64));
        values.push(Box::new(filter.offset as i64));

        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let ids: Vec<i64> = stmt
            .query_map(&param_refs[..], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut messages = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(m) = Self::load_message(&conn, id)? {
                messages.push(m);
            }
        }
        Ok(messages)
    }

    fn count_messages(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn link_message_to_application(
        &self,
        user_id: i64,
        message_id: i64,
        application_id: i64,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE messages SET application_id = ? WHERE user_id = ? AND id = ?",
            params![application_id, user_id, message_id],
        )?;
        Ok(changed > 0)
    }

    fn set_message_category(
        &self,
        user_id: i64,
        message_id: i64,
        category: Option<Category>,
        sub_category: Option<SubCategory>,
    ) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE messages SET category = ?, sub_category = ? WHERE user_id = ? AND id = ?",
            params![
                category.map(|c| c.as_str()),
                sub_category.map(|c| c.as_str()),
                user_id,
                message_id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn update_message_labels(
        &self,
        user_id: i64,
        message_id: i64,
        label_ids: &[String],
    ) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let owned: Option<i64> = tx
            .query_row(
                "SELECT 1 FROM messages WHERE user_id = ? AND id = ?",
                params![user_id, message_id],
                |row| row.get(0),
            )
            .optional()?;
        if owned.is_none() {
            return Ok(());
        }

        tx.execute(
            "DELETE FROM message_labels WHERE message_id = ?",
            [message_id],
        )?;
        {
            let mut stmt = tx
                .prepare("INSERT INTO message_labels (message_id, label_id) VALUES (?, ?)")?;
            for label in label_ids {
                stmt.execute(params![message_id, label])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn list_links_for_message(&self, message_id: i64) -> Result<Vec<DiscoveredLink>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, message_id, url, crawl_status, extracted_company,
                    extracted_role, confidence_score, application_id, error_message
             FROM discovered_links WHERE message_id = ? ORDER BY id",
        )?;

        let links = stmt
            .query_map([message_id], Self::load_link)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    fn update_link_crawl(
        &self,
        link_id: i64,
        status: CrawlStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE discovered_links SET crawl_status = ?, error_message = ? WHERE id = ?",
            params![status.as_str(), error_message, link_id],
        )?;
        Ok(())
    }

    fn link_application_to_link(&self, link_id: i64, application_id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE discovered_links SET application_id = ? WHERE id = ?",
            params![application_id, link_id],
        )?;
        Ok(changed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> SqliteStore {
        SqliteStore::new(dir.path().join("tracker.db")).unwrap()
    }

    fn make_message(user_id: i64, gmail_id: &str, age_hours: i64) -> Message {
        Message::builder(user_id, GmailId::new(gmail_id), format!("t-{gmail_id}"))
            .subject(format!("Subject {gmail_id}"))
            .sender(EmailAddress::with_name("Recruiter", "jobs@corp.example"))
            .recipient(EmailAddress::new("me@example.com"))
            .snippet("snippet")
            .received_at(Utc::now() - Duration::hours(age_hours))
            .internal_date(1_700_000_000_000)
            .body_plain("We think you would be a great fit.")
            .body_html(Some("<p>We think you would be a great fit.</p>".into()))
            .label_ids(vec!["INBOX".into(), "UNREAD".into()])
            .category(Some(Category::ProspectSingle))
            .build()
    }

    #[test]
    fn test_message_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let msg = make_message(1, "g1", 1);

        let id = store.insert_message_if_new(&msg, &[]).unwrap().unwrap();
        let loaded = store.get_message(1, id).unwrap().unwrap();

        assert_eq!(loaded.gmail_id, msg.gmail_id);
        assert_eq!(loaded.subject, msg.subject);
        assert_eq!(loaded.body_plain, msg.body_plain);
        assert_eq!(loaded.body_html, msg.body_html);
        assert_eq!(loaded.sender, msg.sender);
        assert_eq!(loaded.category, Some(Category::ProspectSingle));
        let mut labels = loaded.label_ids.clone();
        labels.sort();
        assert_eq!(labels, vec!["INBOX".to_string(), "UNREAD".to_string()]);
    }

    #[test]
    fn test_duplicate_insert_is_coalesced() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let msg = make_message(1, "g1", 1);

        assert!(store.insert_message_if_new(&msg, &[]).unwrap().is_some());
        assert!(store.insert_message_if_new(&msg, &[]).unwrap().is_none());
        assert_eq!(store.count_messages(1).unwrap(), 1);
    }

    #[test]
    fn test_message_scoped_to_user() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let id = store
            .insert_message_if_new(&make_message(1, "g1", 1), &[])
            .unwrap()
            .unwrap();

        assert!(store.get_message(2, id).unwrap().is_none());
        assert!(store.get_message(1, id).unwrap().is_some());
    }

    #[test]
    fn test_links_stored_with_message() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let urls = vec![
            "https://jobs.example.com/1".to_string(),
            "https://jobs.example.com/2".to_string(),
            "https://jobs.example.com/1".to_string(),
        ];

        let id = store
            .insert_message_if_new(&make_message(1, "g1", 1), &urls)
            .unwrap()
            .unwrap();

        let links = store.list_links_for_message(id).unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.crawl_status == CrawlStatus::Pending));
    }

    #[test]
    fn test_link_crawl_update() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let urls = vec!["https://jobs.example.com/1".to_string()];

        let id = store
            .insert_message_if_new(&make_message(1, "g1", 1), &urls)
            .unwrap()
            .unwrap();
        let link = &store.list_links_for_message(id).unwrap()[0];

        store
            .update_link_crawl(link.id, CrawlStatus::Error, Some("timeout"))
            .unwrap();

        let reloaded = &store.list_links_for_message(id).unwrap()[0];
        assert_eq!(reloaded.crawl_status, CrawlStatus::Error);
        assert_eq!(reloaded.error_message.as_deref(), Some("timeout"));
    }

    #[test]
    fn test_list_filters_and_order() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut offer = make_message(1, "g-offer", 3);
        offer.subject = "Offer from Acme".to_string();
        offer.category = Some(Category::ApplicationResponse);
        store.insert_message_if_new(&offer, &[]).unwrap();
        store
            .insert_message_if_new(&make_message(1, "g-new", 1), &[])
            .unwrap();
        store
            .insert_message_if_new(&make_message(2, "g-other-user", 1), &[])
            .unwrap();

        let all = store.list_messages(1, &MessageFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].gmail_id.as_str(), "g-new");

        let filtered = store
            .list_messages(
                1,
                &MessageFilter {
                    category: Some(Category::ApplicationResponse),
                    ..MessageFilter::default()
                },
            )
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].gmail_id.as_str(), "g-offer");

        let searched = store
            .list_messages(
                1,
                &MessageFilter {
                    search: Some("ACME".to_string()),
                    ..MessageFilter::default()
                },
            )
            .unwrap();
        assert_eq!(searched.len(), 1);
    }

    #[test]
    fn test_credential_upsert_and_delete() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let expires = Utc::now() + Duration::hours(1);

        store
            .save_credential(1, &Credential::new("a1", "r1", expires))
            .unwrap();
        store
            .save_credential(1, &Credential::new("a2", "r1", expires))
            .unwrap();

        let loaded = store.get_credential(1).unwrap().unwrap();
        assert_eq!(loaded.access_token, "a2");
        assert_eq!(loaded.expires_at.timestamp(), expires.timestamp());

        store.delete_credential(1).unwrap();
        assert!(store.get_credential(1).unwrap().is_none());
    }

    #[test]
    fn test_link_and_category_updates() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let id = store
            .insert_message_if_new(&make_message(1, "g1", 1), &[])
            .unwrap()
            .unwrap();

        assert!(store.link_message_to_application(1, id, 77).unwrap());
        assert!(store
            .set_message_category(1, id, Some(Category::ApplicationResponse), Some(SubCategory::Interested))
            .unwrap());
        // Wrong user touches nothing
        assert!(!store.link_message_to_application(2, id, 99).unwrap());

        let loaded = store.get_message(1, id).unwrap().unwrap();
        assert_eq!(loaded.application_id, Some(77));
        assert_eq!(loaded.category, Some(Category::ApplicationResponse));
        assert_eq!(loaded.sub_category, Some(SubCategory::Interested));
    }

    #[test]
    fn test_update_message_labels() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let id = store
            .insert_message_if_new(&make_message(1, "g1", 1), &[])
            .unwrap()
            .unwrap();

        store
            .update_message_labels(1, id, &["INBOX".to_string(), "Label_7".to_string()])
            .unwrap();

        let loaded = store.get_message(1, id).unwrap().unwrap();
        let mut labels = loaded.label_ids;
        labels.sort();
        assert_eq!(labels, vec!["INBOX".to_string(), "Label_7".to_string()]);
    }
}
