//! Gmail API response normalization
//!
//! Converts raw Gmail messages to the domain Message model.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};

use super::api::{GmailMessage, MessagePayload};
use super::extract::extract_bodies;
use crate::models::{EmailAddress, GmailId, Message};

/// Normalize a raw Gmail message into a domain Message for one user
///
/// Missing headers default to empty strings. Body extraction is delegated
/// to [`extract_bodies`] and never fails; a message with no payload at all
/// is rejected and counted as a per-message failure by the caller.
pub fn normalize_message(gmail_msg: GmailMessage, user_id: i64) -> Result<Message> {
    let payload = gmail_msg
        .payload
        .as_ref()
        .context("Message has no payload")?;

    let subject = extract_header(payload, "Subject").unwrap_or_default();
    let sender = extract_header(payload, "From")
        .map(|s| EmailAddress::parse(&s))
        .unwrap_or_else(|| EmailAddress::new(""));
    let recipient = extract_header(payload, "To")
        .map(|s| EmailAddress::parse(&s))
        .unwrap_or_else(|| EmailAddress::new(""));

    let (received_at, internal_date) = parse_received(&gmail_msg, payload);

    let body = extract_bodies(payload);
    let body_html = if body.html.is_empty() {
        None
    } else {
        Some(body.html)
    };

    let snippet = decode_html_entities(&gmail_msg.snippet);
    let label_ids = gmail_msg.label_ids.unwrap_or_default();

    Ok(
        Message::builder(user_id, GmailId::new(&gmail_msg.id), &gmail_msg.thread_id)
            .subject(subject)
            .sender(sender)
            .recipient(recipient)
            .snippet(snippet)
            .received_at(received_at)
            .internal_date(internal_date)
            .body_plain(body.plain)
            .body_html(body_html)
            .label_ids(label_ids)
            .build(),
    )
}

/// Extract a header value by name (case-insensitive)
fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

/// Resolve the received timestamp
///
/// The provider's internalDate (milliseconds since epoch) is
/// authoritative; the RFC 2822 Date header is the fallback when it is
/// missing or unparseable.
fn parse_received(msg: &GmailMessage, payload: &MessagePayload) -> (DateTime<Utc>, i64) {
    if let Ok(ms) = msg.internal_date.parse::<i64>()
        && let Some(ts) = Utc.timestamp_millis_opt(ms).single()
        && ms > 0
    {
        return (ts, ms);
    }

    if let Some(date_header) = extract_header(payload, "Date")
        && let Ok(parsed) = DateTime::parse_from_rfc2822(&date_header)
    {
        let ts = parsed.with_timezone(&Utc);
        return (ts, ts.timestamp_millis());
    }

    let now = Utc::now();
    (now, now.timestamp_millis())
}

/// Decode HTML entities in snippet text
fn decode_html_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{Header, MessageBody};
    use base64::prelude::*;

    fn make_message(headers: Vec<(&str, &str)>, internal_date: &str) -> GmailMessage {
        GmailMessage {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            label_ids: Some(vec!["INBOX".to_string(), "UNREAD".to_string()]),
            snippet: "Hi &amp; welcome".to_string(),
            internal_date: internal_date.to_string(),
            payload: Some(MessagePayload {
                mime_type: Some("text/plain".to_string()),
                headers: Some(
                    headers
                        .into_iter()
                        .map(|(n, v)| Header {
                            name: n.to_string(),
                            value: v.to_string(),
                        })
                        .collect(),
                ),
                body: Some(MessageBody {
                    size: None,
                    data: Some(BASE64_URL_SAFE_NO_PAD.encode(b"body text")),
                }),
                parts: None,
            }),
        }
    }

    #[test]
    fn test_normalize_full_message() {
        let raw = make_message(
            vec![
                ("From", "Jane <jane@corp.example>"),
                ("To", "me@example.com"),
                ("Subject", "Interview invitation"),
            ],
            "1700000000000",
        );

        let msg = normalize_message(raw, 42).unwrap();
        assert_eq!(msg.user_id, 42);
        assert_eq!(msg.gmail_id.as_str(), "m1");
        assert_eq!(msg.subject, "Interview invitation");
        assert_eq!(msg.sender.email, "jane@corp.example");
        assert_eq!(msg.sender.name, Some("Jane".to_string()));
        assert_eq!(msg.recipient.email, "me@example.com");
        assert_eq!(msg.body_plain, "body text");
        assert!(msg.body_html.is_none());
        assert_eq!(msg.internal_date, 1_700_000_000_000);
        assert_eq!(msg.snippet, "Hi & welcome");
    }

    #[test]
    fn test_missing_headers_default_to_empty() {
        let raw = make_message(vec![], "1700000000000");
        let msg = normalize_message(raw, 1).unwrap();
        assert_eq!(msg.subject, "");
        assert_eq!(msg.sender.email, "");
        assert_eq!(msg.recipient.email, "");
    }

    #[test]
    fn test_date_header_fallback() {
        let raw = make_message(
            vec![("Date", "Mon, 15 Jan 2024 10:30:00 +0000")],
            "not-a-number",
        );
        let msg = normalize_message(raw, 1).unwrap();
        assert_eq!(msg.received_at.timestamp(), 1_705_314_600);
    }

    #[test]
    fn test_no_payload_is_rejected() {
        let raw = GmailMessage {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            label_ids: None,
            snippet: String::new(),
            internal_date: String::new(),
            payload: None,
        };
        assert!(normalize_message(raw, 1).is_err());
    }
}
