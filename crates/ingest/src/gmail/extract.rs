//! Recursive body extraction from the multipart payload tree
//!
//! Gmail delivers message bodies as a tree of parts: leaves carry a MIME
//! type and base64url payload, containers carry nested parts. Extraction
//! walks the tree depth-first and keeps the first successfully decoded
//! plain and HTML bodies it encounters.

use base64::prelude::*;

use super::api::{MessagePart, MessagePayload};

/// Plain and HTML bodies pulled out of one message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedBody {
    pub plain: String,
    pub html: String,
}

/// Extract plain-text and HTML bodies from a message payload
///
/// First-wins per field: messages often duplicate the same body across
/// alternative representations, so an earlier-visited leaf takes
/// precedence. A leaf that fails to decode contributes nothing and leaves
/// the field open for a sibling; extraction itself never fails.
pub fn extract_bodies(payload: &MessagePayload) -> ExtractedBody {
    let mut out = ExtractedBody::default();

    // The root payload doubles as the single part of a non-multipart message
    visit_leaf(
        payload.mime_type.as_deref(),
        payload.body.as_ref().and_then(|b| b.data.as_deref()),
        &mut out,
    );

    if let Some(parts) = &payload.parts {
        for part in parts {
            walk_part(part, &mut out);
            if !out.plain.is_empty() && !out.html.is_empty() {
                break;
            }
        }
    }

    out
}

fn walk_part(part: &MessagePart, out: &mut ExtractedBody) {
    visit_leaf(
        part.mime_type.as_deref(),
        part.body.as_ref().and_then(|b| b.data.as_deref()),
        out,
    );

    // Containers carry nested parts; parts with neither payload nor
    // children are metadata-only and fall through here as a no-op.
    if let Some(nested) = &part.parts {
        for child in nested {
            walk_part(child, out);
            if !out.plain.is_empty() && !out.html.is_empty() {
                return;
            }
        }
    }
}

fn visit_leaf(mime_type: Option<&str>, data: Option<&str>, out: &mut ExtractedBody) {
    let Some(mime_type) = mime_type else { return };
    let Some(data) = data else { return };

    if mime_type.starts_with("text/plain") && out.plain.is_empty() {
        if let Some(text) = decode_base64_body(data) {
            out.plain = text;
        }
    } else if mime_type.starts_with("text/html") && out.html.is_empty() {
        if let Some(html) = decode_base64_body(data) {
            out.html = html;
        }
    }
}

/// Decode base64-encoded body data
///
/// Gmail uses URL-safe base64 but padding can vary, so we try multiple
/// decoders. Returns None for payloads no decoder accepts or that are not
/// valid UTF-8.
fn decode_base64_body(data: &str) -> Option<String> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE};

    let decoders: &[&base64::engine::GeneralPurpose] =
        &[&BASE64_URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD];

    for decoder in decoders {
        if let Ok(decoded) = decoder.decode(data) {
            if let Ok(s) = String::from_utf8(decoded) {
                return Some(s);
            }
        }
    }

    None
}
