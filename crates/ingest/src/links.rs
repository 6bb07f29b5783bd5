//! URL discovery in extracted message bodies
//!
//! Feeds the DiscoveredLink pipeline: every http(s) URL found in a newly
//! saved message is recorded as pending for the external crawler.

use std::collections::HashSet;

use url::Url;

/// Characters that terminate a URL token in running text or markup
const TERMINATORS: &[char] = &['"', '\'', '<', '>', ')', ']', '}', '|'];

/// Trailing punctuation that belongs to the sentence, not the URL
const TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

/// Find http(s) URLs in a message's bodies, deduplicated in order of
/// first appearance
///
/// The same scan handles plain text and HTML: href attribute values end
/// at a quote, prose URLs end at whitespace. Anything `Url::parse`
/// rejects (or that has no host) is dropped.
pub fn discover_links(body_plain: &str, body_html: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    scan(body_plain, &mut seen, &mut found);
    if let Some(html) = body_html {
        scan(html, &mut seen, &mut found);
    }

    found
}

fn scan(text: &str, seen: &mut HashSet<String>, found: &mut Vec<String>) {
    let mut rest = text;

    while let Some(start) = rest.find("http") {
        let candidate = &rest[start..];
        let is_url = candidate.starts_with("http://") || candidate.starts_with("https://");
        if !is_url {
            rest = &rest[start + 4..];
            continue;
        }

        let end = candidate
            .find(|c: char| c.is_whitespace() || TERMINATORS.contains(&c))
            .unwrap_or(candidate.len());
        let token = candidate[..end].trim_end_matches(TRAILING);

        if let Ok(parsed) = Url::parse(token)
            && parsed.host_str().is_some()
            && seen.insert(token.to_string())
        {
            found.push(token.to_string());
        }

        rest = &candidate[end.max(1)..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovers_plain_text_links() {
        let body = "Apply here: https://jobs.example.com/role/123 before Friday.";
        assert_eq!(
            discover_links(body, None),
            vec!["https://jobs.example.com/role/123"]
        );
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        let body = "See https://example.com/a, https://example.com/b. Done (https://example.com/c)";
        assert_eq!(
            discover_links(body, None),
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c",
            ]
        );
    }

    #[test]
    fn test_html_href_links() {
        let html = r#"<a href="https://jobs.example.com/apply?id=9">Apply</a>"#;
        assert_eq!(
            discover_links("", Some(html)),
            vec!["https://jobs.example.com/apply?id=9"]
        );
    }

    #[test]
    fn test_duplicates_across_bodies_collapse() {
        let plain = "https://example.com/job";
        let html = r#"<a href="https://example.com/job">same</a>"#;
        assert_eq!(discover_links(plain, Some(html)).len(), 1);
    }

    #[test]
    fn test_bare_http_prefix_is_not_a_link() {
        assert!(discover_links("httpx is not a scheme, nor is http alone", None).is_empty());
    }

    #[test]
    fn test_no_links() {
        assert!(discover_links("plain prose only", None).is_empty());
    }
}
