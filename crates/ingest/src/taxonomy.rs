//! Thin keyword gate for classifying ingested messages
//!
//! Deliberately shallow: exact lowercase phrase matching over the subject
//! and plain body, plus a link-count heuristic. Anything smarter belongs
//! to an external classifier.

use crate::models::{Category, SubCategory};

/// Phrases recruiters use when turning an application down
const DENIAL_MARKERS: &[&str] = &[
    "unfortunately",
    "regret to inform",
    "not moving forward",
    "decided to move forward with other candidates",
    "position has been filled",
    "not selected",
];

/// Phrases signalling the sender wants to continue the process
const INTEREST_MARKERS: &[&str] = &[
    "schedule an interview",
    "schedule a call",
    "interview",
    "next steps",
    "move forward with your application",
    "would love to chat",
];

/// Phrases marking a reply to an application the user submitted
const RESPONSE_MARKERS: &[&str] = &[
    "your application",
    "thank you for applying",
    "we received your application",
    "application status",
];

/// A message carrying at least this many links reads as a job digest
const LINK_LIST_THRESHOLD: usize = 3;

/// Classify a message from its text and discovered link count
///
/// Returns (category, sub-category); both None when nothing matched.
pub fn categorize(
    subject: &str,
    body_plain: &str,
    link_count: usize,
) -> (Option<Category>, Option<SubCategory>) {
    let haystack = format!("{}\n{}", subject, body_plain).to_lowercase();

    if contains_any(&haystack, DENIAL_MARKERS) {
        return (Some(Category::ApplicationResponse), Some(SubCategory::Denial));
    }

    if contains_any(&haystack, RESPONSE_MARKERS) || contains_any(&haystack, INTEREST_MARKERS) {
        let sub = contains_any(&haystack, INTEREST_MARKERS).then_some(SubCategory::Interested);
        return (Some(Category::ApplicationResponse), sub);
    }

    if link_count >= LINK_LIST_THRESHOLD {
        return (Some(Category::JobLinkList), None);
    }

    if link_count >= 1 {
        return (Some(Category::ProspectSingle), None);
    }

    (None, None)
}

fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial() {
        let (cat, sub) = categorize(
            "Your application to Acme",
            "Unfortunately we will not be moving forward.",
            0,
        );
        assert_eq!(cat, Some(Category::ApplicationResponse));
        assert_eq!(sub, Some(SubCategory::Denial));
    }

    #[test]
    fn test_interest() {
        let (cat, sub) = categorize(
            "Next steps",
            "We would like to schedule an interview with you.",
            1,
        );
        assert_eq!(cat, Some(Category::ApplicationResponse));
        assert_eq!(sub, Some(SubCategory::Interested));
    }

    #[test]
    fn test_response_without_interest_signal() {
        let (cat, sub) = categorize("Application status", "We received your application.", 0);
        assert_eq!(cat, Some(Category::ApplicationResponse));
        assert_eq!(sub, None);
    }

    #[test]
    fn test_denial_outranks_interest() {
        let (cat, sub) = categorize(
            "Interview result",
            "Unfortunately, after your interview we are not moving forward.",
            0,
        );
        assert_eq!(cat, Some(Category::ApplicationResponse));
        assert_eq!(sub, Some(SubCategory::Denial));
    }

    #[test]
    fn test_link_digest() {
        let (cat, sub) = categorize("10 new jobs for you", "fresh roles this week", 5);
        assert_eq!(cat, Some(Category::JobLinkList));
        assert_eq!(sub, None);
    }

    #[test]
    fn test_single_prospect() {
        let (cat, _) = categorize("A role you might like", "take a look", 1);
        assert_eq!(cat, Some(Category::ProspectSingle));
    }

    #[test]
    fn test_unclassified() {
        let (cat, sub) = categorize("Lunch?", "Are you free tomorrow?", 0);
        assert_eq!(cat, None);
        assert_eq!(sub, None);
    }
}
