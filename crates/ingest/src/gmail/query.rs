//! Gmail search query construction

use chrono::NaiveDate;

/// Keyword taxonomy used to gate the incremental fetch to job-related mail
pub const JOB_KEYWORDS: &[&str] = &[
    "job",
    "position",
    "opportunity",
    "hiring",
    "recruitment",
    "application",
    "interview",
    "offer",
    "reject",
    "candidate",
];

/// Build a Gmail search query from a keyword set and a lower-bound date
///
/// Each keyword is phrase-quoted and joined with OR, conjoined with an
/// `after:` date filter. Pure and deterministic: identical inputs produce
/// byte-identical output, and no keyword set produces a malformed query.
pub fn build_query(keywords: &[&str], since: NaiveDate) -> String {
    let after = since.format("%Y/%m/%d");
    if keywords.is_empty() {
        return format!("after:{}", after);
    }

    let quoted: Vec<String> = keywords.iter().map(|k| format!("\"{}\"", k)).collect();
    format!("({}) after:{}", quoted.join(" OR "), after)
}
