//! Word-token extraction tuned to the issue-tracker domain.
//!
//! Lowercases, splits on any non-alphanumeric run, drops tokens shorter
//! than 3 chars, pure-digit tokens, and stopwords. The stopword set
//! deliberately includes generic tracker nouns ("issue", "bug", "app",
//! "report") so domain-specific terms surface in keywords and trends.

use indexmap::{IndexMap, IndexSet};

/// Generic English filler plus tracker-domain generic nouns.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "that", "this", "are", "was", "were", "not", "but",
    "has", "have", "had", "when", "then", "than", "will", "would", "can", "could", "should",
    "there", "their", "they", "them", "been", "being", "also", "into", "over", "under",
    "after", "before", "while", "where", "which", "who", "what", "why", "how", "all", "any",
    "some", "only", "same", "does", "did", "doing", "please", "still", "very", "you", "your",
    "per", "via",
    // tracker-domain generics that would otherwise dominate every list
    "issue", "issues", "bug", "bugs", "app", "application", "report", "reports", "reported",
    "user", "users", "problem", "problems", "need", "needs", "working", "works", "fix",
    "fixed", "shows", "showing",
];

fn is_meaningful(tok: &str) -> bool {
    tok.len() >= 3 && !tok.chars().all(|c| c.is_ascii_digit()) && !STOPWORDS.contains(&tok)
}

/// De-duplicated meaningful tokens, first-encounter order preserved.
pub fn tokenize(text: &str) -> IndexSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| is_meaningful(t))
        .map(str::to_string)
        .collect()
}

/// Top `n` tokens by raw in-text frequency.
///
/// Counting uses an insertion-ordered map and a stable sort, so equal
/// counts keep first-encountered order.
pub fn top_keywords(text: &str, n: usize) -> Vec<String> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for tok in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| is_meaningful(t))
    {
        *counts.entry(tok.to_string()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1)); // stable: ties keep insertion order
    ranked.into_iter().take(n).map(|(t, _)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_short_and_digit_tokens() {
        let toks = tokenize("The export failed, error: timeout!! at 10 on v2");
        assert!(!toks.contains("the"));
        assert!(toks.contains("export"));
        assert!(toks.contains("failed"));
        assert!(toks.contains("error"));
        assert!(toks.contains("timeout"));
        // "at"/"on"/"v2" are short, "10" is pure digits
        assert!(!toks.contains("at"));
        assert!(!toks.contains("10"));
    }

    #[test]
    fn dedupes_while_keeping_first_encounter_order() {
        let toks = tokenize("timezone export timezone export schedule");
        let got: Vec<&str> = toks.iter().map(String::as_str).collect();
        assert_eq!(got, vec!["timezone", "export", "schedule"]);
    }

    #[test]
    fn keyword_ranking_breaks_ties_by_insertion_order() {
        // "export" and "schedule" both occur twice; "export" was seen first
        let kws = top_keywords("export schedule export schedule timezone", 2);
        assert_eq!(kws, vec!["export", "schedule"]);
    }

    #[test]
    fn keyword_ranking_prefers_frequency() {
        let kws = top_keywords("geofence geofence geofence export export timezone", 3);
        assert_eq!(kws, vec!["geofence", "export", "timezone"]);
    }

    #[test]
    fn non_ascii_words_survive_the_split() {
        let toks = tokenize("تقرير export");
        assert!(toks.contains("تقرير"));
        assert!(toks.contains("export"));
    }
}
