//! Emerging vs. stable theme detection.
//!
//! Splits the dated issues into an older and a newer half (index split
//! after a chronological sort, not a time split) and compares per-window
//! document frequency: each distinct token counts once per issue.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::core::model::Issue;
use crate::core::tokenize;

/// A term with its per-window document counts.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrendTerm {
    pub term: String,
    pub new_count: usize,
    pub old_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Trends {
    pub emerging: Vec<TrendTerm>,
    pub stable: Vec<TrendTerm>,
}

/// How many issues of the window mention each token at least once.
fn window_doc_freq(issues: &[&Issue]) -> IndexMap<String, usize> {
    let mut freq: IndexMap<String, usize> = IndexMap::new();
    for issue in issues {
        for tok in tokenize::tokenize(&format!("{} {}", issue.title, issue.description)) {
            *freq.entry(tok).or_insert(0) += 1;
        }
    }
    freq
}

/// Flag themes rising between the two halves of the dataset, and themes
/// holding steady. Undated issues are ignored. Each list is capped to the
/// top 8 by newer-window count.
pub fn analyze(issues: &[Issue]) -> Trends {
    let dated: Vec<&Issue> = issues
        .iter()
        .filter(|i| i.date.is_some())
        .sorted_by_key(|i| i.date)
        .collect();

    let mid = dated.len() / 2;
    let old_freq = window_doc_freq(&dated[..mid]);
    let new_freq = window_doc_freq(&dated[mid..]);

    let mut emerging = Vec::new();
    let mut stable = Vec::new();
    for (term, &new_count) in &new_freq {
        let old_count = old_freq.get(term).copied().unwrap_or(0);
        let growth = new_count as i64 - old_count as i64;
        // With no older-window presence the ratio defaults to the new
        // count itself, so any growth ≥ 2 qualifies.
        let ratio = if old_count == 0 {
            new_count as f64
        } else {
            new_count as f64 / old_count as f64
        };

        if new_count >= 3 && growth >= 2 && ratio >= 1.5 {
            emerging.push(TrendTerm { term: term.clone(), new_count, old_count });
        } else if new_count >= 4 && growth.abs() <= 2 {
            stable.push(TrendTerm { term: term.clone(), new_count, old_count });
        }
    }

    emerging.sort_by(|a, b| b.new_count.cmp(&a.new_count));
    stable.sort_by(|a, b| b.new_count.cmp(&a.new_count));
    emerging.truncate(8);
    stable.truncate(8);
    Trends { emerging, stable }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn dated_issue(n: i64, title: &str) -> Issue {
        let date = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::days(n);
        Issue {
            id: format!("I-{n}"),
            module: String::new(),
            priority: String::new(),
            status: String::new(),
            kind: String::new(),
            module_norm: "Unspecified".into(),
            priority_norm: "medium".into(),
            status_norm: String::new(),
            kind_norm: "Bug".into(),
            title: title.into(),
            description: String::new(),
            log: String::new(),
            date: Some(date),
            age_days: Some(0),
            links: Vec::new(),
            keywords: Vec::new(),
            category: String::new(),
            risk_score: 5.0,
            severity: 1,
            impact: 1,
            urgency: 1,
            is_closed: false,
        }
    }

    #[test]
    fn zero_old_count_term_with_enough_growth_is_emerging() {
        // 6 issues: older half never mentions geofence, newer half does 3x
        let issues = vec![
            dated_issue(0, "export broken"),
            dated_issue(1, "export broken"),
            dated_issue(2, "export broken"),
            dated_issue(3, "geofence radius wrong"),
            dated_issue(4, "geofence exit missed"),
            dated_issue(5, "geofence alert late"),
        ];
        let t = analyze(&issues);
        let geo = t.emerging.iter().find(|e| e.term == "geofence").unwrap();
        assert_eq!((geo.new_count, geo.old_count), (3, 0));
    }

    #[test]
    fn steady_term_is_stable_not_emerging() {
        // "timezone" appears in 4 older and 4 newer issues
        let issues: Vec<Issue> =
            (0..8).map(|n| dated_issue(n, "timezone offset wrong")).collect();
        let t = analyze(&issues);
        assert!(t.emerging.iter().all(|e| e.term != "timezone"));
        let tz = t.stable.iter().find(|e| e.term == "timezone").unwrap();
        assert_eq!((tz.new_count, tz.old_count), (4, 4));
    }

    #[test]
    fn counts_are_document_frequency_not_term_frequency() {
        // one newer issue repeating a token three times still counts once,
        // so it never reaches the emerging threshold
        let issues = vec![
            dated_issue(0, "quiet"),
            dated_issue(1, "geofence geofence geofence"),
        ];
        let t = analyze(&issues);
        assert!(t.emerging.is_empty());
    }

    #[test]
    fn lists_are_capped_at_eight() {
        let mut issues = Vec::new();
        for day in 0..3 {
            issues.push(dated_issue(day, "old quiet entry"));
        }
        for day in 3..6 {
            // ten distinct rising terms per newer issue
            issues.push(dated_issue(
                day,
                "alpha bravo charlie delta echo foxtrot golf hotel india juliet",
            ));
        }
        let t = analyze(&issues);
        assert_eq!(t.emerging.len(), 8);
    }

    #[test]
    fn undated_issues_are_ignored() {
        let mut undated = dated_issue(0, "geofence broken");
        undated.date = None;
        let t = analyze(&[undated]);
        assert_eq!(t, Trends::default());
    }
}
