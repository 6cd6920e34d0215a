//! Topic classification: one winner category per issue, multi-bucket
//! clusters for the dashboard, and the ranked multi-label scheme used by
//! the analytics view. All three read the shared tables in `rules`.

use crate::core::model::Issue;
use crate::core::rules;

/// Single best-fit topic for lowercased title+description. The rule list
/// is ordered and the first match wins; the i18n rule additionally fires
/// on any non-ASCII character in the text.
pub fn categorize(text_lower: &str) -> String {
    for rule in rules::CATEGORY_RULES {
        let hit = rule.matches(text_lower)
            || (rule.label == "i18n / encoding" && text_lower.chars().any(|c| !c.is_ascii()));
        if hit {
            return rule.label.to_string();
        }
    }
    rules::CATEGORY_FALLBACK.to_string()
}

/// One thematic bucket of the dashboard cluster view.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Cluster {
    pub name: &'static str,
    /// First few matching issue ids in input order (representatives, not
    /// an importance ranking).
    pub members: Vec<String>,
    /// Total matching issues, including those beyond the display cap.
    pub total: usize,
}

/// Group issues into the fixed buckets. An issue may appear in several
/// buckets; buckets nothing matched are omitted.
pub fn cluster(issues: &[Issue]) -> Vec<Cluster> {
    let mut out = Vec::new();
    for bucket in rules::CLUSTER_BUCKETS {
        let mut members = Vec::new();
        let mut total = 0usize;
        for issue in issues {
            if bucket.matches(&issue.text_lower()) {
                total += 1;
                if members.len() < rules::CLUSTER_CAP {
                    members.push(issue.id.clone());
                }
            }
        }
        if total > 0 {
            out.push(Cluster { name: bucket.label, members, total });
        }
    }
    out
}

/// Ranked multi-label classification: every label with at least one
/// keyword hit, sorted by hit count descending (table order on ties).
pub fn ranked_labels(text_lower: &str) -> Vec<(&'static str, usize)> {
    let mut hits: Vec<(&'static str, usize)> = rules::ANALYTICS_LABELS
        .iter()
        .map(|rule| (rule.label, rule.hit_count(text_lower)))
        .filter(|(_, n)| *n >= 1)
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1)); // stable
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn issue(id: &str, title: &str) -> Issue {
        Issue {
            id: id.into(),
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
            date: Some(Utc::now()),
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
    fn first_matching_category_rule_wins() {
        // timezone outranks exports even when both match
        assert_eq!(categorize("export shows wrong timezone"), "Timezone / locale");
        assert_eq!(categorize("excel export truncated"), "Exports & reporting output");
        assert_eq!(categorize("push notification missing"), "Notifications");
        assert_eq!(categorize("nothing special"), "General");
    }

    #[test]
    fn non_ascii_text_lands_in_i18n() {
        assert_eq!(categorize("garbled text: تقرير"), "i18n / encoding");
        // but the timezone rule is checked first
        assert_eq!(categorize("timezone تقرير"), "Timezone / locale");
    }

    #[test]
    fn clusters_cap_members_but_count_everything() {
        let issues: Vec<Issue> =
            (0..10).map(|n| issue(&format!("I-{n}"), "export is broken")).collect();
        let clusters = cluster(&issues);
        let exports = clusters.iter().find(|c| c.name == "Exports & reports").unwrap();
        assert_eq!(exports.members.len(), 7);
        assert_eq!(exports.total, 10);
        assert_eq!(exports.members[0], "I-0"); // input order, not ranked
    }

    #[test]
    fn empty_buckets_are_omitted() {
        let issues = vec![issue("A", "geofence radius wrong")];
        let clusters = cluster(&issues);
        assert!(clusters.iter().any(|c| c.name == "Geofencing"));
        assert!(!clusters.iter().any(|c| c.name == "Notifications"));
    }

    #[test]
    fn one_issue_may_join_multiple_buckets() {
        let issues = vec![issue("A", "mobile export is slow")];
        let clusters = cluster(&issues);
        let names: Vec<&str> = clusters.iter().map(|c| c.name).collect();
        assert!(names.contains(&"Exports & reports"));
        assert!(names.contains(&"Mobile app"));
        assert!(names.contains(&"Performance"));
    }

    #[test]
    fn ranked_labels_sort_by_hit_count() {
        let got = ranked_labels("crash error outage after login");
        assert_eq!(got[0].0, "Reliability/Errors");
        assert_eq!(got[0].1, 3);
        assert!(got.iter().any(|(l, n)| *l == "Authentication/Login" && *n == 1));
        assert!(!got.iter().any(|(l, _)| *l == "Payments/Billing"));
    }
}
