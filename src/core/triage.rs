//! Triage queue: open issues whose metadata looks inconsistent with their
//! computed risk, ranked for human review.

use crate::core::model::Issue;

/// One flagged issue with the reasons it was pulled in.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TriageEntry {
    pub id: String,
    pub title: String,
    pub risk_score: f64,
    pub age_days: Option<i64>,
    pub reasons: Vec<String>,
    /// risk + age/7 + reason count; higher reviews first.
    pub rank: f64,
}

/// Ceiling on the queue length.
pub const TRIAGE_CAP: usize = 15;

/// Flag and rank open issues. An issue enters the queue when any of the
/// inconsistency checks fires; the queue is sorted by rank descending and
/// capped at [`TRIAGE_CAP`].
pub fn build_queue(issues: &[Issue]) -> Vec<TriageEntry> {
    let mut queue: Vec<TriageEntry> = issues
        .iter()
        .filter(|i| i.is_open())
        .filter_map(|i| flag(i))
        .collect();
    queue.sort_by(|a, b| b.rank.total_cmp(&a.rank));
    queue.truncate(TRIAGE_CAP);
    queue
}

fn flag(issue: &Issue) -> Option<TriageEntry> {
    let mut reasons = Vec::new();

    let priority_unset = issue.priority.trim().is_empty();
    if (issue.priority_norm == "medium" || priority_unset) && issue.risk_score >= 7.0 {
        reasons.push("risk high but priority medium/unspecified".to_string());
    }

    let kind_unset = issue.kind.trim().is_empty();
    if (issue.kind_norm == "Bug" || kind_unset) && issue.text_lower().contains("after release") {
        reasons.push("possible regression after release".to_string());
    }

    let age = issue.age_days.unwrap_or(0);
    if age > 21 && issue.risk_score >= 5.0 {
        reasons.push(format!("aged {age}d and still open"));
    }

    let mut missing = Vec::new();
    if priority_unset {
        missing.push("priority");
    }
    if kind_unset {
        missing.push("type");
    }
    if issue.module.trim().is_empty() || issue.module_norm == "Unspecified" {
        missing.push("module");
    }
    if !missing.is_empty() {
        reasons.push(format!("missing: {}", missing.join(", ")));
    }

    if reasons.is_empty() {
        return None;
    }
    let rank = issue.risk_score + age as f64 / 7.0 + reasons.len() as f64;
    Some(TriageEntry {
        id: issue.id.clone(),
        title: issue.title.clone(),
        risk_score: issue.risk_score,
        age_days: issue.age_days,
        rank,
        reasons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str) -> Issue {
        Issue {
            id: id.into(),
            module: "Reporting".into(),
            priority: "high".into(),
            status: "under development".into(),
            kind: "Bug".into(),
            module_norm: "Reporting".into(),
            priority_norm: "high".into(),
            status_norm: "under development".into(),
            kind_norm: "Bug".into(),
            title: "title".into(),
            description: "description".into(),
            log: String::new(),
            date: None,
            age_days: Some(2),
            links: Vec::new(),
            keywords: Vec::new(),
            category: String::new(),
            risk_score: 4.0,
            severity: 1,
            impact: 1,
            urgency: 1,
            is_closed: false,
        }
    }

    #[test]
    fn high_risk_medium_priority_is_flagged() {
        let mut i = issue("A");
        i.priority_norm = "medium".into();
        i.risk_score = 7.5;
        let q = build_queue(&[i]);
        assert_eq!(q.len(), 1);
        assert!(q[0].reasons.iter().any(|r| r.contains("priority medium/unspecified")));
    }

    #[test]
    fn post_release_bug_text_is_flagged() {
        let mut i = issue("A");
        i.description = "started failing after release 2.3".into();
        let q = build_queue(&[i]);
        assert!(q[0].reasons.iter().any(|r| r.contains("regression after release")));
    }

    #[test]
    fn aged_open_issue_with_mid_risk_is_flagged() {
        let mut i = issue("A");
        i.age_days = Some(30);
        i.risk_score = 5.0;
        let q = build_queue(&[i]);
        assert!(q[0].reasons.contains(&"aged 30d and still open".to_string()));
    }

    #[test]
    fn missing_fields_are_listed_by_name() {
        let mut i = issue("A");
        i.priority = String::new();
        i.module = String::new();
        i.module_norm = "Unspecified".into();
        let q = build_queue(&[i]);
        assert!(q[0].reasons.contains(&"missing: priority, module".to_string()));
    }

    #[test]
    fn closed_and_consistent_issues_stay_out() {
        let consistent = issue("A");
        let mut closed = issue("B");
        closed.is_closed = true;
        closed.risk_score = 9.9;
        closed.priority_norm = "medium".into();
        assert!(build_queue(&[consistent, closed]).is_empty());
    }

    #[test]
    fn queue_ranks_by_score_and_caps_at_fifteen() {
        let mut issues = Vec::new();
        for n in 0..20 {
            let mut i = issue(&format!("I-{n}"));
            i.priority_norm = "medium".into();
            i.risk_score = 7.0 + 0.1 * n as f64;
            issues.push(i);
        }
        let q = build_queue(&issues);
        assert_eq!(q.len(), TRIAGE_CAP);
        assert_eq!(q[0].id, "I-19"); // highest risk first
        assert!(q.windows(2).all(|w| w[0].rank >= w[1].rank));
    }
}
