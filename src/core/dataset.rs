//! Whole-dataset recompute pipeline and dashboard aggregates.
//!
//! Derived issue metadata is never merged incrementally: every reload
//! rebuilds the full issue list from the raw rows and the caller swaps it
//! in as one unit. The pipeline is a pure function of (rows, now), so
//! running it twice on the same input yields an identical list.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use itertools::Itertools;

use crate::core::classify;
use crate::core::model::{Issue, RawRow};
use crate::core::normalize;
use crate::core::risk::{BoundedScale, RiskStrategy};
use crate::core::tokenize;

/// How many keywords each issue keeps.
pub const KEYWORD_TOP_N: usize = 6;

/// Normalize every raw row and attach the derived analytics fields.
/// Rows without an id drop out silently.
pub fn recompute(rows: &[RawRow], now: DateTime<Utc>) -> Vec<Issue> {
    let scorer = BoundedScale;
    rows.iter()
        .filter_map(|row| normalize::normalize_issue(row, now))
        .map(|mut issue| {
            let text = issue.text_lower();
            issue.keywords =
                tokenize::top_keywords(&format!("{} {}", issue.title, issue.description), KEYWORD_TOP_N);
            issue.category = classify::categorize(&text);

            let breakdown = scorer.score(&issue);
            issue.risk_score = breakdown.total;
            issue.severity = breakdown.severity;
            issue.impact = breakdown.impact;
            issue.urgency = breakdown.urgency;
            issue
        })
        .collect()
}

/// Headline numbers for the dashboard, open-issue oriented: closed issues
/// are excluded from the risk/backlog aggregates.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Kpis {
    pub total: usize,
    pub open: usize,
    pub closed: usize,
    pub avg_open_risk: f64,
    pub high_risk_open: usize,
    /// Open-issue counts per canonical module, insertion-ordered by first
    /// appearance in the dataset.
    pub modules: IndexMap<String, usize>,
    /// Open-issue counts per normalized priority.
    pub priorities: IndexMap<String, usize>,
    /// Open-issue counts per single-winner category.
    pub categories: IndexMap<String, usize>,
}

pub fn kpis(issues: &[Issue]) -> Kpis {
    let open: Vec<&Issue> = issues.iter().filter(|i| i.is_open()).collect();

    let avg_open_risk = if open.is_empty() {
        0.0
    } else {
        let sum: f64 = open.iter().map(|i| i.risk_score).sum();
        crate::core::risk::round1(sum / open.len() as f64)
    };

    let mut modules = IndexMap::new();
    let mut priorities = IndexMap::new();
    let mut categories = IndexMap::new();
    for issue in &open {
        *modules.entry(issue.module_norm.clone()).or_insert(0) += 1;
        *priorities.entry(issue.priority_norm.clone()).or_insert(0) += 1;
        *categories.entry(issue.category.clone()).or_insert(0) += 1;
    }

    Kpis {
        total: issues.len(),
        open: open.len(),
        closed: issues.len() - open.len(),
        avg_open_risk,
        high_risk_open: open.iter().filter(|i| i.risk_score >= 7.0).count(),
        modules,
        priorities,
        categories,
    }
}

/// The per-module open risk exposure the planner and event views lean on:
/// module name (lowercased) → (open issues, high-risk issues).
pub fn module_exposure(issues: &[Issue]) -> IndexMap<String, (usize, usize)> {
    let mut out: IndexMap<String, (usize, usize)> = IndexMap::new();
    for issue in issues.iter().filter(|i| i.is_open()) {
        let entry = out.entry(issue.module_norm.to_lowercase()).or_insert((0, 0));
        entry.0 += 1;
        if issue.risk_score >= 7.0 {
            entry.1 += 1;
        }
    }
    out
}

/// Modules sorted by high-risk exposure, riskiest first; ties by open
/// count, then first appearance.
pub fn riskiest_modules(issues: &[Issue]) -> Vec<(String, usize, usize)> {
    module_exposure(issues)
        .into_iter()
        .map(|(m, (open, high))| (m, open, high))
        .sorted_by(|a, b| (b.2, b.1).cmp(&(a.2, a.1)))
        .collect()
}
