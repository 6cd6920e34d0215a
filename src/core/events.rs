//! Operational event handling: creation-time validation, heuristic event
//! risk scoring, and same-environment collision detection.
//!
//! Unlike the feed normalizer, event creation is an explicit user action:
//! a missing title or start time is a typed error surfaced at the
//! boundary, not a silent default.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;

use crate::core::model::{Event, EventEnv, EventKind, ImpactType, Issue};
use crate::core::risk::round1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventValidationError {
    #[error("event title is required")]
    MissingTitle,
    #[error("event start time is required")]
    MissingStart,
    #[error("unrecognized start time: {0}")]
    InvalidStart(String),
    #[error("unrecognized end time: {0}")]
    InvalidEnd(String),
}

/// User-supplied fields before validation. Timestamps arrive as text.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub title: String,
    pub kind: EventKind,
    pub env: EventEnv,
    pub status: String,
    pub owner: String,
    pub description: String,
    pub modules: String,
    pub impact_type: ImpactType,
    pub issue_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_day: bool,
}

/// Accepted timestamp shapes for user input; stricter than the feed's
/// date recovery since this is a form, not a spreadsheet.
fn parse_stamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

/// Generated id for events created without one.
pub fn generate_id() -> String {
    let suffix: String =
        rand::rng().sample_iter(Alphanumeric).take(8).map(char::from).collect();
    format!("evt-{}", suffix.to_lowercase())
}

/// Validate a draft into a persistable event. Every persisted event has a
/// non-empty title and a parsed start.
pub fn build_event(draft: EventDraft) -> Result<Event, EventValidationError> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(EventValidationError::MissingTitle);
    }

    let start_raw = draft.start.as_deref().map(str::trim).unwrap_or_default();
    if start_raw.is_empty() {
        return Err(EventValidationError::MissingStart);
    }
    let start = parse_stamp(start_raw)
        .ok_or_else(|| EventValidationError::InvalidStart(start_raw.to_string()))?;

    let end = match draft.end.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            parse_stamp(raw).ok_or_else(|| EventValidationError::InvalidEnd(raw.to_string()))?,
        ),
    };

    Ok(Event {
        id: generate_id(),
        title,
        kind: draft.kind,
        env: draft.env,
        status: draft.status.trim().to_string(),
        owner: draft.owner.trim().to_string(),
        description: draft.description.trim().to_string(),
        modules: draft.modules.trim().to_string(),
        impact_type: draft.impact_type,
        issue_id: draft.issue_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        start,
        end,
        all_day: draft.all_day,
        risk_score: 0.0,
    })
}

fn env_weight(env: EventEnv) -> f64 {
    match env {
        EventEnv::Prod => 3.0,
        EventEnv::Staging => 2.0,
        EventEnv::Dev | EventEnv::Other => 1.0,
    }
}

fn kind_weight(kind: EventKind) -> f64 {
    match kind {
        EventKind::Deployment => 3.0,
        EventKind::Release | EventKind::Maintenance => 2.0,
        EventKind::Other => 1.0,
    }
}

fn impact_weight(impact: ImpactType) -> f64 {
    match impact {
        ImpactType::HighRiskChange => 3.0,
        ImpactType::CustomerVisible => 2.0,
        ImpactType::InternalOnly => 1.0,
        ImpactType::NoDowntime => 0.0,
    }
}

/// Heuristic event risk: env/type/impact base plus exposure to related
/// open issues. Rounded to one decimal, no clamp ceiling.
pub fn compute_event_risk(event: &Event, open_issues: &[Issue]) -> f64 {
    let mut score = env_weight(event.env) + kind_weight(event.kind) + impact_weight(event.impact_type);

    let modules = event.module_list();
    for issue in open_issues.iter().filter(|i| i.is_open()) {
        if modules.contains(&issue.module_norm.to_lowercase()) {
            score += if issue.risk_score >= 7.0 { 0.7 } else { 0.35 };
        }
    }

    if let Some(issue_id) = &event.issue_id {
        let linked_high = open_issues
            .iter()
            .any(|i| &i.id == issue_id && i.risk_score >= 7.0);
        if linked_high {
            score += 1.5;
        }
    }

    round1(score)
}

/// Two events collide when they share an environment and their intervals
/// overlap inclusively (a missing end collapses to the start).
pub fn overlaps(a: &Event, b: &Event) -> bool {
    a.env == b.env && a.start <= b.end_or_start() && b.start <= a.end_or_start()
}

/// Every colliding pair of event ids, considering all pairs.
pub fn collisions(events: &[Event]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (idx, a) in events.iter().enumerate() {
        for b in &events[idx + 1..] {
            if overlaps(a, b) {
                pairs.push((a.id.clone(), b.id.clone()));
            }
        }
    }
    pairs
}

/// Ids of events involved in at least one collision.
pub fn colliding_ids(events: &[Event]) -> Vec<String> {
    let mut ids = Vec::new();
    for (a, b) in collisions(events) {
        if !ids.contains(&a) {
            ids.push(a);
        }
        if !ids.contains(&b) {
            ids.push(b);
        }
    }
    ids
}
