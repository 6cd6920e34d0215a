//! Release slot planner: generate candidate windows over a horizon, score
//! each against rush-hour/business heuristics, module risk exposure, and
//! calendar collisions, then pick the safest per-day spread.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use indexmap::IndexMap;

use crate::core::model::{Event, EventEnv, Issue};
use crate::core::risk::round1;
use crate::core::rules;

/// Release archetypes, ordered by blast radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseType {
    Major,
    Feature,
    #[default]
    Patch,
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseType::Major => write!(f, "major"),
            ReleaseType::Feature => write!(f, "feature"),
            ReleaseType::Patch => write!(f, "patch"),
        }
    }
}

/// Planner inputs; modules are the release's affected module names.
#[derive(Debug, Clone)]
pub struct SlotContext {
    pub env: EventEnv,
    pub release_type: ReleaseType,
    pub modules: Vec<String>,
    pub description: String,
    pub horizon_days: u32,
    pub max_per_day: usize,
}

/// One scored candidate window; lower score = safer.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub score: f64,
    /// Human-readable penalty notes in trigger order.
    pub notes: Vec<String>,
}

/// Fixed candidate start hours: early-morning, mid-morning, afternoon,
/// late-night.
pub const SLOT_HOURS: [u32; 4] = [6, 10, 15, 22];

/// Slot length.
const SLOT_DURATION_HOURS: i64 = 1;

/// Collision look-around window on each side of a slot.
const COLLISION_PAD_HOURS: i64 = 2;

fn env_base(env: EventEnv) -> f64 {
    match env {
        EventEnv::Prod => 4.0,
        EventEnv::Staging => 2.5,
        EventEnv::Dev | EventEnv::Other => 1.5,
    }
}

fn release_penalty(release_type: ReleaseType) -> f64 {
    match release_type {
        ReleaseType::Major => 3.0,
        ReleaseType::Feature => 2.0,
        ReleaseType::Patch => 1.0,
    }
}

fn rush_hour(hour: u32) -> bool {
    (11..=15).contains(&hour) || (18..=22).contains(&hour)
}

/// Raw word split of the release description, unfiltered so short or
/// generic words still count against the risky-term list.
fn description_has_risky_term(description: &str) -> bool {
    description
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .any(|tok| rules::PLANNER_RISKY_TERMS.iter().any(|term| tok.starts_with(term)))
}

fn score_slot(
    start: DateTime<Utc>,
    ctx: &SlotContext,
    open_issues: &[Issue],
    events: &[Event],
) -> Slot {
    let end = start + Duration::hours(SLOT_DURATION_HOURS);
    let mut notes = Vec::new();
    let mut score = env_base(ctx.env);

    if rush_hour(start.hour()) {
        score += 3.0;
        notes.push("lunch/dinner rush".to_string());
    }
    if matches!(start.weekday(), Weekday::Fri | Weekday::Sat) {
        score += 1.0;
        notes.push("weekend-adjacent day".to_string());
    }

    score += release_penalty(ctx.release_type);

    let modules: Vec<String> = ctx.modules.iter().map(|m| m.trim().to_lowercase()).collect();
    let mut high = 0usize;
    let mut related = 0usize;
    for issue in open_issues.iter().filter(|i| i.is_open()) {
        if modules.contains(&issue.module_norm.to_lowercase()) {
            if issue.risk_score >= 7.0 {
                high += 1;
            } else {
                related += 1;
            }
        }
    }
    if high + related > 0 {
        score += 0.6 * high as f64 + 0.3 * related as f64;
        notes.push(format!("{} open issues in affected modules ({high} high-risk)", high + related));
    }

    let pad = Duration::hours(COLLISION_PAD_HOURS);
    for event in events.iter().filter(|e| e.env == ctx.env) {
        if event.start <= end + pad && (start - pad) <= event.end_or_start() {
            score += 1.5;
            notes.push(format!("near event: {}", event.title));
        }
    }

    if description_has_risky_term(&ctx.description) {
        score += 1.0;
        notes.push("description mentions risky surface".to_string());
    }

    Slot { start, end, score: round1(score), notes }
}

/// Generate and rank candidate slots, safest first, then greedily keep at
/// most `max_per_day` per calendar day in score order.
pub fn suggest_slots(
    ctx: &SlotContext,
    open_issues: &[Issue],
    events: &[Event],
    now: DateTime<Utc>,
) -> Vec<Slot> {
    let mut candidates = Vec::new();
    for day in 1..=i64::from(ctx.horizon_days) {
        let date = now.date_naive() + Duration::days(day);
        for hour in SLOT_HOURS {
            let Some(naive) = date.and_hms_opt(hour, 0, 0) else { continue };
            candidates.push(score_slot(naive.and_utc(), ctx, open_issues, events));
        }
    }

    candidates.sort_by(|a, b| a.score.total_cmp(&b.score)); // stable: earlier slot wins ties

    let budget = ctx.max_per_day * ctx.horizon_days as usize;
    let mut per_day: IndexMap<chrono::NaiveDate, usize> = IndexMap::new();
    let mut chosen = Vec::new();
    for slot in candidates {
        if chosen.len() >= budget {
            break;
        }
        let day = per_day.entry(slot.start.date_naive()).or_insert(0);
        if *day < ctx.max_per_day {
            *day += 1;
            chosen.push(slot);
        }
    }
    chosen
}
