//! Core data shapes shared across the engine.
//!
//! An `Issue` is one normalized row of the tracker feed; an `Event` is one
//! operational calendar entry. Both are plain serde data: every derived
//! field (risk, category, keywords) is recomputed from the raw inputs, so
//! nothing here caches state between runs.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One raw feed row: header name → cell text, header order preserved.
pub type RawRow = IndexMap<String, String>;

/// A normalized tracker issue with all derived metadata attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Trimmed unique id; rows without one never become an `Issue`.
    pub id: String,

    /// Raw field values exactly as the feed gave them.
    pub module: String,
    pub priority: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,

    /// Canonicalized counterparts from the fixed vocabularies.
    pub module_norm: String,
    pub priority_norm: String,
    pub status_norm: String,
    #[serde(rename = "type_norm")]
    pub kind_norm: String,

    pub title: String,
    pub description: String,
    pub log: String,

    /// Parsed report time; None when the cell was unparseable.
    pub date: Option<DateTime<Utc>>,
    /// Whole days since `date`, None without a date.
    pub age_days: Option<i64>,

    /// Zero or more URLs from the comma-separated link cell.
    pub links: Vec<String>,

    /// Top-N frequent meaningful tokens from title+description.
    pub keywords: Vec<String>,
    /// Single best-fit topic label (first matching rule wins).
    pub category: String,

    /// Bounded-scale risk, clamped to [1,10] with one decimal.
    pub risk_score: f64,
    /// Sub-dimensions in [1,3] derived from risk/priority/module.
    pub severity: u8,
    pub impact: u8,
    pub urgency: u8,

    pub is_closed: bool,
}

impl Issue {
    /// Lowercased title+description, the text every keyword rule matches on.
    pub fn text_lower(&self) -> String {
        let mut t = String::with_capacity(self.title.len() + self.description.len() + 1);
        t.push_str(&self.title);
        t.push(' ');
        t.push_str(&self.description);
        t.to_lowercase()
    }

    /// Concatenated haystack for free-text query terms.
    pub fn search_text(&self) -> String {
        [
            self.id.as_str(),
            self.module.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.log.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }

    /// Open issues feed every risk/backlog aggregate; closed ones are out.
    pub fn is_open(&self) -> bool {
        !self.is_closed
    }
}

/// Calendar entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EventKind {
    Deployment,
    Maintenance,
    Release,
    #[default]
    Other,
}

impl EventKind {
    /// Lenient recovery from free text (persisted blobs, imports).
    pub fn from_raw(raw: &str) -> Self {
        let l = raw.trim().to_lowercase();
        if l.starts_with("deploy") {
            EventKind::Deployment
        } else if l.starts_with("maint") {
            EventKind::Maintenance
        } else if l.starts_with("release") {
            EventKind::Release
        } else {
            EventKind::Other
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Deployment => write!(f, "Deployment"),
            EventKind::Maintenance => write!(f, "Maintenance"),
            EventKind::Release => write!(f, "Release"),
            EventKind::Other => write!(f, "Other"),
        }
    }
}

/// Target environment of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EventEnv {
    Prod,
    Staging,
    Dev,
    #[default]
    Other,
}

impl EventEnv {
    pub fn from_raw(raw: &str) -> Self {
        let l = raw.trim().to_lowercase();
        if l.starts_with("prod") {
            EventEnv::Prod
        } else if l.starts_with("stag") {
            EventEnv::Staging
        } else if l.starts_with("dev") {
            EventEnv::Dev
        } else {
            EventEnv::Other
        }
    }
}

impl std::fmt::Display for EventEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventEnv::Prod => write!(f, "Prod"),
            EventEnv::Staging => write!(f, "Staging"),
            EventEnv::Dev => write!(f, "Dev"),
            EventEnv::Other => write!(f, "Other"),
        }
    }
}

/// Declared blast radius of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ImpactType {
    #[serde(rename = "No downtime expected")]
    #[default]
    NoDowntime,
    #[serde(rename = "Internal only")]
    InternalOnly,
    #[serde(rename = "Customer visible")]
    CustomerVisible,
    #[serde(rename = "High risk change")]
    HighRiskChange,
}

impl std::fmt::Display for ImpactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImpactType::NoDowntime => write!(f, "No downtime expected"),
            ImpactType::InternalOnly => write!(f, "Internal only"),
            ImpactType::CustomerVisible => write!(f, "Customer visible"),
            ImpactType::HighRiskChange => write!(f, "High risk change"),
        }
    }
}

/// One scheduled operational activity on the calendar.
///
/// Persisted as a full snapshot list on every mutation; `start` is always
/// present on a persisted event (creation validates it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub env: EventEnv,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub description: String,

    /// Comma-separated free-text list of affected module names.
    #[serde(default)]
    pub modules: String,

    #[serde(default)]
    pub impact_type: ImpactType,

    /// Optional link to a single issue.
    #[serde(default)]
    pub issue_id: Option<String>,

    pub start: DateTime<Utc>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,

    /// Computed heuristic risk; unlike issues this has no clamp ceiling.
    #[serde(default)]
    pub risk_score: f64,
}

impl Event {
    /// End of the interval, defaulting to `start` for point events.
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.start)
    }

    /// Affected modules, trimmed and lowercased for matching.
    pub fn module_list(&self) -> Vec<String> {
        self.modules
            .split(',')
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect()
    }
}
