//! Raw feed row → typed issue normalization.
//!
//! The feed is a shared spreadsheet: column names drift in case and
//! wording, vocab cells are free text, dates arrive in several shapes.
//! Everything here degrades to a default instead of erring; the only way
//! a row is rejected is an empty id.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::core::model::{Issue, RawRow};

/// Case-insensitive header aliases per logical field.
pub const ID_ALIASES: &[&str] = &["id", "issue id", "ticket id", "ticket"];
pub const MODULE_ALIASES: &[&str] = &["module", "modules", "area", "component"];
pub const PRIORITY_ALIASES: &[&str] = &["priority", "prio"];
pub const STATUS_ALIASES: &[&str] = &["status", "state"];
pub const TYPE_ALIASES: &[&str] = &["type", "issue type", "kind"];
pub const TITLE_ALIASES: &[&str] = &["title", "summary", "issue", "name"];
pub const DESCRIPTION_ALIASES: &[&str] = &["description", "details", "desc"];
pub const LOG_ALIASES: &[&str] = &["log", "comments", "notes", "history"];
pub const DATE_ALIASES: &[&str] = &["date", "created", "created at", "reported", "reported date"];
pub const LINK_ALIASES: &[&str] = &["link", "links", "url", "urls"];

/// First non-empty cell whose header matches an alias, trimmed.
pub fn field(row: &RawRow, aliases: &[&str]) -> String {
    for (key, value) in row {
        let k = key.trim().to_lowercase();
        if aliases.contains(&k.as_str()) {
            let v = value.trim();
            if !v.is_empty() {
                return v.to_string();
            }
        }
    }
    String::new()
}

/// Ordered module canonicalization table; first substring match wins, so
/// text containing both "checklist" and "mobile" resolves to Checklist.
const MODULE_RULES: &[(&[&str], &str)] = &[
    (&["checklist"], "Checklist"),
    (&["journal", "logbook"], "Journal"),
    (&["report"], "Reporting"),
    (&["mobile", "app"], "Mobile App"),
    (&["employee"], "Employee"),
    (&["role"], "Roles"),
    (&["location"], "Locations"),
    (&["reference"], "Reference Material"),
];

pub fn normalize_module(raw: &str) -> String {
    let l = raw.trim().to_lowercase();
    if l.is_empty() {
        return "Unspecified".to_string();
    }
    for (needles, canonical) in MODULE_RULES {
        if needles.iter().any(|n| l.contains(n)) {
            return (*canonical).to_string();
        }
    }
    capitalize_first(raw.trim())
}

/// Prefix match on the lowercased value; anything unrecognized (including
/// empty) lands on "medium".
pub fn normalize_priority(raw: &str) -> String {
    let l = raw.trim().to_lowercase();
    if l.starts_with("urg") {
        "urgent"
    } else if l.starts_with("hi") {
        "high"
    } else if l.starts_with("med") {
        "medium"
    } else if l.starts_with("low") {
        "low"
    } else {
        "medium"
    }
    .to_string()
}

const STATUS_PHRASES: &[&str] = &[
    "resolved",
    "rejected",
    "on stage",
    "under development",
    "on hold",
    "tested on staging",
    "not started",
];

/// Substring match against the canonical status phrases, else the raw
/// trimmed string passes through untouched.
pub fn normalize_status(raw: &str) -> String {
    let l = raw.trim().to_lowercase();
    for phrase in STATUS_PHRASES {
        if l.contains(phrase) {
            return (*phrase).to_string();
        }
    }
    raw.trim().to_string()
}

pub fn normalize_kind(raw: &str) -> String {
    let l = raw.trim().to_lowercase();
    if l.is_empty() {
        return "Bug".to_string();
    }
    if l.contains("bug") {
        return "Bug".to_string();
    }
    if l.contains("enhancement") {
        return "Enhancement".to_string();
    }
    // "new futur" covers a recurring typo in the source sheet
    if l.contains("new feature") || l.contains("new futur") {
        return "New Feature".to_string();
    }
    capitalize_first(raw.trim())
}

/// True when the status reads as finished work.
pub fn is_closed_status(status_norm: &str) -> bool {
    let l = status_norm.to_lowercase();
    ["resolved", "rejected", "completed"].iter().any(|s| l.contains(s))
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

static DMY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[-/](\d{1,2})[-/](\d{2,4})$").expect("d-m-y pattern compiles")
});

/// Parse a date cell: standard formats first, then a `D-M-Y`/`D/M/Y`
/// recovery pass (2-digit years are 2000s). Unparseable → None.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return midnight(d);
        }
    }

    // Spreadsheet rows often carry day-first dates the formats above
    // reject; re-order into Y-M-D and retry.
    let caps = DMY_RE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day).and_then(midnight)
}

fn midnight(d: NaiveDate) -> Option<DateTime<Utc>> {
    d.and_hms_opt(0, 0, 0).map(|n| Utc.from_utc_datetime(&n))
}

/// Whole days between the issue date and `now`, clamped at zero for
/// slightly-future dates.
pub fn age_days(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    date.map(|d| (now - d).num_days().max(0))
}

/// Build the issue skeleton from one raw row. Derived analytics fields
/// (keywords, category, risk, sub-scores) are filled by the dataset
/// pipeline; a row with no usable id yields None and is dropped.
pub fn normalize_issue(row: &RawRow, now: DateTime<Utc>) -> Option<Issue> {
    let id = field(row, ID_ALIASES);
    if id.is_empty() {
        return None;
    }

    let module = field(row, MODULE_ALIASES);
    let priority = field(row, PRIORITY_ALIASES);
    let status = field(row, STATUS_ALIASES);
    let kind = field(row, TYPE_ALIASES);
    let date = parse_date(&field(row, DATE_ALIASES));
    let status_norm = normalize_status(&status);

    Some(Issue {
        id,
        module_norm: normalize_module(&module),
        priority_norm: normalize_priority(&priority),
        is_closed: is_closed_status(&status_norm),
        status_norm,
        kind_norm: normalize_kind(&kind),
        module,
        priority,
        status,
        kind,
        title: field(row, TITLE_ALIASES),
        description: field(row, DESCRIPTION_ALIASES),
        log: field(row, LOG_ALIASES),
        age_days: age_days(date, now),
        date,
        links: field(row, LINK_ALIASES)
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        keywords: Vec::new(),
        category: String::new(),
        risk_score: 0.0,
        severity: 1,
        impact: 1,
        urgency: 1,
    })
}
