//! Declarative keyword rule tables.
//!
//! Every keyword/substring concern in the engine lives here so that the
//! risk scorers, the classifier, and the planner all share one source of
//! truth per topic instead of hand-rolling their own lists. Matching is
//! plain lowercase substring for the small ordered tables and Aho-Corasick
//! for the larger flat phrase lists.

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;

/// A labeled keyword group: `label` plus the substrings that trigger it.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub label: &'static str,
    pub terms: &'static [&'static str],
}

impl KeywordRule {
    /// True when any term occurs in the (already lowercased) text.
    pub fn matches(&self, text: &str) -> bool {
        self.terms.iter().any(|t| text.contains(t))
    }

    /// Number of distinct terms present in the text.
    pub fn hit_count(&self, text: &str) -> usize {
        self.terms.iter().filter(|t| text.contains(*t)).count()
    }
}

/// Bounded-scale risk bonus phrases: one point per distinct phrase found
/// in lowercased title+description, additive with no upper cap.
pub const RISK_BONUS_PHRASES: &[&str] = &[
    "crash",
    "data loss",
    "cannot login",
    "login failed",
    "timeout",
    "timezone",
    "wrong time",
    "payment",
    "security",
    "breach",
    "leak",
    "not working",
    "production",
    "duplicate",
    "missing",
    "incorrect",
    "slow",
    "freeze",
    "sync failed",
    "offline",
    "no notification",
    "export failed",
    "blocker",
    "regression",
    "data mismatch",
];

static RISK_BONUS_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::new(RISK_BONUS_PHRASES).expect("risk bonus phrase table builds")
});

/// Count distinct bonus phrases present in `text` (lowercased input).
pub fn risk_bonus_hits(text: &str) -> usize {
    let mut seen = [false; RISK_BONUS_PHRASES.len()];
    for m in RISK_BONUS_MATCHER.find_overlapping_iter(text) {
        seen[m.pattern().as_usize()] = true;
    }
    seen.iter().filter(|s| **s).count()
}

/// Per-module risk weight: the modules that historically carry incidents.
pub const MODULE_WEIGHTS: &[(&str, f64)] = &[
    ("Reporting", 1.5),
    ("Checklist", 1.5),
    ("Mobile App", 1.0),
    ("Employee", 0.5),
    ("Roles", 0.5),
    ("Locations", 0.5),
];

/// Risk weight for a canonical module name, 0.0 when unlisted.
pub fn module_weight(module_norm: &str) -> f64 {
    MODULE_WEIGHTS
        .iter()
        .find(|(m, _)| *m == module_norm)
        .map(|(_, w)| *w)
        .unwrap_or(0.0)
}

/// One keyword group of the weighted-dimension strategy with its
/// per-dimension bumps (applied once per group, capped at 6 downstream).
#[derive(Debug, Clone, Copy)]
pub struct DimensionRule {
    pub reason: &'static str,
    pub terms: &'static [&'static str],
    pub severity: u8,
    pub impact: u8,
    pub urgency: u8,
    pub technical: u8,
    pub business: u8,
    pub operational: u8,
    pub time: u8,
}

pub const DIMENSION_RULES: &[DimensionRule] = &[
    DimensionRule {
        reason: "critical/outage language",
        terms: &["crash", "outage", "data loss", "security", "breach", "cannot access", "down"],
        severity: 2,
        impact: 1,
        urgency: 0,
        technical: 1,
        business: 0,
        operational: 0,
        time: 0,
    },
    DimensionRule {
        reason: "payments/POS exposure",
        terms: &["payment", "billing", "invoice", "pos", "checkout", "refund"],
        severity: 0,
        impact: 1,
        urgency: 0,
        technical: 0,
        business: 2,
        operational: 0,
        time: 0,
    },
    DimensionRule {
        reason: "performance degradation",
        terms: &["slow", "timeout", "latency", "performance", "freeze", "lag"],
        severity: 1,
        impact: 0,
        urgency: 0,
        technical: 1,
        business: 0,
        operational: 0,
        time: 0,
    },
    DimensionRule {
        reason: "authentication surface",
        terms: &["login", "auth", "password", "session", "token"],
        severity: 1,
        impact: 0,
        urgency: 0,
        technical: 0,
        business: 1,
        operational: 0,
        time: 0,
    },
    DimensionRule {
        reason: "peak-period sensitivity",
        terms: &["peak", "rush", "month-end", "end of month", "quarter close"],
        severity: 0,
        impact: 0,
        urgency: 0,
        technical: 0,
        business: 0,
        operational: 2,
        time: 1,
    },
    DimensionRule {
        reason: "deployment blocker",
        terms: &["release", "deploy", "blocker", "regression", "rollback"],
        severity: 0,
        impact: 0,
        urgency: 1,
        technical: 0,
        business: 0,
        operational: 1,
        time: 1,
    },
];

/// Single-category inference rules. Order is significant: the first
/// matching rule wins, so "checklist"-before-"mobile" style precedence
/// is encoded purely by position.
pub const CATEGORY_RULES: &[KeywordRule] = &[
    KeywordRule {
        label: "Timezone / locale",
        terms: &["timezone", "time zone", "utc", "gmt", "locale"],
    },
    // This rule also fires on any non-ASCII character; see classify.
    KeywordRule {
        label: "i18n / encoding",
        terms: &["arabic", "rtl", "unicode", "encoding"],
    },
    KeywordRule {
        label: "Exports & reporting output",
        terms: &["export", "excel", "pdf", "xlsx"],
    },
    KeywordRule {
        label: "Scheduling & instances",
        terms: &["schedule", "on-demand", "on demand", "display time", "instance"],
    },
    KeywordRule {
        label: "Notifications",
        terms: &["notification", "push", "email", "reminder"],
    },
    KeywordRule {
        label: "Access control / roles",
        terms: &["role", "access", "permission"],
    },
    KeywordRule {
        label: "Employee management",
        terms: &["employee", "staff"],
    },
    KeywordRule {
        label: "Journal / logbook",
        terms: &["journal", "logbook"],
    },
    KeywordRule {
        label: "Geofencing",
        terms: &["geofence", "geofencing", "geo-fence", "geo fence"],
    },
    KeywordRule {
        label: "Media / attachments",
        terms: &["camera", "photo", "video", "attachment", "image"],
    },
];

pub const CATEGORY_FALLBACK: &str = "General";

/// Fixed thematic buckets for the dashboard cluster view. An issue may
/// land in several buckets; empty buckets are omitted from output.
pub const CLUSTER_BUCKETS: &[KeywordRule] = &[
    KeywordRule {
        label: "Timezone & display time",
        terms: &["timezone", "time zone", "display time", "wrong time", "utc"],
    },
    KeywordRule {
        label: "Exports & reports",
        terms: &["export", "excel", "pdf", "print", "download"],
    },
    KeywordRule {
        label: "Scheduling",
        terms: &["schedule", "on-demand", "on demand", "recurring", "instance"],
    },
    KeywordRule {
        label: "Notifications",
        terms: &["notification", "push", "email", "reminder", "alert"],
    },
    KeywordRule {
        label: "Access & roles",
        terms: &["role", "access", "permission", "login"],
    },
    KeywordRule {
        label: "Mobile app",
        terms: &["mobile", "android", "ios", "tablet"],
    },
    KeywordRule {
        label: "Geofencing",
        terms: &["geofence", "geofencing", "geo-fence", "location radius"],
    },
    KeywordRule {
        label: "Media & attachments",
        terms: &["camera", "photo", "video", "attachment", "upload"],
    },
    KeywordRule {
        label: "Sync & offline",
        terms: &["sync", "offline", "refresh", "stale data"],
    },
    KeywordRule {
        label: "Performance",
        terms: &["slow", "timeout", "lag", "performance", "freeze"],
    },
];

/// Displayed membership cap per bucket (first N in input order).
pub const CLUSTER_CAP: usize = 7;

/// Ranked multi-label scheme for the secondary analytics path. Distinct
/// from the single-winner categories: every label with ≥1 hit is
/// returned, sorted by hit count.
pub const ANALYTICS_LABELS: &[KeywordRule] = &[
    KeywordRule {
        label: "Authentication/Login",
        terms: &["login", "auth", "password", "session", "token", "sign in"],
    },
    KeywordRule {
        label: "Payments/Billing",
        terms: &["payment", "billing", "invoice", "pos", "checkout", "refund"],
    },
    KeywordRule {
        label: "Performance/Latency",
        terms: &["slow", "latency", "timeout", "performance", "lag", "freeze"],
    },
    KeywordRule {
        label: "Reliability/Errors",
        terms: &["crash", "error", "fail", "exception", "outage", "down"],
    },
    KeywordRule {
        label: "UI/UX",
        terms: &["button", "screen", "layout", "display", "design", "scroll"],
    },
    KeywordRule {
        label: "Data/Sync",
        terms: &["sync", "duplicate", "missing", "import", "mismatch", "stale"],
    },
];

/// Terms in a release description that historically correlate with risky
/// changes; the planner adds a flat penalty when any appears.
pub const PLANNER_RISKY_TERMS: &[&str] =
    &["schedule", "report", "export", "timezone", "geofence", "filter"];
