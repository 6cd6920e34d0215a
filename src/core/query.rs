//! The filter/sort query mini-language.
//!
//! One line of text, whitespace-tokenized. Tokens either parse into a
//! typed filter (`module:reporting`, `risk>=8`, `last:7d`, `sort:date`)
//! or silently fall back to free-text terms; the parser never raises a
//! syntax error. All conditions AND-combine.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::LazyLock;

use crate::core::model::Issue;

/// Sort order for the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Bounded risk score, highest first (the default).
    #[default]
    Risk,
    /// Issue date, newest first; undated issues sink to the end.
    Date,
    /// Priority rank: urgent, high, medium, low.
    Priority,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Module(String),
    Status(String),
    Priority(String),
    Kind(String),
    IdSub(String),
    Missing(MissingField),
    MinRisk(f64),
    MinSeverity(u8),
    MinImpact(u8),
    MinUrgency(u8),
    /// Issue date within the last N days of `now`.
    LastDays(i64),
    /// Issue age strictly greater than N days.
    AgeOver(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Priority,
    Status,
    Module,
    Kind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedQuery {
    pub filters: Vec<Filter>,
    /// Free-text terms; every term must match the issue haystack.
    pub terms: Vec<String>,
    pub sort: SortKey,
}

static LAST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^last:(\d+)d$").expect("last:Nd pattern compiles"));
static AGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^age>(\d+)d$").expect("age>Nd pattern compiles"));

/// Parse one query line. Unrecognized tokens become free-text terms.
pub fn parse(line: &str) -> ParsedQuery {
    let mut q = ParsedQuery::default();
    for raw in line.split_whitespace() {
        let tok = raw.to_lowercase();
        match parse_token(&tok) {
            Token::Filter(f) => q.filters.push(f),
            Token::Sort(s) => q.sort = s,
            Token::Term => q.terms.push(tok),
        }
    }
    q
}

enum Token {
    Filter(Filter),
    Sort(SortKey),
    Term,
}

fn parse_token(tok: &str) -> Token {
    if let Some(caps) = LAST_RE.captures(tok) {
        if let Ok(n) = caps[1].parse() {
            return Token::Filter(Filter::LastDays(n));
        }
    }
    if let Some(caps) = AGE_RE.captures(tok) {
        if let Ok(n) = caps[1].parse() {
            return Token::Filter(Filter::AgeOver(n));
        }
    }

    for (prefix, build) in NUMERIC_MIN_KEYS {
        if let Some(rest) = tok.strip_prefix(prefix) {
            if let Ok(n) = rest.parse::<f64>() {
                return Token::Filter(build(n));
            }
            return Token::Term; // "risk>=abc" degrades to free text
        }
    }

    if let Some((key, value)) = tok.split_once(':') {
        if value.is_empty() {
            return Token::Term;
        }
        return match key {
            "module" => Token::Filter(Filter::Module(value.to_string())),
            "status" => Token::Filter(Filter::Status(value.to_string())),
            "priority" => Token::Filter(Filter::Priority(value.to_string())),
            "type" => Token::Filter(Filter::Kind(value.to_string())),
            "id" => Token::Filter(Filter::IdSub(value.to_string())),
            "missing" => match value {
                "priority" => Token::Filter(Filter::Missing(MissingField::Priority)),
                "status" => Token::Filter(Filter::Missing(MissingField::Status)),
                "module" => Token::Filter(Filter::Missing(MissingField::Module)),
                "type" => Token::Filter(Filter::Missing(MissingField::Kind)),
                _ => Token::Term,
            },
            "sort" => match value {
                "risk" => Token::Sort(SortKey::Risk),
                "date" => Token::Sort(SortKey::Date),
                "priority" => Token::Sort(SortKey::Priority),
                _ => Token::Term,
            },
            _ => Token::Term,
        };
    }

    Token::Term
}

type FilterBuilder = fn(f64) -> Filter;

const NUMERIC_MIN_KEYS: &[(&str, FilterBuilder)] = &[
    ("risk>=", |n| Filter::MinRisk(n)),
    ("severity>=", |n| Filter::MinSeverity(n as u8)),
    ("impact>=", |n| Filter::MinImpact(n as u8)),
    ("urgency>=", |n| Filter::MinUrgency(n as u8)),
];

fn matches_filter(issue: &Issue, filter: &Filter, now: DateTime<Utc>) -> bool {
    match filter {
        Filter::Module(v) => issue.module_norm.to_lowercase().contains(v),
        Filter::Status(v) => issue.status_norm.to_lowercase().contains(v),
        Filter::Priority(v) => issue.priority_norm.to_lowercase().contains(v),
        Filter::Kind(v) => issue.kind_norm.to_lowercase().contains(v),
        Filter::IdSub(v) => issue.id.to_lowercase().contains(v),
        Filter::Missing(field) => match field {
            MissingField::Priority => issue.priority.trim().is_empty(),
            MissingField::Status => issue.status.trim().is_empty(),
            MissingField::Kind => issue.kind.trim().is_empty(),
            MissingField::Module => {
                issue.module.trim().is_empty() || issue.module_norm == "Unspecified"
            }
        },
        Filter::MinRisk(n) => issue.risk_score >= *n,
        Filter::MinSeverity(n) => issue.severity >= *n,
        Filter::MinImpact(n) => issue.impact >= *n,
        Filter::MinUrgency(n) => issue.urgency >= *n,
        Filter::LastDays(n) => {
            issue.date.is_some_and(|d| d >= now - Duration::days(*n))
        }
        Filter::AgeOver(n) => issue.age_days.is_some_and(|a| a > *n),
    }
}

/// Apply a parsed query: filter, free-text match, then stable sort.
pub fn run<'a>(issues: &'a [Issue], q: &ParsedQuery, now: DateTime<Utc>) -> Vec<&'a Issue> {
    let mut hits: Vec<&Issue> = issues
        .iter()
        .filter(|i| q.filters.iter().all(|f| matches_filter(i, f, now)))
        .filter(|i| {
            if q.terms.is_empty() {
                return true;
            }
            let haystack = i.search_text();
            q.terms.iter().all(|t| haystack.contains(t))
        })
        .collect();

    match q.sort {
        SortKey::Risk => hits.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score)),
        SortKey::Date => hits.sort_by(|a, b| match (b.date, a.date) {
            (Some(db), Some(da)) => db.cmp(&da),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => std::cmp::Ordering::Equal,
        }),
        SortKey::Priority => hits.sort_by_key(|i| priority_rank(&i.priority_norm)),
    }
    hits
}

fn priority_rank(priority_norm: &str) -> u8 {
    match priority_norm {
        "urgent" => 0,
        "high" => 1,
        "medium" => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issue(id: &str, module_norm: &str, risk: f64, days_ago: i64, now: DateTime<Utc>) -> Issue {
        Issue {
            id: id.into(),
            module: module_norm.into(),
            priority: "high".into(),
            status: "not started".into(),
            kind: "Bug".into(),
            module_norm: module_norm.into(),
            priority_norm: "high".into(),
            status_norm: "not started".into(),
            kind_norm: "Bug".into(),
            title: format!("{module_norm} issue"),
            description: "something broke".into(),
            log: String::new(),
            date: Some(now - Duration::days(days_ago)),
            age_days: Some(days_ago),
            links: Vec::new(),
            keywords: Vec::new(),
            category: String::new(),
            risk_score: risk,
            severity: 2,
            impact: 2,
            urgency: 2,
            is_closed: false,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn combined_filters_and_sort() {
        let n = now();
        let issues = vec![
            issue("A", "Reporting", 9.0, 2, n),
            issue("B", "Reporting", 8.5, 3, n),
            issue("C", "Reporting", 9.5, 20, n), // too old for last:7d
            issue("D", "Checklist", 9.9, 1, n),  // wrong module
            issue("E", "Reporting", 4.0, 1, n),  // risk too low
        ];
        let q = parse("module:reporting risk>=8 last:7d sort:risk");
        let got: Vec<&str> = run(&issues, &q, n).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(got, vec!["A", "B"]);
    }

    #[test]
    fn unparseable_tokens_degrade_to_free_text() {
        let q = parse("risk>=abc broke");
        assert!(q.filters.is_empty());
        assert_eq!(q.terms, vec!["risk>=abc", "broke"]);

        let n = now();
        let issues = vec![issue("A", "Reporting", 5.0, 1, n)];
        // "risk>=abc" matches nothing in the haystack, so no results,
        // but no error either
        assert!(run(&issues, &q, n).is_empty());
    }

    #[test]
    fn free_text_terms_all_must_match() {
        let n = now();
        let issues = vec![issue("A", "Reporting", 5.0, 1, n)];
        assert_eq!(run(&issues, &parse("reporting broke"), n).len(), 1);
        assert!(run(&issues, &parse("reporting missingword"), n).is_empty());
    }

    #[test]
    fn missing_and_age_filters() {
        let n = now();
        let mut unset = issue("A", "Unspecified", 5.0, 30, n);
        unset.priority = String::new();
        let set = issue("B", "Reporting", 5.0, 2, n);

        let missing_items = [unset.clone(), set.clone()];
        let got = run(&missing_items, &parse("missing:priority"), n);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "A");

        let age_items = [unset, set];
        let got = run(&age_items, &parse("age>21d"), n);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].id, "A");
    }

    #[test]
    fn sort_by_date_puts_newest_first_and_undated_last() {
        let n = now();
        let mut undated = issue("U", "Reporting", 5.0, 1, n);
        undated.date = None;
        let issues = vec![undated, issue("OLD", "Reporting", 5.0, 9, n), issue("NEW", "Reporting", 5.0, 1, n)];
        let got: Vec<&str> =
            run(&issues, &parse("sort:date"), n).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(got, vec!["NEW", "OLD", "U"]);
    }

    #[test]
    fn sort_by_priority_is_urgent_first_and_stable() {
        let n = now();
        let mut a = issue("A", "Reporting", 5.0, 1, n);
        a.priority_norm = "low".into();
        let mut b = issue("B", "Reporting", 5.0, 1, n);
        b.priority_norm = "urgent".into();
        let mut c = issue("C", "Reporting", 5.0, 1, n);
        c.priority_norm = "urgent".into();
        let sort_items = [a, b, c];
        let got: Vec<&str> =
            run(&sort_items, &parse("sort:priority"), n).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(got, vec!["B", "C", "A"]); // B before C: stable
    }

    #[test]
    fn id_substring_filter_is_case_insensitive() {
        let n = now();
        let issues = vec![issue("APP-42", "Reporting", 5.0, 1, n)];
        assert_eq!(run(&issues, &parse("id:app-4"), n).len(), 1);
        assert!(run(&issues, &parse("id:xyz"), n).is_empty());
    }
}
