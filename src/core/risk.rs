//! Heuristic risk scoring.
//!
//! Two strategies coexist on purpose and must not be merged: the bounded
//! 1–10 scale drives the dashboard's `risk_score`, while the unbounded
//! weighted-dimension scale (0–24) feeds the deeper analytics view. Each
//! is a deterministic pure function of a single issue's fields.

use crate::core::model::Issue;
use crate::core::rules;

/// Result of scoring one issue under some strategy.
///
/// `severity`/`impact`/`urgency` are scaled per strategy: [1,3] bands for
/// the bounded scale, [1,6] dimensions for the weighted scale. The four
/// optional dimensions and `reasons` are only produced by the weighted
/// strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskBreakdown {
    pub total: f64,
    pub severity: u8,
    pub impact: u8,
    pub urgency: u8,
    pub technical: Option<u8>,
    pub business: Option<u8>,
    pub operational: Option<u8>,
    pub time: Option<u8>,
    pub reasons: Vec<String>,
}

/// A named scoring strategy over a single issue.
pub trait RiskStrategy {
    fn name(&self) -> &'static str;
    fn score(&self, issue: &Issue) -> RiskBreakdown;
}

/// Round to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Primary dashboard strategy: priority base, type/module adjustments,
/// open-age and status bonuses, uncapped additive keyword bonus, clamped
/// into [1,10] with one decimal.
pub struct BoundedScale;

impl RiskStrategy for BoundedScale {
    fn name(&self) -> &'static str {
        "bounded-scale"
    }

    fn score(&self, issue: &Issue) -> RiskBreakdown {
        let mut score = match issue.priority_norm.as_str() {
            "urgent" => 9.0,
            "high" => 7.0,
            "medium" => 5.0,
            "low" => 2.0,
            _ => 4.0,
        };

        match issue.kind_norm.as_str() {
            "Bug" => score += 2.0,
            "Enhancement" => score -= 1.0,
            _ => {}
        }

        score += rules::module_weight(&issue.module_norm);

        // Age only matters while the issue is still open.
        if issue.is_open() {
            if let Some(age) = issue.age_days {
                if age > 60 {
                    score += 1.5;
                } else if age > 30 {
                    score += 1.0;
                } else if age > 14 {
                    score += 0.5;
                }
            }
        }

        // In-flight statuses stack.
        let status = issue.status_norm.to_lowercase();
        if status.contains("on hold") {
            score += 0.5;
        }
        if status.contains("under development") {
            score += 0.5;
        }
        if status.contains("on stage") || status.contains("tested on staging") {
            score += 0.5;
        }

        // One point per distinct bonus phrase, additive with no cap.
        score += rules::risk_bonus_hits(&issue.text_lower()) as f64;

        let total = round1(score.clamp(1.0, 10.0));
        RiskBreakdown {
            total,
            severity: severity_band(total),
            impact: impact_band(total, &issue.module_norm),
            urgency: urgency_band(issue),
            technical: None,
            business: None,
            operational: None,
            time: None,
            reasons: Vec::new(),
        }
    }
}

/// Severity band in [1,3] from the bounded total.
pub fn severity_band(total: f64) -> u8 {
    if total >= 8.0 {
        3
    } else if total >= 5.0 {
        2
    } else {
        1
    }
}

/// Impact band in [1,3]: top weighted modules escalate, any module weight
/// or a mid risk keeps it at 2.
pub fn impact_band(total: f64, module_norm: &str) -> u8 {
    let weight = rules::module_weight(module_norm);
    if weight >= 1.5 && total >= 6.0 {
        3
    } else if total >= 5.0 || weight > 0.0 {
        2
    } else {
        1
    }
}

/// Urgency band in [1,3] from priority, bumped for long-open issues.
pub fn urgency_band(issue: &Issue) -> u8 {
    let mut u: u8 = match issue.priority_norm.as_str() {
        "urgent" => 3,
        "high" => 2,
        _ => 1,
    };
    if issue.is_open() && issue.age_days.is_some_and(|a| a > 30) {
        u = (u + 1).min(3);
    }
    u
}

const DIM_CAP: u8 = 6;

fn bump(dim: &mut u8, by: u8) {
    *dim = (*dim + by).min(DIM_CAP);
}

fn decay(dim: &mut u8, by: u8) {
    *dim = dim.saturating_sub(by).max(1);
}

/// Deep-analytics strategy: seven dimensions starting at 1, bumped by
/// keyword groups (cap 6), adjusted by recency and closed status, then
/// aligned so dependent dimensions never trail their drivers. Total is a
/// weighted sum clamped to [0,24], rounded to the nearest integer.
pub struct WeightedDimensions;

impl RiskStrategy for WeightedDimensions {
    fn name(&self) -> &'static str {
        "weighted-dimensions"
    }

    fn score(&self, issue: &Issue) -> RiskBreakdown {
        let text = issue.text_lower();
        let mut reasons: Vec<String> = Vec::new();

        let (mut severity, mut impact, mut technical, mut business, mut operational) =
            (1u8, 1u8, 1u8, 1u8, 1u8);
        let mut time = 1u8;

        // Priority seeds urgency.
        let mut urgency: u8 = 1;
        match issue.priority_norm.as_str() {
            "urgent" => {
                bump(&mut urgency, 4);
                reasons.push("urgent priority".to_string());
            }
            "high" => {
                bump(&mut urgency, 3);
                reasons.push("high priority".to_string());
            }
            "medium" => bump(&mut urgency, 1),
            _ => {}
        }

        for rule in rules::DIMENSION_RULES {
            if !rule.terms.iter().any(|t| text.contains(t)) {
                continue;
            }
            bump(&mut severity, rule.severity);
            bump(&mut impact, rule.impact);
            bump(&mut urgency, rule.urgency);
            bump(&mut technical, rule.technical);
            bump(&mut business, rule.business);
            bump(&mut operational, rule.operational);
            bump(&mut time, rule.time);
            reasons.push(rule.reason.to_string());
        }

        // Recency: fresh reports press, stale ones fade.
        if let Some(age) = issue.age_days {
            if age <= 7 {
                bump(&mut urgency, 1);
                bump(&mut time, 1);
                reasons.push("reported within the last week".to_string());
            } else if age > 90 {
                decay(&mut urgency, 1);
                decay(&mut time, 1);
                reasons.push("stale report, urgency decayed".to_string());
            }
        }

        if issue.is_closed {
            decay(&mut urgency, 2);
            decay(&mut time, 2);
            decay(&mut operational, 2);
            reasons.push("closed, residual risk only".to_string());
        }

        // Alignment: dependent dimensions never trail their drivers.
        technical = technical.max(severity);
        business = business.max(impact);
        operational = operational.max(severity.midpoint(impact));
        time = time.max(urgency);

        let total = f64::from(severity) * 0.9
            + f64::from(impact) * 1.0
            + f64::from(urgency) * 0.8
            + f64::from(technical) * 0.8
            + f64::from(business) * 0.9
            + f64::from(operational) * 0.7
            + f64::from(time) * 0.7;
        let total = total.clamp(0.0, 24.0).round();

        reasons.dedup();
        RiskBreakdown {
            total,
            severity,
            impact,
            urgency,
            technical: Some(technical),
            business: Some(business),
            operational: Some(operational),
            time: Some(time),
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn issue() -> Issue {
        Issue {
            id: "T-1".into(),
            module: "Reporting".into(),
            priority: "High".into(),
            status: "Under development".into(),
            kind: "Bug".into(),
            module_norm: "Reporting".into(),
            priority_norm: "high".into(),
            status_norm: "under development".into(),
            kind_norm: "Bug".into(),
            title: "Export crash".into(),
            description: "timeout during export".into(),
            log: String::new(),
            date: Some(Utc::now() - Duration::days(40)),
            age_days: Some(40),
            links: Vec::new(),
            keywords: Vec::new(),
            category: String::new(),
            risk_score: 0.0,
            severity: 1,
            impact: 1,
            urgency: 1,
            is_closed: false,
        }
    }

    #[test]
    fn bounded_scale_adds_each_documented_component() {
        // base 7 (high) + 2 (Bug) + 1.5 (Reporting) + 1 (age>30)
        // + 0.5 (under development) + 2 (crash, timeout) = 14 → clamp 10
        let b = BoundedScale.score(&issue());
        assert_eq!(b.total, 10.0);
        assert_eq!(b.severity, 3);
        assert_eq!(b.impact, 3);
    }

    #[test]
    fn bounded_scale_stays_within_range_and_one_decimal() {
        let mut low = issue();
        low.priority_norm = "low".into();
        low.kind_norm = "Enhancement".into();
        low.module_norm = "Unspecified".into();
        low.status_norm = "not started".into();
        low.title = "polish copy".into();
        low.description = "minor wording tweak".into();
        low.age_days = Some(2);
        let b = BoundedScale.score(&low);
        assert_eq!(b.total, 1.0); // 2 - 1 = 1, already at the floor
    }

    #[test]
    fn closed_issues_get_no_age_bonus() {
        let mut open = issue();
        open.priority_norm = "low".into();
        open.title = "quiet".into();
        open.description = "quiet".into();
        open.status_norm = "not started".into();
        let open_score = BoundedScale.score(&open).total;

        let mut closed = open.clone();
        closed.is_closed = true;
        closed.status_norm = "resolved".into();
        let closed_score = BoundedScale.score(&closed).total;
        assert!(closed_score < open_score);
    }

    #[test]
    fn status_bonuses_stack() {
        let mut i = issue();
        i.priority_norm = "low".into();
        i.title = "quiet".into();
        i.description = "quiet".into();
        i.age_days = Some(0);
        i.status_norm = "not started".into();
        let base = BoundedScale.score(&i).total;

        i.status_norm = "on hold, under development, tested on staging".into();
        let stacked = BoundedScale.score(&i).total;
        assert_eq!(round1(stacked - base), 1.5);
    }

    #[test]
    fn weighted_dimensions_align_and_clamp() {
        let mut i = issue();
        i.title = "crash outage security breach payment login slow release blocker peak".into();
        i.description = "month-end rollback regression".into();
        i.age_days = Some(2);
        let b = WeightedDimensions.score(&i);
        let technical = b.technical.unwrap();
        let business = b.business.unwrap();
        let operational = b.operational.unwrap();
        let time = b.time.unwrap();
        assert!(technical >= b.severity);
        assert!(business >= b.impact);
        assert!(operational >= b.severity.midpoint(b.impact));
        assert!(time >= b.urgency);
        assert!(b.total <= 24.0);
        assert_eq!(b.total, b.total.round());
        assert!(b.reasons.contains(&"critical/outage language".to_string()));
        assert!(b.reasons.contains(&"deployment blocker".to_string()));
    }

    #[test]
    fn weighted_dimensions_decay_closed_issues() {
        let mut open = issue();
        open.age_days = Some(3);
        let mut closed = open.clone();
        closed.is_closed = true;
        let open_score = WeightedDimensions.score(&open);
        let closed_score = WeightedDimensions.score(&closed);
        assert!(closed_score.total < open_score.total);
        assert!(closed_score.reasons.iter().any(|r| r.contains("closed")));
    }

    #[test]
    fn strategies_are_pure_functions() {
        let i = issue();
        assert_eq!(BoundedScale.score(&i), BoundedScale.score(&i));
        assert_eq!(WeightedDimensions.score(&i), WeightedDimensions.score(&i));
    }
}
