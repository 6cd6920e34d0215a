use proptest::prelude::*;

use opsdeck::core::model::Issue;
use opsdeck::core::tokenize;
use opsdeck::{BoundedScale, RiskStrategy, WeightedDimensions};

fn arb_issue() -> impl Strategy<Value = Issue> {
    (
        "[A-Z]{1,3}-[0-9]{1,4}",
        prop::sample::select(vec![
            "Reporting",
            "Checklist",
            "Mobile App",
            "Employee",
            "Roles",
            "Locations",
            "Journal",
            "Unspecified",
            "Warehouse",
        ]),
        prop::sample::select(vec!["urgent", "high", "medium", "low"]),
        prop::sample::select(vec![
            "not started",
            "on hold",
            "under development",
            "on stage",
            "tested on staging",
            "resolved",
        ]),
        prop::sample::select(vec!["Bug", "Enhancement", "New Feature", "Task"]),
        ".{0,60}",
        ".{0,120}",
        prop::option::of(0i64..400),
        any::<bool>(),
    )
        .prop_map(
            |(id, module, priority, status, kind, title, description, age_days, is_closed)| {
                Issue {
                    id,
                    module: module.to_string(),
                    priority: priority.to_string(),
                    status: status.to_string(),
                    kind: kind.to_string(),
                    module_norm: module.to_string(),
                    priority_norm: priority.to_string(),
                    status_norm: status.to_string(),
                    kind_norm: kind.to_string(),
                    title,
                    description,
                    log: String::new(),
                    date: None,
                    age_days,
                    links: Vec::new(),
                    keywords: Vec::new(),
                    category: String::new(),
                    risk_score: 0.0,
                    severity: 1,
                    impact: 1,
                    urgency: 1,
                    is_closed,
                }
            },
        )
}

proptest! {
    #[test]
    fn bounded_risk_is_clamped_with_one_decimal(issue in arb_issue()) {
        let b = BoundedScale.score(&issue);
        prop_assert!((1.0..=10.0).contains(&b.total));
        // at most one decimal digit
        let scaled = b.total * 10.0;
        prop_assert!((scaled - scaled.round()).abs() < 1e-9);
        prop_assert!((1..=3).contains(&b.severity));
        prop_assert!((1..=3).contains(&b.impact));
        prop_assert!((1..=3).contains(&b.urgency));
    }

    #[test]
    fn weighted_risk_stays_in_documented_ranges(issue in arb_issue()) {
        let b = WeightedDimensions.score(&issue);
        prop_assert!((0.0..=24.0).contains(&b.total));
        prop_assert_eq!(b.total, b.total.round());
        for dim in [
            Some(b.severity),
            Some(b.impact),
            Some(b.urgency),
            b.technical,
            b.business,
            b.operational,
            b.time,
        ] {
            let d = dim.unwrap_or(1);
            prop_assert!((1..=6).contains(&d));
        }
        prop_assert!(b.technical.unwrap_or(1) >= b.severity);
        prop_assert!(b.business.unwrap_or(1) >= b.impact);
        prop_assert!(b.time.unwrap_or(1) >= b.urgency);
    }

    #[test]
    fn scoring_is_deterministic(issue in arb_issue()) {
        prop_assert_eq!(BoundedScale.score(&issue), BoundedScale.score(&issue));
        prop_assert_eq!(WeightedDimensions.score(&issue), WeightedDimensions.score(&issue));
    }

    #[test]
    fn tokens_are_meaningful(text in ".{0,200}") {
        for tok in tokenize::tokenize(&text) {
            prop_assert!(tok.len() >= 3);
            prop_assert!(!tok.chars().all(|c| c.is_ascii_digit()));
            prop_assert!(!tokenize::STOPWORDS.contains(&tok.as_str()));
            prop_assert_eq!(tok.to_lowercase(), tok.clone());
        }
    }
}
