//! Read-side dashboard commands: summary, query, triage, trends,
//! clusters, and the per-issue deep profile.

use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use serde_json::json;
use tabled::{Table, Tabled};

use crate::cli::{
    AppContext, ClustersArgs, ProfileArgs, QueryArgs, SummaryArgs, TrendsArgs, TriageArgs,
};
use crate::cli_ext::common::{load_dataset, paint_risk, print_empty_state};
use crate::core::model::Issue;
use crate::core::risk::{RiskStrategy, WeightedDimensions};
use crate::core::{classify, dataset, query, trends, triage};

pub fn summary_run(args: SummaryArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;
    if data.issues.is_empty() {
        print_empty_state();
        return Ok(());
    }

    let kpis = dataset::kpis(&data.issues);
    let clusters = classify::cluster(&data.issues);
    let themes = trends::analyze(&data.issues);

    if args.json {
        let payload = json!({
            "synced_at": data.synced_at,
            "kpis": kpis,
            "clusters": clusters,
            "trends": themes,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    if let Some(at) = data.synced_at {
        println!("Last sync: {}", at.to_rfc3339());
    }
    if let Some(search) = data.store.load_filters().unwrap_or_default().search {
        println!("Last query: {search}");
    }
    println!(
        "{} issues · {} open · {} closed · avg open risk {} · {} high-risk",
        kpis.total,
        kpis.open,
        kpis.closed,
        paint_risk(kpis.avg_open_risk, ctx.no_color),
        kpis.high_risk_open
    );

    #[derive(Tabled)]
    struct BreakdownRow {
        name: String,
        open: usize,
    }

    println!("\n{}", "Open issues by module".bold());
    let rows: Vec<BreakdownRow> = kpis
        .modules
        .iter()
        .map(|(name, open)| BreakdownRow { name: name.clone(), open: *open })
        .collect();
    println!("{}", Table::new(rows));

    println!("\n{}", "Open issues by priority".bold());
    let rows: Vec<BreakdownRow> = kpis
        .priorities
        .iter()
        .map(|(name, open)| BreakdownRow { name: name.clone(), open: *open })
        .collect();
    println!("{}", Table::new(rows));

    #[derive(Tabled)]
    struct ExposureRow {
        module: String,
        open: usize,
        high_risk: usize,
    }

    println!("\n{}", "Module risk exposure".bold());
    let rows: Vec<ExposureRow> = dataset::riskiest_modules(&data.issues)
        .into_iter()
        .map(|(module, open, high_risk)| ExposureRow { module, open, high_risk })
        .collect();
    println!("{}", Table::new(rows));

    if !clusters.is_empty() {
        println!("\n{}", "Thematic clusters".bold());
        print_clusters(&clusters);
    }
    if !themes.emerging.is_empty() || !themes.stable.is_empty() {
        println!("\n{}", "Themes".bold());
        print_trends(&themes);
    }
    Ok(())
}

pub fn query_run(args: QueryArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;
    if data.issues.is_empty() {
        print_empty_state();
        return Ok(());
    }

    let parsed = query::parse(&args.query);
    let hits = query::run(&data.issues, &parsed, now);
    let shown: Vec<&&Issue> = hits.iter().take(args.limit).collect();

    // Remember the last query line, best effort, like the dashboard's
    // persisted filter selections.
    let mut filters = data.store.load_filters().unwrap_or_default();
    filters.search = Some(args.query.clone());
    let _ = data.store.save_filters(&filters);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    #[derive(Tabled)]
    struct IssueRow {
        id: String,
        module: String,
        priority: String,
        status: String,
        risk: String,
        title: String,
    }

    let rows: Vec<IssueRow> = shown
        .iter()
        .map(|i| IssueRow {
            id: i.id.clone(),
            module: i.module_norm.clone(),
            priority: i.priority_norm.clone(),
            status: i.status_norm.clone(),
            risk: paint_risk(i.risk_score, ctx.no_color),
            title: truncate(&i.title, 48),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!("{} of {} matching issues", shown.len(), hits.len());
    Ok(())
}

pub fn triage_run(args: TriageArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;
    if data.issues.is_empty() {
        print_empty_state();
        return Ok(());
    }

    let queue = triage::build_queue(&data.issues);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&queue)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }
    if queue.is_empty() {
        println!("Nothing flagged: metadata and risk agree.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct TriageRow {
        id: String,
        risk: String,
        age: String,
        reasons: String,
        title: String,
    }

    let rows: Vec<TriageRow> = queue
        .iter()
        .map(|e| TriageRow {
            id: e.id.clone(),
            risk: paint_risk(e.risk_score, ctx.no_color),
            age: e.age_days.map(|a| format!("{a}d")).unwrap_or_else(|| "-".to_string()),
            reasons: e.reasons.join("; "),
            title: truncate(&e.title, 40),
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

pub fn trends_run(args: TrendsArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;
    if data.issues.is_empty() {
        print_empty_state();
        return Ok(());
    }

    let themes = trends::analyze(&data.issues);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&themes)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }
    print_trends(&themes);
    Ok(())
}

pub fn clusters_run(args: ClustersArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;
    if data.issues.is_empty() {
        print_empty_state();
        return Ok(());
    }

    let clusters = classify::cluster(&data.issues);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&clusters)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }
    print_clusters(&clusters);
    Ok(())
}

pub fn profile_run(args: ProfileArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;
    if data.issues.is_empty() {
        print_empty_state();
        return Ok(());
    }

    let Some(issue) = data.issues.iter().find(|i| i.id == args.id) else {
        println!("No issue with id {}", args.id);
        return Ok(());
    };

    let deep = WeightedDimensions.score(issue);
    let labels = classify::ranked_labels(&issue.text_lower());

    if args.json {
        let payload = json!({
            "id": issue.id,
            "title": issue.title,
            "dashboard_risk": issue.risk_score,
            "weighted_total": deep.total,
            "dimensions": {
                "severity": deep.severity,
                "impact": deep.impact,
                "urgency": deep.urgency,
                "technical": deep.technical,
                "business": deep.business,
                "operational": deep.operational,
                "time": deep.time,
            },
            "reasons": deep.reasons,
            "labels": labels.iter().map(|(l, n)| json!({"label": l, "hits": n})).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    println!("{} · {}", issue.id.bold(), issue.title);
    println!(
        "dashboard risk {} · weighted total {} / 24",
        paint_risk(issue.risk_score, ctx.no_color),
        deep.total
    );
    println!(
        "severity {} · impact {} · urgency {} · technical {} · business {} · operational {} · time {}",
        deep.severity,
        deep.impact,
        deep.urgency,
        deep.technical.unwrap_or(1),
        deep.business.unwrap_or(1),
        deep.operational.unwrap_or(1),
        deep.time.unwrap_or(1),
    );
    if !deep.reasons.is_empty() {
        println!("reasons: {}", deep.reasons.join("; "));
    }
    if !labels.is_empty() {
        let rendered: Vec<String> =
            labels.iter().map(|(l, n)| format!("{l} ({n})")).collect();
        println!("labels: {}", rendered.join(", "));
    }
    Ok(())
}

fn print_clusters(clusters: &[classify::Cluster]) {
    #[derive(Tabled)]
    struct ClusterRow {
        bucket: String,
        issues: usize,
        representatives: String,
    }

    let rows: Vec<ClusterRow> = clusters
        .iter()
        .map(|c| ClusterRow {
            bucket: c.name.to_string(),
            issues: c.total,
            representatives: c.members.join(", "),
        })
        .collect();
    println!("{}", Table::new(rows));
}

fn print_trends(themes: &trends::Trends) {
    #[derive(Tabled)]
    struct TrendRow {
        kind: String,
        term: String,
        newer: usize,
        older: usize,
    }

    let rows: Vec<TrendRow> = themes
        .emerging
        .iter()
        .map(|t| ("emerging", t))
        .chain(themes.stable.iter().map(|t| ("stable", t)))
        .map(|(kind, t)| TrendRow {
            kind: kind.to_string(),
            term: t.term.clone(),
            newer: t.new_count,
            older: t.old_count,
        })
        .collect();
    if rows.is_empty() {
        println!("Not enough dated issues to compare windows.");
        return;
    }
    println!("{}", Table::new(rows));
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
