//! Calendar commands: event add/list/remove, release assignments, and
//! the slot planner.

use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled};
use tracing::info;

use crate::cli::{
    AppContext, AssignArgs, EventAddArgs, EventArgs, EventListArgs, EventRemoveArgs,
    EventSubcommand, PlanArgs,
};
use crate::cli_ext::common::{load_dataset, paint_risk};
use crate::core::events::{self, EventDraft};
use crate::core::model::EventEnv;
use crate::core::planner::{self, SlotContext};

pub fn run(args: EventArgs, ctx: &AppContext) -> Result<()> {
    match args.command {
        EventSubcommand::Add(add) => add_run(add, ctx),
        EventSubcommand::List(list) => list_run(list, ctx),
        EventSubcommand::Remove(remove) => remove_run(remove, ctx),
    }
}

fn add_run(args: EventAddArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;

    let draft = EventDraft {
        title: args.title,
        kind: args.kind.into(),
        env: args.env.into(),
        status: args.status,
        owner: args.owner,
        description: args.description,
        modules: args.modules,
        impact_type: args.impact.into(),
        issue_id: args.issue,
        start: Some(args.start),
        end: args.end,
        all_day: args.all_day,
    };

    // Validation failures surface as a message, not a crash.
    let mut event = match events::build_event(draft) {
        Ok(event) => event,
        Err(err) => {
            eprintln!("{} {err}", "✗".red());
            return Ok(());
        }
    };
    event.risk_score = events::compute_event_risk(&event, &data.issues);

    if ctx.dry_run {
        if !ctx.quiet {
            println!("DRY RUN: Would add event '{}' at {}", event.title, event.start.to_rfc3339());
        }
        return Ok(());
    }

    let mut all = data.store.load_events()?;
    all.push(event.clone());
    data.store.save_events(&all)?;
    info!(id = %event.id, risk = event.risk_score, "event added");

    if !ctx.quiet {
        println!(
            "{} {} ({}) risk {}",
            "✓".green(),
            event.id,
            event.title,
            paint_risk(event.risk_score, ctx.no_color)
        );
    }
    Ok(())
}

fn list_run(args: EventListArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;

    let mut all = data.store.load_events()?;
    for event in &mut all {
        event.risk_score = events::compute_event_risk(event, &data.issues);
    }
    let colliding = events::colliding_ids(&all);

    if args.json {
        let payload = serde_json::json!({
            "events": all,
            "colliding": colliding,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }
    if all.is_empty() {
        println!("No events scheduled.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct EventRow {
        id: String,
        title: String,
        #[tabled(rename = "type")]
        kind: String,
        env: String,
        start: String,
        risk: String,
        collision: String,
    }

    let rows: Vec<EventRow> = all
        .iter()
        .map(|e| EventRow {
            id: e.id.clone(),
            title: e.title.clone(),
            kind: e.kind.to_string(),
            env: e.env.to_string(),
            start: e.start.to_rfc3339(),
            risk: paint_risk(e.risk_score, ctx.no_color),
            collision: if colliding.contains(&e.id) { "!".to_string() } else { String::new() },
        })
        .collect();
    println!("{}", Table::new(rows));
    Ok(())
}

fn remove_run(args: EventRemoveArgs, ctx: &AppContext) -> Result<()> {
    let cfg = crate::infra::config::load_config().unwrap_or_default();
    let store = crate::infra::store::Store::new(&cfg.data_dir);

    let mut all = store.load_events()?;
    let before = all.len();
    all.retain(|e| e.id != args.id);
    if all.len() == before {
        println!("No event with id {}", args.id);
        return Ok(());
    }

    if ctx.dry_run {
        if !ctx.quiet {
            println!("DRY RUN: Would remove event {}", args.id);
        }
        return Ok(());
    }

    store.save_events(&all)?;
    if !ctx.quiet {
        println!("{} removed {}", "✓".green(), args.id);
    }
    Ok(())
}

pub fn assign_run(args: AssignArgs, ctx: &AppContext) -> Result<()> {
    let cfg = crate::infra::config::load_config().unwrap_or_default();
    let store = crate::infra::store::Store::new(&cfg.data_dir);

    let ids: Vec<String> =
        args.issues.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();

    if ctx.dry_run {
        if !ctx.quiet {
            println!("DRY RUN: Would assign {} issues to {}", ids.len(), args.release);
        }
        return Ok(());
    }

    let total = store.assign(&args.release, &ids)?;
    if !ctx.quiet {
        println!("{} {} now has {} assigned issues", "✓".green(), args.release, total);
    }
    Ok(())
}

pub fn plan_run(args: PlanArgs, ctx: &AppContext) -> Result<()> {
    let now = Utc::now();
    let data = load_dataset(now)?;

    let env: EventEnv = match args.env {
        Some(arg) => arg.into(),
        None => EventEnv::from_raw(&data.config.planner.default_env),
    };
    let slot_ctx = SlotContext {
        env,
        release_type: args.release_type.into(),
        modules: args
            .modules
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect(),
        description: args.description,
        horizon_days: args.horizon.unwrap_or(data.config.planner.horizon_days),
        max_per_day: args.per_day.unwrap_or(data.config.planner.max_slots_per_day),
    };

    let events = data.store.load_events()?;
    let slots = planner::suggest_slots(&slot_ctx, &data.issues, &events, now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&slots)?);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }
    if slots.is_empty() {
        println!("No candidate slots in the horizon.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct SlotRow {
        start: String,
        score: String,
        notes: String,
    }

    let rows: Vec<SlotRow> = slots
        .iter()
        .map(|s| SlotRow {
            start: s.start.format("%a %Y-%m-%d %H:%M").to_string(),
            score: format!("{:.1}", s.score),
            notes: s.notes.join("; "),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!("Lower score = safer. Env {} · {} release.", env, slot_ctx.release_type);
    Ok(())
}
