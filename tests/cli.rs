use clap::Parser;
use opsdeck::cli::{Cli, Commands, PlanArgs, QueryArgs};

#[test]
fn query_flag_parsing() {
    // Given
    let argv = vec![
        "opd",
        "query",
        "module:reporting risk>=8 last:7d sort:risk",
        "--json",
        "--limit",
        "10",
    ];

    // When
    let cmd = Cli::parse_from(argv);

    // Then
    match cmd.command {
        Commands::Query(QueryArgs { query, json, limit }) => {
            assert_eq!(query, "module:reporting risk>=8 last:7d sort:risk");
            assert!(json);
            assert_eq!(limit, 10);
        }
        _ => panic!("expected Query command"),
    }
}

#[test]
fn plan_flag_parsing() {
    let argv = vec![
        "opd",
        "plan",
        "--env",
        "prod",
        "--release-type",
        "major",
        "--modules",
        "Reporting,Checklist",
        "--horizon",
        "5",
        "--per-day",
        "1",
    ];

    let cmd = Cli::parse_from(argv);

    match cmd.command {
        Commands::Plan(PlanArgs { env, horizon, per_day, modules, .. }) => {
            assert!(env.is_some());
            assert_eq!(horizon, Some(5));
            assert_eq!(per_day, Some(1));
            assert_eq!(modules, "Reporting,Checklist");
        }
        _ => panic!("expected Plan command"),
    }
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cmd = Cli::parse_from(vec!["opd", "summary", "--quiet", "--no-color"]);
    assert!(cmd.quiet);
    assert!(cmd.no_color);
    assert!(matches!(cmd.command, Commands::Summary(_)));
}

#[test]
fn event_add_requires_title_and_start() {
    let err = Cli::try_parse_from(vec!["opd", "event", "add", "--title", "Deploy"]);
    assert!(err.is_err()); // --start missing

    let ok = Cli::try_parse_from(vec![
        "opd", "event", "add", "--title", "Deploy", "--start", "2026-03-01 22:00",
    ]);
    assert!(ok.is_ok());
}
