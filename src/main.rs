//! netrisk-nexus CLI
//!
//! Drive the clearing network simulation from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Autoplay until an AI alert pauses the market (or 30 ticks pass)
//! netrisk-nexus run --ticks 30 --seed 42
//!
//! # Same, as JSON snapshots
//! netrisk-nexus run --ticks 30 --seed 42 --format json
//!
//! # Scripted alert -> crash -> recovery walkthrough
//! netrisk-nexus scenario --seed 7
//!
//! # Graphviz market map
//! netrisk-nexus map --seed 7 > market.dot
//! ```

use netrisk_nexus::ccp::waterfall::WaterfallReport;
use netrisk_nexus::graph::market_map::MarketMap;
use netrisk_nexus::simulation::command::Command;
use netrisk_nexus::simulation::config::SimulationConfig;
use netrisk_nexus::simulation::engine::{MarketSnapshot, SimulationEngine};
use netrisk_nexus::simulation::runner::Runner;
use std::fs;
use std::process;
use std::time::Duration;

fn print_usage() {
    eprintln!(
        r#"netrisk-nexus — clearing network and CCP default waterfall simulator

USAGE:
    netrisk-nexus <COMMAND> [OPTIONS]

COMMANDS:
    run         Autoplay the market until an AI alert or the tick budget
    scenario    Walk one entity through alert, default and recovery
    map         Print the bank/entity market map as Graphviz DOT
    help        Show this message

OPTIONS:
    --config <FILE>       JSON simulation config (missing fields use defaults)
    --seed <N>            RNG seed (overrides the config)
    --ticks <N>           Tick budget for run (default: 30)
    --interval-ms <MS>    Pause between ticks (default: from config)
    --format <FORMAT>     Output format: text (default) or json

EXAMPLES:
    netrisk-nexus run --ticks 50 --seed 42 --interval-ms 0
    netrisk-nexus scenario --seed 7 --format json
    netrisk-nexus map --seed 7"#
    );
}

struct Options {
    config: SimulationConfig,
    ticks: u64,
    interval_ms: Option<u64>,
    json: bool,
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn load_config(path: &str) -> SimulationConfig {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("Error reading config '{}': {}", path, e)));
    serde_json::from_str(&content).unwrap_or_else(|e| fail(format!("Error parsing config: {}", e)))
}

fn parse_options(args: &[String]) -> Options {
    let mut config_path = None;
    let mut seed = None;
    let mut ticks = 30u64;
    let mut interval_ms = None;
    let mut format = "text".to_string();

    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i + 1)
                .cloned()
                .unwrap_or_else(|| fail(format!("{} requires a value", args[i])))
        };
        let number = |i: usize| -> u64 {
            value(i)
                .parse()
                .unwrap_or_else(|_| fail(format!("{} requires a number", args[i])))
        };
        match args[i].as_str() {
            "--config" => config_path = Some(value(i)),
            "--seed" => seed = Some(number(i)),
            "--ticks" => ticks = number(i),
            "--interval-ms" => interval_ms = Some(number(i)),
            "--format" => format = value(i),
            other => fail(format!("Unknown option: {}", other)),
        }
        i += 2;
    }

    let mut config = config_path
        .as_deref()
        .map(load_config)
        .unwrap_or_default();
    if seed.is_some() {
        config.seed = seed;
    }
    if format != "text" && format != "json" {
        fail("--format requires 'text' or 'json'");
    }

    Options {
        config,
        ticks,
        interval_ms,
        json: format == "json",
    }
}

fn build_engine(config: SimulationConfig) -> SimulationEngine {
    SimulationEngine::new(config).unwrap_or_else(|e| fail(format!("Error: {}", e)))
}

fn print_snapshot(snapshot: &MarketSnapshot) {
    println!("=== Iteration {} ({}) ===", snapshot.iteration, snapshot.clock_state);
    println!("System Status: {}", snapshot.system_status);
    println!(
        "Risk Score:    {:.1}/10  ({})",
        snapshot.risk_score, snapshot.sentiment
    );
    println!("Global Margin: {}%", snapshot.global_margin_rate);
    println!(
        "CCP Stress:    {}  (default fund drawn: \u{20b9}{} Cr)",
        snapshot.ccp_stress, snapshot.default_fund_drawn
    );

    println!("\nInstitutional Monitor:");
    for e in &snapshot.entities {
        println!(
            "  {:<14} {:<20} loan \u{20b9}{} Cr | margin \u{20b9}{} Cr | collateral \u{20b9}{} Cr{}",
            e.id().to_string(),
            e.status().to_string(),
            e.exposure(),
            e.margin(),
            e.collateral(),
            if e.alert_flag() { "  [AI ALERT]" } else { "" }
        );
        println!("  {:<14} {}", "", e.news());
    }

    println!("\nLive Feed:");
    for line in &snapshot.log {
        println!("  {}", line);
    }
}

fn print_report(report: &WaterfallReport) {
    println!("=== Waterfall: {} ===", report.entity);
    println!("Exposure:          {}", report.exposure);
    println!("Margin applied:    {}", report.margin_applied);
    println!("Remaining debt:    {}", report.remaining_debt);
    println!("Assets sold (90%): {}", report.assets_sold_value);
    println!("Final gap:         {}", report.final_gap);
    println!("Default fund draw: {}", report.default_fund_draw);
    println!("Outcome:           {}", report.outcome);
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(format!("Error encoding JSON: {}", e)))
}

fn cmd_run(args: &[String]) {
    let opts = parse_options(args);
    let mut engine = build_engine(opts.config);
    let runner = match opts.interval_ms {
        Some(ms) => Runner::new(Duration::from_millis(ms)),
        None => Runner::from_engine(&engine),
    };

    engine.execute(Command::Start).unwrap_or_else(|e| fail(e));
    let summary = runner.run(&mut engine, Some(opts.ticks));
    let snapshot = engine.snapshot();

    if opts.json {
        println!("{}", to_json(&snapshot));
    } else {
        print_snapshot(&snapshot);
        println!(
            "\nRan {} ticks, {} AI alerts, stopped: {:?}",
            summary.ticks.len(),
            summary.alerts(),
            summary.stop
        );
    }
}

fn cmd_scenario(args: &[String]) {
    let opts = parse_options(args);
    let mut engine = build_engine(opts.config);

    // Scan the oldest entity so the walkthrough does not depend on the dice.
    let target = engine.pool().ids()[0].clone();
    let alert = engine
        .risk_scan(&target)
        .unwrap_or_else(|e| fail(format!("Error: {}", e)));
    let before_crash = engine.snapshot();

    engine
        .execute(Command::Crash(target.clone()))
        .unwrap_or_else(|e| fail(format!("Error: {}", e)));
    let after_crash = engine.snapshot();

    let report = engine
        .recover(&target)
        .unwrap_or_else(|e| fail(format!("Error: {}", e)));
    let after_recovery = engine.snapshot();

    if opts.json {
        #[derive(serde::Serialize)]
        struct ScenarioOutput<'a> {
            alert: &'a netrisk_nexus::simulation::engine::RiskAlert,
            after_alert: &'a MarketSnapshot,
            after_crash: &'a MarketSnapshot,
            waterfall: &'a WaterfallReport,
            after_recovery: &'a MarketSnapshot,
        }
        println!(
            "{}",
            to_json(&ScenarioOutput {
                alert: &alert,
                after_alert: &before_crash,
                after_crash: &after_crash,
                waterfall: &report,
                after_recovery: &after_recovery,
            })
        );
    } else {
        println!(
            "AI alert on {}: margin raised to {:.1}% (\u{20b9}{} Cr)\n",
            alert.entity, alert.assessment.recommended_margin_percent, alert.new_margin
        );
        print_snapshot(&after_crash);
        println!();
        print_report(&report);
        println!();
        print_snapshot(&after_recovery);
    }
}

fn cmd_map(args: &[String]) {
    let opts = parse_options(args);
    let mut engine = build_engine(opts.config);
    let snapshot = engine.snapshot();
    let map = MarketMap::from_snapshot(&snapshot, engine.rng_mut());
    println!("{}", map.to_dot());
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "run" => cmd_run(rest),
        "scenario" => cmd_scenario(rest),
        "map" => cmd_map(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
