//! health_sim - Headless crew health simulation harness
//!
//! Loads a scenario, prints design estimates for its vessels, runs the tick
//! driver over the requested span and reports where everybody ended up.
//!
//! ```bash
//! # Run the bundled scenario for 30 days
//! health_sim
//!
//! # Custom scenario, 6-hour ticks, JSON output
//! health_sim --scenario outpost.toml --days 90 --step 0.25 --json
//! ```

mod scenario;

use clap::Parser;
use health_core::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use scenario::{Scenario, ScenarioError};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "health_sim")]
#[command(about = "Run crew health scenarios and print forecasts")]
#[command(version)]
struct Args {
    /// Scenario file, the bundled sample if left out
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Days to simulate
    #[arg(short, long, default_value = "30")]
    days: f64,

    /// Days per tick
    #[arg(long, default_value = "1")]
    step: f64,

    /// Seed for random events
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Compare the closed-form forecast against step-by-step integration
    #[arg(long)]
    verify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where one crew member stands at the end of the run
#[derive(Debug, Serialize)]
struct CrewSummary {
    name: String,
    hp: f64,
    max_hp: f64,
    conditions: Vec<ConditionKind>,
    change_per_day: Option<f64>,
    balance_hp: Option<f64>,
    time_to_next_condition: Option<f64>,
}

/// Forecast drift between the closed form and Euler integration
#[derive(Debug, Serialize)]
struct Verification {
    name: String,
    closed_form: f64,
    integrated: f64,
}

#[derive(Debug, Serialize)]
struct RunReport {
    scenario: String,
    days: f64,
    estimates: Vec<HealthReport>,
    crew: Vec<CrewSummary>,
    sickness_events: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    verification: Vec<Verification>,
}

const VERIFY_DAYS: f64 = 10.0;
const VERIFY_STEPS: u32 = 10_000;

fn load(args: &Args) -> Result<Scenario, ScenarioError> {
    match &args.scenario {
        Some(path) => Scenario::load(path),
        None => Scenario::parse(include_str!("../scenarios/sample.toml")),
    }
}

fn run(args: &Args, scenario: &Scenario) -> Result<RunReport, ScenarioError> {
    let loaded = scenario.build()?;
    let mut sim = loaded.simulation;
    let mut pool = loaded.pool;
    let settings = sim.settings.clone();
    let day_length = settings.general.day_length;

    // Design estimates for every vessel, as they would look before launch
    let estimates: Vec<HealthReport> = sim
        .vessels()
        .iter()
        .map(|v| estimate_vessel(v, &sim.roster, &sim.factors, EstimateOptions::default(), &settings))
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let step = args.step.max(1e-3);
    let mut now = scenario.start;
    let end = scenario.start + args.days * day_length;
    let mut sickness_events = 0;

    sim.tick(now, &mut pool);
    while now < end {
        now = (now + step * day_length).min(end);

        for (resource, per_second) in &loaded.generation {
            pool.add(resource, per_second * step * day_length);
        }

        let result = sim.tick(now, &mut pool);
        for crew in &result.crew {
            debug!("{}: {:.1} HP ({:+.2}/day)", crew.name, crew.hp, crew.change_per_day);
            if crew.exhaustion == Some(true) {
                warn!("{} is exhausted.", crew.name);
            }
        }
        if !result.starving_modules.is_empty() {
            info!("Modules out of resource: {:?}", result.starving_modules);
        }

        // New sickness starts at the tick boundary and counts from the next tick
        let chance = (scenario.events.sickness_chance * step).clamp(0.0, 1.0);
        let sick_for = scenario.events.sickness_days * day_length;
        sickness_events += roll_sickness(&mut sim, &mut rng, chance, now, sick_for)?;
    }

    let mut crew = Vec::new();
    let mut verification = Vec::new();
    for state in sim.roster.iter() {
        let change = state.last_change();
        if args.verify {
            if let Some(change) = change {
                let model = state.model(change);
                verification.push(Verification {
                    name: state.name.clone(),
                    closed_form: model.hp_at(state.hp(), VERIFY_DAYS),
                    integrated: model.integrate_euler(state.hp(), VERIFY_DAYS, VERIFY_STEPS),
                });
            }
        }
        crew.push(CrewSummary {
            name: state.name.clone(),
            hp: state.hp(),
            max_hp: state.max_hp(),
            conditions: state.conditions().map(|c| c.kind).collect(),
            change_per_day: change.map(|c| state.hp_change_per_day(c)),
            balance_hp: change.and_then(|c| state.balance_hp(c)),
            time_to_next_condition: change.and_then(|c| state.time_to_next_condition(c, &settings)),
        });
    }

    Ok(RunReport {
        scenario: scenario.name.clone(),
        days: args.days,
        estimates,
        crew,
        sickness_events,
        verification,
    })
}

/// Make each healthy crew member sick with probability `chance`
///
/// Returns how many fell sick.
fn roll_sickness(
    sim: &mut HealthSimulation,
    rng: &mut impl Rng,
    chance: f64,
    now: f64,
    duration: f64,
) -> Result<u32, ScenarioError> {
    let ids: Vec<CrewId> = sim
        .roster
        .iter()
        .filter(|c| !c.has_condition(ConditionKind::Sick))
        .map(|c| c.id.clone())
        .collect();
    let mut events = 0;
    for id in ids {
        if rng.gen_bool(chance) {
            sim.roster
                .add_condition(&id, ConditionKind::Sick, now, Some(now + duration))?;
            events += 1;
        }
    }
    Ok(events)
}

fn opt(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}{}", v, unit))
}

fn print_text(report: &RunReport) {
    println!("Scenario: {} ({} days)", report.scenario, report.days);
    println!();
    println!("Design estimates:");
    for estimate in &report.estimates {
        print!("{}", estimate);
    }
    println!();
    println!("After {} days ({} sickness events):", report.days, report.sickness_events);
    for crew in &report.crew {
        let conditions: Vec<&str> = crew.conditions.iter().map(|c| c.name()).collect();
        println!(
            "  {:<16} {:>6.1}/{:<6.1} {:>9} HP/day  balance {:>6}  next condition {:>8}  [{}]",
            crew.name,
            crew.hp,
            crew.max_hp,
            opt(crew.change_per_day, ""),
            opt(crew.balance_hp, ""),
            opt(crew.time_to_next_condition, " d"),
            conditions.join(", ")
        );
    }
    if !report.verification.is_empty() {
        println!();
        println!("Forecast check over {} days:", VERIFY_DAYS);
        for check in &report.verification {
            println!(
                "  {:<16} closed form {:>8.3}  integrated {:>8.3}  diff {:.2e}",
                check.name,
                check.closed_form,
                check.integrated,
                (check.closed_form - check.integrated).abs()
            );
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let report = match load(&args).and_then(|scenario| run(&args, &scenario)) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_text(&report);
    }
    ExitCode::SUCCESS
}
