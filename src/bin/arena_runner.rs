//! Headless Arena Runner
//!
//! Runs seeded NPC battles without a host game and prints a JSON summary,
//! which makes regression runs and tuning sweeps scriptable.

use clap::Parser;
use serde::Serialize;

use iron_arena::core::config::EngineConfig;
use iron_arena::core::types::DecisionEvent;
use iron_arena::personality::profile::{load_profile, ArchetypeProfile};
use iron_arena::sim::scenario::{Loadout, Scenario};

/// Headless Arena Runner - seeded NPC battles with a machine-readable summary
#[derive(Parser, Debug)]
#[command(name = "arena_runner")]
#[command(about = "Run a seeded NPC arena battle and output a summary")]
struct Args {
    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks before the run stops
    #[arg(long, default_value_t = 600)]
    max_ticks: u64,

    /// Seconds of simulated time per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Player bodies standing in for human tanks
    #[arg(long, default_value_t = 1)]
    players: usize,

    #[arg(long, default_value_t = 2)]
    hunters: usize,

    #[arg(long, default_value_t = 1)]
    guards: usize,

    #[arg(long, default_value_t = 1)]
    assassins: usize,

    #[arg(long, default_value_t = 1)]
    caravans: usize,

    /// Circular terrain obstacles scattered over the field
    #[arg(long, default_value_t = 6)]
    obstacles: usize,

    /// Half-extent of the square field
    #[arg(long, default_value_t = 50.0)]
    field: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every decision event as it happens
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks_run: u64,
    shots_fired: u64,
    targets_assigned: u64,
    state_changes: u64,
    circuits_completed: u64,
    agents_disabled: u64,
    npc_survivors: usize,
    player_survivors: usize,
    scores: Vec<ScoreLine>,
}

#[derive(Serialize)]
struct ScoreLine {
    agent: String,
    points: i32,
}

fn load_or_fallback(name: &str) -> ArchetypeProfile {
    load_profile(name).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load archetype profile '{}': {}", name, e);
        eprintln!("Using built-in defaults");
        ArchetypeProfile::fallback(name)
    })
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::WARN.into()
                },
            ),
        )
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);
    let loadout = Loadout {
        player: ArchetypeProfile::fallback("player").stats(),
        hunter: load_or_fallback("hunter").stats(),
        guard: load_or_fallback("guard").stats(),
        assassin: load_or_fallback("assassin").stats(),
        caravan: load_or_fallback("caravan").stats(),
    };
    let scenario = Scenario {
        seed,
        field_half_extent: args.field,
        players: args.players,
        hunters: args.hunters,
        guards: args.guards,
        assassins: args.assassins,
        caravans: args.caravans,
        obstacles: args.obstacles,
    };

    let mut world = scenario
        .build(EngineConfig::default(), args.dt, &loadout)
        .expect("scenario assembly failed");

    let mut targets_assigned = 0u64;
    let mut state_changes = 0u64;
    let mut circuits_completed = 0u64;
    let mut agents_disabled = 0u64;

    let startup = world.startup_events();
    for event in &startup {
        if matches!(event, DecisionEvent::AgentDisabled { .. }) {
            agents_disabled += 1;
        }
        if args.verbose {
            eprintln!("  [startup] {:?}", event);
        }
    }

    let mut ticks_run = 0u64;
    while ticks_run < args.max_ticks {
        let events = world.run_tick();
        for event in &events {
            match event {
                DecisionEvent::TargetAssigned { .. } => targets_assigned += 1,
                DecisionEvent::StateChanged { .. } => state_changes += 1,
                DecisionEvent::CircuitCompleted { .. } => circuits_completed += 1,
                DecisionEvent::AgentDisabled { .. } => agents_disabled += 1,
            }
            if args.verbose {
                eprintln!("  [{}] {:?}", world.tick(), event);
            }
        }
        ticks_run += 1;

        let npcs_standing = world.arena.iter().any(|a| a.alive && a.is_npc());
        if !npcs_standing {
            break;
        }
    }

    let mut scores: Vec<_> = world
        .scores
        .iter()
        .map(|(id, points)| (*id, *points))
        .collect();
    scores.sort_by_key(|(id, _)| *id);

    let result = RunSummary {
        seed,
        ticks_run,
        shots_fired: world.controller.cannon().total_fired(),
        targets_assigned,
        state_changes,
        circuits_completed,
        agents_disabled,
        npc_survivors: world.arena.iter().filter(|a| a.alive && a.is_npc()).count(),
        player_survivors: world
            .arena
            .iter()
            .filter(|a| a.alive && a.player_controlled)
            .count(),
        scores: scores
            .into_iter()
            .map(|(agent, points)| ScoreLine {
                agent: agent.to_string(),
                points,
            })
            .collect(),
    };

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
        "text" => {
            println!("Arena Run");
            println!("=========");
            println!("Seed: {}", result.seed);
            println!("Ticks: {}", result.ticks_run);
            println!("Shots fired: {}", result.shots_fired);
            println!("Targets assigned: {}", result.targets_assigned);
            println!("State changes: {}", result.state_changes);
            println!("Circuits completed: {}", result.circuits_completed);
            println!("Agents disabled: {}", result.agents_disabled);
            println!(
                "Survivors: {} npc, {} player",
                result.npc_survivors, result.player_survivors
            );
            for line in &result.scores {
                println!("  {} earned {} points", line.agent, line.points);
            }
        }
        _ => {
            eprintln!("Unknown format '{}', defaulting to json", args.format);
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        }
    }
}
