#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Overmind fleets against each other locally.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use overmind_cli::{run_match, MatchSummary, ScenarioConfig};

/// Overmind fleet controller
#[derive(Parser, Debug)]
#[command(name = "overmind")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a full match on a seeded map
    Run {
        /// Scenario file (TOML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of turns
        #[arg(short, long)]
        turns: Option<u32>,

        /// Override the scenario seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Entry point for the Overmind command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Run {
            config,
            turns,
            seed,
            json,
        } => run(config, turns, seed, json),
    }
}

fn run(config: Option<PathBuf>, turns: Option<u32>, seed: Option<u64>, json: bool) -> Result<()> {
    let mut scenario = match config {
        Some(path) => ScenarioConfig::load(&path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if let Some(turns) = turns {
        scenario.rules.max_turns = turns;
    }
    if let Some(seed) = seed {
        scenario.seed = seed;
    }

    let summary = run_match(&scenario).context("simulating match")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &MatchSummary) {
    println!("turns played: {}", summary.turns);
    for player in &summary.players {
        println!(
            "player {}: banked {} ({} ships alive, {} spawned)",
            player.player, player.banked, player.ships, player.spawned
        );
    }
    println!("collisions: {}", summary.collisions);
    println!("halite left on the grid: {}", summary.remaining_halite);
}
