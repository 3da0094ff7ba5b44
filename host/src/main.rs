use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use ares_host::config::RunPolicy;
use ares_host::util::{parse_seed, parse_seed_csv, parse_seed_file, seed_span, seed_to_hex};
use ares_host::{load_scenario, run_scenario, run_sweep, validate_scenario};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ares-host")]
#[command(about = "Run deterministic Ares scenarios and report tick checkpoints")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one scenario to completion and print its fingerprint
    Run {
        #[arg(long)]
        scenario: PathBuf,
        /// Overrides the scenario seed (decimal or 0x-prefixed hex)
        #[arg(long)]
        seed: Option<String>,
        #[arg(long)]
        max_ticks: Option<u32>,
        #[arg(long)]
        checkpoint_interval: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run one scenario across many seeds in parallel
    Sweep {
        #[arg(long)]
        scenario: PathBuf,
        /// Comma-separated seeds; `start..end` expands to a range
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 16)]
        seed_count: u32,
        #[arg(long)]
        max_ticks: Option<u32>,
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check a scenario's catalog and opening world without running it
    Validate {
        #[arg(long)]
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let env_policy = RunPolicy::from_env();

    match cli.command {
        Commands::Run {
            scenario,
            seed,
            max_ticks,
            checkpoint_interval,
            output,
        } => {
            let loaded = load_scenario(&scenario)?;
            let seed = match seed {
                Some(seed) => parse_seed(&seed)?,
                None => loaded.seed,
            };
            let policy = env_policy.with_overrides(max_ticks, checkpoint_interval, None);
            let report = run_scenario(&loaded, seed, &policy)?;

            println!("Scenario run complete.");
            println!("  Seed:        {}", report.seed_hex);
            println!("  Ticks:       {}", report.ticks);
            println!("  Game over:   {}", report.game_over);
            println!("  Objects:     {}", report.objects);
            println!("  Checkpoints: {}", report.checkpoints.len());
            println!("  Fingerprint: 0x{:016x}", report.fingerprint);
            for message in &report.status_messages {
                println!("  > {message}");
            }

            if let Some(path) = output {
                write_json(&path, &report)?;
                println!("  Report JSON: {}", path.display());
            }
        }
        Commands::Sweep {
            scenario,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            max_ticks,
            jobs,
            output,
        } => {
            let loaded = load_scenario(&scenario)?;
            let seeds = resolve_seeds(seeds, seed_file, seed_start, seed_count, loaded.seed)?;
            let policy = env_policy.with_overrides(max_ticks, None, jobs);
            let report = run_sweep(&loaded, &seeds, &policy)?;

            println!("Sweep complete.");
            println!("  Seeds:       {}", report.seed_count);
            println!("  Max ticks:   {}", report.max_ticks);
            println!("  Game overs:  {}", report.game_over_count);
            println!("  Avg objects: {:.2}", report.avg_objects);
            println!("  Kills:       {}", report.total_kills);
            for run in &report.runs {
                println!(
                    "  {}  ticks={:>6}  objects={:>4}  fingerprint=0x{:016x}",
                    run.seed_hex, run.ticks, run.objects, run.fingerprint
                );
            }

            if let Some(path) = output {
                write_json(&path, &report)?;
                println!("  Report JSON: {}", path.display());
            }
        }
        Commands::Validate { scenario } => {
            let loaded = load_scenario(&scenario)?;
            let summary = validate_scenario(&loaded)?;

            println!("Scenario is valid.");
            println!("  Seed:            {}", seed_to_hex(loaded.seed));
            println!("  Base objects:    {}", summary.base_objects);
            println!("  Actions:         {}", summary.actions);
            println!("  Initial objects: {}", summary.initial_objects);
            println!("  Hidden:          {}", summary.hidden_objects);
            println!("  Placed:          {}", summary.placed_objects);
        }
    }

    Ok(())
}

fn resolve_seeds(
    seeds: Option<String>,
    seed_file: Option<PathBuf>,
    seed_start: Option<String>,
    seed_count: u32,
    scenario_seed: u32,
) -> Result<Vec<u32>> {
    match (seeds, seed_file) {
        (Some(_), Some(_)) => Err(anyhow!("use either --seeds or --seed-file, not both")),
        (Some(seeds), None) => parse_seed_csv(&seeds),
        (None, Some(path)) => parse_seed_file(&path),
        (None, None) => {
            if seed_count == 0 {
                return Err(anyhow!("--seed-count must be at least 1"));
            }
            let start = match seed_start {
                Some(start) => parse_seed(&start)?,
                None => scenario_seed,
            };
            Ok(seed_span(start, seed_count))
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("failed to serialize report json")?;
    fs::write(path, json).with_context(|| format!("failed writing report: {}", path.display()))
}
