pub mod config;
pub mod util;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ares_core::base::Catalog;
use ares_core::object::AdmiralId;
use ares_core::sim::{InitialObject, SimConfig};
use ares_core::{EventLog, HostEvent, Simulation, TickCheckpoint, WorldSnapshot};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::RunPolicy;
use crate::util::seed_to_hex;

/// A JSON scenario: the template catalog, the initial object table and the
/// session settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub seed: u32,
    #[serde(default)]
    pub config: SimConfig,
    pub catalog: Catalog,
    #[serde(default)]
    pub initials: Vec<InitialObject>,
}

impl Scenario {
    /// Build a fresh simulation with every visible initial object placed.
    pub fn start(&self, seed: u32) -> Result<Simulation<EventLog>> {
        let mut sim = Simulation::new(self.catalog.clone(), seed, EventLog::new(), self.config)
            .context("scenario catalog failed validation")?;
        sim.place_initial_objects(self.initials.iter().cloned());
        Ok(sim)
    }
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let bytes =
        fs::read(path).with_context(|| format!("failed reading scenario {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("failed parsing scenario {}", path.display()))
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u32,
    pub seed_hex: String,
    pub ticks: u32,
    pub game_over: bool,
    pub fingerprint: u64,
    pub objects: usize,
    pub kills: BTreeMap<AdmiralId, u32>,
    pub cash: BTreeMap<AdmiralId, i32>,
    pub status_messages: Vec<String>,
    pub checkpoints: Vec<TickCheckpoint>,
    pub final_world: WorldSnapshot,
}

fn mix_u64(hash: u64, value: u64) -> u64 {
    // FNV-1a style mix for stable fixture fingerprinting.
    hash.wrapping_mul(0x0000_0100_0000_01B3) ^ value
}

pub fn checkpoint_fingerprint(checkpoints: &[TickCheckpoint]) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325u64;

    for checkpoint in checkpoints {
        hash = mix_u64(hash, checkpoint.tick as u64);
        hash = mix_u64(hash, checkpoint.rng_state as u64);
        hash = mix_u64(hash, checkpoint.sync as i64 as u64);
        hash = mix_u64(hash, checkpoint.objects as u64);
        hash = mix_u64(hash, checkpoint.queue_len as u64);
        hash = mix_u64(hash, checkpoint.game_over as u64);
    }

    hash
}

/// Run one seed to `max_ticks` or game over, checkpointing every
/// `checkpoint_interval` ticks plus the first and last.
pub fn run_scenario(scenario: &Scenario, seed: u32, policy: &RunPolicy) -> Result<RunReport> {
    if policy.max_ticks == 0 {
        return Err(anyhow!("max_ticks must be at least 1"));
    }
    let interval = policy.checkpoint_interval.max(1);
    let mut sim = scenario.start(seed)?;
    let mut checkpoints = vec![sim.checkpoint()];

    while sim.tick_count() < policy.max_ticks && !sim.is_game_over() {
        sim.tick(1);
        let tick = sim.tick_count();
        sim.validate_invariants()
            .map_err(|rule| anyhow!("invariant {rule} violated at tick {tick}, seed {seed:#x}"))?;
        if tick % interval == 0 {
            checkpoints.push(sim.checkpoint());
        }
    }
    if checkpoints.last().map(|checkpoint| checkpoint.tick) != Some(sim.tick_count()) {
        checkpoints.push(sim.checkpoint());
    }

    let fingerprint = checkpoint_fingerprint(&checkpoints);
    tracing::info!(
        seed = %seed_to_hex(seed),
        ticks = sim.tick_count(),
        fingerprint,
        "scenario run complete"
    );

    let final_world = sim.world_snapshot();
    let objects = sim.pool().in_use_count();
    let ticks = sim.tick_count();
    let game_over = sim.is_game_over();
    let log = sim.into_host();
    let status_messages = log
        .events
        .iter()
        .filter_map(|event| match event {
            HostEvent::Status(text) => Some(text.clone()),
            _ => None,
        })
        .collect();

    Ok(RunReport {
        seed,
        seed_hex: seed_to_hex(seed),
        ticks,
        game_over,
        fingerprint,
        objects,
        kills: log.kills,
        cash: log.cash,
        status_messages,
        checkpoints,
        final_world,
    })
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepRecord {
    pub seed: u32,
    pub seed_hex: String,
    pub ticks: u32,
    pub game_over: bool,
    pub fingerprint: u64,
    pub objects: usize,
    pub kills: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SweepReport {
    pub max_ticks: u32,
    pub seed_count: usize,
    pub game_over_count: usize,
    pub avg_objects: f64,
    pub total_kills: u64,
    pub runs: Vec<SweepRecord>,
}

/// Run many seeds in parallel and summarize them in seed order.
pub fn run_sweep(scenario: &Scenario, seeds: &[u32], policy: &RunPolicy) -> Result<SweepReport> {
    if seeds.is_empty() {
        return Err(anyhow!("sweep requires at least one seed"));
    }

    let run_one = |seed: &u32| -> Result<SweepRecord> {
        let report = run_scenario(scenario, *seed, policy)
            .with_context(|| format!("sweep run failed for seed={seed:#x}"))?;
        Ok(SweepRecord {
            seed: report.seed,
            seed_hex: report.seed_hex,
            ticks: report.ticks,
            game_over: report.game_over,
            fingerprint: report.fingerprint,
            objects: report.objects,
            kills: report.kills.values().sum(),
        })
    };

    let run_results: Vec<Result<SweepRecord>> = if let Some(jobs) = policy.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| seeds.par_iter().map(run_one).collect())
    } else {
        seeds.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let seed_count = runs.len();
    let game_over_count = runs.iter().filter(|run| run.game_over).count();
    let sum_objects: u64 = runs.iter().map(|run| run.objects as u64).sum();
    let total_kills: u64 = runs.iter().map(|run| run.kills as u64).sum();

    Ok(SweepReport {
        max_ticks: policy.max_ticks,
        seed_count,
        game_over_count,
        avg_objects: sum_objects as f64 / seed_count as f64,
        total_kills,
        runs,
    })
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub base_objects: usize,
    pub actions: usize,
    pub initial_objects: usize,
    pub hidden_objects: usize,
    pub placed_objects: usize,
}

/// Check the catalog and that the opening world is consistent.
pub fn validate_scenario(scenario: &Scenario) -> Result<ValidationSummary> {
    let sim = scenario.start(scenario.seed)?;
    sim.validate_invariants()
        .map_err(|rule| anyhow!("opening world violates {rule}"))?;

    Ok(ValidationSummary {
        base_objects: scenario.catalog.base_objects.len(),
        actions: scenario.catalog.actions.len(),
        initial_objects: scenario.initials.len(),
        hidden_objects: scenario
            .initials
            .iter()
            .filter(|initial| initial.hidden)
            .count(),
        placed_objects: sim.pool().in_use_count(),
    })
}
