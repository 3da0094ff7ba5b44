use std::fs;

use ares_core::base::Catalog;
use ares_core::sim::{InitialObject, SimConfig};
use ares_core::{EventLog, HostEvent, Simulation, TickCheckpoint};
use serde::Deserialize;

#[derive(Deserialize)]
struct Fixture {
    seed: u32,
    #[serde(default)]
    config: SimConfig,
    catalog: Catalog,
    #[serde(default)]
    initials: Vec<InitialObject>,
}

fn load(path: &str) -> Fixture {
    let full = format!("../{path}");
    let bytes = fs::read(&full).unwrap_or_else(|err| panic!("failed reading {full}: {err}"));
    serde_json::from_slice(&bytes).unwrap_or_else(|err| panic!("failed parsing {full}: {err}"))
}

fn start(fixture: &Fixture, seed: u32) -> Simulation<EventLog> {
    let mut sim = Simulation::new(
        fixture.catalog.clone(),
        seed,
        EventLog::new(),
        fixture.config,
    )
    .expect("fixture catalog should validate");
    sim.place_initial_objects(fixture.initials.iter().cloned());
    sim
}

fn run_with_checkpoints(
    sim: &mut Simulation<EventLog>,
    ticks: u32,
    interval: u32,
) -> Vec<TickCheckpoint> {
    let mut checkpoints = vec![sim.checkpoint()];
    for tick in 1..=ticks {
        sim.tick(1);
        sim.validate_invariants()
            .unwrap_or_else(|rule| panic!("invariant {rule} broken at tick {tick}"));
        if tick % interval == 0 || tick == ticks {
            checkpoints.push(sim.checkpoint());
        }
    }
    checkpoints
}

fn mix_u64(hash: u64, value: u64) -> u64 {
    // FNV-1a style mix for stable fixture fingerprinting.
    hash.wrapping_mul(0x0000_0100_0000_01B3) ^ value
}

fn checkpoint_fingerprint(checkpoints: &[TickCheckpoint]) -> u64 {
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

#[test]
fn skirmish_fixture_replays_to_the_same_fingerprint() {
    let fixture = load("fixtures/skirmish.json");

    let mut first = start(&fixture, fixture.seed);
    let mut second = start(&fixture, fixture.seed);
    let first_run = run_with_checkpoints(&mut first, 600, 50);
    let second_run = run_with_checkpoints(&mut second, 600, 50);

    assert_eq!(first_run.first().expect("checkpoint").tick, 0);
    assert_eq!(first_run.last().expect("checkpoint").tick, 600);
    assert_eq!(first_run.len(), 13);
    assert_eq!(first_run, second_run);
    assert_eq!(
        checkpoint_fingerprint(&first_run),
        checkpoint_fingerprint(&second_run)
    );
    assert_eq!(first.world_snapshot(), second.world_snapshot());
}

#[test]
fn skirmish_fixture_places_visible_objects_only() {
    let fixture = load("fixtures/skirmish.json");
    let sim = start(&fixture, fixture.seed);

    let visible = fixture.initials.iter().filter(|initial| !initial.hidden).count();
    assert_eq!(sim.pool().in_use_count(), visible);
    assert!(sim.initial_objects()[5].real.is_none());
    assert_eq!(
        sim.host()
            .count(|event| matches!(event, HostEvent::SpriteAttached { .. })),
        visible
    );
    sim.validate_invariants().expect("fresh world is consistent");
}

#[test]
fn skirmish_fixture_diverges_across_seeds() {
    let fixture = load("fixtures/skirmish.json");

    let mut base = start(&fixture, fixture.seed);
    let mut other = start(&fixture, fixture.seed.wrapping_add(1));
    let base_run = run_with_checkpoints(&mut base, 200, 50);
    let other_run = run_with_checkpoints(&mut other, 200, 50);

    assert_ne!(
        checkpoint_fingerprint(&base_run),
        checkpoint_fingerprint(&other_run)
    );
}
