use std::fs;

use ares_core::action::{Action, AlterArgs, AlterKind, CreateObjectArgs, Verb};
use ares_core::attributes::*;
use ares_core::base::{ActionListRef, BaseObject, Catalog, FrameData, WeaponFrame, WeaponMount};
use ares_core::fixed_point::{Fixed, FixedPoint, Point};
use ares_core::sim::{InitialObject, SimConfig};
use ares_host::config::RunPolicy;
use ares_host::{load_scenario, run_scenario, run_sweep, validate_scenario, Scenario};

fn patrol_scenario() -> Scenario {
    let patrol = BaseObject {
        name: "Patrol".into(),
        attributes: CAN_TURN
            | CAN_BE_ENGAGED
            | HAS_DIRECTION_GOAL
            | CAN_ENGAGE
            | CAN_EVADE
            | CAN_ACCEPT_DESTINATION
            | CAN_BE_HIT
            | SHAPE_FROM_DIRECTION,
        mass: Fixed::ONE,
        max_thrust: Fixed(48),
        max_velocity: Fixed::from_long(3),
        health: 150,
        energy: 300,
        initial_age: -1,
        initial_direction_range: 360,
        skill_num: 1,
        skill_den: 1,
        pulse: Some(WeaponMount {
            base: 1,
            positions: vec![FixedPoint::ZERO],
        }),
        frame: FrameData::Rotation {
            max_turn_rate: Fixed::from_long(4),
            rotation_resolution: 10,
        },
        ..BaseObject::default()
    };
    let gun = BaseObject {
        name: "Gun".into(),
        initial_age: -1,
        frame: FrameData::Weapon(WeaponFrame {
            usage: USE_FOR_ATTACKING,
            energy_cost: 4,
            fire_time: 8,
            range: 90_000,
            inverse_speed: Fixed(64),
            restock_cost: -1,
            ..WeaponFrame::default()
        }),
        activate: ActionListRef::new(0, 1),
        ..BaseObject::default()
    };
    let shell = BaseObject {
        name: "Shell".into(),
        attributes: CAN_COLLIDE,
        initial_velocity: Fixed::from_long(5),
        max_velocity: Fixed::from_long(5),
        initial_age: 20,
        damage: 15,
        ..BaseObject::default()
    };

    Scenario {
        seed: 0x00C0_FFEE,
        config: SimConfig {
            player_admiral: Some(0),
            ..SimConfig::default()
        },
        catalog: Catalog {
            base_objects: vec![patrol, gun, shell],
            actions: vec![
                Action::new(Verb::CreateObject(CreateObjectArgs {
                    base: 2,
                    how_many_min: 1,
                    velocity_relative: true,
                    direction_relative: true,
                    ..CreateObjectArgs::default()
                })),
                Action::new(Verb::Alter(AlterArgs {
                    alter: AlterKind::Hidden,
                    minimum: 2,
                    ..AlterArgs::default()
                })),
            ],
            ..Catalog::default()
        },
        initials: vec![
            InitialObject {
                base: 0,
                owner: Some(0),
                location: Point::new(-200, 0),
                ..InitialObject::default()
            },
            InitialObject {
                base: 0,
                owner: Some(1),
                location: Point::new(200, 0),
                ..InitialObject::default()
            },
            InitialObject {
                base: 0,
                owner: Some(1),
                location: Point::new(200, 400),
                hidden: true,
                ..InitialObject::default()
            },
        ],
    }
}

fn policy(max_ticks: u32, checkpoint_interval: u32, jobs: Option<usize>) -> RunPolicy {
    RunPolicy {
        max_ticks,
        checkpoint_interval,
        jobs,
    }
}

#[test]
fn scenario_files_round_trip_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("patrol.json");
    let scenario = patrol_scenario();
    fs::write(&path, serde_json::to_vec_pretty(&scenario).expect("serialize")).expect("write");

    let loaded = load_scenario(&path).expect("scenario should load");
    assert_eq!(loaded.seed, scenario.seed);
    assert_eq!(loaded.catalog, scenario.catalog);
    assert_eq!(loaded.initials.len(), 3);
    assert!(loaded.initials[2].hidden);
}

#[test]
fn unreadable_and_malformed_scenarios_report_context() {
    let dir = tempfile::tempdir().expect("tempdir");

    let missing = dir.path().join("missing.json");
    let err = load_scenario(&missing).expect_err("missing file should fail");
    assert!(format!("{err:#}").contains("failed reading scenario"));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, b"{\"seed\": 1, \"catalog\": [").expect("write");
    let err = load_scenario(&broken).expect_err("malformed json should fail");
    assert!(format!("{err:#}").contains("failed parsing scenario"));
}

#[test]
fn bad_catalogs_are_rejected_before_running() {
    let mut scenario = patrol_scenario();
    scenario.catalog.actions[0] = Action::new(Verb::CreateObject(CreateObjectArgs {
        base: 42,
        ..CreateObjectArgs::default()
    }));

    let err = validate_scenario(&scenario).expect_err("unknown base should be rejected");
    assert!(format!("{err:#}").contains("unknown base object 42"));
}

#[test]
fn validation_counts_hidden_objects() {
    let summary = validate_scenario(&patrol_scenario()).expect("scenario is valid");
    assert_eq!(summary.base_objects, 3);
    assert_eq!(summary.actions, 2);
    assert_eq!(summary.initial_objects, 3);
    assert_eq!(summary.hidden_objects, 1);
    assert_eq!(summary.placed_objects, 2);
}

#[test]
fn runs_are_reproducible_and_checkpointed() {
    let scenario = patrol_scenario();
    let policy = policy(250, 50, None);

    let first = run_scenario(&scenario, scenario.seed, &policy).expect("first run");
    let second = run_scenario(&scenario, scenario.seed, &policy).expect("second run");

    assert_eq!(first.ticks, 250);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(first.checkpoints, second.checkpoints);
    assert_eq!(first.final_world, second.final_world);
    assert_eq!(
        first
            .checkpoints
            .iter()
            .map(|checkpoint| checkpoint.tick)
            .collect::<Vec<_>>(),
        vec![0, 50, 100, 150, 200, 250]
    );
    assert_eq!(first.seed_hex, "0x00c0ffee");
}

#[test]
fn uneven_intervals_still_checkpoint_the_last_tick() {
    let scenario = patrol_scenario();
    let report = run_scenario(&scenario, 7, &policy(95, 40, None)).expect("run");
    let ticks: Vec<u32> = report
        .checkpoints
        .iter()
        .map(|checkpoint| checkpoint.tick)
        .collect();
    assert_eq!(ticks, vec![0, 40, 80, 95]);
}

#[test]
fn sweeps_match_individual_runs_in_seed_order() {
    let scenario = patrol_scenario();
    let seeds = [3u32, 1, 2, 0xDEAD_BEEF];
    let policy = policy(120, 30, Some(2));

    let report = run_sweep(&scenario, &seeds, &policy).expect("sweep");
    assert_eq!(report.seed_count, seeds.len());
    assert_eq!(report.max_ticks, 120);

    for (record, seed) in report.runs.iter().zip(seeds) {
        assert_eq!(record.seed, seed);
        let single = run_scenario(&scenario, seed, &policy).expect("single run");
        assert_eq!(record.fingerprint, single.fingerprint);
        assert_eq!(record.objects, single.objects);
    }

    assert!(run_sweep(&scenario, &[], &policy).is_err());
}
