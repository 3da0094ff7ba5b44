use super::*;

use crate::action::{Action, AlterArgs, AlterKind, CreateObjectArgs, OwnerFilter, Verb};
use crate::attributes::*;
use crate::base::{ActionListRef, BaseObject, FrameData, WeaponFrame, WeaponMount};
use crate::fixed_point::Fixed;
use crate::host::{EventLog, HostEvent, SpritePolicy};
use crate::object::WeaponSlot;

const SEED: u32 = 0x5EED_1234;

fn template(name: &str) -> BaseObject {
    BaseObject {
        name: name.into(),
        initial_age: -1,
        ..BaseObject::default()
    }
}

fn weapon(name: &str, frame: WeaponFrame, activate: ActionListRef) -> BaseObject {
    BaseObject {
        frame: FrameData::Weapon(frame),
        activate,
        ..template(name)
    }
}

fn mount(base: BaseId) -> Option<WeaponMount> {
    Some(WeaponMount {
        base,
        positions: vec![FixedPoint::ZERO],
    })
}

fn new_sim(catalog: Catalog) -> Simulation<EventLog> {
    new_sim_with(catalog, EventLog::new(), SimConfig::default())
}

fn new_sim_with(catalog: Catalog, host: EventLog, config: SimConfig) -> Simulation<EventLog> {
    let config = SimConfig {
        player_admiral: Some(0),
        ..config
    };
    Simulation::new(catalog, SEED, host, config).expect("test catalog should validate")
}

fn spawn(sim: &mut Simulation<EventLog>, base: BaseId, owner: Option<AdmiralId>) -> usize {
    let request = SpawnRequest::new(base, Point::new(10_000, 10_000)).owner(owner);
    sim.create_object(request).expect("spawn should succeed")
}

fn run(sim: &mut Simulation<EventLog>, ticks: u32) {
    for _ in 0..ticks {
        sim.tick(1);
    }
}

fn score_events(sim: &Simulation<EventLog>) -> usize {
    sim.host()
        .count(|event| matches!(event, HostEvent::Score { .. }))
}

fn statuses(sim: &Simulation<EventLog>) -> Vec<String> {
    sim.host()
        .events
        .iter()
        .filter_map(|event| match event {
            HostEvent::Status(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Two armed frigates on opposite sides, each heading for the other.
fn skirmish_catalog() -> Catalog {
    let frigate = BaseObject {
        attributes: CAN_TURN
            | CAN_BE_ENGAGED
            | HAS_DIRECTION_GOAL
            | CAN_ENGAGE
            | CAN_EVADE
            | CAN_ACCEPT_DESTINATION
            | CAN_COLLIDE
            | CAN_BE_HIT
            | HATED
            | CAN_BE_EVADED
            | SHAPE_FROM_DIRECTION,
        mass: Fixed::ONE,
        max_thrust: Fixed(64),
        max_velocity: Fixed::from_long(4),
        health: 200,
        energy: 400,
        skill_num: 1,
        skill_den: 2,
        initial_direction_range: 360,
        pulse: mount(1),
        frame: FrameData::Rotation {
            max_turn_rate: Fixed::from_long(3),
            rotation_resolution: 10,
        },
        ..template("Frigate")
    };
    let pulse = weapon(
        "Pulse",
        WeaponFrame {
            usage: USE_FOR_ATTACKING,
            energy_cost: 5,
            fire_time: 10,
            range: 250_000,
            inverse_speed: Fixed(32),
            ..WeaponFrame::default()
        },
        ActionListRef::new(0, 1),
    );
    let bolt = BaseObject {
        attributes: CAN_COLLIDE,
        initial_velocity: Fixed::from_long(8),
        max_velocity: Fixed::from_long(8),
        initial_age: 30,
        damage: 10,
        ..template("Bolt")
    };

    Catalog {
        base_objects: vec![frigate, pulse, bolt],
        actions: vec![Action::new(Verb::CreateObject(CreateObjectArgs {
            base: 2,
            how_many_min: 1,
            velocity_relative: true,
            direction_relative: true,
            ..CreateObjectArgs::default()
        }))],
        ..Catalog::default()
    }
}

fn skirmish(seed: u32) -> Simulation<EventLog> {
    let mut sim = Simulation::new(
        skirmish_catalog(),
        seed,
        EventLog::new(),
        SimConfig::default(),
    )
    .expect("skirmish catalog should validate");
    sim.place_initial_objects([
        InitialObject {
            base: 0,
            owner: Some(0),
            location: Point::new(-300, 0),
            ..InitialObject::default()
        },
        InitialObject {
            base: 0,
            owner: Some(1),
            location: Point::new(300, 0),
            ..InitialObject::default()
        },
    ]);
    sim
}

#[test]
fn same_seed_replays_identically() {
    let mut first = skirmish(SEED);
    let mut second = skirmish(SEED);

    for _ in 0..300 {
        first.tick(1);
        second.tick(1);
        assert_eq!(first.checkpoint(), second.checkpoint());
    }
    assert_eq!(first.world_snapshot(), second.world_snapshot());
    assert_eq!(first.host().events, second.host().events);

    let mut other = skirmish(SEED ^ 0xFFFF);
    run(&mut other, 300);
    assert_ne!(first.rng_state(), other.rng_state());
}

#[test]
fn skirmish_keeps_invariants_every_tick() {
    let mut sim = skirmish(SEED);
    assert_eq!(sim.pool().in_use_count(), 2);
    for _ in 0..300 {
        sim.tick(1);
        sim.validate_invariants()
            .expect("tick should preserve invariants");
    }
    assert_eq!(sim.tick_count(), 300);
}

#[test]
fn hits_destroy_exactly_once() {
    let hull = BaseObject {
        attributes: CAN_BE_HIT,
        health: 100,
        ..template("Hull")
    };
    let light = BaseObject {
        attributes: CAN_COLLIDE,
        damage: 30,
        ..template("Light")
    };
    let heavy = BaseObject {
        attributes: CAN_COLLIDE,
        damage: 90,
        ..template("Heavy")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![hull, light, heavy],
        ..Catalog::default()
    });
    let target = spawn(&mut sim, 0, Some(1));
    let light = spawn(&mut sim, 1, Some(0));
    let heavy = spawn(&mut sim, 2, Some(0));

    sim.hit_object(target, light);
    assert_eq!(sim.pool()[target].health, 70);
    sim.hit_object(target, light);
    assert_eq!(sim.pool()[target].health, 40);
    sim.hit_object(target, heavy);
    assert_eq!(sim.pool()[target].health, -50);
    assert_eq!(sim.pool()[target].active, ObjectState::ToBeFreed);

    sim.hit_object(target, heavy);
    assert_eq!(sim.pool()[target].health, -50);
    assert_eq!(
        sim.host()
            .count(|event| matches!(event, HostEvent::Kill { owner: Some(1) })),
        1
    );

    sim.tick(1);
    assert_eq!(sim.pool()[target].active, ObjectState::Available);
    sim.validate_invariants().expect("pool should stay consistent");
}

#[test]
fn fatal_hits_eject_the_pilot_into_a_body() {
    let ship = BaseObject {
        attributes: CAN_BE_HIT | IS_PLAYER_SHIP | IS_HUMAN_CONTROLLED,
        health: 20,
        ..template("Shuttle")
    };
    let body = template("Body");
    let bolt = BaseObject {
        attributes: CAN_COLLIDE,
        damage: 50,
        ..template("Bolt")
    };
    let mut catalog = Catalog {
        base_objects: vec![ship, body, bolt],
        ..Catalog::default()
    };
    catalog.special.player_body = Some(1);
    let mut sim = new_sim(catalog);
    let ship = spawn(&mut sim, 0, Some(0));
    sim.set_player_ship(ship);
    let bolt = spawn(&mut sim, 2, Some(1));

    sim.hit_object(ship, bolt);

    let body = sim.player_ship().expect("pilot should land in a body");
    assert_ne!(body, ship);
    let pilot = &sim.pool()[body];
    assert_eq!(pilot.base_type, 1);
    assert_eq!(pilot.owner, Some(0));
    assert!(pilot.has(IS_PLAYER_SHIP) && pilot.has(IS_HUMAN_CONTROLLED));

    let wreck = &sim.pool()[ship];
    assert!(!wreck.has(IS_PLAYER_SHIP | IS_HUMAN_CONTROLLED));
    assert_eq!(wreck.active, ObjectState::ToBeFreed);
    assert_eq!(
        sim.host().count(|event| matches!(
            event,
            HostEvent::PlayerShipChanged { owner: Some(0), .. }
        )),
        1
    );

    sim.tick(1);
    assert_eq!(sim.player_ship(), Some(body));
    sim.validate_invariants().expect("pool should stay consistent");
}

#[test]
fn energy_spills_into_battery_then_pays_the_owner_once() {
    let tank = BaseObject {
        energy: 100,
        ..template("Tank")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![tank],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, Some(1));
    assert_eq!(sim.pool()[slot].battery, 500);

    sim.alter_energy(slot, 1_000);
    let object = &sim.pool()[slot];
    assert_eq!(object.energy, 100);
    assert_eq!(object.battery, 500);
    assert_eq!(sim.host().cash(1), 1_000);

    sim.alter_energy(slot, -5_000);
    assert_eq!(sim.pool()[slot].energy, 0);
    assert_eq!(sim.host().cash(1), 1_000);
    sim.validate_invariants().expect("energy stays within bounds");
}

#[test]
fn references_go_stale_when_the_slot_is_recycled() {
    let mut sim = new_sim(Catalog {
        base_objects: vec![template("Drone")],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, None);
    let stale = sim.pool()[slot].reference();
    assert_eq!(sim.resolve(stale), Some(slot));

    sim.destroy_object(slot);
    assert_eq!(sim.resolve(stale), None);
    sim.tick(1);

    let reused = spawn(&mut sim, 0, None);
    assert_eq!(reused, slot);
    let same_id = sim.pool()[reused].id == stale.id;
    assert_eq!(sim.resolve(stale).is_some(), same_id);
}

#[test]
fn delayed_actions_drop_when_their_subject_dies() {
    let mut sim = new_sim(Catalog {
        base_objects: vec![template("Beacon")],
        actions: vec![Action::new(Verb::ChangeScore {
            player: Some(0),
            which: 0,
            amount: 1,
        })
        .delayed(3)],
        ..Catalog::default()
    });
    let list = ActionListRef::new(0, 1);

    let doomed = spawn(&mut sim, 0, None);
    let doomed_ref = sim.pool()[doomed].reference();
    sim.execute(list, Some(doomed_ref), None, None, true);
    assert_eq!(sim.queue().len(), 1);
    sim.destroy_object(doomed);
    run(&mut sim, 5);
    assert_eq!(sim.queue().len(), 0);
    assert_eq!(score_events(&sim), 0);

    let survivor = spawn(&mut sim, 0, None);
    let survivor_ref = sim.pool()[survivor].reference();
    sim.execute(list, Some(survivor_ref), None, None, true);
    run(&mut sim, 2);
    assert_eq!(score_events(&sim), 0);
    run(&mut sim, 1);
    assert_eq!(score_events(&sim), 1);
}

#[test]
fn delayed_actions_skip_a_new_object_in_the_old_slot() {
    let mut sim = new_sim(Catalog {
        base_objects: vec![template("Beacon")],
        actions: vec![Action::new(Verb::ChangeScore {
            player: Some(0),
            which: 0,
            amount: 1,
        })
        .delayed(3)],
        ..Catalog::default()
    });

    let first = spawn(&mut sim, 0, None);
    let first_ref = sim.pool()[first].reference();
    sim.execute(ActionListRef::new(0, 1), Some(first_ref), None, None, true);
    sim.destroy_object(first);
    run(&mut sim, 1);
    assert_eq!(sim.pool()[first].active, ObjectState::Available);

    let second = spawn(&mut sim, 0, None);
    assert_eq!(second, first);
    assert_ne!(sim.pool()[second].id, first_ref.id);
    assert_eq!(sim.queue().len(), 1);

    run(&mut sim, 2);
    assert_eq!(sim.queue().len(), 0);
    assert_eq!(score_events(&sim), 0);
}

#[test]
fn delayed_actions_still_run_for_a_subject_expiring_that_tick() {
    let spark = BaseObject {
        initial_age: 3,
        ..template("Spark")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![spark],
        actions: vec![Action::new(Verb::ChangeScore {
            player: None,
            which: 0,
            amount: 1,
        })
        .delayed(4)],
        ..Catalog::default()
    });

    let spark = spawn(&mut sim, 0, Some(1));
    let spark_ref = sim.pool()[spark].reference();
    sim.execute(ActionListRef::new(0, 1), Some(spark_ref), None, None, true);

    run(&mut sim, 3);
    assert_eq!(sim.pool()[spark].active, ObjectState::InUse);
    assert_eq!(score_events(&sim), 0);

    run(&mut sim, 1);
    assert_eq!(sim.pool()[spark].active, ObjectState::Available);
    assert_eq!(sim.queue().len(), 0);
    assert_eq!(
        sim.host().count(|event| matches!(
            event,
            HostEvent::Score {
                admiral: 1,
                which: 0,
                amount: 1
            }
        )),
        1
    );
}

#[test]
fn full_queue_drops_new_entries() {
    let mut sim = new_sim_with(
        Catalog {
            base_objects: vec![template("Beacon")],
            actions: vec![Action::new(Verb::SetZoom { level: 3 }).delayed(10)],
            ..Catalog::default()
        },
        EventLog::new(),
        SimConfig {
            queue_capacity: 2,
            ..SimConfig::default()
        },
    );
    let list = ActionListRef::new(0, 1);
    for _ in 0..3 {
        sim.execute(list, None, None, None, true);
    }
    assert_eq!(sim.queue().len(), 2);
    sim.validate_invariants().expect("queue stays consistent");

    run(&mut sim, 10);
    assert!(sim.queue().is_empty());
    assert_eq!(sim.zoom(), 3);
}

#[test]
fn create_spawns_jittered_copies_owned_by_the_creator() {
    let carrier = template("Carrier");
    let fighter = template("Fighter");
    let mut sim = new_sim(Catalog {
        base_objects: vec![carrier, fighter],
        actions: vec![Action::new(Verb::CreateObject(CreateObjectArgs {
            base: 1,
            how_many_min: 10,
            random_distance: 100,
            ..CreateObjectArgs::default()
        }))],
        ..Catalog::default()
    });
    let carrier = spawn(&mut sim, 0, Some(2));
    let origin = sim.pool()[carrier].location;
    let carrier_ref = sim.pool()[carrier].reference();

    sim.execute(ActionListRef::new(0, 1), Some(carrier_ref), None, None, true);

    assert_eq!(sim.count_objects_of_base_type(Some(1), Some(2)), 10);
    assert_eq!(sim.count_objects_of_base_type(Some(1), None), 10);
    for object in sim.pool().iter_in_use().filter(|object| object.base_type == 1) {
        assert!((object.location.h - origin.h).abs() <= 100);
        assert!((object.location.v - origin.v).abs() <= 100);
        assert_eq!(object.owner, Some(2));
    }
}

#[test]
fn filters_gate_actions_on_the_direct_object() {
    let hull = BaseObject {
        health: 100,
        ..template("Hull")
    };
    let mut damage = Action::new(Verb::Alter(AlterArgs {
        alter: AlterKind::Damage,
        minimum: -10,
        ..AlterArgs::default()
    }));
    damage.inclusive_filter = CAN_BE_HIT;
    let mut rival_only = damage.clone();
    rival_only.inclusive_filter = 0;
    rival_only.owner = OwnerFilter::Different;

    let mut sim = new_sim(Catalog {
        base_objects: vec![hull],
        actions: vec![damage, rival_only],
        ..Catalog::default()
    });
    let source = spawn(&mut sim, 0, Some(1));
    let target = spawn(&mut sim, 0, Some(1));
    let source_ref = sim.pool()[source].reference();
    let target_ref = sim.pool()[target].reference();

    sim.execute(ActionListRef::new(0, 2), Some(source_ref), Some(target_ref), None, true);
    assert_eq!(sim.pool()[target].health, 100);

    sim.object_mut(target).expect("target is live").owner = Some(2);
    sim.execute(ActionListRef::new(1, 1), Some(source_ref), Some(target_ref), None, true);
    assert_eq!(sim.pool()[target].health, 90);
    assert_eq!(sim.pool()[source].health, 100);
}

#[test]
fn weapons_respect_cooldown_and_ammo() {
    let ship = BaseObject {
        attributes: IS_HUMAN_CONTROLLED,
        health: 100,
        energy: 100,
        pulse: mount(1),
        ..template("Gunboat")
    };
    let torpedo = weapon(
        "Torpedo",
        WeaponFrame {
            usage: USE_FOR_ATTACKING,
            energy_cost: 10,
            fire_time: 5,
            ammo: 2,
            restock_cost: -1,
            ..WeaponFrame::default()
        },
        ActionListRef::new(0, 1),
    );
    let mut sim = new_sim(Catalog {
        base_objects: vec![ship, torpedo],
        actions: vec![Action::new(Verb::ChangeScore {
            player: Some(0),
            which: 1,
            amount: 1,
        })],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, Some(0));
    sim.press_keys(slot, ONE_KEY);

    sim.tick(1);
    assert_eq!(score_events(&sim), 1);
    assert_eq!(sim.pool()[slot].weapon(WeaponSlot::Pulse).ammo, 1);
    assert_eq!(sim.pool()[slot].energy, 90);

    run(&mut sim, 4);
    assert_eq!(score_events(&sim), 1);
    sim.tick(1);
    assert_eq!(score_events(&sim), 2);
    assert_eq!(sim.pool()[slot].weapon(WeaponSlot::Pulse).ammo, 0);

    run(&mut sim, 20);
    assert_eq!(score_events(&sim), 2);
}

#[test]
fn disabled_keys_are_masked_from_input() {
    let mut sim = new_sim(Catalog {
        base_objects: vec![BaseObject {
            attributes: IS_HUMAN_CONTROLLED,
            ..template("Gunboat")
        }],
        actions: vec![Action::new(Verb::DisableKeys { mask: ONE_KEY })],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, Some(0));
    sim.execute(ActionListRef::new(0, 1), None, None, None, true);
    sim.press_keys(slot, ONE_KEY | UP_KEY);
    assert_eq!(sim.pool()[slot].keys_down, UP_KEY);
}

#[test]
fn warp_in_without_energy_falls_back_to_normal() {
    let ship = BaseObject {
        attributes: CAN_ACCEPT_DESTINATION,
        energy: 800,
        warp_speed: Fixed::from_long(10),
        ..template("Courier")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![ship],
        actions: vec![Action::new(Verb::EnterWarp)],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, Some(1));
    sim.object_mut(slot).expect("ship is live").energy = 50;
    let ship_ref = sim.pool()[slot].reference();
    sim.execute(ActionListRef::new(0, 1), Some(ship_ref), None, None, true);
    assert!(matches!(sim.pool()[slot].presence, Presence::WarpIn { .. }));

    run(&mut sim, 100);
    assert!(matches!(sim.pool()[slot].presence, Presence::WarpIn { .. }));
    sim.tick(1);

    let object = &sim.pool()[slot];
    assert_eq!(object.presence, Presence::Normal);
    assert_eq!(object.energy, 0);
    assert_eq!(object.warp_energy_collected, 50);
    assert_eq!(
        sim.host()
            .count(|event| matches!(event, HostEvent::WarpCue { .. })),
        4
    );
}

#[test]
fn neutral_death_releases_then_occupation_captures() {
    let station = BaseObject {
        attributes: IS_DESTINATION | NEUTRAL_DEATH | CAN_BE_HIT,
        health: 50,
        initial_age_range: 3,
        ..template("Station")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![station],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, Some(1));
    sim.object_mut(slot).expect("station is live").health = -5;

    sim.destroy_object(slot);
    let object = &sim.pool()[slot];
    assert!(object.is_in_use());
    assert_eq!(object.owner, None);
    assert_eq!(object.health, 50);
    assert!(!object.has(CAN_BE_HIT));
    assert_eq!(statuses(&sim), vec![String::from("Station lost by Admiral 1.")]);

    sim.alter_occupation(slot, Some(0), 2, true);
    assert_eq!(sim.pool()[slot].owner, None);
    sim.alter_occupation(slot, Some(0), 1, true);
    assert_eq!(sim.pool()[slot].owner, Some(0));
    assert_eq!(
        statuses(&sim).last().map(String::as_str),
        Some("Station captured by Admiral 0.")
    );
    assert_eq!(
        sim.host().count(|event| matches!(
            event,
            HostEvent::DestinationCaptured { owner: 0, .. }
        )),
        1
    );
}

#[test]
fn guided_missiles_keep_locks_across_north_and_drop_targets_behind() {
    let missile = BaseObject {
        attributes: CAN_THINK | CAN_TURN | HAS_DIRECTION_GOAL | SHAPE_FROM_DIRECTION | IS_GUIDED,
        max_thrust: Fixed(32),
        max_velocity: Fixed::from_long(6),
        frame: FrameData::Rotation {
            max_turn_rate: Fixed::from_long(2),
            rotation_resolution: 10,
        },
        ..template("Missile")
    };
    let drone = BaseObject {
        attributes: CAN_BE_ENGAGED,
        ..template("Drone")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![missile, drone],
        ..Catalog::default()
    });

    let launch = |sim: &mut Simulation<EventLog>, from: Point, to: Point| {
        let missile = sim
            .create_object(SpawnRequest::new(0, from).direction(10).owner(Some(0)))
            .expect("missile spawns");
        let drone = sim
            .create_object(SpawnRequest::new(1, to).owner(Some(1)))
            .expect("drone spawns");
        let lock = sim.pool()[drone].reference();
        sim.object_mut(missile).expect("missile is live").target = Some(lock);
        (missile, lock)
    };
    // Bearing 350: twenty degrees left of a heading of 10.
    let (ahead, ahead_lock) = launch(&mut sim, Point::new(0, 0), Point::new(-176, -985));
    // Bearing 180: behind.
    let (behind, _) = launch(&mut sim, Point::new(20_000, 0), Point::new(20_000, 1_000));

    sim.tick(1);

    let ahead = &sim.pool()[ahead];
    assert_eq!(ahead.target, Some(ahead_lock));
    assert!(ahead.target_angle > 340 && ahead.target_angle < 360);
    assert_eq!(sim.pool()[behind].target, None);
}

#[test]
fn human_aim_leads_the_target_along_its_drift() {
    let fighter = BaseObject {
        attributes: CAN_ENGAGE | CAN_TURN,
        beam: mount(1),
        ..template("Fighter")
    };
    let lance = weapon(
        "Lance",
        WeaponFrame {
            usage: USE_FOR_ATTACKING,
            fire_time: 10,
            range: 4_000_000,
            inverse_speed: Fixed(64),
            ..WeaponFrame::default()
        },
        ActionListRef::default(),
    );
    let raider = BaseObject {
        attributes: CAN_BE_ENGAGED | HATED,
        max_velocity: Fixed::from_long(4),
        ..template("Raider")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![fighter, lance, raider],
        ..Catalog::default()
    });
    let pilot = sim
        .create_object(
            SpawnRequest::new(0, Point::new(0, 0))
                .owner(Some(0))
                .special_attributes(IS_HUMAN_CONTROLLED),
        )
        .expect("fighter spawns");
    let raider = sim
        .create_object(SpawnRequest::new(2, Point::new(0, -1_000)).owner(Some(1)))
        .expect("raider spawns");
    sim.object_mut(raider).expect("raider is live").velocity =
        FixedPoint::new(Fixed::from_long(2), Fixed::ZERO);

    // The first tick finds the raider; the second aims at it.
    run(&mut sim, 2);

    let pilot = &sim.pool()[pilot];
    assert_eq!(pilot.target, Some(sim.pool()[raider].reference()));
    assert!(pilot.target_angle > 10 && pilot.target_angle < 45);
}

#[test]
fn drifting_objects_move_along_their_heading() {
    let rock = BaseObject {
        initial_direction: 90,
        initial_velocity: Fixed::from_long(2),
        ..template("Rock")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![rock],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, None);
    let start = sim.pool()[slot].location;

    run(&mut sim, 10);
    let location = sim.pool()[slot].location;
    assert_eq!(location.h, start.h + 20);
    assert_eq!(location.v, start.v);
}

#[test]
fn age_expiry_runs_the_expire_list_and_frees_the_slot() {
    let spark = BaseObject {
        initial_age: 3,
        expire: ActionListRef::new(0, 1),
        ..template("Spark")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![spark],
        actions: vec![Action::new(Verb::ChangeScore {
            player: Some(0),
            which: 2,
            amount: 1,
        })],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, None);

    run(&mut sim, 3);
    assert!(sim.object(slot).is_some());
    sim.tick(1);
    assert_eq!(score_events(&sim), 1);
    assert_eq!(sim.pool()[slot].active, ObjectState::Available);
}

#[test]
fn base_type_change_keeps_human_control() {
    let pod = BaseObject {
        attributes: CAN_TURN,
        health: 10,
        ..template("Pod")
    };
    let ship = BaseObject {
        attributes: CAN_BE_HIT,
        health: 300,
        max_velocity: Fixed::from_long(6),
        ..template("Ship")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![pod, ship],
        ..Catalog::default()
    });
    let slot = sim
        .create_object(
            SpawnRequest::new(0, Point::new(0, 0))
                .owner(Some(0))
                .special_attributes(IS_HUMAN_CONTROLLED),
        )
        .expect("pod spawns");

    sim.change_base_type(slot, 1, None, false);
    let object = &sim.pool()[slot];
    assert_eq!(object.base_type, 1);
    assert!(object.has(IS_HUMAN_CONTROLLED));
    assert!(object.has(CAN_BE_HIT));
    assert!(!object.has(CAN_TURN));
    assert_eq!(object.max_velocity, Fixed::from_long(6));
    assert_eq!(object.health, 10);
}

#[test]
fn relative_rebases_keep_ammo_through_an_unarmed_form() {
    let gunboat = BaseObject {
        pulse: mount(1),
        ..template("Gunboat")
    };
    let gun = weapon(
        "Gun",
        WeaponFrame {
            usage: USE_FOR_ATTACKING,
            fire_time: 6,
            range: 10_000,
            ammo: 9,
            ..WeaponFrame::default()
        },
        ActionListRef::default(),
    );
    let husk = BaseObject {
        initial_age: -40,
        initial_age_range: 60,
        ..template("Husk")
    };
    let mut sim = new_sim(Catalog {
        base_objects: vec![gunboat, gun, husk],
        ..Catalog::default()
    });
    let slot = spawn(&mut sim, 0, Some(0));
    assert_eq!(sim.pool()[slot].weapon(WeaponSlot::Pulse).ammo, 9);
    {
        let pulse = sim
            .object_mut(slot)
            .expect("gunboat is live")
            .weapon_mut(WeaponSlot::Pulse);
        pulse.ammo = 3;
        pulse.time = 4;
    }

    let mut stream = sim.pool()[slot].random_seed;
    let expected_age = -40 + stream.roll(60);
    sim.change_base_type(slot, 2, None, true);
    let husk = &sim.pool()[slot];
    assert_eq!(husk.age, expected_age);
    let pulse = husk.weapon(WeaponSlot::Pulse);
    assert_eq!(pulse.base, None);
    assert_eq!(pulse.time, 0);
    assert_eq!(pulse.ammo, 3);

    sim.change_base_type(slot, 0, None, true);
    let pulse = sim.pool()[slot].weapon(WeaponSlot::Pulse);
    assert_eq!(pulse.base, Some(1));
    assert_eq!(pulse.ammo, 3);

    sim.change_base_type(slot, 0, None, false);
    assert_eq!(sim.pool()[slot].weapon(WeaponSlot::Pulse).ammo, 9);
}

#[test]
fn pool_exhaustion_and_sprite_exhaustion_are_reported() {
    let mut sim = new_sim_with(
        Catalog {
            base_objects: vec![template("Drone")],
            ..Catalog::default()
        },
        EventLog::new(),
        SimConfig {
            pool_capacity: 2,
            ..SimConfig::default()
        },
    );
    spawn(&mut sim, 0, None);
    spawn(&mut sim, 0, None);
    let request = SpawnRequest::new(0, Point::default());
    assert_eq!(sim.create_object(request), Err(SpawnError::PoolFull));
    assert_eq!(
        sim.create_object(SpawnRequest::new(9, Point::default())),
        Err(SpawnError::UnknownBaseObject { base: 9 })
    );

    let mut sim = new_sim_with(
        Catalog {
            base_objects: vec![BaseObject {
                sprite_id: Some(500),
                ..template("Drone")
            }],
            ..Catalog::default()
        },
        EventLog::with_sprite_policy(SpritePolicy::Exhausted),
        SimConfig::default(),
    );
    assert_eq!(
        sim.create_object(SpawnRequest::new(0, Point::default())),
        Err(SpawnError::SpriteUnavailable { base: 0 })
    );
    assert!(sim.is_game_over());
    sim.tick(1);
    assert_eq!(sim.tick_count(), 0);
}

#[test]
fn energy_pods_that_find_no_slot_are_skipped() {
    let freighter = BaseObject {
        attributes: RELEASE_ENERGY_ON_DEATH,
        energy: 1_500,
        ..template("Freighter")
    };
    let mut catalog = Catalog {
        base_objects: vec![freighter, template("Pod")],
        ..Catalog::default()
    };
    catalog.special.energy_blob = Some(1);
    let mut sim = new_sim_with(
        catalog,
        EventLog::new(),
        SimConfig {
            pool_capacity: 2,
            ..SimConfig::default()
        },
    );
    let freighter = spawn(&mut sim, 0, Some(1));

    sim.destroy_object(freighter);
    assert_eq!(sim.pool()[freighter].active, ObjectState::ToBeFreed);
    assert_eq!(sim.pool().in_use_count(), 1);
    assert_eq!(
        sim.host()
            .count(|event| matches!(event, HostEvent::Kill { owner: Some(1) })),
        1
    );

    sim.tick(1);
    assert_eq!(sim.pool().in_use_count(), 1);
    assert!(sim.pool().iter_in_use().all(|object| object.base_type == 1));
    sim.validate_invariants().expect("pool should stay consistent");
}

#[test]
fn hidden_initial_objects_wait_for_unhide() {
    let mut sim = new_sim(Catalog {
        base_objects: vec![template("Outpost")],
        actions: vec![Action::new(Verb::Alter(AlterArgs {
            alter: AlterKind::Hidden,
            minimum: 1,
            ..AlterArgs::default()
        }))],
        ..Catalog::default()
    });
    sim.place_initial_objects([
        InitialObject::default(),
        InitialObject {
            hidden: true,
            location: Point::new(50, -50),
            ..InitialObject::default()
        },
    ]);
    assert_eq!(sim.pool().in_use_count(), 1);

    sim.execute(ActionListRef::new(0, 1), None, None, None, true);
    assert_eq!(sim.pool().in_use_count(), 2);
    let real = sim.initial_objects()[1]
        .real
        .expect("unhidden object is linked");
    let location = sim.pool()[real.slot].location;
    assert_eq!(location, Point::new(UNIVERSAL_CENTER + 50, UNIVERSAL_CENTER - 50));
}
