//! The tick-driven simulation: object lifecycle, the action interpreter, the
//! think driver and the motion step, all sharing one seeded stream.

use alloc::sync::Arc;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::base::{BaseId, Catalog};
use crate::constants::{ACTION_QUEUE_LENGTH, MAX_SPACE_OBJECTS, UNIVERSAL_CENTER};
use crate::error::{CatalogError, RuleCode, SpawnError};
use crate::fixed_point::{cos_deg, sin_deg, FixedPoint, Point};
use crate::host::Host;
use crate::object::{AdmiralId, ObjectRef, ObjectState, Presence, SpaceObject};
use crate::pool::ObjectPool;
use crate::queue::ActionQueue;
use crate::rng::SeededRng;

mod interpreter;
mod lifecycle;
mod motion;
mod presence;
mod think;

#[cfg(test)]
mod tests;

pub use lifecycle::SpawnRequest;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub player_admiral: Option<AdmiralId>,
    /// Degrees applied to scenario coordinates before they enter the world.
    pub scenario_rotation: i32,
    pub auto_play: bool,
    pub pool_capacity: usize,
    pub queue_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            player_admiral: None,
            scenario_rotation: 0,
            auto_play: false,
            pool_capacity: MAX_SPACE_OBJECTS,
            queue_capacity: ACTION_QUEUE_LENGTH,
        }
    }
}

/// A scenario-placed object. Hidden entries wait for an unhide action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialObject {
    pub base: BaseId,
    pub owner: Option<AdmiralId>,
    /// Scenario coordinates, relative to the universal center.
    pub location: Point,
    pub direction: i32,
    pub hidden: bool,
    pub sprite_id_override: Option<i32>,
    pub special_attributes: u32,
    #[serde(skip)]
    pub real: Option<ObjectRef>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickCheckpoint {
    pub tick: u32,
    pub rng_state: u32,
    pub sync: i32,
    pub objects: usize,
    pub queue_len: usize,
    pub game_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub slot: usize,
    pub id: i32,
    pub base: BaseId,
    pub active: ObjectState,
    pub owner: Option<AdmiralId>,
    pub location: Point,
    pub velocity: FixedPoint,
    pub direction: i32,
    pub health: i32,
    pub energy: i32,
    pub battery: i32,
    pub age: i32,
    pub presence: Presence,
    pub target: Option<ObjectRef>,
    pub dest: Option<ObjectRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: u32,
    pub rng_state: u32,
    pub sync: i32,
    pub game_over: bool,
    pub zoom: i32,
    pub key_mask: u32,
    pub queued_actions: usize,
    pub objects: Vec<ObjectSnapshot>,
}

#[derive(Clone, Debug)]
pub struct Simulation<H: Host> {
    catalog: Arc<Catalog>,
    pool: ObjectPool,
    queue: ActionQueue,
    rng: SeededRng,
    host: H,
    config: SimConfig,
    initials: Vec<InitialObject>,
    tick_count: u32,
    elapsed: i32,
    sync: i32,
    player_ship: Option<ObjectRef>,
    /// Keys the scenario has disabled for human input.
    key_mask: u32,
    zoom: i32,
    game_over: bool,
}

impl<H: Host> Simulation<H> {
    pub fn new(catalog: Catalog, seed: u32, host: H, config: SimConfig) -> Result<Self, CatalogError> {
        catalog.validate()?;
        Ok(Self {
            catalog: Arc::new(catalog),
            pool: ObjectPool::new(config.pool_capacity),
            queue: ActionQueue::new(config.queue_capacity),
            rng: SeededRng::new(seed),
            host,
            config,
            initials: Vec::new(),
            tick_count: 0,
            elapsed: 1,
            sync: 0,
            player_ship: None,
            key_mask: 0,
            zoom: 0,
            game_over: false,
        })
    }

    /// Register scenario objects and create every one that is not hidden.
    pub fn place_initial_objects(&mut self, initials: impl IntoIterator<Item = InitialObject>) {
        let first = self.initials.len();
        self.initials.extend(initials);
        for index in first..self.initials.len() {
            if self.initials[index].hidden {
                continue;
            }
            if let Err(error) = self.object_from_initial(index) {
                tracing::debug!(index, %error, "initial object not created");
            }
        }
    }

    /// Advance one think pass of `elapsed` ticks.
    pub fn tick(&mut self, elapsed: i32) {
        if self.game_over {
            return;
        }
        self.elapsed = elapsed.max(1);
        self.think();
        self.motion();
        self.run_action_queue();
        self.pool.reap();
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    fn run_action_queue(&mut self) {
        self.queue.decrement(self.elapsed);
        while let Some(entry) = self.queue.pop_due() {
            let subject = match entry.subject {
                Some(reference) => match self.pool.resolve_pending(reference) {
                    Some(slot) => Some(slot),
                    None => continue,
                },
                None => None,
            };
            let direct = match entry.direct {
                Some(reference) => match self.pool.resolve_pending(reference) {
                    Some(slot) => Some(slot),
                    None => continue,
                },
                None => None,
            };
            self.execute_slots(entry.list, subject, direct, Some(entry.offset), false);
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn object(&self, slot: usize) -> Option<&SpaceObject> {
        self.pool.get(slot).filter(|object| object.is_in_use())
    }

    pub fn object_mut(&mut self, slot: usize) -> Option<&mut SpaceObject> {
        self.pool.get_mut(slot).filter(|object| object.is_in_use())
    }

    pub fn resolve(&self, reference: ObjectRef) -> Option<usize> {
        self.pool.resolve(reference)
    }

    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn sync(&self) -> i32 {
        self.sync
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn key_mask(&self) -> u32 {
        self.key_mask
    }

    pub fn player_ship(&self) -> Option<usize> {
        self.pool.resolve_opt(self.player_ship)
    }

    pub fn set_player_ship(&mut self, slot: usize) {
        self.player_ship = self.pool.reference(slot);
    }

    pub fn initial_objects(&self) -> &[InitialObject] {
        &self.initials
    }

    /// Feed human input to an object, minus any keys the scenario disabled.
    pub fn press_keys(&mut self, slot: usize, keys: u32) {
        let mask = self.key_mask;
        if let Some(object) = self.object_mut(slot) {
            object.keys_down = keys & !mask;
        }
    }

    pub fn checkpoint(&self) -> TickCheckpoint {
        TickCheckpoint {
            tick: self.tick_count,
            rng_state: self.rng.state(),
            sync: self.sync,
            objects: self.pool.in_use_count(),
            queue_len: self.queue.len(),
            game_over: self.game_over,
        }
    }

    pub fn world_snapshot(&self) -> WorldSnapshot {
        let objects = self
            .pool
            .active_slots()
            .into_iter()
            .map(|slot| {
                let object = &self.pool[slot];
                ObjectSnapshot {
                    slot,
                    id: object.id,
                    base: object.base_type,
                    active: object.active,
                    owner: object.owner,
                    location: object.location,
                    velocity: object.velocity,
                    direction: object.direction,
                    health: object.health,
                    energy: object.energy,
                    battery: object.battery,
                    age: object.age,
                    presence: object.presence,
                    target: object.target,
                    dest: object.dest,
                }
            })
            .collect();

        WorldSnapshot {
            tick: self.tick_count,
            rng_state: self.rng.state(),
            sync: self.sync,
            game_over: self.game_over,
            zoom: self.zoom,
            key_mask: self.key_mask,
            queued_actions: self.queue.len(),
            objects,
        }
    }

    pub fn validate_invariants(&self) -> Result<(), RuleCode> {
        self.pool.validate()?;
        self.queue.validate()?;

        for object in self.pool.iter_in_use() {
            if object.id < 0 || object.id as u32 >= crate::constants::OBJECT_ID_RANGE {
                return Err(RuleCode::ObjectIdRange);
            }
            let cap = self
                .catalog
                .base(object.base_type)
                .map_or(i32::MAX, |base| base.energy);
            if object.energy < 0 || object.energy > cap.max(0) {
                return Err(RuleCode::ObjectEnergyRange);
            }
        }

        Ok(())
    }

    /// Count live objects of a template (any template when `None`) held by
    /// `owner` (any owner when `None`). Objects awaiting reaping still count.
    pub fn count_objects_of_base_type(
        &self,
        base: Option<BaseId>,
        owner: Option<AdmiralId>,
    ) -> usize {
        self.pool
            .active_slots()
            .into_iter()
            .map(|slot| &self.pool[slot])
            .filter(|object| base.map_or(true, |base| object.base_type == base))
            .filter(|object| owner.map_or(true, |owner| object.owner == Some(owner)))
            .count()
    }

    /// Walk the active list circularly from `start` for the next in-use object
    /// that carries (or, with `exclude`, lacks) any of `attributes`.
    pub fn next_object_with_attributes(
        &self,
        start: Option<usize>,
        attributes: u32,
        exclude: bool,
    ) -> Option<usize> {
        let slots = self.pool.active_slots();
        if slots.is_empty() {
            return None;
        }
        let origin = start
            .and_then(|start| slots.iter().position(|&slot| slot == start))
            .map_or(0, |index| index + 1);

        (0..slots.len())
            .map(|step| slots[(origin + step) % slots.len()])
            .filter(|&slot| Some(slot) != start)
            .find(|&slot| {
                let object = &self.pool[slot];
                object.is_in_use() && object.has(attributes) != exclude
            })
    }

    /// Create the object for a registered initial entry unless it already
    /// exists.
    pub fn object_from_initial(&mut self, index: usize) -> Result<usize, SpawnError> {
        let Some(initial) = self.initials.get(index).cloned() else {
            return Err(SpawnError::UnknownBaseObject { base: BaseId::MAX });
        };
        if let Some(slot) = self.pool.resolve_opt(initial.real) {
            return Ok(slot);
        }

        let location = self.scenario_point(initial.location);
        let request = SpawnRequest::new(initial.base, location)
            .direction(crate::fixed_point::add_angle(
                initial.direction,
                self.config.scenario_rotation,
            ))
            .owner(initial.owner)
            .special_attributes(initial.special_attributes)
            .sprite_override(initial.sprite_id_override);
        let slot = self.create_object(request)?;
        self.initials[index].real = self.pool.reference(slot);
        Ok(slot)
    }

    pub fn unhide_initial_object(&mut self, index: i32) {
        let Ok(index) = usize::try_from(index) else {
            return;
        };
        if index >= self.initials.len() {
            return;
        }
        if let Err(error) = self.object_from_initial(index) {
            tracing::debug!(index, %error, "could not unhide initial object");
        }
    }

    fn initial_slot(&self, index: u32) -> Option<usize> {
        let initial = self.initials.get(index as usize)?;
        self.pool.resolve_opt(initial.real)
    }

    /// Rotate scenario coordinates by the scenario rotation and move them to
    /// the universal center.
    fn scenario_point(&self, point: Point) -> Point {
        let angle = self.config.scenario_rotation;
        let cos = cos_deg(angle).raw() as i64;
        let sin = sin_deg(angle).raw() as i64;
        let h = point.h as i64;
        let v = point.v as i64;
        let rotated_h = (h * cos - v * sin) >> 8;
        let rotated_v = (h * sin + v * cos) >> 8;
        Point::new(
            (rotated_h as i32).wrapping_add(UNIVERSAL_CENTER),
            (rotated_v as i32).wrapping_add(UNIVERSAL_CENTER),
        )
    }

    fn distance_from_player(&self, location: Point) -> u64 {
        let Some(player) = self.player_ship() else {
            return 0;
        };
        let origin = self.pool[player].location;
        let dh = (location.h as i64 - origin.h as i64).unsigned_abs();
        let dv = (location.v as i64 - origin.v as i64).unsigned_abs();
        dh * dh + dv * dv
    }
}
