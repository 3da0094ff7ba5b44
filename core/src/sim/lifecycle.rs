use super::*;

use alloc::format;

use crate::attributes::*;
use crate::base::{BaseObject, FrameData};
use crate::constants::*;
use crate::fixed_point::{add_angle, rot_point, Fixed};
use crate::host::{SpriteAttach, SpriteRequest};
use crate::object::{tiny_color_for, AnimationState, BeamState, WeaponSlot, WeaponState};

/// Everything `create_object` needs besides the template itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    pub base: BaseId,
    /// Added to the template's own launch velocity.
    pub velocity: FixedPoint,
    pub location: Point,
    /// Added to the template's initial direction.
    pub direction: i32,
    pub owner: Option<AdmiralId>,
    pub special_attributes: u32,
    pub sprite_override: Option<i32>,
}

impl SpawnRequest {
    pub fn new(base: BaseId, location: Point) -> Self {
        Self {
            base,
            velocity: FixedPoint::ZERO,
            location,
            direction: 0,
            owner: None,
            special_attributes: 0,
            sprite_override: None,
        }
    }

    pub fn velocity(mut self, velocity: FixedPoint) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn direction(mut self, direction: i32) -> Self {
        self.direction = direction;
        self
    }

    pub fn owner(mut self, owner: Option<AdmiralId>) -> Self {
        self.owner = owner;
        self
    }

    pub fn special_attributes(mut self, attributes: u32) -> Self {
        self.special_attributes = attributes;
        self
    }

    pub fn sprite_override(mut self, sprite_id: Option<i32>) -> Self {
        self.sprite_override = sprite_id;
        self
    }
}

fn player_flag_for(owner: Option<AdmiralId>) -> u32 {
    match owner {
        Some(owner) => 1u32.checked_shl(u32::from(owner)).unwrap_or(0),
        None => NO_OWNER_PLAYER_FLAG,
    }
}

fn periodic_time(base: &BaseObject, random: &mut SeededRng) -> i32 {
    if base.activate_period > 0 {
        base.activate_period + random.roll(base.activate_period_range)
    } else {
        0
    }
}

fn init_animation(frame: &FrameData, random: &mut SeededRng) -> AnimationState {
    let FrameData::Animation(frame) = frame else {
        return AnimationState::default();
    };
    let mut state = AnimationState {
        this_shape: frame.frame_shape + Fixed(random.roll(frame.frame_shape_range)),
        direction: frame.frame_direction,
        speed: frame.frame_speed,
    };
    if frame.frame_direction_range == -1 {
        if random.roll(2) == 1 {
            state.direction = 1;
        }
    } else if frame.frame_direction_range > 0 {
        state.direction += random.roll(frame.frame_direction_range);
    }
    state
}

fn initial_age(base: &BaseObject, random: &mut SeededRng) -> i32 {
    if base.initial_age >= 0 {
        base.initial_age + random.roll(base.initial_age_range)
    } else {
        -1
    }
}

/// Point each weapon slot at the template's mounts. `reload` refills ammo,
/// rewinds the fire position and clamps the cooldown to the new fire time.
/// An empty mount keeps its ammo and position for a later relative rebase.
fn load_weapons(catalog: &Catalog, base: &BaseObject, object: &mut SpaceObject, reload: bool) {
    let mounts = [&base.pulse, &base.beam, &base.special];
    for (which, mount) in WeaponSlot::ALL.into_iter().zip(mounts) {
        let frame = mount
            .as_ref()
            .and_then(|mount| Some((mount.base, catalog.weapon_frame(mount.base)?)));
        let state = object.weapon_mut(which);
        match frame {
            Some((weapon, frame)) => {
                state.base = Some(weapon);
                if reload {
                    state.ammo = frame.ammo;
                    state.position = 0;
                    state.time = state.time.clamp(0, frame.fire_time.max(0));
                }
            }
            None => {
                state.base = None;
                state.time = 0;
            }
        }
    }
    recompute_weapon_ranges(catalog, object);
}

fn recompute_weapon_ranges(catalog: &Catalog, object: &mut SpaceObject) {
    let mut longest = 0;
    let mut shortest = u32::MAX;
    for frame in object
        .weapons
        .iter()
        .filter_map(|state| catalog.weapon_frame(state.base?))
    {
        if frame.range > 0 && frame.usage & USE_FOR_ATTACKING != 0 {
            longest = longest.max(frame.range);
            shortest = shortest.min(frame.range);
        }
    }
    if longest == 0 {
        shortest = 0;
    }
    object.longest_weapon_range = longest;
    object.shortest_weapon_range = shortest;
    object.engage_range = longest.max(ENGAGE_RANGE_SQ);
}

/// Build a fresh object from its template using its own seeded stream.
fn init_from_base(
    catalog: &Catalog,
    base: &BaseObject,
    request: &SpawnRequest,
    seed: u32,
) -> SpaceObject {
    let mut random = SeededRng::new(seed);
    let mut object = SpaceObject {
        base_type: request.base,
        attributes: base.attributes,
        owner: request.owner,
        player_flag: player_flag_for(request.owner),
        shield_color: base.shield_color,
        tiny_size: base.tiny_size,
        layer: base.pixel_layer,
        ..SpaceObject::default()
    };

    object.id = random.roll(LOCAL_ID_RANGE);
    object.periodic_time = periodic_time(base, &mut random);

    let mut direction = add_angle(base.initial_direction, request.direction);
    if base.initial_direction_range > 0 {
        direction = add_angle(direction, random.roll(base.initial_direction_range));
    }
    object.direction = direction;

    let speed = base.initial_velocity + Fixed(random.roll(base.initial_velocity_range));
    object.velocity = rot_point(direction).scale(speed) + request.velocity;
    object.max_velocity = base.max_velocity;
    object.thrust = if object.has(CAN_THINK | REMOTE_OR_HUMAN) {
        Fixed::ZERO
    } else {
        base.max_thrust
    };

    object.energy = base.energy;
    object.battery = base.energy * BATTERY_TO_ENERGY_RATIO;

    if object.has(IS_SELF_ANIMATED) {
        object.animation = init_animation(&base.frame, &mut random);
    }
    if let (true, FrameData::Beam(frame)) = (object.has(IS_BEAM), &base.frame) {
        object.beam = Some(BeamState {
            kind: frame.kind,
            ..BeamState::default()
        });
    }

    object.health = base.health;
    object.age = initial_age(base, &mut random);
    object.natural_scale = base.natural_scale;
    object.sprite_id = request.sprite_override.or(base.sprite_id);
    object.random_seed = random;

    load_weapons(catalog, base, &mut object, true);
    object
}

impl<H: Host> Simulation<H> {
    /// Instantiate a template, link it at the head of the active list and run
    /// its create actions.
    pub fn create_object(&mut self, request: SpawnRequest) -> Result<usize, SpawnError> {
        let catalog = Arc::clone(&self.catalog);
        let Some(base) = catalog.base(request.base) else {
            tracing::debug!(base = request.base, "unknown base object, not created");
            return Err(SpawnError::UnknownBaseObject { base: request.base });
        };

        let seed = self.rng.next_int(OBJECT_SEED_RANGE);
        let mut object = init_from_base(&catalog, base, &request, seed);
        object.location = request.location;
        if object.has(CONSIDER_DISTANCE) {
            object.distance_from_player = self.distance_from_player(request.location);
        }
        object.id = self.rng.next_int(OBJECT_ID_RANGE) as i32;

        let Some(slot) = self.pool.first_free() else {
            tracing::debug!(base = request.base, "object pool full, not created");
            return Err(SpawnError::PoolFull);
        };

        object.tiny_color = tiny_color_for(
            object.owner,
            self.config.player_admiral,
            object.layer,
            object.tiny_size,
        );

        if let Some(sprite_id) = object.sprite_id {
            let attach = self.host.attach_sprite(&SpriteRequest {
                slot,
                base: request.base,
                sprite_id,
                layer: object.layer,
                scale: object.natural_scale,
                tiny_size: object.tiny_size,
                color: object.tiny_color,
                location: object.location,
            });
            match attach {
                SpriteAttach::Attached(sprite) => object.sprite = Some(sprite),
                SpriteAttach::Missing => {}
                SpriteAttach::Exhausted => {
                    tracing::warn!(base = request.base, sprite_id, "no sprite available, ending session");
                    self.game_over = true;
                    return Err(SpawnError::SpriteUnavailable { base: request.base });
                }
            }
        }

        object.attributes |= request.special_attributes;
        self.pool.insert_at_head(slot, object);
        self.execute_slots(base.create, Some(slot), None, None, true);
        Ok(slot)
    }

    /// Swap an object's template in place. Velocity, direction and the
    /// object's stream position carry over.
    pub fn change_base_type(
        &mut self,
        slot: usize,
        base_type: BaseId,
        sprite_override: Option<i32>,
        relative: bool,
    ) {
        let catalog = Arc::clone(&self.catalog);
        let Some(base) = catalog.base(base_type) else {
            tracing::debug!(base = base_type, "unknown base object, type unchanged");
            return;
        };
        let Some(object) = self.object_mut(slot) else {
            return;
        };

        object.attributes = base.attributes | (object.attributes & RETAINED_ON_REBASE);
        object.base_type = base_type;
        object.tiny_size = base.tiny_size;
        object.shield_color = base.shield_color;
        object.layer = base.pixel_layer;

        if object.has(CAN_TURN) {
            object.direction_goal = 0;
            object.turn_fraction = Fixed::ZERO;
            object.turn_velocity = Fixed::ZERO;
        }
        if object.has(IS_SELF_ANIMATED) {
            object.animation = init_animation(&base.frame, &mut object.random_seed);
        }

        object.max_velocity = base.max_velocity;
        object.age = base.initial_age + object.random_seed.roll(base.initial_age_range);
        object.natural_scale = base.natural_scale;
        object.sprite_id = sprite_override.or(base.sprite_id);
        object.periodic_time = periodic_time(base, &mut object.random_seed);

        load_weapons(&catalog, base, object, !relative);

        if object.sprite.is_some() {
            let scale = object.natural_scale;
            self.host.scale_sprite(slot, scale);
        }
    }

    pub fn destroy_object(&mut self, slot: usize) {
        let Some(object) = self.object(slot) else {
            return;
        };
        let catalog = Arc::clone(&self.catalog);
        let Some(base) = catalog.base(object.base_type) else {
            return;
        };
        let this = object.reference();
        let owner = object.owner;
        let energy = object.energy;
        let releases_energy = object.has(RELEASE_ENERGY_ON_DEATH);
        let debris = SpawnRequest::new(0, object.location)
            .velocity(object.velocity)
            .direction(object.direction);

        if object.has(NEUTRAL_DEATH) {
            self.pool[slot].health = base.health;
            for other in self.pool.active_slots() {
                let other = &mut self.pool[other];
                if other.has(CAN_ACCEPT_DESTINATION) && other.target == Some(this) {
                    other.target = None;
                }
            }

            self.alter_owner(slot, None, true);
            self.pool[slot].attributes &= !(HATED | CAN_ENGAGE | CAN_COLLIDE | CAN_BE_HIT);
            self.execute_slots(base.destroy, Some(slot), None, None, true);
            return;
        }

        self.host.add_kill(owner);

        if releases_energy {
            if let Some(blob) = catalog.special.energy_blob {
                let request = SpawnRequest { base: blob, ..debris };
                for _ in 0..energy / ENERGY_POD_AMOUNT {
                    if let Err(error) = self.create_object(request) {
                        tracing::debug!(slot, %error, "energy pod not created");
                    }
                }
            }
        }

        if self.pool[slot].has(IS_DESTINATION) && !base.destroy_dont_die {
            self.host.remove_destination(slot);
            for other in self.pool.active_slots() {
                let other = &mut self.pool[other];
                if other.has(CAN_ACCEPT_DESTINATION) && other.dest == Some(this) {
                    other.dest = None;
                    other.attributes &= !STATIC_DESTINATION;
                }
            }
        }

        self.execute_slots(base.destroy, Some(slot), None, None, true);

        if self.pool[slot].has(CAN_ACCEPT_DESTINATION) {
            self.host.remove_from_destination(slot);
        }
        if !base.destroy_dont_die && self.pool[slot].active != ObjectState::Available {
            self.pool[slot].active = ObjectState::ToBeFreed;
        }
    }

    pub fn alter_owner(&mut self, slot: usize, owner: Option<AdmiralId>, announce: bool) {
        let Some(object) = self.object(slot) else {
            return;
        };
        if object.owner == owner {
            return;
        }
        let original = object.owner;
        let catalog = Arc::clone(&self.catalog);
        let Some(base) = catalog.base(object.base_type) else {
            return;
        };

        if object.has(IS_PLAYER_SHIP | REMOTE_OR_HUMAN) && !base.destroy_dont_die {
            self.create_floating_body(slot);
        }

        let player = self.config.player_admiral;
        let object = &mut self.pool[slot];
        object.owner = owner;
        object.player_flag = player_flag_for(owner);
        if object.has(NEUTRAL_DEATH) {
            object.attributes = base.attributes;
        }
        object.tiny_color = tiny_color_for(owner, player, object.layer, object.tiny_size);
        object.remote_foe_strength = Fixed::ZERO;
        object.remote_friend_strength = Fixed::ZERO;
        object.escort_strength = Fixed::ZERO;
        object.local_foe_strength = Fixed::ZERO;
        object.local_friend_strength = Fixed::ZERO;
        object.best_considered_target_value = u32::MAX;
        object.current_target_value = u32::MAX;
        let this = object.reference();
        let tint = object.tiny_color;
        if object.sprite.is_some() {
            self.host.recolor_sprite(slot, tint);
        }

        let mut foe = Fixed::ZERO;
        let mut friend = Fixed::ZERO;
        for other in self.pool.active_slots() {
            let other = &mut self.pool[other];
            if !other.has(CAN_THINK) || other.dest != Some(this) {
                continue;
            }
            other.current_target_value = u32::MAX;
            let offense = catalog
                .base(other.base_type)
                .map_or(Fixed::ZERO, |base| base.offense_value);
            if other.owner != owner {
                foe += offense;
            } else {
                friend += offense;
            }
        }
        let object = &mut self.pool[slot];
        object.remote_foe_strength = foe;
        object.remote_friend_strength = friend;
        object.escort_strength = friend;

        let is_destination = object.has(IS_DESTINATION);
        if is_destination {
            if object.has(NEUTRAL_DEATH) {
                self.host.clear_occupants(slot);
            }
            self.host.stop_building(slot);
            if let Some(owner) = owner {
                self.host.destination_captured(slot, owner);
            }
        }

        if announce {
            let text = match (owner, original) {
                (Some(owner), _) => Some(format!(
                    "{} captured by {}.",
                    base.name,
                    self.host.admiral_name(owner)
                )),
                (None, Some(original)) => Some(format!(
                    "{} lost by {}.",
                    base.name,
                    self.host.admiral_name(original)
                )),
                (None, None) => None,
            };
            if let Some(text) = text {
                self.host.status_message(&text);
            }
        }

        if is_destination {
            self.host.recalc_build_data();
        }
    }

    /// Negative amounts wound, positive amounts heal. Dropping below zero
    /// destroys the object.
    pub fn alter_health(&mut self, slot: usize, amount: i32) {
        let Some(object) = self.object_mut(slot) else {
            return;
        };
        object.health = object.health.saturating_add(amount);
        if object.health < 0 {
            self.destroy_object(slot);
        }
    }

    /// Energy above the template maximum spills into the battery.
    pub fn alter_energy(&mut self, slot: usize, amount: i32) {
        let Some(object) = self.object(slot) else {
            return;
        };
        let cap = self
            .catalog
            .base(object.base_type)
            .map_or(0, |base| base.energy);
        let object = &mut self.pool[slot];
        object.energy = object.energy.saturating_add(amount);
        if object.energy < 0 {
            object.energy = 0;
        } else if object.energy > cap {
            let spill = object.energy - cap;
            object.energy = cap;
            self.alter_battery(slot, spill);
        }
    }

    /// Battery charge above its capacity is paid out to the owner.
    pub fn alter_battery(&mut self, slot: usize, amount: i32) {
        let Some(object) = self.object(slot) else {
            return;
        };
        let capacity = self
            .catalog
            .base(object.base_type)
            .map_or(0, |base| base.energy)
            .saturating_mul(BATTERY_TO_ENERGY_RATIO);
        let object = &mut self.pool[slot];
        object.battery = object.battery.saturating_add(amount);
        if object.battery > capacity {
            let excess = object.battery - capacity;
            let owner = object.owner;
            object.battery = capacity;
            self.host.pay_admiral(owner, excess);
        }
    }

    /// Feed the occupation tally of a neutral-death destination; the owner
    /// flips once the tally reaches the template's capture threshold.
    pub fn alter_occupation(
        &mut self,
        slot: usize,
        owner: Option<AdmiralId>,
        amount: i32,
        announce: bool,
    ) {
        let Some(object) = self.object(slot) else {
            return;
        };
        if !(object.has(IS_DESTINATION) && object.has(NEUTRAL_DEATH)) {
            return;
        }
        let threshold = self
            .catalog
            .base(object.base_type)
            .map_or(0, |base| base.initial_age_range);
        if self.host.alter_occupation(slot, owner, amount) >= threshold {
            self.alter_owner(slot, owner, announce);
        }
    }

    pub fn alter_cloak_state(&mut self, slot: usize, cloak: bool) {
        let Some(object) = self.object_mut(slot) else {
            return;
        };
        if cloak && object.cloak_state == 0 {
            object.cloak_state = 1;
            self.host.cloak_cue(slot, true);
        } else if (!cloak || object.has(REMOTE_OR_HUMAN))
            && object.cloak_state >= CLOAK_ENGAGE_THRESHOLD
        {
            object.cloak_state = CLOAK_OFF_STATE_MAX;
            self.host.cloak_cue(slot, false);
        }
    }

    pub fn activate_special(&mut self, slot: usize) {
        if self.object(slot).is_some() {
            self.fire_weapon(slot, WeaponSlot::Special, None);
        }
    }

    /// Eject a human occupant into a player body, unless the object already
    /// is one.
    pub(crate) fn create_floating_body(&mut self, slot: usize) {
        let Some(body) = self.catalog.special.player_body else {
            return;
        };
        let object = &self.pool[slot];
        if object.base_type == body {
            return;
        }
        let owner = object.owner;
        let request = SpawnRequest::new(body, object.location)
            .velocity(object.velocity)
            .direction(object.direction)
            .owner(owner);

        match self.create_object(request) {
            Ok(new) => {
                let carried = self.pool[slot].attributes & (IS_HUMAN_CONTROLLED | IS_PLAYER_SHIP);
                self.pool[slot].attributes &= !carried;
                self.pool[new].attributes |= carried;
                if self.player_ship() == Some(slot)
                    || (owner.is_some() && owner == self.config.player_admiral && carried != 0)
                {
                    self.player_ship = self.pool.reference(new);
                }
                self.host.player_ship_changed(owner, new);
            }
            Err(error) => {
                tracing::debug!(slot, %error, "player body not created");
                self.host.player_body_lost(owner);
            }
        }
    }

    fn eject_occupant(&mut self, slot: usize) {
        let object = &self.pool[slot];
        let dont_die = self
            .catalog
            .base(object.base_type)
            .is_some_and(|base| base.destroy_dont_die);
        if object.has(IS_PLAYER_SHIP | REMOTE_OR_HUMAN) && !dont_die {
            self.create_floating_body(slot);
        }
    }

    /// Mark an object for reaping after ejecting its occupant.
    pub(crate) fn expire_object(&mut self, slot: usize) {
        if !self.pool[slot].is_in_use() {
            return;
        }
        self.eject_occupant(slot);
        self.pool[slot].active = ObjectState::ToBeFreed;
    }

    /// Ejecting variant of `destroy_object`, used by scripted kills.
    pub(crate) fn kill_object(&mut self, slot: usize) {
        if !self.pool[slot].is_in_use() {
            return;
        }
        self.eject_occupant(slot);
        self.destroy_object(slot);
    }

    /// `source` strikes `target`: apply its damage and run its collide list.
    pub fn hit_object(&mut self, target: usize, source: usize) {
        let (Some(victim), Some(striker)) = (self.object(target), self.pool.get(source)) else {
            return;
        };
        if !(striker.has(CAN_COLLIDE) && victim.has(CAN_BE_HIT)) {
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let (Some(victim_base), Some(striker_base)) = (
            catalog.base(victim.base_type),
            catalog.base(striker.base_type),
        ) else {
            return;
        };
        let damage = striker_base.damage;

        self.pool[target].time_from_origin = 0;
        let victim = &self.pool[target];
        if victim.health.saturating_sub(damage) < 0
            && victim.has(IS_PLAYER_SHIP | REMOTE_OR_HUMAN)
            && !victim_base.destroy_dont_die
        {
            self.create_floating_body(target);
        }

        self.alter_health(target, -damage);

        let victim = &mut self.pool[target];
        if victim.shield_color != NO_SHIELD_COLOR && victim_base.health > 0 {
            let ratio = i64::from(victim.health) * i64::from(HIT_STATE_MAX)
                / i64::from(victim_base.health);
            victim.hit_state = ratio as i32 + HIT_STATE_OFFSET;
        }
        if victim.cloak_state > 0 {
            victim.cloak_state = 1;
        }

        let owner = victim.owner;
        let base_type = victim.base_type;
        let player_owned = owner.is_some() && owner == self.config.player_admiral;
        if victim.health < 0 && player_owned && victim.has(CAN_ACCEPT_DESTINATION) {
            let remaining = self
                .count_objects_of_base_type(Some(base_type), owner)
                .saturating_sub(1);
            let text = format!("{} destroyed. {} remaining.", victim_base.name, remaining);
            self.host.status_message(&text);
        }

        if self.pool[source].is_in_use() {
            self.execute_slots(striker_base.collide, Some(source), Some(target), None, true);
        }

        if player_owned && self.pool[target].has(IS_HUMAN_CONTROLLED) && damage > 0 {
            self.host.color_flash(HIT_FLASH_LENGTH, HIT_FLASH_COLOR, 0);
        }
    }

    /// Point a freshly created beam at its source and at the source's target.
    pub(crate) fn attach_beam(&mut self, beam: usize, source: usize) {
        let Some(kind) = self.pool[beam].beam.map(|state| state.kind) else {
            return;
        };
        if kind == crate::base::BeamKind::Kinetic {
            return;
        }
        let from = Some(self.pool[source].reference());
        let target = self.pool.resolve_opt(self.pool[source].target);
        let state = if kind.is_relative_coord() {
            let to_location = target.map_or(self.pool[beam].location, |target| {
                self.pool[target].location
            });
            BeamState {
                kind,
                from,
                to: None,
                to_location: Some(to_location),
            }
        } else {
            BeamState {
                kind,
                from,
                to: target.and_then(|target| self.pool.reference(target)),
                to_location: None,
            }
        };
        self.pool[beam].beam = Some(state);
    }

    /// Replace one weapon slot, or clear it for a negative id.
    pub(crate) fn set_weapon(&mut self, slot: usize, which: WeaponSlot, weapon: i32) {
        let Ok(weapon) = BaseId::try_from(weapon) else {
            *self.pool[slot].weapon_mut(which) = WeaponState::default();
            return;
        };
        let catalog = Arc::clone(&self.catalog);
        let Some(frame) = catalog.weapon_frame(weapon) else {
            tracing::debug!(weapon, "not a weapon, slot unchanged");
            return;
        };
        let object = &mut self.pool[slot];
        *object.weapon_mut(which) = WeaponState {
            base: Some(weapon),
            ammo: frame.ammo,
            ..WeaponState::default()
        };
        object.longest_weapon_range = object.longest_weapon_range.max(frame.range);
        object.shortest_weapon_range = object.shortest_weapon_range.min(frame.range);
        object.engage_range = object.longest_weapon_range.max(ENGAGE_RANGE_SQ);
    }

    /// Send `slot` toward `dest`, or clear its destination. Objects with a
    /// static destination ignore the request.
    pub fn set_object_destination(&mut self, slot: usize, dest: Option<usize>) {
        let Some(object) = self.object(slot) else {
            return;
        };
        if object.has(STATIC_DESTINATION) {
            return;
        }
        let target = dest.and_then(|dest| self.pool.get(dest));
        let dest_ref = target.map(|target| target.reference());
        let dest_dest = target.and_then(|target| target.dest);
        let location = target.map(|target| target.location);

        let object = &mut self.pool[slot];
        object.dest = dest_ref;
        object.dest_dest = dest_dest;
        object.destination_location = location;
        object.time_from_origin = 0;
        object.run_time_flags &= !HAS_ARRIVED;
    }

    pub fn toggle_autopilot(&mut self, slot: usize) {
        let Some(object) = self.object_mut(slot) else {
            return;
        };
        object.attributes ^= ON_AUTO_PILOT;
        let on = object.has(ON_AUTO_PILOT);
        self.host.autopilot_toggled(slot, on);
    }

    pub(crate) fn spawn_flare(&mut self, flare: Option<BaseId>, slot: usize) {
        let Some(flare) = flare else {
            return;
        };
        let object = &self.pool[slot];
        let request = SpawnRequest::new(flare, object.location).direction(object.direction);
        if let Err(error) = self.create_object(request) {
            tracing::debug!(slot, %error, "flare not created");
        }
    }
}
