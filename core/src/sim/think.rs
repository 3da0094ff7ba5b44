use super::*;

use crate::attributes::*;
use crate::base::{BaseObject, FrameData};
use crate::constants::*;
use crate::fixed_point::{add_angle, angle_difference, rotate_point, Fixed};
use crate::object::{Presence, WeaponSlot};

const FIRE_KEYS: [(u32, WeaponSlot); 3] = [
    (ONE_KEY, WeaponSlot::Pulse),
    (TWO_KEY, WeaponSlot::Beam),
    (ENTER_KEY, WeaponSlot::Special),
];

/// Objects steered by the simulation rather than by a human or the network.
pub(super) fn is_autonomous(object: &SpaceObject) -> bool {
    !object.has(REMOTE_OR_HUMAN) || object.has(ON_AUTO_PILOT)
}

pub(super) fn turn_rate(object: &SpaceObject, base: &BaseObject) -> Fixed {
    if object.has(SHAPE_FROM_DIRECTION) {
        base.frame.max_turn_rate()
    } else {
        DEFAULT_TURN_RATE
    }
}

/// Move `amount` energy into the warp pool. Returns false, draining what is
/// left, when the object cannot pay in full.
fn collect_warp_energy(object: &mut SpaceObject, amount: i32) -> bool {
    if amount >= object.energy {
        object.warp_energy_collected += object.energy;
        object.energy = 0;
        false
    } else {
        object.warp_energy_collected += amount;
        object.energy -= amount;
        true
    }
}

fn recharge(object: &mut SpaceObject, base: &BaseObject, catalog: &Catalog) {
    if object.energy < base.energy - ENERGY_CHUNK && object.battery > ENERGY_CHUNK {
        object.battery -= ENERGY_CHUNK;
        object.energy += ENERGY_CHUNK;
    }

    if object.health < base.health / 2 && object.energy > HEALTH_RATIO {
        object.health += 1;
        object.energy -= HEALTH_RATIO;
    }

    for weapon in object.weapons.iter_mut() {
        let Some(frame) = weapon.base.and_then(|id| catalog.weapon_frame(id)) else {
            continue;
        };
        if weapon.ammo < frame.ammo >> 1 && object.energy >= WEAPON_RATIO {
            weapon.charge += 1;
            object.energy -= WEAPON_RATIO;
            if frame.restock_cost >= 0 && weapon.charge >= frame.restock_cost {
                weapon.charge -= frame.restock_cost;
                weapon.ammo += 1;
            }
        }
    }
}

impl<H: Host> Simulation<H> {
    pub(super) fn think(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        self.sync = self.rng.state() as i32;

        for slot in self.pool.active_slots() {
            let object = &self.pool[slot];
            if !object.is_in_use() {
                continue;
            }
            self.sync = self
                .sync
                .wrapping_add(object.location.h)
                .wrapping_add(object.location.v);

            if !object.has(CAN_THINK | REMOTE_OR_HUMAN) {
                continue;
            }
            let Some(base) = catalog.base(object.base_type) else {
                continue;
            };
            self.think_object(slot, base);
        }
    }

    fn think_object(&mut self, slot: usize, base: &BaseObject) {
        let object = &mut self.pool[slot];
        object.target_angle = object.direction;
        object.direction_goal = object.direction;

        let presence = object.presence;
        let mut keys = match presence {
            Presence::Normal => self.think_normal(slot, base),
            Presence::WarpIn { .. } => self.think_warp_in(slot, base),
            Presence::Warping { .. } => self.think_warping(slot, base),
            Presence::WarpOut { .. } => self.think_warp_out(slot, base),
            Presence::Landing { .. } => self.think_landing(slot, base),
        };
        if !self.pool[slot].is_in_use() {
            return;
        }

        let object = &mut self.pool[slot];
        let rate = turn_rate(object, base);
        if is_autonomous(object) {
            if object.has(HAS_DIRECTION_GOAL) {
                if object.has(SHAPE_FROM_DIRECTION)
                    && object.has(IS_GUIDED)
                    && object.target.is_some()
                    && angle_difference(object.target_angle, object.direction).abs()
                        > GUIDED_LOCK_ANGLE
                {
                    object.target = None;
                    object.direction_goal = object.direction;
                }

                let offset = angle_difference(object.direction_goal, object.direction);
                if offset.abs() > Fixed(rate.raw() << 1).to_long() {
                    if offset > 0 {
                        keys |= RIGHT_KEY;
                    } else if offset < 0 {
                        keys |= LEFT_KEY;
                    }
                }
            }

            if object.keys_down & MANUAL_OVERRIDE_FLAG == 0 {
                if object.closest_distance < ENGAGE_RANGE_SQ {
                    let mut held = object.keys_down;
                    if object.random_seed.roll(base.skill_den) < base.skill_num {
                        held = (held & !MOTION_KEY_MASK) | (keys & MOTION_KEY_MASK);
                    }
                    if object.random_seed.roll(3) == 1 {
                        held = (held & !WEAPON_KEY_MASK) | (keys & WEAPON_KEY_MASK);
                    }
                    object.keys_down = (held & !MISC_KEY_MASK) | (keys & MISC_KEY_MASK);
                } else {
                    object.keys_down = (object.keys_down & SPECIAL_KEY_MASK) | keys;
                }
            } else {
                object.keys_down &= !MANUAL_OVERRIDE_FLAG;
            }
        }

        self.apply_special_keys(slot);
        self.apply_keys(slot, base, rate);
    }

    fn apply_special_keys(&mut self, slot: usize) {
        let keys = self.pool[slot].keys_down;
        if keys & ADOPT_TARGET_KEY != 0 {
            let target = self.pool.resolve_opt(self.pool[slot].target);
            self.set_object_destination(slot, target);
        }
        if keys & AUTO_PILOT_KEY != 0 {
            self.toggle_autopilot(slot);
        }
        if keys & GIVE_COMMAND_KEY != 0 {
            self.host.give_command(slot);
        }
        self.pool[slot].keys_down &= !SPECIAL_KEY_MASK;
    }

    /// Turn the held keys into turn, thrust, recharge, fire and warp state.
    fn apply_keys(&mut self, slot: usize, base: &BaseObject, rate: Fixed) {
        let catalog = Arc::clone(&self.catalog);
        let elapsed = self.elapsed;
        let object = &mut self.pool[slot];

        if object.offline_time > 0 {
            if object.random_seed.roll(object.offline_time) > DIRECTION_ERROR {
                object.keys_down = 0;
            }
            object.offline_time -= 1;
        }

        let keys = object.keys_down;
        if object.has(HAS_DIRECTION_GOAL) && object.offline_time <= 0 {
            object.turn_velocity = if keys & LEFT_KEY != 0 {
                -rate
            } else if keys & RIGHT_KEY != 0 {
                rate
            } else {
                Fixed::ZERO
            };
        }

        if keys & UP_KEY != 0 {
            if !object.presence.is_warp() {
                object.thrust = base.max_thrust;
            }
        } else if keys & DOWN_KEY != 0 {
            object.thrust = -base.max_thrust;
        } else {
            object.thrust = Fixed::ZERO;
        }

        if object.recharge_time < RECHARGE_SPEED {
            object.recharge_time += elapsed;
        } else {
            object.recharge_time = 0;
            match object.presence {
                Presence::Warping { .. } => {
                    collect_warp_energy(object, 1);
                }
                Presence::Normal => recharge(object, base, &catalog),
                _ => {}
            }
        }

        let target = self.pool.resolve_opt(self.pool[slot].target);
        for (key, which) in FIRE_KEYS {
            if self.pool[slot].keys_down & key != 0 {
                self.fire_weapon(slot, which, target);
                if !self.pool[slot].is_in_use() {
                    return;
                }
            }
        }

        let object = &mut self.pool[slot];
        let warp_ready = object.keys_down & WARP_KEY != 0
            && base.warp_speed > Fixed::ZERO
            && object.energy > 0;
        if warp_ready {
            match object.presence {
                Presence::Warping { speed } | Presence::WarpOut { speed } => {
                    object.thrust = base.max_thrust.mul(speed);
                }
                Presence::Normal if object.energy > base.energy >> WARP_IN_ENERGY_FACTOR => {
                    object.presence = Presence::WarpIn {
                        step: 0,
                        progress: 0,
                    };
                }
                _ => {}
            }
        } else {
            match object.presence {
                Presence::WarpIn { .. } => object.presence = Presence::Normal,
                Presence::Warping { speed } => object.presence = Presence::WarpOut { speed },
                Presence::WarpOut { speed } => object.thrust = base.max_thrust.mul(speed),
                _ => {}
            }
        }
    }

    /// Fire one weapon slot if its cooldown, energy and ammo allow.
    pub(crate) fn fire_weapon(&mut self, slot: usize, which: WeaponSlot, target: Option<usize>) {
        let catalog = Arc::clone(&self.catalog);
        let object = &self.pool[slot];
        let state = *object.weapon(which);
        if state.time > 0 {
            return;
        }
        let Some(weapon_id) = state.base else {
            return;
        };
        let Some(weapon) = catalog.base(weapon_id) else {
            return;
        };
        let FrameData::Weapon(frame) = &weapon.frame else {
            return;
        };
        if object.energy < frame.energy_cost || (frame.ammo > 0 && state.ammo <= 0) {
            return;
        }
        let Some(base) = catalog.base(object.base_type) else {
            return;
        };
        let mount = match which {
            WeaponSlot::Pulse => &base.pulse,
            WeaponSlot::Beam => &base.beam,
            WeaponSlot::Special => &base.special,
        };
        let positions = mount
            .as_ref()
            .map_or(&[][..], |mount| mount.positions.as_slice());

        if which != WeaponSlot::Special && object.cloak_state > 0 {
            self.alter_cloak_state(slot, false);
        }

        let object = &mut self.pool[slot];
        object.energy -= frame.energy_cost;
        let direction = object.direction;
        let state = object.weapon_mut(which);
        state.position += 1;
        if state.position >= positions.len() {
            state.position = 0;
        }
        let offset = if which == WeaponSlot::Special {
            None
        } else {
            let mount = positions.get(state.position).copied().unwrap_or_default();
            let rotated = rotate_point(mount, direction);
            Some(Point::new(rotated.h.to_long(), rotated.v.to_long()))
        };
        state.time = frame.fire_time;
        if frame.ammo > 0 {
            state.ammo -= 1;
        }

        tracing::trace!(slot, weapon = weapon_id, "weapon fired");
        self.execute_slots(weapon.activate, Some(slot), target, offset, true);
    }

    /// Keys that fire every weapon usable for defense.
    pub(super) fn defense_keys(&self, slot: usize) -> u32 {
        let object = &self.pool[slot];
        FIRE_KEYS
            .into_iter()
            .filter(|(_, which)| {
                object
                    .weapon(*which)
                    .base
                    .and_then(|id| self.catalog.weapon_frame(id))
                    .is_some_and(|frame| frame.usage & USE_FOR_DEFENSE != 0)
            })
            .fold(0, |keys, (key, _)| keys | key)
    }

    pub(super) fn think_warp_in(&mut self, slot: usize, base: &BaseObject) -> u32 {
        let elapsed = self.elapsed;
        let object = &mut self.pool[slot];
        let keys = if is_autonomous(object) {
            WARP_KEY
        } else {
            object.keys_down & SPECIAL_KEY_MASK
        };
        let Presence::WarpIn {
            mut step,
            mut progress,
        } = object.presence
        else {
            return keys;
        };

        progress += elapsed;
        let cue = if step < WARP_IN_STEPS && progress > WARP_IN_STEP_PROGRESS * step {
            step += 1;
            Some(step - 1)
        } else {
            None
        };
        object.presence = Presence::WarpIn { step, progress };
        if let Some(step) = cue {
            self.host.warp_cue(slot, step);
        }

        if progress > WARP_IN_COMPLETE_PROGRESS {
            let object = &mut self.pool[slot];
            if collect_warp_energy(object, base.energy >> WARP_IN_ENERGY_FACTOR) {
                object.presence = Presence::Warping {
                    speed: base.warp_speed,
                };
                object.attributes &= !OCCUPIES_SPACE;
                let flare = self.catalog.special.warp_in_flare;
                self.spawn_flare(flare, slot);
            } else {
                tracing::debug!(slot, "not enough energy to finish warp in");
                object.presence = Presence::Normal;
                object.energy = 0;
            }
        }
        keys
    }

    pub(super) fn think_warp_out(&mut self, slot: usize, base: &BaseObject) -> u32 {
        let object = &mut self.pool[slot];
        let keys = object.keys_down & SPECIAL_KEY_MASK;
        let Presence::WarpOut { speed } = object.presence else {
            return keys;
        };

        let speed = speed - WARP_ACCELERATION;
        object.presence = Presence::WarpOut { speed };
        if speed < object.max_velocity {
            let collected = core::mem::take(&mut object.warp_energy_collected);
            object.presence = Presence::Normal;
            object.attributes |= base.attributes & OCCUPIES_SPACE;
            object.velocity = crate::fixed_point::rot_point(object.direction).scale(object.max_velocity);
            self.alter_battery(slot, collected);
            let flare = self.catalog.special.warp_out_flare;
            self.spawn_flare(flare, slot);
        }
        keys
    }

    /// Mark arrival once and run the template's arrive actions.
    pub(super) fn arrive(&mut self, slot: usize, base: &BaseObject) {
        if base.arrive.is_empty() || self.pool[slot].run_time_flags & HAS_ARRIVED != 0 {
            return;
        }
        let dest = self.pool.resolve_opt(self.pool[slot].dest);
        self.execute_slots(base.arrive, Some(slot), dest, Some(Point::default()), true);
        self.pool[slot].run_time_flags |= HAS_ARRIVED;
    }

    pub(super) fn evade(
        &mut self,
        slot: usize,
        threat: usize,
        theta: i32,
        use_defense: bool,
        dodge_guided: bool,
    ) -> u32 {
        let threat_direction = self.pool[threat].direction;
        let threat_guided = self.pool[threat].has(IS_GUIDED);
        let defense = if use_defense { self.defense_keys(slot) } else { 0 };

        let object = &mut self.pool[slot];
        if object.has(HAS_DIRECTION_GOAL) {
            let swing = if dodge_guided && threat_guided {
                GUIDED_EVADE_ANGLE
            } else {
                EVADE_ANGLE
            };
            let beta = if theta > 0 {
                swing
            } else if theta < 0 || object.location.h & 1 != 0 {
                -swing
            } else {
                swing
            };
            object.direction_goal = add_angle(threat_direction, beta);
            defense | UP_KEY
        } else {
            let beta = if object.random_seed.roll(2) != 0 {
                -EVADE_ANGLE
            } else {
                EVADE_ANGLE
            };
            object.direction = add_angle(object.direction, beta);
            UP_KEY
        }
    }
}
