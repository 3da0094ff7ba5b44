use super::*;

use crate::attributes::*;
use crate::base::BaseObject;
use crate::constants::*;
use crate::fixed_point::{add_angle, angle_difference, isqrt, vector_angle, Fixed};
use crate::object::{Presence, WeaponSlot};

use super::think::is_autonomous;

/// Squared distance between two points, pinned to the relevance limit once
/// either axis exceeds it.
pub(crate) fn coord_distance(from: Point, to: Point) -> u32 {
    let dh = (i64::from(to.h) - i64::from(from.h)).unsigned_abs();
    let dv = (i64::from(to.v) - i64::from(from.v)).unsigned_abs();
    let limit = MAXIMUM_RELEVANT_DISTANCE as u64;
    if dh > limit || dv > limit {
        return MAXIMUM_RELEVANT_DISTANCE_SQ;
    }
    (dh * dh + dv * dv) as u32
}

/// Distance and heading from `object` to `dest`. Standing on the point keeps
/// the current heading.
fn coord_vector(object: &SpaceObject, dest: Point) -> (u32, i32) {
    if object.location == dest {
        return (0, object.direction);
    }
    let angle = vector_angle(
        dest.h.wrapping_sub(object.location.h),
        dest.v.wrapping_sub(object.location.v),
    );
    (coord_distance(object.location, dest), angle)
}

enum Destination {
    /// No destination, or the object is one.
    Stationary,
    /// The destination and its fallback are both gone.
    Lost,
    Object { slot: usize, location: Point },
    Coords(Point),
}

struct TargetFix {
    location: Point,
    distance: u32,
    target: Option<usize>,
}

impl<H: Host> Simulation<H> {
    pub(super) fn think_normal(&mut self, slot: usize, base: &BaseObject) -> u32 {
        let mut keys = self.pool[slot].keys_down & SPECIAL_KEY_MASK;
        if !is_autonomous(&self.pool[slot]) {
            self.think_human(slot);
            return keys;
        }

        let fix = self.resolve_target(slot);
        let object = &self.pool[slot];
        let engaged = fix.target.filter(|&target| {
            let target = &self.pool[target];
            object.target.is_some()
                && (object.has(IS_GUIDED)
                    || (object.has(CAN_ENGAGE)
                        && !object.has(REMOTE_OR_HUMAN)
                        && fix.distance < object.engage_range
                        && object.time_from_origin < TIME_TO_CHECK_HOME
                        && target.has(CAN_BE_ENGAGED)))
        });

        if let Some(target) = engaged {
            let (engage_keys, theta) = self.engage_target(slot, target, fix.distance);
            keys |= engage_keys;

            let object = &self.pool[slot];
            let threat = &self.pool[target];
            let afraid = object.has(CAN_EVADE)
                && threat.has(CAN_BE_EVADED)
                && fix.distance < threat.longest_weapon_range
                && threat.has(HATED)
                && theta.abs() < PARANOIA_ANGLE
                && (!threat.has(CAN_BE_ENGAGED) || object.health <= threat.health);

            if afraid {
                keys |= self.evade(slot, target, theta, true, true);
            } else {
                let object = &mut self.pool[slot];
                let distance = fix.distance;
                if distance > object.shortest_weapon_range || object.has(IS_GUIDED) {
                    keys |= UP_KEY;
                } else if distance < MOTION_MARGIN
                    || distance.saturating_add(MOTION_MARGIN) < object.last_target_distance
                {
                    keys |= DOWN_KEY;
                    object.last_target_distance = distance;
                } else if distance.saturating_sub(MOTION_MARGIN) > object.last_target_distance {
                    keys |= UP_KEY;
                    object.last_target_distance = distance;
                }
            }

            let object = &self.pool[slot];
            if object.target.is_some()
                && object.target == object.dest
                && fix.distance < base.arrive_action_distance
            {
                self.arrive(slot, base);
            }
            return keys;
        }

        if self.pool[slot].has(IS_GUIDED) {
            return keys | UP_KEY;
        }

        let object = &self.pool[slot];
        let nearby = fix.target.filter(|_| {
            object.target.is_some()
                && !object.has(REMOTE_OR_HUMAN)
                && fix.distance < object.engage_range
        });
        if let Some(target) = nearby {
            let (engage_keys, theta) = self.engage_target(slot, target, fix.distance);
            keys |= engage_keys;

            let object = &self.pool[slot];
            let threat = &self.pool[target];
            let fighting = threat.has(CAN_BE_ENGAGED)
                && object.has(CAN_ENGAGE)
                && fix.distance < object.longest_weapon_range
                && threat.has(HATED);
            let threatened = object.has(CAN_EVADE)
                && threat.has(HATED)
                && threat.has(CAN_BE_EVADED)
                && ((fix.distance < threat.longest_weapon_range && theta.abs() < PARANOIA_ANGLE)
                    || threat.has(IS_GUIDED));
            if !fighting && threatened {
                let in_range = fix.distance < object.longest_weapon_range;
                keys |= self.evade(slot, target, theta, in_range, false);
            }
        }

        keys | self.cruise(slot, base)
    }

    /// Head for the destination, requesting warp or a transport special for
    /// long hauls and firing the arrive list on reaching it.
    fn cruise(&mut self, slot: usize, base: &BaseObject) -> u32 {
        let mut keys = 0;
        let (point, dest) = match self.resolve_destination(slot) {
            Destination::Stationary => {
                self.pool[slot].time_from_origin = 0;
                return DOWN_KEY;
            }
            Destination::Lost => {
                keys |= DOWN_KEY;
                (self.pool[slot].location, None)
            }
            Destination::Object { slot: found, location } => (location, Some(found)),
            Destination::Coords(point) => (point, None),
        };
        let (distance, theta) = self.steer_toward(slot, point);

        let transport = self.pool[slot]
            .weapon(WeaponSlot::Special)
            .base
            .and_then(|id| self.catalog.weapon_frame(id))
            .is_some_and(|frame| frame.usage & USE_FOR_TRANSPORTATION != 0);

        let object = &mut self.pool[slot];
        if distance < ENGAGE_RANGE_SQ {
            object.time_from_origin = 0;
        }

        if distance > base.arrive_action_distance {
            if theta < EVADE_ANGLE {
                keys |= UP_KEY;
            }
            object.last_target_distance = distance;
            let long_haul = distance > WARP_IN_DISTANCE_SQ && theta <= DIRECTION_ERROR;
            if transport && long_haul {
                keys |= ENTER_KEY;
            }
            if base.warp_speed > Fixed::ZERO
                && object.energy > base.energy >> WARP_IN_ENERGY_FACTOR
                && long_haul
            {
                keys |= WARP_KEY;
            }
            return keys;
        }

        if let Some(dest) = dest {
            let (owner, attributes, heading, dest_keys) = {
                let dest = &self.pool[dest];
                (dest.owner, dest.attributes, dest.direction, dest.keys_down)
            };
            let object = &mut self.pool[slot];
            if owner == object.owner && attributes & object.attributes & HAS_DIRECTION_GOAL != 0 {
                object.direction_goal = heading;
                if dest_keys & WARP_KEY != 0
                    && base.warp_speed > Fixed::ZERO
                    && angle_difference(object.direction, heading).abs() < DIRECTION_ERROR
                {
                    keys |= WARP_KEY;
                }
            }
        }

        if distance < base.arrive_action_distance {
            self.arrive(slot, base);
        }

        let object = &mut self.pool[slot];
        if distance.saturating_add(MOTION_MARGIN) < object.last_target_distance {
            keys |= DOWN_KEY;
            object.last_target_distance = distance;
        } else if distance.saturating_sub(MOTION_MARGIN) > object.last_target_distance {
            keys |= if theta < EVADE_ANGLE { UP_KEY } else { DOWN_KEY };
            object.last_target_distance = distance;
        }
        keys
    }

    /// Turn toward `point`. Returns the squared distance and how far the
    /// heading still is from the goal.
    fn steer_toward(&mut self, slot: usize, point: Point) -> (u32, i32) {
        let object = &mut self.pool[slot];
        let (distance, angle) = coord_vector(object, point);
        let theta = if object.has(HAS_DIRECTION_GOAL) {
            if angle_difference(angle, object.direction_goal).abs() > DIRECTION_ERROR {
                object.direction_goal = angle;
            }
            angle_difference(object.direction, object.direction_goal).abs()
        } else {
            object.direction = angle;
            0
        };
        (distance, theta)
    }

    fn resolve_destination(&mut self, slot: usize) -> Destination {
        let object = &self.pool[slot];
        if object.has(IS_DESTINATION) || (object.dest.is_none() && object.destination_location.is_none())
        {
            if object.has(ON_AUTO_PILOT) {
                self.toggle_autopilot(slot);
            }
            return Destination::Stationary;
        }

        let Some(dest) = object.dest else {
            let point = object.destination_location.unwrap_or(object.location);
            if object.has(ON_AUTO_PILOT) {
                self.toggle_autopilot(slot);
            }
            return Destination::Coords(point);
        };

        if let Some(found) = self.pool.resolve(dest) {
            let location = self.pool[found].location;
            let dest_dest = self.pool[found].dest;
            let object = &mut self.pool[slot];
            object.destination_location = Some(location);
            object.dest_dest = dest_dest;
            return Destination::Object {
                slot: found,
                location,
            };
        }

        let fallback = self.pool.resolve_opt(object.dest_dest);
        let fallback = fallback.map(|found| (found, self.pool[found].location, self.pool[found].dest));
        let object = &mut self.pool[slot];
        object.attributes &= !STATIC_DESTINATION;
        match fallback {
            Some((found, location, dest_dest)) => {
                object.dest = object.dest_dest;
                object.dest_dest = dest_dest;
                Destination::Object {
                    slot: found,
                    location,
                }
            }
            None => {
                tracing::trace!(slot, "destination lost");
                object.dest = None;
                object.dest_dest = None;
                if object.has(ON_AUTO_PILOT) {
                    self.toggle_autopilot(slot);
                }
                Destination::Lost
            }
        }
    }

    fn cancel_target(&mut self, slot: usize) -> TargetFix {
        let object = &mut self.pool[slot];
        object.target = None;
        TargetFix {
            location: object.location,
            distance: object.engage_range,
            target: None,
        }
    }

    /// Settle on a target: keep a legal one, fall back to the closest hostile
    /// object, or switch to the closest when it is much nearer.
    fn resolve_target(&mut self, slot: usize) -> TargetFix {
        let closest = self.pool.resolve_opt(self.pool[slot].closest);
        let closest_targetable = closest.filter(|&found| self.pool[found].has(POTENTIAL_TARGET));

        if self.pool[slot].target.is_none() {
            if closest_targetable.is_none() {
                return self.cancel_target(slot);
            }
            let object = &mut self.pool[slot];
            if object.has(HAS_DIRECTION_GOAL) {
                object.direction_goal = object.direction;
            }
            object.target = object.closest;
        }

        let object = &self.pool[slot];
        let current = self.pool.resolve_opt(object.target).filter(|&found| {
            let target = &self.pool[found];
            !(target.owner == object.owner && target.has(HATED))
                && target.has(POTENTIAL_TARGET | HATED)
        });
        let target = match current {
            Some(target) => target,
            None => {
                let Some(closest) = closest else {
                    return self.cancel_target(slot);
                };
                self.pool[slot].target = self.pool[slot].closest;
                if closest_targetable.is_none() {
                    return self.cancel_target(slot);
                }
                closest
            }
        };

        let object = &self.pool[slot];
        let location = self.pool[target].location;
        match closest_targetable {
            Some(closest) if closest != target && !object.has(IS_GUIDED) => {
                let distance = coord_distance(object.location, location);
                if (distance >> 1) > object.closest_distance
                    || !object.has(CAN_ENGAGE)
                    || object.has(REMOTE_OR_HUMAN)
                {
                    let mut location = self.pool[closest].location;
                    if self.pool[closest].cloak_state > CLOAK_ENGAGE_THRESHOLD {
                        location.h = location.h.wrapping_sub(200);
                        location.v = location.v.wrapping_sub(200);
                    }
                    let object = &mut self.pool[slot];
                    object.target = object.closest;
                    TargetFix {
                        location,
                        distance: object.closest_distance,
                        target: Some(closest),
                    }
                } else {
                    TargetFix {
                        location,
                        distance,
                        target: Some(target),
                    }
                }
            }
            _ => TargetFix {
                location,
                distance: object.closest_distance,
                target: Some(target),
            },
        }
    }

    /// Aim at `target` and pick the weapons that can reach it. Returns the
    /// fire keys and the angle between the target's heading and our bearing.
    fn engage_target(&mut self, slot: usize, target: usize, distance: u32) -> (u32, i32) {
        let catalog = Arc::clone(&self.catalog);
        let (mut location, cloaked, hated, heading) = {
            let target = &self.pool[target];
            (
                target.location,
                target.cloak_state > CLOAK_ENGAGE_THRESHOLD,
                target.has(HATED),
                target.direction,
            )
        };
        let engageable = self.pool[target].has(CAN_BE_ENGAGED);
        let elapsed = self.elapsed;

        let object = &mut self.pool[slot];
        if cloaked {
            location.h = location.h.wrapping_add(object.random_seed.roll(140) - 70);
            location.v = location.v.wrapping_add(object.random_seed.roll(140) - 70);
        }
        if distance < object.longest_weapon_range
            && engageable
            && hated
            && object.has(CAN_ACCEPT_DESTINATION)
        {
            object.time_from_origin += elapsed;
        }

        let mut angle = vector_angle(
            location.h.wrapping_sub(object.location.h),
            location.v.wrapping_sub(object.location.v),
        );
        if cloaked {
            angle = add_angle(angle - 45, object.random_seed.roll(90));
        }
        object.target_angle = angle;

        let theta = if object.has(HAS_DIRECTION_GOAL) {
            if angle_difference(angle, object.direction_goal).abs() > DIRECTION_ERROR
                || !object.has(IS_GUIDED)
            {
                object.direction_goal = angle;
            }
            angle_difference(add_angle(heading, 180), angle)
        } else {
            object.direction = angle;
            0
        };

        let mut keys = 0;
        if distance < object.longest_weapon_range && hated {
            let beta = angle_difference(object.direction, angle).abs();
            for (key, which) in [
                (ONE_KEY, WeaponSlot::Pulse),
                (TWO_KEY, WeaponSlot::Beam),
                (ENTER_KEY, WeaponSlot::Special),
            ] {
                let Some(weapon) = object.weapon(which).base else {
                    continue;
                };
                let (Some(frame), Some(weapon)) = (catalog.weapon_frame(weapon), catalog.base(weapon))
                else {
                    continue;
                };
                if frame.usage & USE_FOR_ATTACKING != 0
                    && (beta <= SHOOT_ANGLE || weapon.attributes & AUTO_TARGET != 0)
                    && distance < frame.range
                {
                    keys |= key;
                }
            }
        }
        (keys, theta)
    }

    /// Inverse projectile speed of the weapon a human pilot would lead with.
    /// A mounted beam is picked first and only displaced by a tighter attack
    /// weapon that still reaches.
    fn lead_weapon(&self, slot: usize, distance: u32) -> Option<Fixed> {
        let object = &self.pool[slot];
        let mut best = None;
        let mut reach = object.longest_weapon_range;
        for which in [WeaponSlot::Beam, WeaponSlot::Pulse, WeaponSlot::Special] {
            let Some(frame) = object
                .weapon(which)
                .base
                .and_then(|id| self.catalog.weapon_frame(id))
            else {
                continue;
            };
            if which == WeaponSlot::Beam {
                best = Some(frame.inverse_speed);
            }
            if frame.usage & USE_FOR_ATTACKING != 0 && frame.range >= distance && frame.range < reach {
                best = Some(frame.inverse_speed);
                reach = frame.range;
            }
        }
        best
    }

    /// Human-flown ships only get a lead-corrected target angle.
    fn think_human(&mut self, slot: usize) {
        let fix = self.resolve_target(slot);
        let Some(target) = fix.target else {
            return;
        };
        let object = &self.pool[slot];
        if !(object.has(CAN_ENGAGE) && fix.distance < object.engage_range && object.target.is_some())
        {
            return;
        }

        let threat = &self.pool[target];
        let mut aim = fix.location;
        if fix.distance < object.longest_weapon_range && threat.has(HATED) {
            if let Some(inverse_speed) = self.lead_weapon(slot, fix.distance) {
                let flight = Fixed::from_long(isqrt(fix.distance) as i32).mul(inverse_speed);
                let drift_h = threat.velocity.h - object.velocity.h;
                let drift_v = threat.velocity.v - object.velocity.v;
                aim.h = aim.h.wrapping_add(drift_h.mul(flight).to_long());
                aim.v = aim.v.wrapping_add(drift_v.mul(flight).to_long());
            }
        }
        let cloaked = threat.cloak_state > CLOAK_ENGAGE_THRESHOLD;

        let object = &mut self.pool[slot];
        let mut angle = vector_angle(
            aim.h.wrapping_sub(object.location.h),
            aim.v.wrapping_sub(object.location.v),
        );
        if cloaked {
            angle = add_angle(angle - 45, object.random_seed.roll(90));
        }
        object.target_angle = angle;
    }

    pub(super) fn think_warping(&mut self, slot: usize, base: &BaseObject) -> u32 {
        let object = &mut self.pool[slot];
        let mut keys = object.keys_down & SPECIAL_KEY_MASK;
        if object.energy <= 0 {
            if let Presence::Warping { speed } = object.presence {
                object.presence = Presence::WarpOut { speed };
            }
        }
        if !is_autonomous(object) {
            return keys;
        }

        let (point, dest) = match self.resolve_destination(slot) {
            Destination::Stationary | Destination::Lost => (self.pool[slot].location, None),
            Destination::Object { slot: found, location } => (location, Some(found)),
            Destination::Coords(point) => (point, None),
        };
        let (distance, _) = self.steer_toward(slot, point);

        if distance < base.warp_out_distance {
            let dest_warping = dest.is_some_and(|dest| {
                matches!(
                    self.pool[dest].presence,
                    Presence::WarpIn { .. } | Presence::Warping { .. }
                )
            });
            if dest_warping {
                keys |= WARP_KEY;
            }
        } else {
            keys |= WARP_KEY;
        }
        keys
    }

    pub(super) fn think_landing(&mut self, slot: usize, base: &BaseObject) -> u32 {
        let mut keys = 0;
        let point = match self.resolve_destination(slot) {
            Destination::Stationary => None,
            Destination::Lost => {
                keys |= DOWN_KEY;
                Some(self.pool[slot].location)
            }
            Destination::Object { location, .. } => Some(location),
            Destination::Coords(point) => Some(point),
        };
        let (distance, theta) = match point {
            Some(point) => self.steer_toward(slot, point),
            None => {
                keys |= DOWN_KEY;
                (0, 0)
            }
        };

        let object = &mut self.pool[slot];
        let Presence::Landing { mut scale, speed } = object.presence else {
            return keys;
        };
        if distance > LANDING_DISTANCE {
            keys |= if theta < EVADE_ANGLE { UP_KEY } else { DOWN_KEY };
            object.last_target_distance = distance;
        } else {
            keys |= DOWN_KEY;
            scale -= speed;
        }
        object.presence = Presence::Landing { scale, speed };
        let dest = object.dest;
        let has_sprite = object.sprite.is_some();

        if scale <= 0 {
            let dest = self.pool.resolve_opt(dest);
            self.execute_slots(base.expire, Some(slot), dest, None, true);
            if self.pool[slot].active != ObjectState::Available {
                self.pool[slot].active = ObjectState::ToBeFreed;
            }
        } else if has_sprite {
            self.host.scale_sprite(slot, scale);
        }
        keys
    }
}
