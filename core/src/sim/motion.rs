use super::*;

use crate::attributes::*;
use crate::base::{BaseObject, FrameData};
use crate::constants::*;
use crate::fixed_point::{add_angle, rot_point, Fixed};

use super::presence::coord_distance;

/// Move `current` toward `goal` by at most `step`.
fn approach(current: Fixed, goal: Fixed, step: Fixed) -> Fixed {
    if current < goal {
        (current + step).min(goal)
    } else {
        (current - step).max(goal)
    }
}

/// Add `velocity * elapsed` to a coordinate, keeping the sub-unit remainder.
fn advance(coordinate: &mut i32, fraction: &mut Fixed, velocity: Fixed, elapsed: i32) {
    let total = *fraction + Fixed(velocity.raw().wrapping_mul(elapsed));
    let whole = total.to_long();
    *coordinate = coordinate.wrapping_add(whole);
    *fraction = total - Fixed::from_long(whole);
}

impl<H: Host> Simulation<H> {
    pub(super) fn motion(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        for slot in self.pool.active_slots() {
            if !self.pool[slot].is_in_use() {
                continue;
            }
            let Some(base) = catalog.base(self.pool[slot].base_type) else {
                continue;
            };
            self.move_object(slot);
            self.count_down(slot, base);
        }
        self.update_proximity();
    }

    fn move_object(&mut self, slot: usize) {
        let elapsed = self.elapsed;
        let object = &mut self.pool[slot];

        if object.has(CAN_TURN) && object.turn_velocity != Fixed::ZERO {
            let total = object.turn_fraction + Fixed(object.turn_velocity.raw().wrapping_mul(elapsed));
            let whole = total.to_long();
            object.turn_fraction = total - Fixed::from_long(whole);
            object.direction = add_angle(object.direction, whole);
        }

        if object.thrust != Fixed::ZERO {
            let cap = match object.presence {
                Presence::Warping { speed } | Presence::WarpOut { speed } => speed,
                _ => object.max_velocity,
            };
            let goal = if object.thrust > Fixed::ZERO {
                rot_point(object.direction).scale(cap)
            } else {
                FixedPoint::ZERO
            };
            let step = Fixed(object.thrust.abs().raw().saturating_mul(elapsed));
            object.velocity.h = approach(object.velocity.h, goal.h, step);
            object.velocity.v = approach(object.velocity.v, goal.v, step);
        }

        let velocity = object.velocity;
        advance(&mut object.location.h, &mut object.motion_fraction.h, velocity.h, elapsed);
        advance(&mut object.location.v, &mut object.motion_fraction.v, velocity.v, elapsed);
    }

    /// Age, periodic activation, cooldowns and display decay.
    fn count_down(&mut self, slot: usize, base: &BaseObject) {
        let elapsed = self.elapsed;
        let object = &mut self.pool[slot];

        if object.age >= 0 {
            object.age -= elapsed;
            if object.age < 0 {
                self.execute_slots(base.expire, Some(slot), None, None, true);
                if !base.expire_dont_die && self.pool[slot].is_in_use() {
                    self.pool[slot].active = ObjectState::ToBeFreed;
                }
                if !self.pool[slot].is_in_use() {
                    return;
                }
            }
        }

        let object = &mut self.pool[slot];
        if !base.activate.is_empty() && base.activate_period > 0 {
            object.periodic_time -= elapsed;
            if object.periodic_time <= 0 {
                object.periodic_time =
                    base.activate_period + object.random_seed.roll(base.activate_period_range);
                self.execute_slots(base.activate, Some(slot), None, None, true);
                if !self.pool[slot].is_in_use() {
                    return;
                }
            }
        }

        let object = &mut self.pool[slot];
        for weapon in object.weapons.iter_mut() {
            if weapon.time > 0 {
                weapon.time = (weapon.time - elapsed).max(0);
            }
        }

        if object.cloak_state > 0 && object.cloak_state < CLOAK_ON_STATE_MAX {
            object.cloak_state =
                (object.cloak_state + CLOAK_STEP.saturating_mul(elapsed)).min(CLOAK_ON_STATE_MAX);
        } else if object.cloak_state < 0 {
            object.cloak_state = (object.cloak_state + CLOAK_STEP.saturating_mul(elapsed)).min(0);
        }

        if object.hit_state > 0 {
            object.hit_state = (object.hit_state - HIT_STATE_DECAY).max(0);
        }

        if let (true, FrameData::Animation(frame)) = (object.has(IS_SELF_ANIMATED), &base.frame) {
            let animation = &mut object.animation;
            let step = animation.speed.raw().wrapping_mul(animation.direction).wrapping_mul(elapsed);
            animation.this_shape += Fixed(step);
            let cycle = object.attributes & ANIMATION_CYCLE != 0;
            if animation.this_shape > frame.last_shape {
                animation.this_shape = if cycle { frame.first_shape } else { frame.last_shape };
            } else if animation.this_shape < frame.first_shape {
                animation.this_shape = if cycle { frame.last_shape } else { frame.first_shape };
            }
        }

        if object.has(CONSIDER_DISTANCE) {
            let location = object.location;
            let distance = self.distance_from_player(location);
            self.pool[slot].distance_from_player = distance;
        }
    }

    /// Record, for every thinking object, the nearest targetable object of
    /// another owner.
    fn update_proximity(&mut self) {
        let slots = self.pool.active_slots();
        for &slot in &slots {
            let object = &self.pool[slot];
            if !object.is_in_use() || !object.has(CAN_THINK | REMOTE_OR_HUMAN) {
                continue;
            }
            let nearest = slots
                .iter()
                .copied()
                .filter(|&other| other != slot)
                .filter(|&other| {
                    let other = &self.pool[other];
                    other.is_in_use() && other.has(POTENTIAL_TARGET) && other.owner != object.owner
                })
                .map(|other| (coord_distance(object.location, self.pool[other].location), other))
                .min();

            let closest = nearest.and_then(|(_, other)| self.pool.reference(other));
            let object = &mut self.pool[slot];
            object.closest = closest;
            object.closest_distance = nearest.map_or(MAXIMUM_RELEVANT_DISTANCE_SQ, |(distance, _)| distance);
        }
    }
}
