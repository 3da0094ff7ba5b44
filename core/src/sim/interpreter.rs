use super::*;

use crate::action::{Action, AlterArgs, AlterKind, CreateObjectArgs, DieKind, Verb, MATCH_LEVEL_KEY};
use crate::attributes::*;
use crate::base::ActionListRef;
use crate::constants::{PUSH_SHIFT, SPIN_TURN_RATE, TIME_TO_CHECK_HOME};
use crate::fixed_point::{rot_point, vector_angle, Fixed};
use crate::host::SoundRequest;
use crate::object::{Presence, WeaponSlot};

fn clamp_component(value: Fixed, cap: Fixed) -> Fixed {
    if cap.raw() < 0 {
        value.max(cap)
    } else {
        value.min(cap)
    }
}

impl<H: Host> Simulation<H> {
    /// Run an action list against weak references. A reference that no
    /// longer resolves drops the whole run.
    pub fn execute(
        &mut self,
        list: ActionListRef,
        subject: Option<ObjectRef>,
        direct: Option<ObjectRef>,
        offset: Option<Point>,
        allow_delay: bool,
    ) {
        let subject = match subject {
            Some(reference) => match self.pool.resolve(reference) {
                Some(slot) => Some(slot),
                None => return,
            },
            None => None,
        };
        let direct = match direct {
            Some(reference) => match self.pool.resolve(reference) {
                Some(slot) => Some(slot),
                None => return,
            },
            None => None,
        };
        self.execute_slots(list, subject, direct, offset, allow_delay);
    }

    pub(crate) fn execute_slots(
        &mut self,
        list: ActionListRef,
        subject: Option<usize>,
        direct: Option<usize>,
        offset: Option<Point>,
        mut allow_delay: bool,
    ) {
        let catalog = Arc::clone(&self.catalog);
        let mut check_conditions = false;

        for index in 0..list.count {
            let Some(action) = catalog.action(list.start + index) else {
                break;
            };
            if matches!(action.verb, Verb::NoAction) {
                break;
            }

            let subject = match action.initial_subject_override {
                Some(initial) => self.initial_slot(initial),
                None => subject,
            };
            let direct = match action.initial_direct_override {
                Some(initial) => self.initial_slot(initial),
                None => direct,
            };

            if action.delay > 0 && allow_delay {
                let subject = subject.map(|slot| self.pool[slot].reference());
                let direct = direct.map(|slot| self.pool[slot].reference());
                let scheduled = self.queue.schedule(
                    list.skip(index),
                    action.delay,
                    subject,
                    direct,
                    offset.unwrap_or_default(),
                );
                if !scheduled {
                    tracing::debug!(start = list.start + index, "action queue full, dropping actions");
                }
                return;
            }
            allow_delay = true;

            let acting = if action.reflexive || direct.is_none() {
                subject
            } else {
                direct
            };
            if !self.admits(&catalog, action, subject, direct, acting) {
                continue;
            }
            check_conditions |= self.apply_verb(action, subject, direct, acting, offset);
        }

        if check_conditions {
            self.host.check_scenario_conditions();
        }
    }

    fn admits(
        &self,
        catalog: &Catalog,
        action: &Action,
        subject: Option<usize>,
        direct: Option<usize>,
        acting: Option<usize>,
    ) -> bool {
        let (Some(_), Some(direct)) = (acting, direct) else {
            return true;
        };
        let direct = &self.pool[direct];
        let subject_owner = subject.and_then(|slot| self.pool[slot].owner);
        if !action.owner.admits(subject_owner, direct.owner) {
            return false;
        }

        if action.exclusive_filter == MATCH_LEVEL_KEY {
            let build_flags = catalog
                .base(direct.base_type)
                .map_or(0, |base| base.build_flags);
            action.inclusive_filter & LEVEL_KEY_TAG_MASK == build_flags & LEVEL_KEY_TAG_MASK
        } else {
            direct.attributes & action.inclusive_filter == action.inclusive_filter
        }
    }

    /// Returns true when the verb may have changed scenario conditions.
    fn apply_verb(
        &mut self,
        action: &Action,
        subject: Option<usize>,
        direct: Option<usize>,
        acting: Option<usize>,
        offset: Option<Point>,
    ) -> bool {
        match action.verb {
            Verb::NoAction => {}

            Verb::CreateObject(args) => {
                self.create_from_action(&args, false, action.reflexive, subject, acting, offset);
            }
            Verb::CreateObjectSetDest(args) => {
                self.create_from_action(&args, true, action.reflexive, subject, acting, offset);
            }

            Verb::PlaySound(args) => {
                let mut id = args.id_min;
                if args.id_range > 0 {
                    id += self.roll_for(acting, args.id_range.saturating_add(1));
                }
                let at = if args.absolute {
                    None
                } else {
                    match acting {
                        Some(slot) => Some(self.pool[slot].location),
                        None => return false,
                    }
                };
                self.host.play_sound(&SoundRequest {
                    id,
                    volume: args.volume,
                    persistence: args.persistence,
                    priority: args.priority,
                    at,
                });
            }

            Verb::MakeSparks(args) => {
                if let Some(slot) = acting {
                    let location = self.pool[slot].location;
                    self.host.make_sparks(&args, location);
                }
            }

            Verb::Die { how } => match how {
                DieKind::Normal => {
                    if let Some(slot) = acting {
                        self.expire_object(slot);
                    }
                }
                DieKind::Expire => {
                    if let Some(slot) = subject {
                        self.expire_object(slot);
                    }
                }
                DieKind::Destroy => {
                    if let Some(slot) = subject {
                        self.kill_object(slot);
                    }
                }
            },

            Verb::NilTarget => {
                if let Some(slot) = acting {
                    self.pool[slot].target = None;
                    self.pool[slot].last_target_distance = 0;
                }
            }

            Verb::Alter(args) => self.apply_alter(&args, action.reflexive, subject, direct, acting),

            Verb::LandAt { speed } => {
                let Some(slot) = subject else {
                    return false;
                };
                if self.pool[slot].has(IS_PLAYER_SHIP | REMOTE_OR_HUMAN) {
                    self.create_floating_body(slot);
                }
                let object = &mut self.pool[slot];
                object.presence = Presence::Landing {
                    scale: object.natural_scale,
                    speed,
                };
            }

            Verb::EnterWarp => {
                let Some(slot) = subject else {
                    return false;
                };
                let object = &mut self.pool[slot];
                if object.presence != Presence::Normal {
                    return false;
                }
                object.presence = Presence::WarpIn {
                    step: 0,
                    progress: 0,
                };
                object.attributes &= !OCCUPIES_SPACE;
                let flare = self.catalog.special.warp_in_flare;
                self.spawn_flare(flare, slot);
            }

            Verb::DisplayMessage { res_id, page_count } => {
                if !self.config.auto_play {
                    self.host
                        .start_long_message(res_id, res_id + page_count.max(1) - 1);
                    return true;
                }
            }

            Verb::ChangeScore {
                player,
                which,
                amount,
            } => {
                let admiral = player.or_else(|| acting.and_then(|slot| self.pool[slot].owner));
                if let Some(admiral) = admiral {
                    self.host.alter_admiral_score(admiral, which, amount);
                    return true;
                }
            }

            Verb::DeclareWinner {
                player,
                next_level,
                text_id,
            } => {
                let winner = player.or_else(|| acting.and_then(|slot| self.pool[slot].owner));
                self.host.declare_winner(winner, next_level, text_id);
            }

            Verb::SetDestination => {
                let (Some(slot), Some(dest)) = (subject, acting) else {
                    return false;
                };
                let saved = self.pool[slot].attributes;
                self.pool[slot].attributes &= !STATIC_DESTINATION;
                self.set_object_destination(slot, Some(dest));
                self.pool[slot].attributes = saved;
            }

            Verb::ActivateSpecial => {
                if let Some(slot) = subject {
                    self.activate_special(slot);
                }
            }

            Verb::ColorFlash {
                length,
                color,
                shade,
            } => self.host.color_flash(length, color, shade),

            Verb::EnableKeys { mask } => self.key_mask &= !mask,
            Verb::DisableKeys { mask } => self.key_mask |= mask,

            Verb::SetZoom { level } => {
                if level != self.zoom {
                    self.zoom = level;
                    self.host.zoom_changed(level);
                }
            }

            Verb::ComputerSelect { screen, line } => self.host.computer_select(screen, line),

            Verb::AssumeInitialObject { which } => {
                let Some(slot) = acting else {
                    return false;
                };
                let index = which.saturating_add(self.host.admiral_score(0, 0));
                let reference = self.pool.reference(slot);
                if let Some(initial) = usize::try_from(index)
                    .ok()
                    .and_then(|index| self.initials.get_mut(index))
                {
                    initial.real = reference;
                }
            }
        }
        false
    }

    fn roll_for(&mut self, acting: Option<usize>, range: i32) -> i32 {
        match acting {
            Some(slot) => self.pool[slot].random_seed.roll(range),
            None => 0,
        }
    }

    fn create_from_action(
        &mut self,
        args: &CreateObjectArgs,
        set_dest: bool,
        reflexive: bool,
        subject: Option<usize>,
        acting: Option<usize>,
        offset: Option<Point>,
    ) {
        let Some(acting) = acting else {
            return;
        };
        let Some(auto_target) = self
            .catalog
            .base(args.base)
            .map(|base| base.attributes & AUTO_TARGET != 0)
        else {
            tracing::debug!(base = args.base, "create action names an unknown base object");
            return;
        };

        let count = args.how_many_min + self.pool[acting].random_seed.roll(args.how_many_range);
        for _ in 0..count {
            let aim = subject.map_or(0, |slot| self.pool[slot].target_angle);
            let source = &mut self.pool[acting];
            let velocity = if args.velocity_relative {
                source.velocity
            } else {
                FixedPoint::ZERO
            };
            let direction = if auto_target {
                aim
            } else if args.direction_relative {
                source.direction
            } else {
                0
            };
            let mut location = source.location;
            if let Some(offset) = offset {
                location.h = location.h.wrapping_add(offset.h);
                location.v = location.v.wrapping_add(offset.v);
            }
            location.h = location.h.wrapping_add(source.random_seed.jitter(args.random_distance));
            location.v = location.v.wrapping_add(source.random_seed.jitter(args.random_distance));

            let request = SpawnRequest::new(args.base, location)
                .velocity(velocity)
                .direction(direction)
                .owner(source.owner);
            match self.create_object(request) {
                Ok(created) => self.adopt_creation(created, acting, set_dest, reflexive),
                Err(SpawnError::SpriteUnavailable { .. }) => break,
                Err(_) => {}
            }
        }
    }

    /// Hand a freshly created object its destination and its creator's target.
    fn adopt_creation(&mut self, created: usize, creator: usize, set_dest: bool, reflexive: bool) {
        if self.pool[created].has(CAN_ACCEPT_DESTINATION) {
            let saved = self.pool[created].attributes;
            self.pool[created].attributes &= !STATIC_DESTINATION;
            if self.pool[created].owner.is_some() {
                if reflexive {
                    if !set_dest {
                        self.set_object_destination(created, Some(creator));
                    } else {
                        let dest = self.pool.resolve_opt(self.pool[creator].dest);
                        if dest.is_some() {
                            self.set_object_destination(created, dest);
                        }
                    }
                }
            } else if reflexive {
                let home = self.pool[creator].reference();
                let home_dest = self.pool[creator].dest;
                let object = &mut self.pool[created];
                object.dest = Some(home);
                object.dest_dest = home_dest;
                object.time_from_origin = TIME_TO_CHECK_HOME;
                object.run_time_flags &= !HAS_ARRIVED;
            }
            self.pool[created].attributes = saved;
        }

        let target = self.pool[creator].target;
        let object = &mut self.pool[created];
        object.target = target;
        object.closest = target;
        if object.has(IS_BEAM) {
            self.attach_beam(created, creator);
        }
    }

    fn apply_alter(
        &mut self,
        args: &AlterArgs,
        reflexive: bool,
        subject: Option<usize>,
        direct: Option<usize>,
        acting: Option<usize>,
    ) {
        let last = args.minimum.saturating_add(args.range.max(0));
        match args.alter {
            AlterKind::Hidden => {
                for index in args.minimum..=last {
                    self.unhide_initial_object(index);
                }
                return;
            }
            AlterKind::ConditionTrueYet => {
                for condition in args.minimum..=last {
                    self.host.set_condition_true_yet(condition, args.relative);
                }
                return;
            }
            AlterKind::AbsoluteCash => {
                if args.relative {
                    if let Some(slot) = acting {
                        let owner = self.pool[slot].owner;
                        self.host.pay_admiral_absolute(owner, args.minimum);
                    }
                } else {
                    let admiral = AdmiralId::try_from(args.range).ok();
                    self.host.pay_admiral_absolute(admiral, args.minimum);
                }
                return;
            }
            AlterKind::LevelKeyTag => return,
            _ => {}
        }

        let Some(slot) = acting else {
            return;
        };
        match args.alter {
            AlterKind::Damage => self.alter_health(slot, args.minimum),
            AlterKind::Energy => self.alter_energy(slot, args.minimum),
            AlterKind::Cloak => self.alter_cloak_state(slot, true),
            AlterKind::Spin => self.alter_spin(slot, args),
            AlterKind::Offline => {
                let mass = self.base_mass(slot);
                let object = &mut self.pool[slot];
                let amount = Fixed(args.minimum + object.random_seed.roll(args.range));
                object.offline_time = amount.checked_div(mass).map_or(-1, Fixed::to_long);
            }
            AlterKind::Velocity => self.alter_velocity(args, subject, direct, slot),
            AlterKind::MaxVelocity => {
                let object = &mut self.pool[slot];
                object.max_velocity = if args.minimum < 0 {
                    self.catalog
                        .base(object.base_type)
                        .map_or(Fixed::ZERO, |base| base.max_velocity)
                } else {
                    Fixed(args.minimum)
                };
            }
            AlterKind::Thrust => {
                let object = &mut self.pool[slot];
                let amount = Fixed(args.minimum + object.random_seed.roll(args.range));
                object.thrust = if args.relative {
                    object.thrust + amount
                } else {
                    amount
                };
            }
            AlterKind::BaseType => {
                if reflexive || direct.is_some() {
                    if let Ok(base) = BaseId::try_from(args.minimum) {
                        self.change_base_type(slot, base, None, args.relative);
                    }
                }
            }
            AlterKind::Owner => {
                if args.relative {
                    let source = if reflexive && direct.is_some() {
                        direct
                    } else {
                        subject
                    };
                    let owner = source.and_then(|source| self.pool[source].owner);
                    self.alter_owner(slot, owner, true);
                } else {
                    self.alter_owner(slot, AdmiralId::try_from(args.minimum).ok(), false);
                }
            }
            AlterKind::Occupation => {
                let owner = subject.and_then(|source| self.pool[source].owner);
                self.alter_occupation(slot, owner, args.minimum, true);
            }
            AlterKind::Age => {
                let object = &mut self.pool[slot];
                let amount = args.minimum + object.random_seed.roll(args.range);
                if !args.relative {
                    object.age = amount;
                } else if object.age >= 0 {
                    object.age = (object.age + amount).max(0);
                } else {
                    object.age += amount;
                }
            }
            AlterKind::Location => {
                let anchor = if args.relative {
                    direct
                        .or(subject)
                        .map_or(Point::default(), |source| self.pool[source].location)
                } else {
                    Point::default()
                };
                let object = &mut self.pool[slot];
                let h = object.random_seed.jitter(args.minimum);
                let v = object.random_seed.jitter(args.minimum);
                object.location = Point::new(anchor.h.wrapping_add(h), anchor.v.wrapping_add(v));
            }
            AlterKind::AbsoluteLocation => {
                let location = if args.relative {
                    let current = self.pool[slot].location;
                    Point::new(
                        current.h.wrapping_add(args.minimum),
                        current.v.wrapping_add(args.range),
                    )
                } else {
                    self.scenario_point(Point::new(args.minimum, args.range))
                };
                self.pool[slot].location = location;
            }
            AlterKind::Weapon1 => self.set_weapon(slot, WeaponSlot::Pulse, args.minimum),
            AlterKind::Weapon2 => self.set_weapon(slot, WeaponSlot::Beam, args.minimum),
            AlterKind::Special => self.set_weapon(slot, WeaponSlot::Special, args.minimum),
            AlterKind::Hidden
            | AlterKind::ConditionTrueYet
            | AlterKind::AbsoluteCash
            | AlterKind::LevelKeyTag => {}
        }
    }

    fn base_mass(&self, slot: usize) -> Fixed {
        self.catalog
            .base(self.pool[slot].base_type)
            .map_or(Fixed::ZERO, |base| base.mass)
    }

    fn alter_spin(&mut self, slot: usize, args: &AlterArgs) {
        if !self.pool[slot].has(CAN_TURN) {
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let Some(base) = catalog.base(self.pool[slot].base_type) else {
            return;
        };
        let object = &mut self.pool[slot];
        let rate = if object.has(SHAPE_FROM_DIRECTION) {
            base.frame.max_turn_rate()
        } else {
            SPIN_TURN_RATE
        };
        let spin = rate.mul(Fixed(args.minimum + object.random_seed.roll(args.range)));
        object.turn_velocity = spin.checked_div(base.mass).unwrap_or(Fixed(-1));
    }

    fn alter_velocity(
        &mut self,
        args: &AlterArgs,
        subject: Option<usize>,
        direct: Option<usize>,
        acting: usize,
    ) {
        let Some(subject) = subject else {
            return;
        };
        let push = Fixed(args.minimum);

        match direct {
            Some(direct) if args.relative => {
                let mass = self.base_mass(direct);
                let source_velocity = self.pool[subject].velocity;
                let object = &mut self.pool[direct];
                if mass.raw() <= 0 || object.max_velocity.raw() <= 0 {
                    return;
                }
                if args.minimum >= 0 {
                    let dh = (source_velocity.h - object.velocity.h).raw() / mass.raw();
                    let dv = (source_velocity.v - object.velocity.v).raw() / mass.raw();
                    object.velocity.h += Fixed(dh.wrapping_shl(PUSH_SHIFT));
                    object.velocity.v += Fixed(dv.wrapping_shl(PUSH_SHIFT));
                } else {
                    object.velocity = object.velocity + object.velocity.scale(push);
                }

                let angle = vector_angle(object.velocity.h.raw(), object.velocity.v.raw());
                let cap = rot_point(angle).scale(object.max_velocity);
                object.velocity.h = clamp_component(object.velocity.h, cap.h);
                object.velocity.v = clamp_component(object.velocity.v, cap.v);
            }
            Some(_) => {
                let heading = self.pool[subject].direction;
                self.pool[acting].velocity = rot_point(heading).scale(push);
            }
            None => {
                let object = &mut self.pool[acting];
                let burst = rot_point(object.direction).scale(push);
                object.velocity = if args.relative {
                    object.velocity + burst
                } else {
                    burst
                };
            }
        }
    }
}
