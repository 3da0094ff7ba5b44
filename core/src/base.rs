//! Static base-object templates and the action table they index into.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::action::{Action, AlterKind, Verb};
use crate::error::CatalogError;
use crate::fixed_point::{Fixed, FixedPoint};

pub type BaseId = u32;

/// A run of `count` consecutive actions starting at `start` in the catalog's
/// action table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionListRef {
    pub start: u32,
    pub count: u32,
}

impl ActionListRef {
    pub const EMPTY: ActionListRef = ActionListRef { start: 0, count: 0 };

    pub const fn new(start: u32, count: u32) -> Self {
        Self { start, count }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The tail of this list starting `skip` entries in.
    pub fn skip(self, skip: u32) -> ActionListRef {
        let skip = skip.min(self.count);
        ActionListRef::new(self.start + skip, self.count - skip)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamKind {
    #[default]
    Kinetic,
    StaticToObject,
    StaticToRelativeCoord,
    BoltToObject,
    BoltToRelativeCoord,
}

impl BeamKind {
    pub fn is_relative_coord(self) -> bool {
        matches!(self, Self::StaticToRelativeCoord | Self::BoltToRelativeCoord)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponFrame {
    pub usage: u32,
    pub energy_cost: i32,
    pub fire_time: i32,
    /// Ammo of zero or less means unlimited.
    pub ammo: i32,
    /// Squared reach.
    pub range: u32,
    pub inverse_speed: Fixed,
    /// Negative restock cost disables restocking.
    pub restock_cost: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationFrame {
    pub first_shape: Fixed,
    pub last_shape: Fixed,
    pub frame_direction: i32,
    /// -1 picks a direction of 0 or 1 at random.
    pub frame_direction_range: i32,
    pub frame_speed: Fixed,
    pub frame_shape: Fixed,
    pub frame_shape_range: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamFrame {
    pub kind: BeamKind,
    pub color: u8,
    pub accuracy: i32,
    pub range: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameData {
    Rotation {
        #[serde(default)]
        max_turn_rate: Fixed,
        #[serde(default)]
        rotation_resolution: i32,
    },
    Animation(AnimationFrame),
    Beam(BeamFrame),
    Weapon(WeaponFrame),
}

impl Default for FrameData {
    fn default() -> Self {
        Self::Rotation {
            max_turn_rate: Fixed::ZERO,
            rotation_resolution: 0,
        }
    }
}

impl FrameData {
    pub fn max_turn_rate(&self) -> Fixed {
        match self {
            Self::Rotation { max_turn_rate, .. } => *max_turn_rate,
            _ => Fixed::ZERO,
        }
    }
}

/// A weapon template plus the local fire positions it cycles through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponMount {
    pub base: BaseId,
    #[serde(default)]
    pub positions: Vec<FixedPoint>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseObject {
    pub name: String,
    pub attributes: u32,
    pub build_flags: u32,
    pub mass: Fixed,
    pub max_thrust: Fixed,
    pub max_velocity: Fixed,
    pub warp_speed: Fixed,
    /// Squared distance at which a warping object drops out.
    pub warp_out_distance: u32,
    pub initial_velocity: Fixed,
    pub initial_velocity_range: i32,
    pub initial_direction: i32,
    pub initial_direction_range: i32,
    pub health: i32,
    pub energy: i32,
    pub damage: i32,
    /// Negative initial age means the object never expires.
    pub initial_age: i32,
    /// Doubles as the capture threshold for neutral-death destinations.
    pub initial_age_range: i32,
    pub natural_scale: i32,
    pub pixel_layer: i32,
    pub sprite_id: Option<i32>,
    pub tiny_size: i32,
    pub shield_color: u8,
    pub skill_num: i32,
    pub skill_den: i32,
    pub offense_value: Fixed,
    pub arrive_action_distance: u32,
    pub pulse: Option<WeaponMount>,
    pub beam: Option<WeaponMount>,
    pub special: Option<WeaponMount>,
    pub frame: FrameData,
    pub destroy: ActionListRef,
    pub destroy_dont_die: bool,
    pub expire: ActionListRef,
    pub expire_dont_die: bool,
    pub create: ActionListRef,
    pub collide: ActionListRef,
    pub activate: ActionListRef,
    pub activate_period: i32,
    pub activate_period_range: i32,
    pub arrive: ActionListRef,
}

/// Well-known templates the simulation spawns on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialBases {
    pub energy_blob: Option<BaseId>,
    pub warp_in_flare: Option<BaseId>,
    pub warp_out_flare: Option<BaseId>,
    pub player_body: Option<BaseId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub base_objects: Vec<BaseObject>,
    pub actions: Vec<Action>,
    pub special: SpecialBases,
}

impl Catalog {
    pub fn base(&self, id: BaseId) -> Option<&BaseObject> {
        self.base_objects.get(id as usize)
    }

    pub fn action(&self, index: u32) -> Option<&Action> {
        self.actions.get(index as usize)
    }

    pub fn weapon_frame(&self, id: BaseId) -> Option<&WeaponFrame> {
        match &self.base(id)?.frame {
            FrameData::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        for (index, base) in self.base_objects.iter().enumerate() {
            let id = index as BaseId;
            for list in [
                base.destroy,
                base.expire,
                base.create,
                base.collide,
                base.activate,
                base.arrive,
            ] {
                self.check_list(id, list)?;
            }

            for mount in [&base.pulse, &base.beam, &base.special].into_iter().flatten() {
                if self.base(mount.base).is_none() {
                    return Err(CatalogError::UnknownBaseObject {
                        referenced_by: "weapon mount",
                        base: mount.base,
                    });
                }
                if self.weapon_frame(mount.base).is_none() {
                    return Err(CatalogError::NotAWeapon {
                        base: id,
                        weapon: mount.base,
                    });
                }
                if mount.positions.is_empty() {
                    return Err(CatalogError::EmptyWeaponPositions { base: id });
                }
            }
        }

        for action in &self.actions {
            match &action.verb {
                Verb::CreateObject(args) | Verb::CreateObjectSetDest(args) => {
                    self.check_base("create action", args.base)?;
                }
                Verb::Alter(args) => match args.alter {
                    AlterKind::BaseType => {
                        self.check_base("alter base type", args.minimum as BaseId)?;
                    }
                    AlterKind::Weapon1 | AlterKind::Weapon2 | AlterKind::Special
                        if args.minimum >= 0 =>
                    {
                        let weapon = args.minimum as BaseId;
                        self.check_base("alter weapon", weapon)?;
                        if self.weapon_frame(weapon).is_none() {
                            return Err(CatalogError::NotAWeapon {
                                base: weapon,
                                weapon,
                            });
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        for special in [
            self.special.energy_blob,
            self.special.warp_in_flare,
            self.special.warp_out_flare,
            self.special.player_body,
        ]
        .into_iter()
        .flatten()
        {
            self.check_base("special bases", special)?;
        }

        Ok(())
    }

    fn check_base(&self, referenced_by: &'static str, base: BaseId) -> Result<(), CatalogError> {
        if self.base(base).is_none() {
            return Err(CatalogError::UnknownBaseObject {
                referenced_by,
                base,
            });
        }
        Ok(())
    }

    fn check_list(&self, base: BaseId, list: ActionListRef) -> Result<(), CatalogError> {
        if list.is_empty() {
            return Ok(());
        }
        let end = list.start as usize + list.count as usize;
        if end > self.actions.len() {
            return Err(CatalogError::ActionListOutOfRange {
                base,
                start: list.start,
                count: list.count,
                actions: self.actions.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{AlterArgs, CreateObjectArgs};

    fn weapon(range: u32) -> BaseObject {
        BaseObject {
            name: "laser".into(),
            frame: FrameData::Weapon(WeaponFrame {
                range,
                fire_time: 10,
                energy_cost: 5,
                ammo: -1,
                ..WeaponFrame::default()
            }),
            ..BaseObject::default()
        }
    }

    #[test]
    fn skip_clamps_to_list_end() {
        let list = ActionListRef::new(4, 3);
        assert_eq!(list.skip(1), ActionListRef::new(5, 2));
        assert_eq!(list.skip(9), ActionListRef::new(7, 0));
        assert!(list.skip(3).is_empty());
    }

    #[test]
    fn validate_accepts_consistent_catalog() {
        let catalog = Catalog {
            base_objects: vec![
                BaseObject {
                    pulse: Some(WeaponMount {
                        base: 1,
                        positions: vec![FixedPoint::ZERO],
                    }),
                    destroy: ActionListRef::new(0, 1),
                    ..BaseObject::default()
                },
                weapon(400),
            ],
            actions: vec![Action::new(Verb::CreateObject(CreateObjectArgs {
                base: 0,
                ..CreateObjectArgs::default()
            }))],
            special: SpecialBases::default(),
        };
        assert_eq!(catalog.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_out_of_range_list() {
        let catalog = Catalog {
            base_objects: vec![BaseObject {
                create: ActionListRef::new(2, 2),
                ..BaseObject::default()
            }],
            actions: vec![Action::new(Verb::NilTarget)],
            special: SpecialBases::default(),
        };
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::ActionListOutOfRange {
                base: 0,
                start: 2,
                count: 2,
                actions: 1,
            })
        );
    }

    #[test]
    fn validate_rejects_non_weapon_mount_and_unknown_alter_target() {
        let mounted_hull = Catalog {
            base_objects: vec![
                BaseObject {
                    special: Some(WeaponMount {
                        base: 0,
                        positions: vec![FixedPoint::ZERO],
                    }),
                    ..BaseObject::default()
                },
            ],
            ..Catalog::default()
        };
        assert_eq!(
            mounted_hull.validate(),
            Err(CatalogError::NotAWeapon { base: 0, weapon: 0 })
        );

        let bad_rebase = Catalog {
            base_objects: vec![BaseObject::default()],
            actions: vec![Action::new(Verb::Alter(AlterArgs {
                alter: AlterKind::BaseType,
                minimum: 7,
                ..AlterArgs::default()
            }))],
            special: SpecialBases::default(),
        };
        assert!(matches!(
            bad_rebase.validate(),
            Err(CatalogError::UnknownBaseObject { base: 7, .. })
        ));
    }
}
