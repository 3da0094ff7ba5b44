//! Live simulation entities.

use serde::{Deserialize, Serialize};

use crate::base::{BaseId, BeamKind};
use crate::constants::MAXIMUM_RELEVANT_DISTANCE_SQ;
use crate::fixed_point::{Fixed, FixedPoint, Point};
use crate::rng::SeededRng;

pub type AdmiralId = u8;

/// Weak handle to a pooled object: valid only while the slot is in use and
/// still carries the same identity tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub slot: usize,
    pub id: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectState {
    #[default]
    Available,
    InUse,
    ToBeFreed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    #[default]
    Normal,
    WarpIn {
        step: i32,
        progress: i32,
    },
    Warping {
        speed: Fixed,
    },
    WarpOut {
        speed: Fixed,
    },
    Landing {
        scale: i32,
        speed: i32,
    },
}

impl Presence {
    pub fn is_warp(&self) -> bool {
        matches!(
            self,
            Self::WarpIn { .. } | Self::Warping { .. } | Self::WarpOut { .. }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponSlot {
    Pulse,
    Beam,
    Special,
}

impl WeaponSlot {
    pub const ALL: [WeaponSlot; 3] = [WeaponSlot::Pulse, WeaponSlot::Beam, WeaponSlot::Special];

    pub fn index(self) -> usize {
        match self {
            Self::Pulse => 0,
            Self::Beam => 1,
            Self::Special => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponState {
    pub base: Option<BaseId>,
    pub ammo: i32,
    /// Cooldown ticks remaining before the weapon may fire again.
    pub time: i32,
    pub position: usize,
    pub charge: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hue {
    #[default]
    None,
    Green,
    Red,
    SkyBlue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shade {
    #[default]
    Dark,
    Medium,
    Light,
    VeryLight,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TinyColor {
    pub hue: Hue,
    pub shade: Shade,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationState {
    pub this_shape: Fixed,
    pub direction: i32,
    pub speed: Fixed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamState {
    pub kind: BeamKind,
    pub from: Option<ObjectRef>,
    pub to: Option<ObjectRef>,
    pub to_location: Option<Point>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceObject {
    pub entry_number: usize,
    pub id: i32,
    pub active: ObjectState,
    pub base_type: BaseId,
    pub attributes: u32,
    pub keys_down: u32,
    pub run_time_flags: u32,
    pub owner: Option<AdmiralId>,
    pub player_flag: u32,

    pub location: Point,
    pub motion_fraction: FixedPoint,
    pub velocity: FixedPoint,
    pub max_velocity: Fixed,
    pub thrust: Fixed,
    pub direction: i32,
    pub direction_goal: i32,
    pub turn_velocity: Fixed,
    pub turn_fraction: Fixed,
    pub target_angle: i32,
    pub distance_from_player: u64,

    pub health: i32,
    pub energy: i32,
    pub battery: i32,
    pub warp_energy_collected: i32,
    pub age: i32,
    pub periodic_time: i32,
    pub offline_time: i32,
    pub recharge_time: i32,
    pub time_from_origin: i32,
    pub cloak_state: i32,
    pub hit_state: i32,

    pub weapons: [WeaponState; 3],
    pub longest_weapon_range: u32,
    pub shortest_weapon_range: u32,
    pub engage_range: u32,

    pub target: Option<ObjectRef>,
    pub last_target_distance: u32,
    pub closest: Option<ObjectRef>,
    pub closest_distance: u32,
    pub dest: Option<ObjectRef>,
    pub dest_dest: Option<ObjectRef>,
    pub destination_location: Option<Point>,

    pub remote_foe_strength: Fixed,
    pub remote_friend_strength: Fixed,
    pub escort_strength: Fixed,
    pub local_foe_strength: Fixed,
    pub local_friend_strength: Fixed,
    pub best_considered_target_value: u32,
    pub current_target_value: u32,

    pub presence: Presence,

    pub natural_scale: i32,
    pub layer: i32,
    pub tiny_size: i32,
    pub tiny_color: TinyColor,
    pub shield_color: u8,
    pub sprite_id: Option<i32>,
    pub sprite: Option<u32>,
    pub animation: AnimationState,
    pub beam: Option<BeamState>,

    pub random_seed: SeededRng,

    pub(crate) next: Option<usize>,
    pub(crate) previous: Option<usize>,
}

impl Default for SpaceObject {
    fn default() -> Self {
        Self {
            entry_number: 0,
            id: -1,
            active: ObjectState::Available,
            base_type: 0,
            attributes: 0,
            keys_down: 0,
            run_time_flags: 0,
            owner: None,
            player_flag: 0,
            location: Point::default(),
            motion_fraction: FixedPoint::ZERO,
            velocity: FixedPoint::ZERO,
            max_velocity: Fixed::ZERO,
            thrust: Fixed::ZERO,
            direction: 0,
            direction_goal: 0,
            turn_velocity: Fixed::ZERO,
            turn_fraction: Fixed::ZERO,
            target_angle: 0,
            distance_from_player: 0,
            health: 0,
            energy: 0,
            battery: 0,
            warp_energy_collected: 0,
            age: -1,
            periodic_time: 0,
            offline_time: 0,
            recharge_time: 0,
            time_from_origin: 0,
            cloak_state: 0,
            hit_state: 0,
            weapons: [WeaponState::default(); 3],
            longest_weapon_range: 0,
            shortest_weapon_range: 0,
            engage_range: 0,
            target: None,
            last_target_distance: 0,
            closest: None,
            closest_distance: MAXIMUM_RELEVANT_DISTANCE_SQ,
            dest: None,
            dest_dest: None,
            destination_location: None,
            remote_foe_strength: Fixed::ZERO,
            remote_friend_strength: Fixed::ZERO,
            escort_strength: Fixed::ZERO,
            local_foe_strength: Fixed::ZERO,
            local_friend_strength: Fixed::ZERO,
            best_considered_target_value: u32::MAX,
            current_target_value: u32::MAX,
            presence: Presence::Normal,
            natural_scale: 0,
            layer: 0,
            tiny_size: 0,
            tiny_color: TinyColor::default(),
            shield_color: 0,
            sprite_id: None,
            sprite: None,
            animation: AnimationState::default(),
            beam: None,
            random_seed: SeededRng::default(),
            next: None,
            previous: None,
        }
    }
}

impl SpaceObject {
    pub fn reference(&self) -> ObjectRef {
        ObjectRef {
            slot: self.entry_number,
            id: self.id,
        }
    }

    #[inline]
    pub fn has(&self, attributes: u32) -> bool {
        self.attributes & attributes != 0
    }

    #[inline]
    pub fn is_in_use(&self) -> bool {
        self.active == ObjectState::InUse
    }

    pub fn weapon(&self, slot: WeaponSlot) -> &WeaponState {
        &self.weapons[slot.index()]
    }

    pub fn weapon_mut(&mut self, slot: WeaponSlot) -> &mut WeaponState {
        &mut self.weapons[slot.index()]
    }

    pub fn next_slot(&self) -> Option<usize> {
        self.next
    }

    pub fn previous_slot(&self) -> Option<usize> {
        self.previous
    }
}

/// Tint for an object as seen by `player`: friendly, neutral or hostile,
/// shaded by sprite layer.
pub fn tiny_color_for(
    owner: Option<AdmiralId>,
    player: Option<AdmiralId>,
    layer: i32,
    tiny_size: i32,
) -> TinyColor {
    let shade = match layer {
        1 => Shade::Medium,
        2 => Shade::Light,
        3 => Shade::VeryLight,
        _ => Shade::Dark,
    };
    let hue = if tiny_size == 0 {
        Hue::None
    } else if owner.is_some() && owner == player {
        Hue::Green
    } else if owner.is_none() {
        Hue::SkyBlue
    } else {
        Hue::Red
    };
    TinyColor { hue, shade }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_follows_ownership_and_layer() {
        assert_eq!(
            tiny_color_for(Some(0), Some(0), 1, 2),
            TinyColor {
                hue: Hue::Green,
                shade: Shade::Medium
            }
        );
        assert_eq!(tiny_color_for(None, Some(0), 3, 2).hue, Hue::SkyBlue);
        assert_eq!(tiny_color_for(Some(1), Some(0), 2, 2).hue, Hue::Red);
        assert_eq!(tiny_color_for(Some(1), Some(0), 9, 0).hue, Hue::None);
        assert_eq!(tiny_color_for(Some(1), Some(0), 9, 2).shade, Shade::Dark);
    }

    #[test]
    fn weapon_slots_index_distinctly() {
        let mut object = SpaceObject::default();
        object.weapon_mut(WeaponSlot::Beam).ammo = 7;
        assert_eq!(object.weapons[1].ammo, 7);
        assert_eq!(object.weapon(WeaponSlot::Pulse).ammo, 0);
    }
}
