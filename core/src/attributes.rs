//! Bit masks carried on base objects and live objects.

// Object attributes
pub const CAN_TURN: u32 = 1 << 0;
pub const CAN_BE_ENGAGED: u32 = 1 << 1;
pub const HAS_DIRECTION_GOAL: u32 = 1 << 2;
pub const IS_REMOTE: u32 = 1 << 3;
pub const IS_HUMAN_CONTROLLED: u32 = 1 << 4;
pub const IS_BEAM: u32 = 1 << 5;
pub const DOES_BOUNCE: u32 = 1 << 6;
pub const IS_SELF_ANIMATED: u32 = 1 << 7;
pub const SHAPE_FROM_DIRECTION: u32 = 1 << 8;
pub const IS_PLAYER_SHIP: u32 = 1 << 9;
pub const CAN_BE_DESTINATION: u32 = 1 << 10;
pub const CAN_ENGAGE: u32 = 1 << 11;
pub const CAN_EVADE: u32 = 1 << 12;
pub const CAN_ACCEPT_MESSAGES: u32 = 1 << 13;
pub const CAN_ACCEPT_BUILD: u32 = 1 << 14;
pub const CAN_ACCEPT_DESTINATION: u32 = 1 << 15;
pub const AUTO_TARGET: u32 = 1 << 16;
pub const ANIMATION_CYCLE: u32 = 1 << 17;
pub const CAN_COLLIDE: u32 = 1 << 18;
pub const CAN_BE_HIT: u32 = 1 << 19;
pub const IS_DESTINATION: u32 = 1 << 20;
pub const HATED: u32 = 1 << 21;
pub const OCCUPIES_SPACE: u32 = 1 << 22;
pub const STATIC_DESTINATION: u32 = 1 << 23;
pub const CAN_BE_EVADED: u32 = 1 << 24;
pub const NEUTRAL_DEATH: u32 = 1 << 25;
pub const IS_GUIDED: u32 = 1 << 26;
pub const APPEAR_ON_RADAR: u32 = 1 << 27;
pub const RELEASE_ENERGY_ON_DEATH: u32 = 1 << 28;
pub const ON_AUTO_PILOT: u32 = 1 << 29;

pub const CAN_THINK: u32 = CAN_EVADE | CAN_ENGAGE | CAN_ACCEPT_DESTINATION;
pub const REMOTE_OR_HUMAN: u32 = IS_REMOTE | IS_HUMAN_CONTROLLED;
pub const POTENTIAL_TARGET: u32 = CAN_BE_ENGAGED;
pub const CONSIDER_DISTANCE: u32 =
    CAN_COLLIDE | CAN_BE_HIT | IS_DESTINATION | CAN_THINK | REMOTE_OR_HUMAN;

/// Attributes that survive a base-type change.
pub const RETAINED_ON_REBASE: u32 =
    IS_HUMAN_CONTROLLED | IS_REMOTE | IS_PLAYER_SHIP | STATIC_DESTINATION;

// Build flags
pub const LEVEL_KEY_TAG_MASK: u32 = 0xFF00_0000;

// Keys
pub const UP_KEY: u32 = 1 << 0;
pub const DOWN_KEY: u32 = 1 << 1;
pub const LEFT_KEY: u32 = 1 << 2;
pub const RIGHT_KEY: u32 = 1 << 3;
pub const ONE_KEY: u32 = 1 << 4;
pub const TWO_KEY: u32 = 1 << 5;
pub const ENTER_KEY: u32 = 1 << 6;
pub const WARP_KEY: u32 = 1 << 7;
pub const ZOOM_IN_KEY: u32 = 1 << 8;
pub const ZOOM_OUT_KEY: u32 = 1 << 9;
pub const ADOPT_TARGET_KEY: u32 = 1 << 16;
pub const AUTO_PILOT_KEY: u32 = 1 << 17;
pub const GIVE_COMMAND_KEY: u32 = 1 << 18;
pub const MANUAL_OVERRIDE_FLAG: u32 = 1 << 31;

pub const MOTION_KEY_MASK: u32 = UP_KEY | DOWN_KEY | LEFT_KEY | RIGHT_KEY;
pub const WEAPON_KEY_MASK: u32 = ONE_KEY | TWO_KEY | ENTER_KEY;
pub const MISC_KEY_MASK: u32 = WARP_KEY | ZOOM_IN_KEY | ZOOM_OUT_KEY;
pub const SPECIAL_KEY_MASK: u32 = ADOPT_TARGET_KEY | AUTO_PILOT_KEY | GIVE_COMMAND_KEY;

// Weapon usage
pub const USE_FOR_TRANSPORTATION: u32 = 1 << 0;
pub const USE_FOR_ATTACKING: u32 = 1 << 1;
pub const USE_FOR_DEFENSE: u32 = 1 << 2;

// Run-time flags
pub const HAS_ARRIVED: u32 = 1 << 0;

// Player flag for unowned objects
pub const NO_OWNER_PLAYER_FLAG: u32 = 0x8000_0000;
