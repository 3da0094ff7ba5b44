//! Simulation tuning constants.
//!
//! Distances suffixed `_SQ` are squared world units. Times are in ticks.

use crate::fixed_point::Fixed;

// Storage
pub const MAX_SPACE_OBJECTS: usize = 250;
pub const ACTION_QUEUE_LENGTH: usize = 120;

// Identity
pub const OBJECT_ID_RANGE: u32 = 16_384;
pub const OBJECT_SEED_RANGE: u32 = 32_766;
pub const LOCAL_ID_RANGE: i32 = 32_768;

// Energy economy
pub const BATTERY_TO_ENERGY_RATIO: i32 = 5;
pub const ENERGY_POD_AMOUNT: i32 = 500;
pub const RECHARGE_SPEED: i32 = 12;
pub const HEALTH_RATIO: i32 = 5;
pub const WEAPON_RATIO: i32 = 2;
pub const ENERGY_CHUNK: i32 = 11;
pub const WARP_IN_ENERGY_FACTOR: i32 = 3;

// Steering
pub const DIRECTION_ERROR: i32 = 5;
pub const SHOOT_ANGLE: i32 = 15;
pub const PARANOIA_ANGLE: i32 = 30;
pub const EVADE_ANGLE: i32 = 30;
pub const GUIDED_EVADE_ANGLE: i32 = 90;
pub const GUIDED_LOCK_ANGLE: i32 = 60;
pub const DEFAULT_TURN_RATE: Fixed = Fixed::from_long(2);
/// Raw spin factor for objects without a rotation frame.
pub const SPIN_TURN_RATE: Fixed = Fixed(2);

// Distances
pub const MOTION_MARGIN: u32 = 5_000;
pub const LANDING_DISTANCE: u32 = 1_000;
pub const WARP_IN_DISTANCE_SQ: u32 = 16_777_216;
pub const ENGAGE_RANGE_SQ: u32 = 1_048_576;
pub const MAXIMUM_RELEVANT_DISTANCE: i32 = 46_340;
pub const MAXIMUM_RELEVANT_DISTANCE_SQ: u32 = 2_147_395_600;
pub const MAXIMUM_ANGLE_DISTANCE: i32 = 32_767;
pub const UNIVERSAL_CENTER: i32 = 1_073_741_823;

// Destinations
pub const TIME_TO_CHECK_HOME: i32 = 900;

// Presence
pub const WARP_ACCELERATION: Fixed = Fixed::ONE;
pub const WARP_IN_STEPS: i32 = 4;
pub const WARP_IN_STEP_PROGRESS: i32 = 25;
pub const WARP_IN_COMPLETE_PROGRESS: i32 = 100;

// Cloak and hit display state
pub const CLOAK_ON_STATE_MAX: i32 = 254;
pub const CLOAK_OFF_STATE_MAX: i32 = -252;
pub const CLOAK_STEP: i32 = 5;
pub const CLOAK_ENGAGE_THRESHOLD: i32 = 250;
pub const HIT_STATE_MAX: i32 = 128;
pub const HIT_STATE_OFFSET: i32 = 16;
pub const HIT_STATE_DECAY: i32 = 4;
pub const NO_SHIELD_COLOR: u8 = 0xFF;
pub const HIT_FLASH_LENGTH: i32 = 128;
pub const HIT_FLASH_COLOR: u8 = 0;

// Alter velocity push magnitude, tuned against mass.
pub const PUSH_SHIFT: u32 = 6;
