//! Fixed-point math for the deterministic simulation.
//!
//! Formats:
//! - `Fixed`: signed 24.8 scalar (velocities, thrust, mass, scale factors)
//! - `Point`: integer world coordinates, +h right and +v down
//! - angles: whole degrees in [0, 360), 0 facing -v and increasing clockwise

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

pub const FIXED_SHIFT: u32 = 8;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << FIXED_SHIFT);

    #[inline]
    pub const fn from_long(value: i32) -> Self {
        Fixed(value.wrapping_shl(FIXED_SHIFT))
    }

    /// Arithmetic shift back to an integer (rounds toward negative infinity).
    #[inline]
    pub const fn to_long(self) -> i32 {
        self.0 >> FIXED_SHIFT
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline]
    pub fn mul(self, other: Fixed) -> Fixed {
        Fixed(((self.0 as i64 * other.0 as i64) >> FIXED_SHIFT) as i32)
    }

    /// Fixed division. Returns `None` for a zero divisor.
    #[inline]
    pub fn checked_div(self, other: Fixed) -> Option<Fixed> {
        if other.0 == 0 {
            return None;
        }
        Some(Fixed((((self.0 as i64) << FIXED_SHIFT) / other.0 as i64) as i32))
    }

    #[inline]
    pub fn abs(self) -> Fixed {
        Fixed(self.0.wrapping_abs())
    }
}

impl Add for Fixed {
    type Output = Fixed;
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

impl AddAssign for Fixed {
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub h: i32,
    pub v: i32,
}

impl Point {
    pub const fn new(h: i32, v: i32) -> Self {
        Self { h, v }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedPoint {
    pub h: Fixed,
    pub v: Fixed,
}

impl FixedPoint {
    pub const ZERO: FixedPoint = FixedPoint {
        h: Fixed::ZERO,
        v: Fixed::ZERO,
    };

    pub const fn new(h: Fixed, v: Fixed) -> Self {
        Self { h, v }
    }

    #[inline]
    pub fn scale(self, factor: Fixed) -> FixedPoint {
        FixedPoint::new(self.h.mul(factor), self.v.mul(factor))
    }
}

impl Add for FixedPoint {
    type Output = FixedPoint;
    fn add(self, rhs: FixedPoint) -> FixedPoint {
        FixedPoint::new(self.h + rhs.h, self.v + rhs.v)
    }
}

/// Pre-computed sine table in 24.8 format, one entry per degree.
/// SIN_TABLE[i] = round(sin(i deg) * 256)
static SIN_TABLE: [i16; 360] = [
    0, 4, 9, 13, 18, 22, 27, 31, 36, 40, 44, 49, 53, 58, 62, 66,
    71, 75, 79, 83, 88, 92, 96, 100, 104, 108, 112, 116, 120, 124, 128, 132,
    136, 139, 143, 147, 150, 154, 158, 161, 165, 168, 171, 175, 178, 181, 184, 187,
    190, 193, 196, 199, 202, 204, 207, 210, 212, 215, 217, 219, 222, 224, 226, 228,
    230, 232, 234, 236, 237, 239, 241, 242, 243, 245, 246, 247, 248, 249, 250, 251,
    252, 253, 254, 254, 255, 255, 255, 256, 256, 256, 256, 256, 256, 256, 255, 255,
    255, 254, 254, 253, 252, 251, 250, 249, 248, 247, 246, 245, 243, 242, 241, 239,
    237, 236, 234, 232, 230, 228, 226, 224, 222, 219, 217, 215, 212, 210, 207, 204,
    202, 199, 196, 193, 190, 187, 184, 181, 178, 175, 171, 168, 165, 161, 158, 154,
    150, 147, 143, 139, 136, 132, 128, 124, 120, 116, 112, 108, 104, 100, 96, 92,
    88, 83, 79, 75, 71, 66, 62, 58, 53, 49, 44, 40, 36, 31, 27, 22,
    18, 13, 9, 4, 0, -4, -9, -13, -18, -22, -27, -31, -36, -40, -44, -49,
    -53, -58, -62, -66, -71, -75, -79, -83, -88, -92, -96, -100, -104, -108, -112, -116,
    -120, -124, -128, -132, -136, -139, -143, -147, -150, -154, -158, -161, -165, -168, -171, -175,
    -178, -181, -184, -187, -190, -193, -196, -199, -202, -204, -207, -210, -212, -215, -217, -219,
    -222, -224, -226, -228, -230, -232, -234, -236, -237, -239, -241, -242, -243, -245, -246, -247,
    -248, -249, -250, -251, -252, -253, -254, -254, -255, -255, -255, -256, -256, -256, -256, -256,
    -256, -256, -255, -255, -255, -254, -254, -253, -252, -251, -250, -249, -248, -247, -246, -245,
    -243, -242, -241, -239, -237, -236, -234, -232, -230, -228, -226, -224, -222, -219, -217, -215,
    -212, -210, -207, -204, -202, -199, -196, -193, -190, -187, -184, -181, -178, -175, -171, -168,
    -165, -161, -158, -154, -150, -147, -143, -139, -136, -132, -128, -124, -120, -116, -112, -108,
    -104, -100, -96, -92, -88, -83, -79, -75, -71, -66, -62, -58, -53, -49, -44, -40,
    -36, -31, -27, -22, -18, -13, -9, -4,
];

/// Atan lookup for one octant in whole degrees, 65 entries.
/// ATAN_TABLE[i] = round(atan(i / 64) in degrees)
static ATAN_TABLE: [u8; 65] = [
    0, 1, 2, 3, 4, 4, 5, 6, 7, 8, 9, 10, 11, 11, 12, 13,
    14, 15, 16, 17, 17, 18, 19, 20, 21, 21, 22, 23, 24, 24, 25, 26,
    27, 27, 28, 29, 29, 30, 31, 31, 32, 33, 33, 34, 35, 35, 36, 36,
    37, 37, 38, 39, 39, 40, 40, 41, 41, 42, 42, 43, 43, 44, 44, 45,
    45,
];

/// Wrap any angle into [0, 360).
#[inline]
pub fn normalize_angle(angle: i32) -> i32 {
    angle.rem_euclid(360)
}

#[inline]
pub fn add_angle(angle: i32, delta: i32) -> i32 {
    normalize_angle(angle.wrapping_add(delta))
}

/// Signed shortest turn from `from` to `to`, in (-180, 180].
#[inline]
pub fn angle_difference(to: i32, from: i32) -> i32 {
    let diff = normalize_angle(to - from);
    if diff > 180 {
        diff - 360
    } else {
        diff
    }
}

#[inline]
pub fn sin_deg(angle: i32) -> Fixed {
    Fixed(SIN_TABLE[normalize_angle(angle) as usize] as i32)
}

#[inline]
pub fn cos_deg(angle: i32) -> Fixed {
    sin_deg(angle + 90)
}

/// Unit vector pointing along `angle`.
#[inline]
pub fn rot_point(angle: i32) -> FixedPoint {
    FixedPoint::new(sin_deg(angle), -cos_deg(angle))
}

/// Rotate a local offset clockwise by `angle`.
pub fn rotate_point(point: FixedPoint, angle: i32) -> FixedPoint {
    let cos = cos_deg(angle);
    let sin = sin_deg(angle);
    FixedPoint::new(
        point.h.mul(cos) - point.v.mul(sin),
        point.h.mul(sin) + point.v.mul(cos),
    )
}

/// Angle of the vector (dh, dv), so that `rot_point` of the result points
/// along it. A zero vector yields 0.
pub fn vector_angle(dh: i32, dv: i32) -> i32 {
    if dh == 0 && dv == 0 {
        return 0;
    }

    let abs_h = dh.unsigned_abs() as u64;
    let abs_v = dv.unsigned_abs() as u64;

    let base = if abs_h <= abs_v {
        ATAN_TABLE[((abs_h * 64) / abs_v).min(64) as usize] as i32
    } else {
        90 - ATAN_TABLE[((abs_v * 64) / abs_h).min(64) as usize] as i32
    };

    match (dh >= 0, dv <= 0) {
        (true, true) => base,
        (true, false) => 180 - base,
        (false, false) => 180 + base,
        (false, true) => normalize_angle(360 - base),
    }
}

/// Integer square root (floor).
pub fn isqrt(value: u32) -> u32 {
    if value < 2 {
        return value;
    }
    let value = value as u64;
    let mut x = value;
    let mut y = (x + 1) >> 1;
    while y < x {
        x = y;
        y = (x + value / x) >> 1;
    }
    x as u32
}
