//! Planar integer coordinates and cache-key derivation for engine crates.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Signed 2D coordinate. Used both for tile-space and chunk-space
/// addresses; the unit depends on context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const ZERO: Vec2i = Vec2i { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Add for Vec2i {
    type Output = Vec2i;
    #[inline]
    fn add(self, rhs: Vec2i) -> Vec2i {
        Vec2i::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2i {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2i) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2i {
    type Output = Vec2i;
    #[inline]
    fn sub(self, rhs: Vec2i) -> Vec2i {
        Vec2i::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2i {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec2i) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<i32> for Vec2i {
    type Output = Vec2i;
    #[inline]
    fn mul(self, rhs: i32) -> Vec2i {
        Vec2i::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(i32, i32)> for Vec2i {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<Vec2i> for (i32, i32) {
    fn from(value: Vec2i) -> Self {
        (value.x, value.y)
    }
}

/// Zig-zag fold of a signed coordinate onto the non-negative integers.
#[inline]
fn fold(v: i32) -> u64 {
    let v = i64::from(v);
    if v < 0 { (-2 * v + 1) as u64 } else { (2 * v) as u64 }
}

/// Collision-free cache key for a signed coordinate pair: each component
/// is zig-zag folded, then the two are combined with the Cantor pairing
/// polynomial. Distinct positions map to distinct keys for all
/// coordinates with |x|, |y| <= 2^30, which covers every address the
/// engine produces. The key is reproducible across processes; no inverse
/// is provided because callers only ever use it as a lookup key.
#[inline]
pub fn pair_key(pos: Vec2i) -> u64 {
    let n1 = u128::from(fold(pos.x));
    let n2 = u128::from(fold(pos.y));
    let s = n1 + n2;
    let key = s * (s + 1) / 2 + n2;
    debug_assert!(key <= u128::from(u64::MAX));
    key as u64
}
