//! 2D vector math for the top-down simulation plane.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// 2D Vector - intent, facing, velocity direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Unit Y vector, the default facing of a fresh player
    pub const Y: Self = Self::new(0.0, 1.0);

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// True when both axes are exactly zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// True when both axes are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Scales each axis by `1/√2` when both axes are non-zero.
    ///
    /// Keeps diagonal input from moving faster than axial input. A vector with
    /// a zero axis is returned unchanged.
    #[must_use]
    pub fn normalize_diagonal(self) -> Self {
        if self.x != 0.0 && self.y != 0.0 {
            self * std::f32::consts::FRAC_1_SQRT_2
        } else {
            self
        }
    }

    /// Clamps both axes into `[-1, 1]`.
    #[must_use]
    pub fn clamp_unit(self) -> Self {
        Self::new(self.x.clamp(-1.0, 1.0), self.y.clamp(-1.0, 1.0))
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_matches_axial_length() {
        let axial = Vec2::new(1.0, 0.0).normalize_diagonal();
        let diagonal = Vec2::new(1.0, 1.0).normalize_diagonal();
        assert!((axial.length() - diagonal.length()).abs() < 1e-6);
    }

    #[test]
    fn test_axial_unchanged() {
        let v = Vec2::new(0.0, -1.0);
        assert_eq!(v.normalize_diagonal(), v);
    }

    #[test]
    fn test_clamp_unit() {
        assert_eq!(Vec2::new(3.0, -7.5).clamp_unit(), Vec2::new(1.0, -1.0));
        assert_eq!(Vec2::new(0.25, 0.0).clamp_unit(), Vec2::new(0.25, 0.0));
    }
}
