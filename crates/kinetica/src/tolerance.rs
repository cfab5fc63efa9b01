#![forbid(unsafe_code)]

//! Settling tolerance shared by every motion model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Thresholds below which a motion counts as settled.
///
/// A model is done once its sampled position is within `distance` of the
/// target *and* its sampled velocity magnitude is within `velocity`.
/// Both thresholds are in the model's own units (per second for velocity).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tolerance {
    /// Maximum remaining distance to the target.
    pub distance: f64,
    /// Maximum velocity magnitude.
    pub velocity: f64,
}

impl Tolerance {
    /// Process-wide default: a thousandth of a unit on both axes.
    pub const DEFAULT: Self = Self {
        distance: 1e-3,
        velocity: 1e-3,
    };

    /// Create a tolerance pair.
    #[inline]
    #[must_use]
    pub const fn new(distance: f64, velocity: f64) -> Self {
        Self { distance, velocity }
    }

    /// Both thresholds must be finite and strictly positive.
    ///
    /// Model constructors reject invalid tolerances; the fields stay public
    /// so the type remains a plain value.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.distance.is_finite()
            && self.velocity.is_finite()
            && self.distance > 0.0
            && self.velocity > 0.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(Tolerance::DEFAULT.is_valid());
        assert!(Tolerance::default().is_valid());
    }

    #[test]
    fn custom_tolerance_valid() {
        assert!(Tolerance::new(0.5, 2.0).is_valid());
    }

    #[test]
    fn zero_distance_invalid() {
        assert!(!Tolerance::new(0.0, 1.0).is_valid());
    }

    #[test]
    fn negative_velocity_invalid() {
        assert!(!Tolerance::new(1.0, -1.0).is_valid());
    }

    #[test]
    fn non_finite_invalid() {
        assert!(!Tolerance::new(f64::NAN, 1.0).is_valid());
        assert!(!Tolerance::new(1.0, f64::INFINITY).is_valid());
    }
}
