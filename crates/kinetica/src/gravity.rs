#![forbid(unsafe_code)]

//! Constant-acceleration projectile motion.
//!
//! The simplest family: `x(t) = start + v₀·t + ½·a·t²`, with a signed
//! acceleration — flip the sign to fall instead of rise. Duration is the
//! smallest non-negative root of the arrival quadratic.
//!
//! # Failure Modes
//!
//! - Zero acceleration and zero initial velocity toward a nonzero
//!   displacement never arrives: `duration` is +∞.
//! - A negative discriminant (thrown away from the target without enough
//!   speed to come back) never crosses it either: `duration` is NaN.
//!   Both propagate to the driver untouched — "this motion never gets
//!   there" is information, not an error.

use std::sync::Arc;

use crate::simulation::{ConfigError, CopySpec, Simulation};
use crate::tolerance::Tolerance;

/// A body under constant signed acceleration.
#[derive(Debug, Clone, Copy)]
pub struct GravitySimulation {
    gravity: f64,
    start: f64,
    end: f64,
    initial_velocity: f64,
    tolerance: Tolerance,
    duration: f64,
}

impl GravitySimulation {
    /// Projectile from `start` toward `end` with the default tolerance.
    pub fn new(gravity: f64, start: f64, end: f64, velocity: f64) -> Result<Self, ConfigError> {
        Self::with_tolerance(gravity, start, end, velocity, Tolerance::DEFAULT)
    }

    /// Projectile with an explicit settling tolerance.
    pub fn with_tolerance(
        gravity: f64,
        start: f64,
        end: f64,
        velocity: f64,
        tolerance: Tolerance,
    ) -> Result<Self, ConfigError> {
        if !tolerance.is_valid() {
            return Err(ConfigError::InvalidTolerance {
                distance: tolerance.distance,
                velocity: tolerance.velocity,
            });
        }
        Ok(Self {
            gravity,
            start,
            end,
            initial_velocity: velocity,
            tolerance,
            duration: arrival_time(gravity, start, end, velocity),
        })
    }

    /// The signed acceleration this motion was built with.
    #[inline]
    #[must_use]
    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Successor projectile starting exactly where this one is at `at`.
    #[must_use]
    pub fn retarget(&self, at: f64, new_end: f64) -> Self {
        let position = self.position(at);
        let velocity = self.velocity(at);
        Self {
            gravity: self.gravity,
            start: position,
            end: new_end,
            initial_velocity: velocity,
            tolerance: self.tolerance,
            duration: arrival_time(self.gravity, position, new_end, velocity),
        }
    }

    /// Derive a new projectile with the given overrides.
    pub fn copy_with(&self, spec: CopySpec) -> Result<Self, ConfigError> {
        let tolerance = spec.resolved_tolerance(self.tolerance);
        let (start, end) = spec.resolved_bounds(self.start, self.end);
        let velocity = spec.resolved_velocity(self, start, end)?;
        Self::with_tolerance(self.gravity, start, end, velocity, tolerance)
    }
}

/// Time to reach `end`: the smallest non-negative quadratic root.
///
/// `½·a·t² + v₀·t − Δ = 0`, so `t = (±√(v₀² + 2aΔ) − v₀) / a`. The linear
/// degenerate branch handles `a == 0`.
fn arrival_time(a: f64, start: f64, end: f64, v0: f64) -> f64 {
    let delta = end - start;
    if delta == 0.0 {
        return 0.0;
    }
    if a == 0.0 {
        if v0 == 0.0 {
            return f64::INFINITY;
        }
        let t = delta / v0;
        return if t >= 0.0 { t } else { f64::INFINITY };
    }
    let disc = v0 * v0 + 2.0 * a * delta;
    if disc < 0.0 {
        // Heading away without the speed to come back.
        return f64::NAN;
    }
    let sqrt_disc = disc.sqrt();
    let mut t = f64::INFINITY;
    for root in [(sqrt_disc - v0) / a, (-sqrt_disc - v0) / a] {
        if root >= 0.0 && root < t {
            t = root;
        }
    }
    t
}

impl Simulation for GravitySimulation {
    fn position(&self, t: f64) -> f64 {
        self.start + self.initial_velocity * t + 0.5 * self.gravity * t * t
    }

    fn velocity(&self, t: f64) -> f64 {
        self.initial_velocity + self.gravity * t
    }

    fn start(&self) -> f64 {
        self.start
    }

    fn end(&self) -> f64 {
        self.end
    }

    fn initial_velocity(&self) -> f64 {
        self.initial_velocity
    }

    fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    /// The launch velocity that lands on `end` after `duration` seconds:
    /// `(Δ − ½·a·T²) / T`. A zero duration with displacement to cover is
    /// impossible and returns a signed infinity.
    fn solve_initial_velocity(&self, start: f64, end: f64, duration: f64) -> f64 {
        let delta = end - start;
        if duration == 0.0 {
            return if delta == 0.0 {
                0.0
            } else {
                delta.signum() * f64::INFINITY
            };
        }
        if self.gravity == 0.0 {
            return delta / duration;
        }
        (delta - 0.5 * self.gravity * duration * duration) / duration
    }

    fn retargeted(&self, at: f64, new_end: f64) -> Arc<dyn Simulation> {
        Arc::new(self.retarget(at, new_end))
    }
}
