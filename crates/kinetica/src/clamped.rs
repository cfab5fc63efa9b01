#![forbid(unsafe_code)]

//! Range clamping over any motion model.
//!
//! The wrapper clamps *sampled* position and velocity into configured
//! ranges. Timing is untouched: `duration` and `is_done` come straight
//! from the inner model, so clamped output can never drift out of sync
//! with the inner motion's settling.

use std::sync::Arc;

use crate::simulation::{ConfigError, Simulation};
use crate::tolerance::Tolerance;

/// Decorator clamping sampled position and velocity.
///
/// Ranges default to unbounded; tighten them with
/// [`position_range`](ClampedSimulation::position_range) and
/// [`velocity_range`](ClampedSimulation::velocity_range).
#[derive(Debug, Clone)]
pub struct ClampedSimulation<S> {
    inner: S,
    x_min: f64,
    x_max: f64,
    dx_min: f64,
    dx_max: f64,
}

impl<S: Simulation> ClampedSimulation<S> {
    /// Wrap a model with unbounded ranges.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            x_min: f64::NEG_INFINITY,
            x_max: f64::INFINITY,
            dx_min: f64::NEG_INFINITY,
            dx_max: f64::INFINITY,
        }
    }

    /// Clamp sampled position into `[min, max]`.
    pub fn position_range(mut self, min: f64, max: f64) -> Result<Self, ConfigError> {
        if !(min <= max) {
            return Err(ConfigError::InvalidClampRange { min, max });
        }
        self.x_min = min;
        self.x_max = max;
        Ok(self)
    }

    /// Clamp sampled velocity into `[min, max]`.
    pub fn velocity_range(mut self, min: f64, max: f64) -> Result<Self, ConfigError> {
        if !(min <= max) {
            return Err(ConfigError::InvalidClampRange { min, max });
        }
        self.dx_min = min;
        self.dx_max = max;
        Ok(self)
    }

    /// The wrapped model.
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the inner model.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Simulation> Simulation for ClampedSimulation<S> {
    fn position(&self, t: f64) -> f64 {
        self.inner.position(t).clamp(self.x_min, self.x_max)
    }

    fn velocity(&self, t: f64) -> f64 {
        self.inner.velocity(t).clamp(self.dx_min, self.dx_max)
    }

    fn start(&self) -> f64 {
        self.inner.start()
    }

    fn end(&self) -> f64 {
        self.inner.end()
    }

    fn initial_velocity(&self) -> f64 {
        self.inner.initial_velocity()
    }

    fn tolerance(&self) -> Tolerance {
        self.inner.tolerance()
    }

    fn duration(&self) -> f64 {
        self.inner.duration()
    }

    /// Settling is the inner model's call, on its unclamped samples.
    fn is_done(&self, t: f64) -> bool {
        self.inner.is_done(t)
    }

    fn solve_initial_velocity(&self, start: f64, end: f64, duration: f64) -> f64 {
        self.inner.solve_initial_velocity(start, end, duration)
    }

    fn retargeted(&self, at: f64, new_end: f64) -> Arc<dyn Simulation> {
        Arc::new(ClampedSimulation {
            inner: self.inner.retargeted(at, new_end),
            x_min: self.x_min,
            x_max: self.x_max,
            dx_min: self.dx_min,
            dx_max: self.dx_max,
        })
    }
}
