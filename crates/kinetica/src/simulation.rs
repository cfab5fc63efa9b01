#![forbid(unsafe_code)]

//! The common contract every motion model implements.
//!
//! A [`Simulation`] is a closed-form trajectory: position and velocity as
//! pure functions of elapsed seconds, plus a settling criterion and a
//! normalized progress-curve view. Instances are immutable — "changing" a
//! running motion always means constructing a successor, either with the
//! momentum it has right now ([`Simulation::retargeted`]) or with explicit
//! overrides ([`CopySpec`]).
//!
//! # Invariants
//!
//! 1. Sampling is pure: the same `t` always yields the same values, with no
//!    internal state and no clock access.
//! 2. `duration` is computed once at construction and never recomputed, so
//!    the progress-curve normalization denominator is stable for the whole
//!    life of the instance.
//! 3. `progress(0.0) == 0.0` and `progress(1.0) == 1.0` exactly.
//! 4. `is_done(duration()) == true` whenever `duration` is finite.
//!
//! # Failure Modes
//!
//! - A motion that never settles reports a non-finite `duration` (NaN or
//!   +∞). `progress` degrades to the identity curve rather than spreading
//!   NaN into consumer math; drivers should inspect `duration()` and decide
//!   whether to treat the motion as complete.

use std::fmt;
use std::sync::Arc;

use crate::tolerance::Tolerance;

// ---------------------------------------------------------------------------
// Simulation contract
// ---------------------------------------------------------------------------

/// A closed-form motion: position and velocity as pure functions of time.
///
/// Implementations are immutable value types. All derived quantities
/// (notably `duration`) are fixed at construction.
pub trait Simulation: fmt::Debug + Send + Sync {
    /// Position at `t` seconds, in the model's own units.
    fn position(&self, t: f64) -> f64;

    /// Velocity at `t` seconds, in units per second.
    fn velocity(&self, t: f64) -> f64;

    /// Where the motion started.
    fn start(&self) -> f64;

    /// The target the motion heads toward.
    fn end(&self) -> f64;

    /// The velocity the motion was constructed with.
    fn initial_velocity(&self) -> f64;

    /// Settling tolerance used by [`is_done`](Simulation::is_done).
    fn tolerance(&self) -> Tolerance;

    /// Estimated time at which the motion first counts as done.
    ///
    /// Fixed at construction. Non-finite (NaN or +∞) when the motion never
    /// settles — that signal propagates to the driver, which must decide
    /// what a never-ending motion means for it.
    fn duration(&self) -> f64;

    /// The velocity that would carry a model of this family from `start`
    /// to `end` in exactly `duration` seconds.
    ///
    /// Returns `±INFINITY` for impossible requests (zero time, nonzero
    /// displacement, no force to lean on) and `0.0` in the degenerate
    /// divide-by-zero branches each family documents: no extra push beats
    /// propagating NaN.
    fn solve_initial_velocity(&self, start: f64, end: f64, duration: f64) -> f64;

    /// A successor model starting exactly where this one is at `at`,
    /// heading for `new_end` with the momentum it carries there.
    fn retargeted(&self, at: f64, new_end: f64) -> Arc<dyn Simulation>;

    /// Whether the motion is settled at `t`.
    ///
    /// True once position is within `tolerance.distance` of the target and
    /// velocity magnitude is within `tolerance.velocity` — or once `t`
    /// reaches a finite `duration`, since arrival-style motions (gravity,
    /// friction through two points) cross their target carrying real speed.
    fn is_done(&self, t: f64) -> bool {
        let d = self.duration();
        if d.is_finite() && t >= d {
            return true;
        }
        let tol = self.tolerance();
        (self.position(t) - self.end()).abs() <= tol.distance
            && self.velocity(t).abs() <= tol.velocity
    }

    /// The trajectory reduced to a normalized progress curve.
    ///
    /// Evaluates `position(t01 * duration)`. The endpoints are returned
    /// unchanged — exactly — so UI layers snapping to 0/1 never see
    /// residual jitter. Non-finite durations degrade to the identity curve.
    fn progress(&self, t01: f64) -> f64 {
        if t01 == 0.0 || t01 == 1.0 {
            return t01;
        }
        let d = self.duration();
        if !d.is_finite() {
            return t01;
        }
        self.position(t01 * d)
    }
}

impl<T: Simulation + ?Sized> Simulation for Arc<T> {
    fn position(&self, t: f64) -> f64 {
        (**self).position(t)
    }

    fn velocity(&self, t: f64) -> f64 {
        (**self).velocity(t)
    }

    fn start(&self) -> f64 {
        (**self).start()
    }

    fn end(&self) -> f64 {
        (**self).end()
    }

    fn initial_velocity(&self) -> f64 {
        (**self).initial_velocity()
    }

    fn tolerance(&self) -> Tolerance {
        (**self).tolerance()
    }

    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn solve_initial_velocity(&self, start: f64, end: f64, duration: f64) -> f64 {
        (**self).solve_initial_velocity(start, end, duration)
    }

    fn retargeted(&self, at: f64, new_end: f64) -> Arc<dyn Simulation> {
        (**self).retargeted(at, new_end)
    }

    // Delegate the provided methods too, so wrappers that override them
    // keep their behavior behind an `Arc`.
    fn is_done(&self, t: f64) -> bool {
        (**self).is_done(t)
    }

    fn progress(&self, t01: f64) -> f64 {
        (**self).progress(t01)
    }
}

// ---------------------------------------------------------------------------
// Construction-time rejection
// ---------------------------------------------------------------------------

/// Errors rejecting invalid model configuration at construction time.
///
/// Invalid parameters fail fast here instead of producing NaN trajectories
/// that surface three frames later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Mass must be finite and strictly positive.
    NonPositiveMass { mass: f64 },
    /// Stiffness must be finite and strictly positive.
    NonPositiveStiffness { stiffness: f64 },
    /// Damping must be finite and non-negative.
    NegativeDamping { damping: f64 },
    /// Bounce is only meaningful in [-1, 1].
    BounceOutOfRange { bounce: f64 },
    /// Damping fraction is only meaningful in [0, 2].
    DampingFractionOutOfRange { fraction: f64 },
    /// A target duration must be finite and strictly positive.
    NonPositiveDuration { duration: f64 },
    /// Tolerance thresholds must be finite and strictly positive.
    InvalidTolerance { distance: f64, velocity: f64 },
    /// Drag must lie strictly between 0 and 1 for decaying motion.
    DragOutOfRange { drag: f64 },
    /// Constant deceleration must be finite and non-negative.
    NegativeDeceleration { deceleration: f64 },
    /// Deriving drag through two points needs distinct positions.
    CoincidentThroughPoints { position: f64 },
    /// Clamp ranges must satisfy `min <= max`.
    InvalidClampRange { min: f64, max: f64 },
    /// Per-axis physics must be uniformly curves or uniformly simulations.
    MixedPhysicsKinds,
    /// `duration` and `duration_scale` are mutually exclusive.
    ConflictingDurations { duration: f64, scale: f64 },
    /// An explicit velocity cannot be combined with a duration-solved one.
    VelocityWithDuration { velocity: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveMass { mass } => {
                write!(f, "mass must be positive, got {mass}")
            }
            Self::NonPositiveStiffness { stiffness } => {
                write!(f, "stiffness must be positive, got {stiffness}")
            }
            Self::NegativeDamping { damping } => {
                write!(f, "damping must be non-negative, got {damping}")
            }
            Self::BounceOutOfRange { bounce } => {
                write!(f, "bounce must be in [-1, 1], got {bounce}")
            }
            Self::DampingFractionOutOfRange { fraction } => {
                write!(f, "damping fraction must be in [0, 2], got {fraction}")
            }
            Self::NonPositiveDuration { duration } => {
                write!(f, "duration must be positive, got {duration}")
            }
            Self::InvalidTolerance { distance, velocity } => {
                write!(
                    f,
                    "tolerance thresholds must be positive, got distance {distance} / velocity {velocity}"
                )
            }
            Self::DragOutOfRange { drag } => {
                write!(f, "drag must be in (0, 1), got {drag}")
            }
            Self::NegativeDeceleration { deceleration } => {
                write!(f, "constant deceleration must be non-negative, got {deceleration}")
            }
            Self::CoincidentThroughPoints { position } => {
                write!(f, "through-points drag needs distinct positions, both are {position}")
            }
            Self::InvalidClampRange { min, max } => {
                write!(f, "clamp range has min {min} above max {max}")
            }
            Self::MixedPhysicsKinds => {
                write!(f, "per-axis physics must all be curves or all be simulations")
            }
            Self::ConflictingDurations { duration, scale } => {
                write!(
                    f,
                    "duration {duration} and duration scale {scale} cannot both be requested"
                )
            }
            Self::VelocityWithDuration { velocity } => {
                write!(
                    f,
                    "explicit velocity {velocity} conflicts with a duration-solved velocity"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// CopySpec
// ---------------------------------------------------------------------------

/// Overrides for deriving a successor model from an existing one.
///
/// Unset fields carry over from the source model. Requesting a `duration`
/// (or `duration_scale`) switches the successor's initial velocity from
/// "carried over" to "solved so the motion lands on `end` at that time" —
/// that is how "finish in exactly X seconds" works without leaving the
/// force family. Combining either duration form with an explicit velocity
/// is a caller error, as is requesting both duration forms at once.
///
/// # Example
///
/// ```ignore
/// let slower = spring.copy_with(CopySpec::new().duration_scale(2.0))?;
/// let rehomed = spring.copy_with(CopySpec::new().start(p).initial_velocity(v))?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct CopySpec {
    tolerance: Option<Tolerance>,
    start: Option<f64>,
    end: Option<f64>,
    initial_velocity: Option<f64>,
    duration: Option<f64>,
    duration_scale: Option<f64>,
}

impl CopySpec {
    /// An empty override set: `copy_with` on it clones the model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the settling tolerance.
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Override the start position.
    pub fn start(mut self, start: f64) -> Self {
        self.start = Some(start);
        self
    }

    /// Override the target position.
    pub fn end(mut self, end: f64) -> Self {
        self.end = Some(end);
        self
    }

    /// Carry an explicit initial velocity into the successor.
    pub fn initial_velocity(mut self, velocity: f64) -> Self {
        self.initial_velocity = Some(velocity);
        self
    }

    /// Solve the successor's velocity so it arrives at `end` after
    /// `duration` seconds.
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Like [`duration`](CopySpec::duration), but relative to the source
    /// model's own duration.
    pub fn duration_scale(mut self, scale: f64) -> Self {
        self.duration_scale = Some(scale);
        self
    }

    pub(crate) fn resolved_tolerance(&self, current: Tolerance) -> Tolerance {
        self.tolerance.unwrap_or(current)
    }

    pub(crate) fn resolved_bounds(&self, start: f64, end: f64) -> (f64, f64) {
        (self.start.unwrap_or(start), self.end.unwrap_or(end))
    }

    pub(crate) fn requests_end(&self) -> bool {
        self.end.is_some()
    }

    pub(crate) fn requests_velocity(&self) -> bool {
        self.initial_velocity.is_some()
    }

    pub(crate) fn requests_duration(&self) -> bool {
        self.duration.is_some() || self.duration_scale.is_some()
    }

    /// Resolve the successor's initial velocity against the source model.
    pub(crate) fn resolved_velocity(
        &self,
        source: &dyn Simulation,
        start: f64,
        end: f64,
    ) -> Result<f64, ConfigError> {
        if let (Some(duration), Some(scale)) = (self.duration, self.duration_scale) {
            return Err(ConfigError::ConflictingDurations { duration, scale });
        }
        let solved_duration = match (self.duration, self.duration_scale) {
            (Some(d), None) => Some(d),
            (None, Some(s)) => Some(source.duration() * s),
            _ => None,
        };
        match (solved_duration, self.initial_velocity) {
            (Some(_), Some(velocity)) => Err(ConfigError::VelocityWithDuration { velocity }),
            (Some(t), None) => Ok(source.solve_initial_velocity(start, end, t)),
            (None, Some(velocity)) => Ok(velocity),
            (None, None) => Ok(source.initial_velocity()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Linear {
        start: f64,
        end: f64,
        velocity: f64,
    }

    impl Simulation for Linear {
        fn position(&self, t: f64) -> f64 {
            self.start + self.velocity * t
        }

        fn velocity(&self, _t: f64) -> f64 {
            self.velocity
        }

        fn start(&self) -> f64 {
            self.start
        }

        fn end(&self) -> f64 {
            self.end
        }

        fn initial_velocity(&self) -> f64 {
            self.velocity
        }

        fn tolerance(&self) -> Tolerance {
            Tolerance::DEFAULT
        }

        fn duration(&self) -> f64 {
            (self.end - self.start) / self.velocity
        }

        fn solve_initial_velocity(&self, start: f64, end: f64, duration: f64) -> f64 {
            (end - start) / duration
        }

        fn retargeted(&self, at: f64, new_end: f64) -> Arc<dyn Simulation> {
            Arc::new(Linear {
                start: self.position(at),
                end: new_end,
                velocity: self.velocity,
            })
        }
    }

    fn unit() -> Linear {
        Linear {
            start: 0.0,
            end: 1.0,
            velocity: 1.0,
        }
    }

    #[test]
    fn progress_endpoints_exact() {
        let sim = unit();
        assert_eq!(sim.progress(0.0), 0.0);
        assert_eq!(sim.progress(1.0), 1.0);
    }

    #[test]
    fn progress_midpoint_samples_position() {
        let sim = unit();
        assert!((sim.progress(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn progress_identity_on_nan_duration() {
        let sim = Linear {
            start: 0.0,
            end: 1.0,
            velocity: 0.0, // duration is inf
        };
        assert!((sim.progress(0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn is_done_at_duration() {
        let sim = unit();
        assert!(sim.is_done(1.0));
        assert!(!sim.is_done(0.5));
    }

    #[test]
    fn arc_delegates_everything() {
        let sim: Arc<dyn Simulation> = Arc::new(unit());
        assert_eq!(sim.position(0.5), 0.5);
        assert_eq!(sim.start(), 0.0);
        assert_eq!(sim.end(), 1.0);
        assert!(sim.is_done(1.0));
        assert_eq!(sim.progress(1.0), 1.0);
    }

    #[test]
    fn copy_spec_carries_velocity_by_default() {
        let sim = unit();
        let v = CopySpec::new()
            .resolved_velocity(&sim, 0.0, 1.0)
            .expect("no overrides cannot conflict");
        assert_eq!(v, 1.0);
    }

    #[test]
    fn copy_spec_duration_solves_velocity() {
        let sim = unit();
        let v = CopySpec::new()
            .duration(0.5)
            .resolved_velocity(&sim, 0.0, 1.0)
            .expect("duration alone is fine");
        assert!((v - 2.0).abs() < 1e-12);
    }

    #[test]
    fn copy_spec_scale_solves_against_source_duration() {
        let sim = unit(); // duration 1.0
        let v = CopySpec::new()
            .duration_scale(2.0)
            .resolved_velocity(&sim, 0.0, 1.0)
            .expect("scale alone is fine");
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn copy_spec_rejects_two_duration_forms() {
        let sim = unit();
        let err = CopySpec::new()
            .duration(0.5)
            .duration_scale(2.0)
            .resolved_velocity(&sim, 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingDurations { .. }));
    }

    #[test]
    fn copy_spec_rejects_velocity_plus_duration() {
        let sim = unit();
        let err = CopySpec::new()
            .duration(0.5)
            .initial_velocity(3.0)
            .resolved_velocity(&sim, 0.0, 1.0)
            .unwrap_err();
        assert!(matches!(err, ConfigError::VelocityWithDuration { .. }));
    }

    #[test]
    fn config_error_displays() {
        let err = ConfigError::InvalidClampRange { min: 2.0, max: 1.0 };
        let text = err.to_string();
        assert!(text.contains("min 2"));
        assert!(text.contains("max 1"));
    }
}
