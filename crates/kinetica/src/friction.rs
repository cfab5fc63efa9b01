#![forbid(unsafe_code)]

//! Exponential-decay drag motion.
//!
//! Velocity decays geometrically: `v(t) = v₀·dragᵗ`, optionally with a
//! constant deceleration stacked on top, and position integrates to
//! `x(t) = start + v₀·(dragᵗ − 1)/ln(drag) − ½·c·t²`. The drag coefficient
//! must lie strictly inside (0, 1): at 1 nothing decays, at 0 the motion
//! stops instantly and the log blows up.
//!
//! Two ways to build one:
//!
//! - [`FrictionSimulation::with_drag`]: from an explicit coefficient. The
//!   duration is when velocity reaches zero, found by Newton's method on
//!   the analytic derivative; the end position falls out of it.
//! - [`FrictionSimulation::through`]: from two positions and the
//!   velocities to have at them. The coefficient falls out analytically:
//!   `drag = e^((v₀ − v_end)/(start − end))`.
//!
//! All derived fields — duration, end position, end velocity — are
//! computed before the value exists; nothing is patched in afterwards.
//!
//! # Invariants
//!
//! 1. `|velocity(t)|` is non-increasing for `t ≥ 0` when the constant
//!    deceleration is zero.
//! 2. The constant deceleration opposes the initial velocity's direction,
//!    so flings decay toward zero from either side.
//!
//! # Failure Modes
//!
//! - `through` with a derived drag outside (0, 1) — coincident positions,
//!   equal velocities, or a velocity pair that does not decay — is
//!   rejected at construction rather than yielding a NaN trajectory.
//! - `through` toward a zero end velocity is asymptotic; its arrival time
//!   is infinite, so the duration falls back to the tolerance-settling
//!   time, which is finite and closed-form for pure decay.

use std::sync::Arc;

use crate::simulation::{ConfigError, CopySpec, Simulation};
use crate::tolerance::Tolerance;

/// Newton iterations for the velocity-zero root search.
const NEWTON_ITERATIONS: u32 = 10;

/// Denominators below this count as numerically zero.
const DEGENERATE_EPS: f64 = 1e-12;

/// Velocity at `t` for raw decay parts. `deceleration` is signed.
fn decay_velocity(v0: f64, drag: f64, deceleration: f64, t: f64) -> f64 {
    v0 * drag.powf(t) - deceleration * t
}

/// Position at `t` for raw decay parts. `deceleration` is signed.
fn decay_position(start: f64, v0: f64, drag: f64, log_drag: f64, deceleration: f64, t: f64) -> f64 {
    start + v0 * (drag.powf(t) - 1.0) / log_drag - 0.5 * deceleration * t * t
}

/// Time for the velocity to reach zero: Newton's method on the analytic
/// derivative, iteration-capped.
///
/// With no constant deceleration the velocity only approaches zero, so the
/// capped search lands where the residual is negligible rather than at a
/// true root.
fn decay_root(v0: f64, drag: f64, log_drag: f64, deceleration: f64) -> f64 {
    if v0 == 0.0 {
        return 0.0;
    }
    let mut t = 0.0;
    for _ in 0..NEWTON_ITERATIONS {
        let v = decay_velocity(v0, drag, deceleration, t);
        let dv = v0 * drag.powf(t) * log_drag - deceleration;
        if dv == 0.0 {
            break;
        }
        t -= v / dv;
    }
    t.max(0.0)
}

/// When pure decay from `start` at `v0` passes position `x`.
///
/// +∞ when the decay exhausts itself before ever getting there.
fn decay_time_at(start: f64, v0: f64, log_drag: f64, x: f64) -> f64 {
    if x == start {
        return 0.0;
    }
    if v0 == 0.0 {
        return f64::INFINITY;
    }
    let arg = 1.0 + (x - start) * log_drag / v0;
    if arg <= 0.0 {
        return f64::INFINITY;
    }
    arg.ln() / log_drag
}

/// Closed-form settling time for pure decay: the later of "velocity under
/// tolerance" and "position within tolerance of the terminal point".
fn decay_settling_time(v0: f64, log_drag: f64, tolerance: Tolerance) -> f64 {
    let speed = v0.abs();
    if speed == 0.0 {
        return 0.0;
    }
    // |v(t)| = |v₀|·dragᵗ ≤ tol.velocity
    let t_velocity = (tolerance.velocity / speed).ln() / log_drag;
    // |end − x(t)| = |v(t)/ln(drag)| ≤ tol.distance
    let t_distance = (tolerance.distance * log_drag.abs() / speed).ln() / log_drag;
    t_velocity.max(t_distance).max(0.0)
}

/// A body coasting against drag.
#[derive(Debug, Clone, Copy)]
pub struct FrictionSimulation {
    drag: f64,
    log_drag: f64,
    start: f64,
    end: f64,
    initial_velocity: f64,
    end_velocity: f64,
    /// Signed internally to oppose the initial velocity.
    deceleration: f64,
    tolerance: Tolerance,
    duration: f64,
}

impl FrictionSimulation {
    /// Coast from `start` at `velocity` against `drag`, with an optional
    /// constant deceleration on top (pass 0.0 for pure drag).
    ///
    /// The end position and end velocity are derived: wherever the body is
    /// when its velocity runs out.
    pub fn with_drag(
        drag: f64,
        start: f64,
        velocity: f64,
        constant_deceleration: f64,
    ) -> Result<Self, ConfigError> {
        Self::with_drag_and_tolerance(
            drag,
            start,
            velocity,
            constant_deceleration,
            Tolerance::DEFAULT,
        )
    }

    /// [`with_drag`](FrictionSimulation::with_drag) with an explicit
    /// settling tolerance.
    pub fn with_drag_and_tolerance(
        drag: f64,
        start: f64,
        velocity: f64,
        constant_deceleration: f64,
        tolerance: Tolerance,
    ) -> Result<Self, ConfigError> {
        if !drag.is_finite() || drag <= 0.0 || drag >= 1.0 {
            return Err(ConfigError::DragOutOfRange { drag });
        }
        if !constant_deceleration.is_finite() || constant_deceleration < 0.0 {
            return Err(ConfigError::NegativeDeceleration {
                deceleration: constant_deceleration,
            });
        }
        if !tolerance.is_valid() {
            return Err(ConfigError::InvalidTolerance {
                distance: tolerance.distance,
                velocity: tolerance.velocity,
            });
        }
        Ok(Self::from_coefficient(
            drag,
            start,
            velocity,
            constant_deceleration,
            tolerance,
        ))
    }

    /// Infallible path for a coefficient that already passed validation.
    fn from_coefficient(
        drag: f64,
        start: f64,
        velocity: f64,
        deceleration_magnitude: f64,
        tolerance: Tolerance,
    ) -> Self {
        let log_drag = drag.ln();
        let deceleration = if velocity < 0.0 {
            -deceleration_magnitude
        } else {
            deceleration_magnitude
        };
        let duration = decay_root(velocity, drag, log_drag, deceleration);
        #[cfg(feature = "tracing")]
        {
            let residual = decay_velocity(velocity, drag, deceleration, duration);
            if residual.abs() > tolerance.velocity {
                tracing::debug!(
                    residual,
                    "velocity root search stopped above tolerance after {NEWTON_ITERATIONS} iterations"
                );
            }
        }
        Self {
            drag,
            log_drag,
            start,
            end: decay_position(start, velocity, drag, log_drag, deceleration, duration),
            initial_velocity: velocity,
            end_velocity: decay_velocity(velocity, drag, deceleration, duration),
            deceleration,
            tolerance,
            duration,
        }
    }

    /// Decay from `start` to `end`, entering at `start_velocity` and
    /// leaving at `end_velocity`; the drag coefficient is derived.
    ///
    /// The velocities must actually decay across the distance — the
    /// derived coefficient has to land strictly inside (0, 1) — and the
    /// positions must differ. A zero `end_velocity` is reachable only
    /// asymptotically; the duration then reflects settling tolerance
    /// rather than exact arrival.
    pub fn through(
        start: f64,
        end: f64,
        start_velocity: f64,
        end_velocity: f64,
    ) -> Result<Self, ConfigError> {
        Self::through_with_tolerance(start, end, start_velocity, end_velocity, Tolerance::DEFAULT)
    }

    /// [`through`](FrictionSimulation::through) with an explicit settling
    /// tolerance.
    pub fn through_with_tolerance(
        start: f64,
        end: f64,
        start_velocity: f64,
        end_velocity: f64,
        tolerance: Tolerance,
    ) -> Result<Self, ConfigError> {
        if start == end {
            return Err(ConfigError::CoincidentThroughPoints { position: start });
        }
        if !tolerance.is_valid() {
            return Err(ConfigError::InvalidTolerance {
                distance: tolerance.distance,
                velocity: tolerance.velocity,
            });
        }
        let drag = ((start_velocity - end_velocity) / (start - end)).exp();
        if !drag.is_finite() || drag <= 0.0 || drag >= 1.0 {
            return Err(ConfigError::DragOutOfRange { drag });
        }
        let log_drag = drag.ln();
        let arrival = decay_time_at(start, start_velocity, log_drag, end);
        let duration = if arrival.is_finite() {
            arrival
        } else {
            decay_settling_time(start_velocity, log_drag, tolerance)
        };
        Ok(Self {
            drag,
            log_drag,
            start,
            end,
            initial_velocity: start_velocity,
            end_velocity,
            deceleration: 0.0,
            tolerance,
            duration,
        })
    }

    /// The drag coefficient in (0, 1).
    #[inline]
    #[must_use]
    pub fn drag(&self) -> f64 {
        self.drag
    }

    /// Magnitude of the constant deceleration term.
    #[inline]
    #[must_use]
    pub fn constant_deceleration(&self) -> f64 {
        self.deceleration.abs()
    }

    /// Velocity the motion carries at its end position.
    #[inline]
    #[must_use]
    pub fn end_velocity(&self) -> f64 {
        self.end_velocity
    }

    /// When the motion passes position `x`, ignoring the constant
    /// deceleration term (exact for `through`-built motions).
    ///
    /// +∞ when the decay exhausts itself before ever getting there.
    #[must_use]
    pub fn time_at_position(&self, x: f64) -> f64 {
        decay_time_at(self.start, self.initial_velocity, self.log_drag, x)
    }

    /// Successor motion starting exactly where this one is at `at`.
    ///
    /// Drag cannot aim: a coasting body goes where its momentum takes it.
    /// The successor re-derives a coefficient that coasts from the sampled
    /// state to `new_end` (an asymptotic `through`); when no decaying
    /// coefficient can get there — wrong direction, or no momentum left —
    /// it keeps this motion's coefficient and lets the end fall where it
    /// falls. Either way the sampled position and velocity carry over
    /// exactly.
    #[must_use]
    pub fn retarget(&self, at: f64, new_end: f64) -> Self {
        let position = self.position(at);
        let velocity = self.velocity(at);
        match Self::through_with_tolerance(position, new_end, velocity, 0.0, self.tolerance) {
            Ok(sim) => sim,
            Err(_) => {
                // No decaying drag reaches the target; coast on unchanged.
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    position,
                    velocity,
                    new_end,
                    "drag cannot reach retarget; coasting with the current coefficient"
                );
                Self::from_coefficient(
                    self.drag,
                    position,
                    velocity,
                    self.deceleration.abs(),
                    self.tolerance,
                )
            }
        }
    }

    /// Derive a new motion with the given overrides.
    ///
    /// The end position of a drag motion is normally derived from its
    /// momentum; an explicit `end` override therefore solves the velocity
    /// that coasts there — at the requested duration if one is given,
    /// otherwise at this motion's own duration.
    pub fn copy_with(&self, spec: CopySpec) -> Result<Self, ConfigError> {
        let tolerance = spec.resolved_tolerance(self.tolerance);
        let (start, end) = spec.resolved_bounds(self.start, self.end);
        let velocity =
            if spec.requests_end() && !spec.requests_velocity() && !spec.requests_duration() {
                self.solve_initial_velocity(start, end, self.duration)
            } else {
                spec.resolved_velocity(self, start, end)?
            };
        Self::with_drag_and_tolerance(
            self.drag,
            start,
            velocity,
            self.deceleration.abs(),
            tolerance,
        )
    }
}

impl Simulation for FrictionSimulation {
    fn position(&self, t: f64) -> f64 {
        decay_position(
            self.start,
            self.initial_velocity,
            self.drag,
            self.log_drag,
            self.deceleration,
            t,
        )
    }

    fn velocity(&self, t: f64) -> f64 {
        decay_velocity(self.initial_velocity, self.drag, self.deceleration, t)
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

    /// The entry velocity that coasts from `start` to `end` in `duration`
    /// seconds under this coefficient: with the decay rate λ = −ln(drag),
    /// `v₀ = Δ·λ / (1 − e^(−λT))`. A vanishing denominator returns `0.0`
    /// — no extra push — instead of NaN.
    fn solve_initial_velocity(&self, start: f64, end: f64, duration: f64) -> f64 {
        let rate = -self.log_drag;
        let denom = 1.0 - (-rate * duration).exp();
        if denom.abs() < DEGENERATE_EPS {
            return 0.0;
        }
        (end - start) * rate / denom
    }

    fn retargeted(&self, at: f64, new_end: f64) -> Arc<dyn Simulation> {
        Arc::new(self.retarget(at, new_end))
    }
}
