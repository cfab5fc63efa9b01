#![forbid(unsafe_code)]

//! Damped harmonic oscillator solved in closed form.
//!
//! The spring obeys `m·ẍ + c·ẋ + k·(x − end) = 0`. Its character is fully
//! described by two derived quantities:
//!
//! - **angular frequency** ω₀ = √(k/m)
//! - **damping ratio** ζ = c / (2√(km))
//!
//! ζ picks one of three closed-form solution shapes, classified once at
//! construction and cached:
//!
//! - ζ < 1 (underdamped): exponential envelope times a sinusoid — the
//!   motion overshoots and rings.
//! - ζ ≈ 1 (critical): envelope times a linear term — the fastest settle
//!   with no overshoot.
//! - ζ > 1 (overdamped): the sum of two real exponentials — no overshoot,
//!   slower settle.
//!
//! # Invariants
//!
//! 1. `position(0)` is exactly `start`; `velocity(0)` recovers the initial
//!    velocity to floating-point accuracy.
//! 2. `duration` is the *earliest* time the settling criterion holds, found
//!    by bracket-and-bisect, not an envelope overestimate.
//! 3. The damping regime is classified once; sampling never re-compares ζ.
//!
//! # Failure Modes
//!
//! - A spring that cannot settle inside the 60-second search window (for
//!   example zero damping) reports `duration = NaN`. The progress-curve
//!   view degrades to identity; `duration()` keeps the NaN so drivers see
//!   the motion for what it is.
//! - The inverse-velocity solver returns `0.0` in its divide-by-zero-prone
//!   branches (degenerate alignment with the oscillation period, zero
//!   requested duration, vanishing overdamped denominator).

use std::f64::consts::PI;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::simulation::{ConfigError, CopySpec, Simulation};
use crate::tolerance::Tolerance;

/// Settling search window cap, in simulated seconds.
const MAX_SETTLE_SECS: f64 = 60.0;

/// Initial settling search window, in seconds.
const SETTLE_SEED_SECS: f64 = 1e-3;

/// Bisection refinements once the settling window is bracketed.
const SETTLE_BISECTIONS: u32 = 30;

/// Displacements below this count as "already there" for velocity solving,
/// and denominators below it as numerically zero.
const DEGENERATE_EPS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Mass–stiffness–damping triple describing a spring's feel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpringParameters {
    /// Mass of the attached body.
    pub mass: f64,
    /// Restoring force strength (k).
    pub stiffness: f64,
    /// Velocity drag (c).
    pub damping: f64,
}

impl SpringParameters {
    /// Create a validated parameter triple.
    pub fn new(mass: f64, stiffness: f64, damping: f64) -> Result<Self, ConfigError> {
        if !mass.is_finite() || mass <= 0.0 {
            return Err(ConfigError::NonPositiveMass { mass });
        }
        if !stiffness.is_finite() || stiffness <= 0.0 {
            return Err(ConfigError::NonPositiveStiffness { stiffness });
        }
        if !damping.is_finite() || damping < 0.0 {
            return Err(ConfigError::NegativeDamping { damping });
        }
        Ok(Self {
            mass,
            stiffness,
            damping,
        })
    }

    /// Derive parameters from a perceptual duration and a bounce amount.
    ///
    /// `bounce` ranges over [-1, 1]: 0 is critically damped, positive
    /// values overshoot (1 never stops ringing), negative values drag.
    /// Mass is fixed at 1; stiffness is (2π/duration)².
    pub fn with_bounce(duration: f64, bounce: f64) -> Result<Self, ConfigError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ConfigError::NonPositiveDuration { duration });
        }
        if !bounce.is_finite() || !(-1.0..=1.0).contains(&bounce) {
            return Err(ConfigError::BounceOutOfRange { bounce });
        }
        let stiffness = (2.0 * PI / duration).powi(2);
        let damping = 4.0 * PI * (1.0 - bounce) / duration;
        Self::new(1.0, stiffness, damping)
    }

    /// Derive parameters from a damping fraction and a perceptual duration.
    ///
    /// `fraction` ranges over [0, 2]: 1 is critically damped, below 1
    /// oscillates, above 1 is overdamped. Mass is fixed at 1.
    pub fn with_damping_fraction(fraction: f64, duration: f64) -> Result<Self, ConfigError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ConfigError::NonPositiveDuration { duration });
        }
        if !fraction.is_finite() || !(0.0..=2.0).contains(&fraction) {
            return Err(ConfigError::DampingFractionOutOfRange { fraction });
        }
        let stiffness = (2.0 * PI / duration).powi(2);
        let damping = 4.0 * PI * fraction / duration;
        Self::new(1.0, stiffness, damping)
    }

    /// Undamped angular frequency ω₀ = √(k/m).
    #[inline]
    #[must_use]
    pub fn omega0(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Damping needed to settle as fast as possible without oscillating.
    #[inline]
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Dimensionless damping ratio ζ = c / (2√(km)).
    #[inline]
    #[must_use]
    pub fn damping_ratio(&self) -> f64 {
        self.damping / self.critical_damping()
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Named parameter presets, tuned for a qualitative feel.
///
/// Plain constants — pick one and hand it to
/// [`SpringSimulation::new`](crate::spring::SpringSimulation::new), or use
/// it as a starting point for your own triple.
pub mod presets {
    use super::SpringParameters;

    /// Quick and businesslike, a whisper of overshoot.
    pub const SWIFT: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 400.0,
        damping: 35.0,
    };

    /// Smooth and composed, settles without drama.
    pub const ELEGANT: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 100.0,
        damping: 18.0,
    };

    /// Near-instant with a crisp stop.
    pub const SNAP: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 600.0,
        damping: 46.0,
    };

    /// Overdamped: approaches the target and never crosses it.
    pub const STERN: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 180.0,
        damping: 32.0,
    };

    /// Soft and weightless, drifts into place.
    pub const FLOAT: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 50.0,
        damping: 10.0,
    };

    /// Lively, with a visible rebound.
    pub const BUOYANT: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 300.0,
        damping: 16.0,
    };

    /// Fast launch, loose landing.
    pub const FLING: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 500.0,
        damping: 28.0,
    };

    /// Unhurried background motion.
    pub const SLOW: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 30.0,
        damping: 9.0,
    };

    /// Bobs past the target a couple of times.
    pub const BOB: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 200.0,
        damping: 9.0,
    };

    /// Rings for a long, long while.
    pub const BOINGOINGOING: SpringParameters = SpringParameters {
        mass: 1.0,
        stiffness: 350.0,
        damping: 4.0,
    };

    /// Every preset with its name, for iteration and diagnostics.
    pub const ALL: [(&str, SpringParameters); 10] = [
        ("swift", SWIFT),
        ("elegant", ELEGANT),
        ("snap", SNAP),
        ("stern", STERN),
        ("float", FLOAT),
        ("buoyant", BUOYANT),
        ("fling", FLING),
        ("slow", SLOW),
        ("bob", BOB),
        ("boingoingoing", BOINGOINGOING),
    ];
}

// ---------------------------------------------------------------------------
// Damping regime
// ---------------------------------------------------------------------------

/// Solution shape, classified once at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DampingRegime {
    /// ζ < 1. Carries the damped frequency ω_d = ω₀√(1 − ζ²).
    Underdamped { omega_d: f64 },
    /// |ζ − 1| below the detection width.
    Critical,
    /// ζ > 1. Carries the two real roots of the characteristic equation.
    Overdamped { r1: f64, r2: f64 },
}

impl DampingRegime {
    fn classify(params: &SpringParameters) -> Self {
        let zeta = params.damping_ratio();
        let omega0 = params.omega0();
        if (zeta - 1.0).abs() < DEGENERATE_EPS {
            Self::Critical
        } else if zeta < 1.0 {
            Self::Underdamped {
                omega_d: omega0 * (1.0 - zeta * zeta).sqrt(),
            }
        } else {
            let spread = omega0 * (zeta * zeta - 1.0).sqrt();
            Self::Overdamped {
                r1: -zeta * omega0 + spread,
                r2: -zeta * omega0 - spread,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SpringSimulation
// ---------------------------------------------------------------------------

/// A spring motion with position and velocity in closed form.
#[derive(Debug, Clone, Copy)]
pub struct SpringSimulation {
    params: SpringParameters,
    start: f64,
    end: f64,
    initial_velocity: f64,
    tolerance: Tolerance,
    regime: DampingRegime,
    duration: f64,
}

impl SpringSimulation {
    /// Spring from `start` to `end` with the default tolerance.
    pub fn new(
        params: SpringParameters,
        start: f64,
        end: f64,
        velocity: f64,
    ) -> Result<Self, ConfigError> {
        Self::with_tolerance(params, start, end, velocity, Tolerance::DEFAULT)
    }

    /// Spring with an explicit settling tolerance.
    pub fn with_tolerance(
        params: SpringParameters,
        start: f64,
        end: f64,
        velocity: f64,
        tolerance: Tolerance,
    ) -> Result<Self, ConfigError> {
        // Presets and struct literals bypass `SpringParameters::new`, so
        // re-validate here.
        let params = SpringParameters::new(params.mass, params.stiffness, params.damping)?;
        if !tolerance.is_valid() {
            return Err(ConfigError::InvalidTolerance {
                distance: tolerance.distance,
                velocity: tolerance.velocity,
            });
        }
        Ok(Self::from_parts(params, start, end, velocity, tolerance))
    }

    /// Infallible path for parameters that already passed validation.
    fn from_parts(
        params: SpringParameters,
        start: f64,
        end: f64,
        velocity: f64,
        tolerance: Tolerance,
    ) -> Self {
        let probe = Self {
            params,
            start,
            end,
            initial_velocity: velocity,
            tolerance,
            regime: DampingRegime::classify(&params),
            duration: f64::NAN,
        };
        let duration = probe.settle_time();
        #[cfg(feature = "tracing")]
        if duration.is_nan() {
            tracing::warn!(
                stiffness = params.stiffness,
                damping = params.damping,
                "spring does not settle within {MAX_SETTLE_SECS}s; duration is NaN"
            );
        }
        Self { duration, ..probe }
    }

    /// The parameter triple this spring was built from.
    #[inline]
    #[must_use]
    pub fn params(&self) -> SpringParameters {
        self.params
    }

    /// Successor spring starting exactly where this one is at `at`.
    #[must_use]
    pub fn retarget(&self, at: f64, new_end: f64) -> Self {
        Self::from_parts(
            self.params,
            self.position(at),
            new_end,
            self.velocity(at),
            self.tolerance,
        )
    }

    /// Derive a new spring with the given overrides.
    ///
    /// See [`CopySpec`] for the velocity-vs-duration rules.
    pub fn copy_with(&self, spec: CopySpec) -> Result<Self, ConfigError> {
        let tolerance = spec.resolved_tolerance(self.tolerance);
        let (start, end) = spec.resolved_bounds(self.start, self.end);
        let velocity = spec.resolved_velocity(self, start, end)?;
        Self::with_tolerance(self.params, start, end, velocity, tolerance)
    }

    /// Closed-form position at `t`, branching on the cached regime.
    fn oscillate(&self, t: f64) -> f64 {
        let zeta = self.params.damping_ratio();
        let omega0 = self.params.omega0();
        let x0 = self.start - self.end;
        let v0 = self.initial_velocity;
        match self.regime {
            DampingRegime::Underdamped { omega_d } => {
                let envelope = (-zeta * omega0 * t).exp();
                let b = (v0 + zeta * omega0 * x0) / omega_d;
                self.end + envelope * (x0 * (omega_d * t).cos() + b * (omega_d * t).sin())
            }
            DampingRegime::Critical => {
                let envelope = (-omega0 * t).exp();
                self.end + envelope * (x0 + (v0 + omega0 * x0) * t)
            }
            DampingRegime::Overdamped { r1, r2 } => {
                let c2 = (r1 * x0 - v0) / (r1 - r2);
                let c1 = x0 - c2;
                self.end + c1 * (r1 * t).exp() + c2 * (r2 * t).exp()
            }
        }
    }

    /// Closed-form velocity at `t`: the time derivative of `oscillate`.
    fn oscillate_velocity(&self, t: f64) -> f64 {
        let zeta = self.params.damping_ratio();
        let omega0 = self.params.omega0();
        let x0 = self.start - self.end;
        let v0 = self.initial_velocity;
        match self.regime {
            DampingRegime::Underdamped { omega_d } => {
                let envelope = (-zeta * omega0 * t).exp();
                let b = (v0 + zeta * omega0 * x0) / omega_d;
                let cos_t = (omega_d * t).cos();
                let sin_t = (omega_d * t).sin();
                envelope
                    * (omega_d * (b * cos_t - x0 * sin_t)
                        - zeta * omega0 * (x0 * cos_t + b * sin_t))
            }
            DampingRegime::Critical => {
                let envelope = (-omega0 * t).exp();
                let a = v0 + omega0 * x0;
                envelope * (a - omega0 * (x0 + a * t))
            }
            DampingRegime::Overdamped { r1, r2 } => {
                let c2 = (r1 * x0 - v0) / (r1 - r2);
                let c1 = x0 - c2;
                c1 * r1 * (r1 * t).exp() + c2 * r2 * (r2 * t).exp()
            }
        }
    }

    /// The raw settling criterion, independent of any computed duration.
    fn settled_at(&self, t: f64) -> bool {
        (self.oscillate(t) - self.end).abs() <= self.tolerance.distance
            && self.oscillate_velocity(t).abs() <= self.tolerance.velocity
    }

    /// Earliest settling time: exponential bracket, then bisection.
    ///
    /// No closed form exists in general — the criterion couples position
    /// and velocity — so the window doubles until the spring tests settled,
    /// then bisection squeezes the earliest such time. NaN past the cap.
    fn settle_time(&self) -> f64 {
        if self.settled_at(0.0) {
            return 0.0;
        }
        let mut lo = 0.0;
        let mut hi = SETTLE_SEED_SECS;
        while !self.settled_at(hi) {
            lo = hi;
            hi *= 2.0;
            if hi > MAX_SETTLE_SECS {
                return f64::NAN;
            }
        }
        for _ in 0..SETTLE_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            if self.settled_at(mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        hi
    }
}

impl Simulation for SpringSimulation {
    fn position(&self, t: f64) -> f64 {
        self.oscillate(t)
    }

    fn velocity(&self, t: f64) -> f64 {
        self.oscillate_velocity(t)
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

    /// Analytic inverse: the launch velocity that lands the spring on
    /// `end` at exactly `duration` seconds.
    ///
    /// Branches on the cached regime. Each divide-by-zero-prone branch
    /// returns `0.0` — no extra push — instead of propagating NaN.
    fn solve_initial_velocity(&self, start: f64, end: f64, duration: f64) -> f64 {
        let a = start - end;
        if a.abs() < DEGENERATE_EPS {
            return 0.0;
        }
        let zeta = self.params.damping_ratio();
        let omega0 = self.params.omega0();
        match self.regime {
            DampingRegime::Underdamped { omega_d } => {
                let sin_t = (omega_d * duration).sin();
                if sin_t.abs() < DEGENERATE_EPS {
                    // Degenerate alignment with the oscillation period.
                    return 0.0;
                }
                let cot = (omega_d * duration).cos() / sin_t;
                -a * (zeta * omega0 + omega_d * cot)
            }
            DampingRegime::Critical => {
                if duration.abs() < DEGENERATE_EPS {
                    return 0.0;
                }
                -a * (1.0 / duration + omega0)
            }
            DampingRegime::Overdamped { r1, r2 } => {
                let e = ((r1 - r2) * duration).exp();
                if e.is_infinite() {
                    // Limit of the expression below as the exponent blows up.
                    return a * r2;
                }
                let denom = 1.0 - e;
                if denom.abs() < DEGENERATE_EPS {
                    return 0.0;
                }
                a / denom * (r1 - r2 * e)
            }
        }
    }

    fn retargeted(&self, at: f64, new_end: f64) -> Arc<dyn Simulation> {
        Arc::new(self.retarget(at, new_end))
    }
}
