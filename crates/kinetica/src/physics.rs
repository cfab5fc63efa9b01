#![forbid(unsafe_code)]

//! One umbrella for easing curves and physics simulations.
//!
//! Anywhere a "physics" parameter is accepted, either a plain
//! [`EasingFn`] or a full [`Simulation`] may be handed over. The two are
//! an explicit tagged union — no structural overlap, no runtime type
//! inspection — and meet on a single normalized view:
//! [`Physics::progress`], mapping [0, 1] to [0, 1] with exact endpoints.

use std::sync::Arc;

use crate::easing::EasingFn;
use crate::simulation::Simulation;

/// Either a plain easing curve or a closed-form motion simulation.
#[derive(Debug, Clone)]
pub enum Physics {
    /// A normalized time-remapping function.
    Curve(EasingFn),
    /// A motion model, viewed through its progress curve when only
    /// normalized progress is wanted.
    Simulation(Arc<dyn Simulation>),
}

/// Which side of the curve/simulation split a [`Physics`] value is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsKind {
    /// Plain easing curve.
    Curve,
    /// Full motion simulation.
    Simulation,
}

impl Physics {
    /// Wrap an easing function.
    #[must_use]
    pub fn curve(f: EasingFn) -> Self {
        Self::Curve(f)
    }

    /// Wrap a motion model.
    #[must_use]
    pub fn simulation(sim: impl Simulation + 'static) -> Self {
        Self::Simulation(Arc::new(sim))
    }

    /// The kind tag, used by compositions to enforce uniformity.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> PhysicsKind {
        match self {
            Self::Curve(_) => PhysicsKind::Curve,
            Self::Simulation(_) => PhysicsKind::Simulation,
        }
    }

    /// Normalized progress at normalized time `t01`.
    ///
    /// Exact at both endpoints for either variant.
    #[must_use]
    pub fn progress(&self, t01: f64) -> f64 {
        match self {
            Self::Curve(f) => f(t01),
            Self::Simulation(sim) => sim.progress(t01),
        }
    }

    /// The underlying simulation, when there is one.
    #[must_use]
    pub fn as_simulation(&self) -> Option<&Arc<dyn Simulation>> {
        match self {
            Self::Curve(_) => None,
            Self::Simulation(sim) => Some(sim),
        }
    }
}

impl From<EasingFn> for Physics {
    fn from(f: EasingFn) -> Self {
        Self::Curve(f)
    }
}
