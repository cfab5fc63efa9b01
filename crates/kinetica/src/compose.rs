#![forbid(unsafe_code)]

//! Per-axis composition of motions into vector-valued samples.
//!
//! Axes are sampled at the same instant and read back as vectors. Done-ness
//! is the AND over axes; the driving duration is the max — the slowest axis
//! gates completion. Axes must be uniformly simulations or uniformly
//! curves: a mixed set has no coherent notion of time and is rejected at
//! construction.

use std::sync::Arc;

use glam::DVec2;

use crate::easing::EasingFn;
use crate::physics::{Physics, PhysicsKind};
use crate::simulation::{ConfigError, Simulation};

/// Max over axis durations, letting NaN (a never-settling axis) win.
fn gating_duration<I: Iterator<Item = f64>>(durations: I) -> f64 {
    durations.fold(0.0, |acc: f64, d| {
        if acc.is_nan() || d.is_nan() {
            f64::NAN
        } else {
            acc.max(d)
        }
    })
}

// ---------------------------------------------------------------------------
// SimulationNd
// ---------------------------------------------------------------------------

/// N per-axis motion models sampled as N-vectors.
#[derive(Debug, Clone)]
pub struct SimulationNd<const N: usize> {
    axes: [Arc<dyn Simulation>; N],
}

impl<const N: usize> SimulationNd<N> {
    /// Compose per-axis models.
    #[must_use]
    pub fn new(axes: [Arc<dyn Simulation>; N]) -> Self {
        Self { axes }
    }

    /// The model driving axis `i`.
    #[must_use]
    pub fn axis(&self, i: usize) -> &Arc<dyn Simulation> {
        &self.axes[i]
    }

    /// Per-axis positions at `t`.
    #[must_use]
    pub fn position(&self, t: f64) -> [f64; N] {
        std::array::from_fn(|i| self.axes[i].position(t))
    }

    /// Per-axis velocities at `t`.
    #[must_use]
    pub fn velocity(&self, t: f64) -> [f64; N] {
        std::array::from_fn(|i| self.axes[i].velocity(t))
    }

    /// Done only when every axis is done.
    #[must_use]
    pub fn is_done(&self, t: f64) -> bool {
        self.axes.iter().all(|axis| axis.is_done(t))
    }

    /// The slowest axis gates completion. NaN if any axis never settles.
    #[must_use]
    pub fn duration(&self) -> f64 {
        gating_duration(self.axes.iter().map(|axis| axis.duration()))
    }
}

// ---------------------------------------------------------------------------
// Simulation2D
// ---------------------------------------------------------------------------

/// Two per-axis motion models sampled as [`DVec2`].
#[derive(Debug, Clone)]
pub struct Simulation2D {
    x: Arc<dyn Simulation>,
    y: Arc<dyn Simulation>,
}

impl Simulation2D {
    /// Compose two concrete models.
    #[must_use]
    pub fn new(x: impl Simulation + 'static, y: impl Simulation + 'static) -> Self {
        Self {
            x: Arc::new(x),
            y: Arc::new(y),
        }
    }

    /// Compose two already-shared models.
    #[must_use]
    pub fn from_axes(x: Arc<dyn Simulation>, y: Arc<dyn Simulation>) -> Self {
        Self { x, y }
    }

    /// The horizontal-axis model.
    #[must_use]
    pub fn x(&self) -> &Arc<dyn Simulation> {
        &self.x
    }

    /// The vertical-axis model.
    #[must_use]
    pub fn y(&self) -> &Arc<dyn Simulation> {
        &self.y
    }

    /// Position vector at `t`.
    #[must_use]
    pub fn position(&self, t: f64) -> DVec2 {
        DVec2::new(self.x.position(t), self.y.position(t))
    }

    /// Velocity vector at `t`.
    #[must_use]
    pub fn velocity(&self, t: f64) -> DVec2 {
        DVec2::new(self.x.velocity(t), self.y.velocity(t))
    }

    /// Done only when both axes are done.
    #[must_use]
    pub fn is_done(&self, t: f64) -> bool {
        self.x.is_done(t) && self.y.is_done(t)
    }

    /// The slower axis gates completion. NaN if either never settles.
    #[must_use]
    pub fn duration(&self) -> f64 {
        gating_duration([self.x.duration(), self.y.duration()].into_iter())
    }

    /// Successor pair starting exactly where this one is at `at`.
    #[must_use]
    pub fn retargeted(&self, at: f64, new_end: DVec2) -> Self {
        Self {
            x: self.x.retargeted(at, new_end.x),
            y: self.y.retargeted(at, new_end.y),
        }
    }
}

// ---------------------------------------------------------------------------
// Physics2D
// ---------------------------------------------------------------------------

/// Two per-axis [`Physics`] values of the same kind.
#[derive(Debug, Clone)]
pub enum Physics2D {
    /// Both axes are plain curves.
    Curves {
        /// Horizontal-axis easing.
        x: EasingFn,
        /// Vertical-axis easing.
        y: EasingFn,
    },
    /// Both axes are simulations.
    Simulations(Simulation2D),
}

impl Physics2D {
    /// Compose two physics values; mixing kinds is rejected.
    pub fn new(x: Physics, y: Physics) -> Result<Self, ConfigError> {
        match (x, y) {
            (Physics::Curve(x), Physics::Curve(y)) => Ok(Self::Curves { x, y }),
            (Physics::Simulation(x), Physics::Simulation(y)) => {
                Ok(Self::Simulations(Simulation2D::from_axes(x, y)))
            }
            _ => Err(ConfigError::MixedPhysicsKinds),
        }
    }

    /// The shared kind of both axes.
    #[must_use]
    pub fn kind(&self) -> PhysicsKind {
        match self {
            Self::Curves { .. } => PhysicsKind::Curve,
            Self::Simulations(_) => PhysicsKind::Simulation,
        }
    }

    /// Normalized progress vector at normalized time `t01`.
    #[must_use]
    pub fn progress(&self, t01: f64) -> DVec2 {
        match self {
            Self::Curves { x, y } => DVec2::new(x(t01), y(t01)),
            Self::Simulations(pair) => DVec2::new(pair.x.progress(t01), pair.y.progress(t01)),
        }
    }

    /// The simulation pair, when that is what this is.
    #[must_use]
    pub fn as_simulations(&self) -> Option<&Simulation2D> {
        match self {
            Self::Curves { .. } => None,
            Self::Simulations(pair) => Some(pair),
        }
    }
}

// ---------------------------------------------------------------------------
// PhysicsNd
// ---------------------------------------------------------------------------

/// N per-axis [`Physics`] values of the same kind.
#[derive(Debug, Clone)]
pub enum PhysicsNd<const N: usize> {
    /// Every axis is a plain curve.
    Curves([EasingFn; N]),
    /// Every axis is a simulation.
    Simulations(SimulationNd<N>),
}

impl<const N: usize> PhysicsNd<N> {
    /// Compose per-axis physics; mixing kinds is rejected.
    pub fn new(axes: [Physics; N]) -> Result<Self, ConfigError> {
        let mut curves: Vec<EasingFn> = Vec::with_capacity(N);
        let mut sims: Vec<Arc<dyn Simulation>> = Vec::with_capacity(N);
        for axis in axes {
            match axis {
                Physics::Curve(f) => curves.push(f),
                Physics::Simulation(s) => sims.push(s),
            }
        }
        // One of the two buckets must hold every axis. (An empty set
        // counts as curves.)
        if curves.len() == N {
            match <[EasingFn; N]>::try_from(curves) {
                Ok(fns) => Ok(Self::Curves(fns)),
                Err(_) => Err(ConfigError::MixedPhysicsKinds),
            }
        } else if sims.len() == N {
            match <[Arc<dyn Simulation>; N]>::try_from(sims) {
                Ok(axes) => Ok(Self::Simulations(SimulationNd::new(axes))),
                Err(_) => Err(ConfigError::MixedPhysicsKinds),
            }
        } else {
            Err(ConfigError::MixedPhysicsKinds)
        }
    }

    /// The shared kind of all axes.
    #[must_use]
    pub fn kind(&self) -> PhysicsKind {
        match self {
            Self::Curves(_) => PhysicsKind::Curve,
            Self::Simulations(_) => PhysicsKind::Simulation,
        }
    }

    /// Normalized progress per axis at normalized time `t01`.
    #[must_use]
    pub fn progress(&self, t01: f64) -> [f64; N] {
        match self {
            Self::Curves(fns) => std::array::from_fn(|i| fns[i](t01)),
            Self::Simulations(sims) => std::array::from_fn(|i| sims.axes[i].progress(t01)),
        }
    }
}
