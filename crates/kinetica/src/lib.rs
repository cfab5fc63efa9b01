// Forbid unsafe everywhere; tests get the same treatment via deny.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: closed-form motion models, settling solvers, and curve composition.
//!
//! # Role in Kinetica
//! `kinetica` is the simulation layer. It owns the motion-model contract,
//! the concrete spring/gravity/friction families, and the curve view that
//! lets physics and plain easing interchange.
//!
//! # Primary responsibilities
//! - **Simulation**: the sampling contract — position, velocity, and
//!   done-ness as pure functions of elapsed time — every family implements.
//! - **SpringSimulation / GravitySimulation / FrictionSimulation**: the
//!   closed-form families, each with an inverse solver ("reach this value
//!   in exactly X seconds") and momentum-preserving retargeting.
//! - **ClampedSimulation**: range clamping over any model, without
//!   touching its timing.
//! - **Physics / Physics2D / SimulationNd**: easing-curve unification and
//!   per-axis vector composition.
//!
//! # How it fits in the system
//! A driver constructs an immutable model, samples it once per frame, and
//! stops when `is_done` says so. Interruption never mutates a model
//! in flight: the driver reads the current position and velocity and asks
//! for a successor that starts exactly there. Widget-level tweening
//! consumes the normalized progress view and never sees physical units.

pub mod clamped;
pub mod compose;
pub mod easing;
pub mod friction;
pub mod gravity;
pub mod physics;
pub mod simulation;
pub mod spring;
pub mod tolerance;

pub use clamped::ClampedSimulation;
pub use compose::{Physics2D, PhysicsNd, Simulation2D, SimulationNd};
pub use easing::{
    EasingFn, ease_in, ease_in_cubic, ease_in_out, ease_out, ease_out_cubic, linear,
};
pub use friction::FrictionSimulation;
pub use gravity::GravitySimulation;
pub use physics::{Physics, PhysicsKind};
pub use simulation::{ConfigError, CopySpec, Simulation};
pub use spring::{SpringParameters, SpringSimulation, presets};
pub use tolerance::Tolerance;
