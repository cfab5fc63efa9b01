#![forbid(unsafe_code)]

//! Plain easing curves: normalized time in, normalized progress out.
//!
//! Every function maps [0.0, 1.0] to [0.0, 1.0] with exact endpoints, so
//! consumers snapping to 0 or 1 never see residual error. These are the
//! curve half of [`Physics`](crate::physics::Physics); the simulation half
//! reaches the same shape through
//! [`Simulation::progress`](crate::simulation::Simulation::progress).

/// A normalized easing function: time in [0, 1] to progress in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing.
#[inline]
#[must_use]
pub fn linear(t: f64) -> f64 {
    t
}

/// Quadratic ease-in: slow start, accelerating finish.
#[inline]
#[must_use]
pub fn ease_in(t: f64) -> f64 {
    t * t
}

/// Quadratic ease-out: fast start, decelerating finish.
#[inline]
#[must_use]
pub fn ease_out(t: f64) -> f64 {
    t * (2.0 - t)
}

/// Quadratic ease-in-out: slow at both ends.
#[inline]
#[must_use]
pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        (4.0 - 2.0 * t) * t - 1.0
    }
}

/// Cubic ease-in: a more pronounced slow start.
#[inline]
#[must_use]
pub fn ease_in_cubic(t: f64) -> f64 {
    t * t * t
}

/// Cubic ease-out: a more pronounced slow finish.
#[inline]
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let u = t - 1.0;
    u * u * u + 1.0
}
