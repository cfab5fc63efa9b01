//! Property-based invariant tests for the simulation core.
//!
//! These tests verify contract invariants across arbitrary parameters:
//!
//! 1. Progress curves are exact at both endpoints
//! 2. Models start exactly at their constructed state
//! 3. Settling: `is_done(duration)` holds for settling springs
//! 4. Retargeting preserves position and velocity continuity
//! 5. Clamp ranges are never escaped, and never touch timing
//! 6. Friction speed decays monotonically without constant deceleration
//! 7. Gravity's second difference recovers the configured acceleration
//! 8. Inverse-velocity solves round-trip through construction

use kinetica::{
    ClampedSimulation, FrictionSimulation, GravitySimulation, Simulation, SpringParameters,
    SpringSimulation,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

/// Springs that settle comfortably inside the search window: the envelope
/// decay rate ζ·ω₀ stays well above zero.
fn settling_spring_strategy() -> impl Strategy<Value = SpringSimulation> {
    (
        10.0f64..1000.0,  // stiffness
        0.3f64..1.8,      // damping ratio
        -50.0f64..50.0,   // start
        -50.0f64..50.0,   // end
        -100.0f64..100.0, // initial velocity
    )
        .prop_map(|(stiffness, ratio, start, end, velocity)| {
            let damping = ratio * 2.0 * stiffness.sqrt();
            let params =
                SpringParameters::new(1.0, stiffness, damping).expect("strategy emits valid params");
            SpringSimulation::new(params, start, end, velocity).expect("strategy emits valid spring")
        })
}

fn drag_strategy() -> impl Strategy<Value = f64> {
    0.05f64..0.95
}

/// Absolute-plus-relative closeness for values spanning magnitudes.
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (1.0 + b.abs())
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Progress boundary exactness
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn progress_is_boundary_exact(spring in settling_spring_strategy()) {
        prop_assert_eq!(spring.progress(0.0), 0.0);
        prop_assert_eq!(spring.progress(1.0), 1.0);
    }

    // ═══════════════════════════════════════════════════════════════════
    // 2. Constructed state is exact
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn spring_starts_where_told(spring in settling_spring_strategy()) {
        prop_assert_eq!(spring.position(0.0), spring.start());
        prop_assert!(
            close(spring.velocity(0.0), spring.initial_velocity()),
            "velocity(0) = {}, constructed {}",
            spring.velocity(0.0),
            spring.initial_velocity()
        );
    }

    // ═══════════════════════════════════════════════════════════════════
    // 3. Settling
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn spring_is_done_at_its_duration(spring in settling_spring_strategy()) {
        let d = spring.duration();
        prop_assert!(d.is_finite(), "settling spring must have finite duration, got {}", d);
        prop_assert!(spring.is_done(d));
    }

    // ═══════════════════════════════════════════════════════════════════
    // 4. Retargeting continuity
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn retarget_is_seamless(
        spring in settling_spring_strategy(),
        at in 0.0f64..2.0,
        target in -50.0f64..50.0,
    ) {
        let p = spring.position(at);
        let v = spring.velocity(at);
        let successor = spring.retarget(at, target);
        prop_assert!(
            close(successor.position(0.0), p),
            "position handoff: {} vs {}",
            successor.position(0.0),
            p
        );
        prop_assert!(
            close(successor.velocity(0.0), v),
            "velocity handoff: {} vs {}",
            successor.velocity(0.0),
            v
        );
    }

    // ═══════════════════════════════════════════════════════════════════
    // 5. Clamp invariants
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn clamp_is_inescapable_and_timing_neutral(
        spring in settling_spring_strategy(),
        lo in -10.0f64..0.0,
        span in 0.0f64..20.0,
        t in 0.0f64..5.0,
    ) {
        let hi = lo + span;
        let clamped = ClampedSimulation::new(spring)
            .position_range(lo, hi)
            .expect("lo <= hi by construction")
            .velocity_range(lo, hi)
            .expect("lo <= hi by construction");
        let p = clamped.position(t);
        prop_assert!((lo..=hi).contains(&p), "position {} escaped [{}, {}]", p, lo, hi);
        let v = clamped.velocity(t);
        prop_assert!((lo..=hi).contains(&v), "velocity {} escaped [{}, {}]", v, lo, hi);
        prop_assert_eq!(clamped.is_done(t), spring.is_done(t));
        prop_assert_eq!(clamped.duration(), spring.duration());
    }

    // ═══════════════════════════════════════════════════════════════════
    // 6. Friction decay
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn friction_speed_never_grows(
        drag in drag_strategy(),
        velocity in -2000.0f64..2000.0,
        steps in 2usize..50,
    ) {
        let sim = FrictionSimulation::with_drag(drag, 0.0, velocity, 0.0)
            .expect("strategy emits valid drag");
        let mut prev = sim.velocity(0.0).abs();
        for i in 1..steps {
            let t = i as f64 * 0.1;
            let speed = sim.velocity(t).abs();
            prop_assert!(
                speed <= prev + 1e-9,
                "speed grew at t={}: {} -> {}",
                t,
                prev,
                speed
            );
            prev = speed;
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // 7. Gravity consistency
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn gravity_second_difference_recovers_acceleration(
        gravity in -100.0f64..100.0,
        velocity in -100.0f64..100.0,
        t in 0.1f64..10.0,
    ) {
        let sim = GravitySimulation::new(gravity, 0.0, 100.0, velocity)
            .expect("tolerance is the default");
        let h = 0.05;
        let dd = (sim.position(t - h) - 2.0 * sim.position(t) + sim.position(t + h)) / (h * h);
        prop_assert!(
            (dd - gravity).abs() <= 0.01 * gravity.abs().max(1.0),
            "second difference {} vs configured {}",
            dd,
            gravity
        );
    }

    // ═══════════════════════════════════════════════════════════════════
    // 8. Inverse-velocity round trip
    // ═══════════════════════════════════════════════════════════════════

    #[test]
    fn gravity_solve_round_trips(
        gravity in -50.0f64..50.0,
        end in -100.0f64..100.0,
        duration in 0.1f64..10.0,
    ) {
        let probe = GravitySimulation::new(gravity, 0.0, end, 0.0)
            .expect("tolerance is the default");
        let v = probe.solve_initial_velocity(0.0, end, duration);
        let sim = GravitySimulation::new(gravity, 0.0, end, v)
            .expect("tolerance is the default");
        prop_assert!(
            close(sim.position(duration), end),
            "landed at {} instead of {}",
            sim.position(duration),
            end
        );
    }

    #[test]
    fn friction_solve_round_trips(
        drag in drag_strategy(),
        end in 10.0f64..200.0,
        duration in 0.2f64..5.0,
    ) {
        let probe = FrictionSimulation::with_drag(drag, 0.0, 100.0, 0.0)
            .expect("strategy emits valid drag");
        let v = probe.solve_initial_velocity(0.0, end, duration);
        let sim = FrictionSimulation::with_drag(drag, 0.0, v, 0.0)
            .expect("strategy emits valid drag");
        prop_assert!(
            close(sim.position(duration), end),
            "landed at {} instead of {}",
            sim.position(duration),
            end
        );
    }
}
