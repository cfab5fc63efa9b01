//! Integration tests for the simulation core.

use kinetica::{
    ClampedSimulation, ConfigError, CopySpec, FrictionSimulation, GravitySimulation, Physics,
    Physics2D, Simulation, SpringParameters, SpringSimulation, linear, presets,
};

fn reference_spring() -> SpringSimulation {
    let params = SpringParameters::new(1.0, 100.0, 10.0).expect("valid params");
    SpringSimulation::new(params, 0.0, 1.0, 0.0).expect("valid spring")
}

#[test]
fn spring_scenario() {
    let s = reference_spring();
    assert_eq!(s.position(0.0), 0.0);
    assert!(s.velocity(0.0).abs() < 1e-12);
    let d = s.duration();
    assert!((s.position(d) - 1.0).abs() < 0.01, "settle position: {}", s.position(d));
    assert!(s.is_done(d));
}

#[test]
fn gravity_scenario() {
    let g = GravitySimulation::new(9.81, 0.0, 100.0, 0.0).expect("valid gravity");
    let h = 0.1;
    let second_difference =
        (g.position(1.0 - h) - 2.0 * g.position(1.0) + g.position(1.0 + h)) / (h * h);
    assert!(
        (second_difference - 9.81).abs() < 0.1,
        "recovered acceleration: {second_difference}"
    );
    let d = g.duration();
    assert!((g.position(d) - 100.0).abs() < 0.01);
}

#[test]
fn friction_scenario() {
    let f = FrictionSimulation::with_drag(0.5, 0.0, 1000.0, 100.0).expect("valid friction");
    assert_eq!(f.velocity(0.0), 1000.0);
    let d = f.duration();
    assert!(f.velocity(d / 2.0) < f.velocity(0.0));
    assert!(f.velocity(d).abs() < 1.0);
}

#[test]
fn velocity_continuity_across_families() {
    // Sample mid-flight, hand the state to a successor, and the handoff
    // must be seamless for every family.
    let spring = reference_spring();
    let t1 = 0.2;
    let (p, v) = (spring.position(t1), spring.velocity(t1));
    let successor = spring.retargeted(t1, -1.0);
    assert!((successor.position(0.0) - p).abs() < 1e-9);
    assert!((successor.velocity(0.0) - v).abs() < 1e-9);

    let gravity = GravitySimulation::new(9.81, 0.0, 100.0, 5.0).expect("valid gravity");
    let (p, v) = (gravity.position(1.0), gravity.velocity(1.0));
    let successor = gravity.retargeted(1.0, 0.0);
    assert!((successor.position(0.0) - p).abs() < 1e-9);
    assert!((successor.velocity(0.0) - v).abs() < 1e-9);

    let friction = FrictionSimulation::with_drag(0.5, 0.0, 800.0, 0.0).expect("valid friction");
    let (p, v) = (friction.position(0.3), friction.velocity(0.3));
    let successor = friction.retargeted(0.3, p + 150.0);
    assert!((successor.position(0.0) - p).abs() < 1e-9);
    assert!((successor.velocity(0.0) - v).abs() < 1e-9);
}

#[test]
fn duration_matching_round_trip_all_families() {
    let spring = reference_spring();
    let v = spring.solve_initial_velocity(0.0, 1.0, 0.35);
    let m = SpringSimulation::new(spring.params(), 0.0, 1.0, v).expect("valid spring");
    assert!((m.position(0.35) - 1.0).abs() < 1e-6);

    let gravity = GravitySimulation::new(9.81, 0.0, 100.0, 0.0).expect("valid gravity");
    let v = gravity.solve_initial_velocity(0.0, 100.0, 2.5);
    let m = GravitySimulation::new(9.81, 0.0, 100.0, v).expect("valid gravity");
    assert!((m.position(2.5) - 100.0).abs() < 1e-9);

    let friction = FrictionSimulation::with_drag(0.4, 0.0, 100.0, 0.0).expect("valid friction");
    let v = friction.solve_initial_velocity(0.0, 60.0, 2.0);
    let m = FrictionSimulation::with_drag(0.4, 0.0, v, 0.0).expect("valid friction");
    assert!((m.position(2.0) - 60.0).abs() < 1e-6);
}

#[test]
fn copy_with_duration_is_exact_across_regimes() {
    for (params, label) in [
        (SpringParameters::new(1.0, 100.0, 10.0).expect("valid"), "underdamped"),
        (SpringParameters::with_bounce(0.4, 0.0).expect("valid"), "critical"),
        (SpringParameters::new(1.0, 100.0, 30.0).expect("valid"), "overdamped"),
    ] {
        let s = SpringSimulation::new(params, 0.0, 1.0, 0.0).expect("valid spring");
        let c = s.copy_with(CopySpec::new().duration(0.3)).expect("solved");
        assert!(
            (c.position(0.3) - 1.0).abs() < 1e-6,
            "{label}: landed at {}",
            c.position(0.3)
        );
    }
}

#[test]
fn clamp_over_spring_respects_inner_timing() {
    let inner = SpringSimulation::new(presets::BUOYANT, 0.0, 1.0, 0.0).expect("valid spring");
    let clamped = ClampedSimulation::new(inner)
        .position_range(0.0, 1.0)
        .expect("valid range")
        .velocity_range(-3.0, 3.0)
        .expect("valid range");
    assert_eq!(clamped.duration(), inner.duration());
    let d = inner.duration();
    for i in 0..=100 {
        let t = d * f64::from(i) / 100.0;
        assert!(clamped.position(t) <= 1.0);
        assert!(clamped.velocity(t).abs() <= 3.0);
        assert_eq!(clamped.is_done(t), inner.is_done(t));
    }
}

#[test]
fn progress_boundaries_exact_for_everything() {
    let curve = Physics::curve(linear);
    assert_eq!(curve.progress(0.0), 0.0);
    assert_eq!(curve.progress(1.0), 1.0);
    for (name, params) in presets::ALL {
        let s = SpringSimulation::new(params, 0.0, 1.0, 0.0).expect("valid spring");
        let p = Physics::simulation(s);
        assert_eq!(p.progress(0.0), 0.0, "{name}");
        assert_eq!(p.progress(1.0), 1.0, "{name}");
    }
}

#[test]
fn mixed_composition_fails_fast() {
    let err = Physics2D::new(
        Physics::curve(linear),
        Physics::simulation(reference_spring()),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::MixedPhysicsKinds));
}

#[test]
fn chained_retargets_stay_continuous() {
    // Interrupt an interruption: momentum must survive every handoff.
    let mut current = reference_spring().retargeted(0.0, 1.0);
    let targets = [2.0, -0.5, 0.25, 1.0];
    for (i, target) in targets.into_iter().enumerate() {
        let at = 0.08;
        let (p, v) = (current.position(at), current.velocity(at));
        let next = current.retargeted(at, target);
        assert!(
            (next.position(0.0) - p).abs() < 1e-9,
            "handoff {i} broke position continuity"
        );
        assert!(
            (next.velocity(0.0) - v).abs() < 1e-9,
            "handoff {i} broke velocity continuity"
        );
        current = next;
    }
}
