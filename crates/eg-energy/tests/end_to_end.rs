//! Assemble mappers and terms, minimize, and read the next state back.

use eg_core::units::{j_per_kg, kg, m, s};
use eg_core::{StateVector, zero_state};
use eg_energy::{
    ErrorFunction, ErrorTerm, ForceChannel, KinematicPair, KinematicTerm, MassConservationTerm,
    MassTransferChannel, MomentumConservationTerm, NewtonTerm, PrescribedValueTerm, VersorTerm,
    advance,
};
use eg_solver::{ConjugateGradientConfig, minimize};
use eg_state::{
    AccumulatingMapper, OverwritingMapper, QuaternionMapper, QuaternionRotationMapper,
    ScalarMapper, StateMapper, Vector1Mapper,
};
use nalgebra::{Quaternion, UnitQuaternion, Vector1};

fn tight() -> ConjugateGradientConfig {
    ConjugateGradientConfig {
        max_iterations: 2000,
        ..ConjugateGradientConfig::with_tolerance(1e-10)
    }
}

#[test]
fn resting_body_stays_at_equilibrium() {
    // [x, v, a]
    let x = Vector1Mapper::new(0);
    let v = Vector1Mapper::new(1);
    let terms: Vec<Box<dyn ErrorTerm>> = vec![
        Box::new(KinematicTerm::position_velocity(kg(1.0), vec![KinematicPair::new(0, 1)]).unwrap()),
        Box::new(
            KinematicTerm::velocity_acceleration(kg(1.0), s(1.0), vec![KinematicPair::new(1, 2)])
                .unwrap(),
        ),
    ];

    let mut previous = zero_state(3);
    x.write(&mut previous, &Vector1::new(0.0)).unwrap();
    v.write(&mut previous, &Vector1::new(0.0)).unwrap();

    let result = advance(&previous, s(1.0), &terms, &tight()).unwrap();

    assert!(result.converged);
    assert_eq!(result.iterations, 0);
    assert!(result.x.iter().all(|c| c.abs() < 1e-10));
}

#[test]
fn free_body_settles_from_a_bad_guess() {
    // [m, x, v, a]
    let terms: Vec<Box<dyn ErrorTerm>> = vec![
        Box::new(MassConservationTerm::closed(0, kg(1.0), j_per_kg(1.0)).unwrap()),
        Box::new(KinematicTerm::position_velocity(kg(1.0), vec![KinematicPair::new(1, 2)]).unwrap()),
        Box::new(
            KinematicTerm::velocity_acceleration(kg(1.0), s(1.0), vec![KinematicPair::new(2, 3)])
                .unwrap(),
        ),
        Box::new(NewtonTerm::new(0, vec![2], vec![3], vec![], vec![], kg(1.0), s(1.0)).unwrap()),
    ];
    let previous = StateVector::from_vec(vec![1.0, 0.0, 0.0, 0.0]);
    let f = ErrorFunction::new(&previous, s(1.0), &terms).unwrap();

    let guess = StateVector::from_vec(vec![1.2, 0.3, -0.2, 0.5]);
    let result = minimize(&f, guess, &tight()).unwrap();

    assert!(result.converged, "stopped at {:?}", result);
    let expected = [1.0, 0.0, 0.0, 0.0];
    for (got, want) in result.x.iter().zip(expected) {
        assert!((got - want).abs() < 1e-7, "{} vs {}", got, want);
    }
}

/// [m, x, v, a, F]
fn free_fall_terms(g: f64) -> Vec<Box<dyn ErrorTerm>> {
    let forces = vec![ForceChannel::new(vec![4])];
    vec![
        Box::new(MassConservationTerm::closed(0, kg(1.0), j_per_kg(1.0)).unwrap()),
        Box::new(KinematicTerm::position_velocity(kg(1.0), vec![KinematicPair::new(1, 2)]).unwrap()),
        Box::new(
            KinematicTerm::velocity_acceleration(kg(1.0), s(1.0), vec![KinematicPair::new(2, 3)])
                .unwrap(),
        ),
        Box::new(
            MomentumConservationTerm::new(0, vec![2], vec![], forces.clone(), kg(1.0)).unwrap(),
        ),
        Box::new(NewtonTerm::new(0, vec![2], vec![3], vec![], forces, kg(1.0), s(1.0)).unwrap()),
        Box::new(PrescribedValueTerm::scalar(4, -g, 1.0).unwrap()),
    ]
}

#[test]
fn free_fall_single_step() {
    let terms = free_fall_terms(9.8);
    let previous = StateVector::from_vec(vec![1.0, 0.0, 0.0, -9.8, -9.8]);

    let result = advance(&previous, s(0.1), &terms, &tight()).unwrap();

    println!(
        "free fall step converged in {} iterations, energy {:e}",
        result.iterations, result.value
    );
    let expected = [1.0, -0.049, -0.98, -9.8, -9.8];
    for (got, want) in result.x.iter().zip(expected) {
        assert!((got - want).abs() < 1e-6, "{} vs {}", got, want);
    }
    assert!(result.value < 1e-12);
}

#[test]
fn free_fall_trajectory_matches_closed_form() {
    let terms = free_fall_terms(9.8);
    let mut state = StateVector::from_vec(vec![1.0, 0.0, 0.0, -9.8, -9.8]);
    let dt = 0.1;

    for _ in 0..10 {
        state = advance(&state, s(dt), &terms, &tight()).unwrap().x;
    }

    // t = 1 s
    let position = ScalarMapper::new(1).read(&state).unwrap();
    let velocity = ScalarMapper::new(2).read(&state).unwrap();
    assert!((position + 4.9).abs() < 1e-5, "x = {}", position);
    assert!((velocity + 9.8).abs() < 1e-5, "v = {}", velocity);
}

#[test]
fn rocket_loses_mass_and_gains_speed() {
    // [m, r, v, a, u]
    let mass = ScalarMapper::new(0);
    let transfer = vec![MassTransferChannel::new(1, vec![4])];
    let terms: Vec<Box<dyn ErrorTerm>> = vec![
        Box::new(MassConservationTerm::new(0, vec![1], kg(1.0), j_per_kg(1.0)).unwrap()),
        Box::new(
            KinematicTerm::velocity_acceleration(kg(1.0), s(1.0), vec![KinematicPair::new(2, 3)])
                .unwrap(),
        ),
        Box::new(
            MomentumConservationTerm::new(0, vec![2], transfer.clone(), vec![], kg(1.0)).unwrap(),
        ),
        Box::new(NewtonTerm::new(0, vec![2], vec![3], transfer, vec![], kg(1.0), s(1.0)).unwrap()),
        // 0.1 kg/s leaving at −10 m/s
        Box::new(PrescribedValueTerm::new(vec![(1, -0.1), (4, -10.0)], 1.0).unwrap()),
    ];

    let mut previous = zero_state(5);
    mass.write(&mut previous, &1.0).unwrap();
    previous[1] = -0.1;
    previous[3] = 1.0;
    previous[4] = -10.0;

    let result = advance(&previous, s(0.1), &terms, &tight()).unwrap();

    assert!(result.converged, "stopped at {:?}", result);
    assert!(result.iterations < 2000, "took {} iterations", result.iterations);
    let m1 = mass.read(&result.x).unwrap();
    assert!((m1 - 0.99).abs() < 1e-5, "m = {}", m1);
    assert!((result.x[2] - 0.1 / 0.99).abs() < 1e-4, "v = {}", result.x[2]);
}

#[test]
fn drifting_quaternion_is_pulled_back_to_unit_length() {
    let attitude = QuaternionRotationMapper::new(0);
    let terms: Vec<Box<dyn ErrorTerm>> =
        vec![Box::new(VersorTerm::new(QuaternionMapper::new(0), kg(1.0), m(1.0)).unwrap())];

    let mut previous = zero_state(4);
    QuaternionMapper::new(0)
        .write(&mut previous, &Quaternion::new(1.5, 0.3, -0.6, 0.9))
        .unwrap();
    let before = attitude.read(&previous).unwrap();

    let result = advance(&previous, s(0.1), &terms, &tight()).unwrap();

    assert!(result.converged);
    let raw = QuaternionMapper::new(0).read(&result.x).unwrap();
    assert!((raw.norm() - 1.0).abs() < 1e-9);
    // Pulled radially: same rotation as before.
    let after: UnitQuaternion<f64> = attitude.read(&result.x).unwrap();
    assert!(after.angle_to(&before) < 1e-9);
}
