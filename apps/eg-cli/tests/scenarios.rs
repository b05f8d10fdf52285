//! Run the shipped scenario files end to end.

use eg_cli::{CliError, load_yaml, simulate};
use std::path::PathBuf;

fn scenario_file(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name)
}

#[test]
fn free_fall_matches_closed_form() {
    let scenario = load_yaml(&scenario_file("free_fall.yaml")).unwrap();
    let samples = simulate(&scenario, None).unwrap();

    assert_eq!(samples.len(), 11);
    let last = samples.last().unwrap();
    let g = 9.80665;
    assert!((last.time - 1.0).abs() < 1e-12);
    assert!((last.mass - 1.0).abs() < 1e-6, "m = {}", last.mass);
    assert!((last.position[2] - (100.0 - 0.5 * g)).abs() < 1e-4, "z = {}", last.position[2]);
    assert!((last.velocity[2] + g).abs() < 1e-4, "vz = {}", last.velocity[2]);
    assert!((last.acceleration[2] + g).abs() < 1e-4);
    assert!(last.position[0].abs() < 1e-6 && last.position[1].abs() < 1e-6);
    assert!(samples.iter().all(|s| s.converged));
}

#[test]
fn rocket_sheds_mass_and_speeds_up() {
    let scenario = load_yaml(&scenario_file("rocket.yaml")).unwrap();
    let samples = simulate(&scenario, Some(5)).unwrap();

    for pair in samples.windows(2) {
        assert!(pair[1].mass < pair[0].mass);
        assert!(pair[1].velocity[0] > pair[0].velocity[0]);
    }
    let last = samples.last().unwrap();
    assert!((last.mass - 0.95).abs() < 1e-3, "m = {}", last.mass);
    // Exhaust at a fixed absolute velocity adds r·u = 1 kg·m/s per second.
    let expected = 0.5 / 0.95;
    assert!((last.velocity[0] - expected).abs() < 1e-3, "v = {}", last.velocity[0]);
}

#[test]
fn samples_serialize_to_json() {
    let scenario = load_yaml(&scenario_file("free_fall.yaml")).unwrap();
    let samples = simulate(&scenario, Some(1)).unwrap();
    let json: serde_json::Value = serde_json::to_value(&samples).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[1]["step"], 1);
    assert!(json[1]["position"].as_array().unwrap().len() == 3);
}

#[test]
fn invalid_scenario_is_rejected() {
    let err = serde_yaml::from_str::<eg_cli::Scenario>("body: {mass: 1.0}\ndt: 0.1\n");
    assert!(err.is_err(), "steps is required");

    let mut scenario = eg_cli::template();
    scenario.body.mass = -1.0;
    assert!(matches!(
        eg_cli::scenario::validate(&scenario),
        Err(CliError::Validation(_))
    ));
}
