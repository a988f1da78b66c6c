//! Scenario files loaded from disk.

use std::{fs, path::PathBuf};

use padlock_core::DeviceState;
use padlock_rig::{Outcome, RigConfig, RigError, run_files};

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name)
}

#[test]
fn shipped_scenarios_pass() {
    let paths = [
        shipped("first_enrollment.yaml"),
        shipped("brute_force.yaml"),
        shipped("provision_lock_recovery.yaml"),
    ];
    let report = run_files(&paths, &RigConfig::default()).unwrap();

    for scenario in &report.scenarios {
        let failures: Vec<_> = scenario.steps.iter().filter(|s| !s.passed()).collect();
        assert!(scenario.passed, "{}: {failures:?}", scenario.name);
    }
    assert!(report.passed);
}

#[test]
fn name_defaults_to_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cold_boot.yaml");
    fs::write(&path, "follow_queued: true\nsteps:\n  - trigger: power_on\n").unwrap();

    let report = run_files(&[path], &RigConfig::default()).unwrap();
    assert_eq!(report.scenarios[0].name, "cold_boot");
    assert_eq!(report.scenarios[0].final_state, DeviceState::Oob);
}

#[test]
fn failed_expectation_fails_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wrong.yaml");
    fs::write(
        &path,
        "steps:\n  - trigger: power_off\n    expect: { outcome: fired }\n",
    )
    .unwrap();

    let report = run_files(&[path], &RigConfig::default()).unwrap();
    assert!(!report.passed);
    assert_eq!(report.scenarios[0].steps[0].outcome, Outcome::IllegalTrigger);

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["passed"], false);
    assert_eq!(json["scenarios"][0]["steps"][0]["outcome"], "illegal_trigger");
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_files(&[dir.path().join("absent.yaml")], &RigConfig::default()).unwrap_err();
    assert!(matches!(err, RigError::Read { .. }));
}

#[test]
fn invalid_profile_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.yaml");
    fs::write(&path, "profile: { brute_force_max: 1 }\nsteps:\n  - trigger: power_on\n").unwrap();

    let err = run_files(&[path], &RigConfig::default()).unwrap_err();
    assert!(matches!(err, RigError::Profile { .. }));
}
