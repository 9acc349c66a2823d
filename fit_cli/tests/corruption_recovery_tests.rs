//! Corruption recovery tests for fittrack.
//!
//! These tests verify the system handles:
//! - Corrupted state files (reported, never overwritten)
//! - Missing files
//! - State written by the browser version of the tracker

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("fittrack").expect("Failed to find fittrack binary")
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_exercises_file_is_not_overwritten() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let exercises_path = data_dir.join("exercises.json");
    fs::write(&exercises_path, "{ invalid json }}}}").expect("Failed to write corrupted state");

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["log", "Squat", "--set", "5x225", "--date", "2024-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("StorageUnavailable"));

    // The damaged file is left for manual recovery
    let contents = fs::read_to_string(&exercises_path).unwrap();
    assert_eq!(contents, "{ invalid json }}}}");
}

#[test]
fn test_corrupted_types_file_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("exercise_types.json"), "[1, 2, 3]").unwrap();

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["list", "--date", "2024-01-15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt state file"));
}

#[test]
fn test_empty_state_files_load_as_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("exercises.json"), "").unwrap();
    fs::write(data_dir.join("exercise_types.json"), "").unwrap();

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["list", "--date", "2024-01-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises logged yet"));
}

#[test]
fn test_missing_data_dir_is_created_on_first_write() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("does/not/exist");

    cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .args(["log", "Plank", "--unit", "seconds", "--set", "60", "--date", "2024-01-15"])
        .assert()
        .success();

    assert!(data_dir.join("exercises.json").exists());
}

#[test]
fn test_reads_browser_storage_format() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(
        data_dir.join("exercise_types.json"),
        r#"{"push-up": {"name": "Push-Up", "repType": "reps", "bodyParts": ["chest"]}}"#,
    )
    .unwrap();
    fs::write(
        data_dir.join("exercises.json"),
        r#"{"2024-01-05": [{"id": "1704470400000", "name": "Push-Up", "repType": "reps",
            "bodyParts": ["chest"], "sets": [{"reps": 20, "weight": null}],
            "timestamp": "2024-01-05T16:00:00.000Z"}]}"#,
    )
    .unwrap();

    cli()
        .arg("--data-dir")
        .arg(data_dir)
        .args(["list", "--date", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Push-Up [chest]"))
        .stdout(predicate::str::contains("Set 1: 20 reps"));
}
