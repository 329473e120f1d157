//! Corruption recovery tests for the lift binary.
//!
//! These tests verify the system can handle:
//! - Corrupted store records
//! - Stale session snapshots
//! - Snapshots saved in the future (clock changes)
//! - Leftover temp files from interrupted writes

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("lift"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn lift(data_dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    cli().args(args).arg("--data-dir").arg(data_dir).assert()
}

/// Rewrite the stored snapshot's save time
fn set_saved_at(data_dir: &Path, saved_at: &str) {
    let path = data_dir.join("store/active_session.json");
    let mut snapshot: Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    snapshot["saved_at"] = Value::String(saved_at.into());
    fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
}

#[test]
fn test_corrupted_snapshot_is_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("store")).unwrap();
    fs::write(
        data_dir.join("store/active_session.json"),
        "{ invalid json }}}}",
    )
    .expect("Failed to write corrupted snapshot");

    lift(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("No active session."));

    // A new session can still be started over the corrupt file
    lift(data_dir, &["start", "--day", "push"]).success();
    lift(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("Push Day (paused)"));
}

#[test]
fn test_snapshot_with_wrong_shape_is_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("store")).unwrap();
    fs::write(
        data_dir.join("store/active_session.json"),
        r#"{"day": "push", "sets": 3}"#,
    )
    .unwrap();

    lift(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("No active session."));
}

#[test]
fn test_corrupted_history_falls_back_to_empty() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("store")).unwrap();
    let history_path = data_dir.join("store/workout_history.json");
    fs::write(&history_path, "not json at all").unwrap();

    lift(data_dir, &["history"])
        .success()
        .stdout(predicate::str::contains("No workouts recorded yet."));

    // Completing a session rewrites a valid history
    lift(data_dir, &["start", "--day", "pull"]).success();
    lift(data_dir, &["done", "--all"]).success();
    lift(data_dir, &["complete"]).success();

    let history: Value =
        serde_json::from_str(&fs::read_to_string(&history_path).unwrap()).unwrap();
    assert_eq!(history["logs"].as_object().unwrap().len(), 1);
}

#[test]
fn test_corrupted_schedule_uses_default_rotation() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::create_dir_all(data_dir.join("store")).unwrap();
    fs::write(data_dir.join("store/workout_schedule.json"), "[1, 2").unwrap();

    lift(data_dir, &["today", "--date", "2024-03-05"])
        .success()
        .stdout(predicate::str::contains("PULL DAY"));
}

#[test]
fn test_stale_snapshot_is_discarded() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    lift(data_dir, &["start", "--day", "legs"]).success();
    set_saved_at(data_dir, "2000-01-01T00:00:00Z");

    lift(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("Discarded a session"))
        .stdout(predicate::str::contains("No active session."));

    assert!(!data_dir.join("store/active_session.json").exists());
    assert!(!data_dir.join("store/workout_history.json").exists());
}

#[test]
fn test_future_snapshot_adds_no_time() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    lift(data_dir, &["start", "--day", "push"]).success();
    set_saved_at(data_dir, "2999-01-01T00:00:00Z");

    lift(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("Push Day (paused)"))
        .stdout(predicate::str::contains("Elapsed: 00:00:00"));
}

#[test]
fn test_leftover_temp_files_do_not_break_reads() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    lift(data_dir, &["start", "--day", "push"]).success();

    // Simulate an interrupted write
    fs::write(data_dir.join("store/.tmpABC123"), "{\"partial\": ").unwrap();

    lift(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("Push Day (paused)"));
}

#[test]
fn test_complete_fails_when_history_cannot_be_written() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    lift(data_dir, &["start", "--day", "pull"]).success();
    lift(data_dir, &["done", "--all"]).success();

    // A directory in the history file's place makes the rename fail
    fs::create_dir_all(data_dir.join("store/workout_history.json")).unwrap();

    lift(data_dir, &["complete"])
        .failure()
        .stdout(predicate::str::contains("complete!").not())
        .stderr(predicate::str::contains("Error:"));

    assert!(data_dir.join("store/active_session.json").exists());
    lift(data_dir, &["status"])
        .success()
        .stdout(predicate::str::contains("Pull Day (paused)"))
        .stdout(predicate::str::contains("Sets: 16/16 done"));

    // Once the path is usable again the same session completes
    fs::remove_dir(data_dir.join("store/workout_history.json")).unwrap();
    lift(data_dir, &["complete"])
        .success()
        .stdout(predicate::str::contains("Pull Day complete!"));
    assert!(!data_dir.join("store/active_session.json").exists());
}
