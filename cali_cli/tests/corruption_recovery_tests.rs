//! Corruption recovery tests for calicraft.
//!
//! These tests verify the system can handle:
//! - Corrupted progression blobs
//! - Saved state from older or newer template versions
//! - Corrupted workout log lines
//! - Missing or malformed catalogue files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("calicraft"))
}

fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    fs::create_dir_all(temp_dir.path().join("data")).unwrap();
    fs::write(temp_dir.path().join("config.toml"), "").unwrap();
    temp_dir
}

fn cli_in(temp_dir: &TempDir) -> Command {
    let mut cmd = cli();
    cmd.arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("--config")
        .arg(temp_dir.path().join("config.toml"));
    cmd
}

fn blob_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("data/skillProgressions.v1.json")
}

#[test]
fn test_corrupted_blob_falls_back_to_template() {
    let temp_dir = setup_test_dir();
    fs::write(blob_path(&temp_dir), "{ invalid json }}}}").unwrap();

    cli_in(&temp_dir)
        .args(["skills", "list", "--category", "legs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Legs (0/23)"))
        .stderr(predicate::str::contains("could not be read"));

    // Next mutation replaces the corrupted blob
    cli_in(&temp_dir)
        .args(["skills", "unlock", "Full Squat"])
        .assert()
        .success();

    let blob = fs::read_to_string(blob_path(&temp_dir)).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&blob).is_ok());
}

#[test]
fn test_schema_mismatch_falls_back_to_template() {
    let temp_dir = setup_test_dir();
    fs::write(blob_path(&temp_dir), r#"["not", "a", "map"]"#).unwrap();

    cli_in(&temp_dir)
        .args(["skills", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""unlockedSkillNames": []"#));
}

#[test]
fn test_old_blob_merged_into_template() {
    let temp_dir = setup_test_dir();
    // Saved by an older version: one category, a step that no longer exists,
    // a progression the template doesn't know about, and an unknown category
    fs::write(
        blob_path(&temp_dir),
        r#"{
            "Legs": [
                {"title": "Squat", "steps": [
                    {"name": "Full Squat", "isUnlocked": true, "note": "felt easy"},
                    {"name": "Jump Squat", "isUnlocked": true}
                ]},
                {"title": "Sissy Squat", "steps": [{"name": "Sissy Squat", "isUnlocked": true}]}
            ],
            "Mobility": [
                {"title": "Pancake", "steps": [{"name": "Pancake", "isUnlocked": true}]}
            ]
        }"#,
    )
    .unwrap();

    cli_in(&temp_dir)
        .args(["skills", "list", "--category", "legs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] Full Squat (felt easy)"))
        .stdout(predicate::str::contains("Jump Squat").not())
        .stdout(predicate::str::contains("Sissy Squat"));

    cli_in(&temp_dir)
        .args(["skills", "list", "--category", "Mobility"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] Pancake"));

    // The unknown category survives a save
    cli_in(&temp_dir)
        .args(["skills", "unlock", "Hollow Hold"])
        .assert()
        .success();
    let blob = fs::read_to_string(blob_path(&temp_dir)).unwrap();
    let tree: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert!(tree.get("Mobility").is_some());
    assert!(tree.get("Vertical Push").is_some());
}

#[test]
fn test_corrupted_workout_log_lines_skipped() {
    let temp_dir = setup_test_dir();

    cli_in(&temp_dir)
        .args(["generate", "--count", "2", "--seed", "5", "--log"])
        .assert()
        .success();

    let log_path = temp_dir.path().join("data/workouts.jsonl");
    let mut file = fs::OpenOptions::new().append(true).open(&log_path).unwrap();
    writeln!(file, "{{ partial write").unwrap();
    drop(file);

    cli_in(&temp_dir)
        .args(["generate", "--count", "2", "--seed", "6", "--log"])
        .assert()
        .success();

    let output = cli_in(&temp_dir).arg("history").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.matches("(2 exercises)").count(), 2);
}

#[test]
fn test_missing_catalogue_gives_empty_results() {
    let temp_dir = setup_test_dir();
    let missing = temp_dir.path().join("nope.json");
    fs::write(
        temp_dir.path().join("config.toml"),
        format!("[data]\ncatalogue_path = {:?}\n", missing.display().to_string()),
    )
    .unwrap();

    cli_in(&temp_dir)
        .arg("exercises")
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises in catalogue."));

    cli_in(&temp_dir)
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises available"));
}

#[test]
fn test_malformed_catalogue_gives_empty_results() {
    let temp_dir = setup_test_dir();
    let catalogue_path = temp_dir.path().join("exercises.json");
    fs::write(&catalogue_path, r#"[{"name": "Push Up"}"#).unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        format!("[data]\ncatalogue_path = {:?}\n", catalogue_path.display().to_string()),
    )
    .unwrap();

    cli_in(&temp_dir)
        .args(["generate", "--skill", "Front Lever"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No exercises available"));
}

#[test]
fn test_empty_blob_file() {
    let temp_dir = setup_test_dir();
    fs::write(blob_path(&temp_dir), "").unwrap();

    cli_in(&temp_dir)
        .args(["skills", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Horizontal Pull (0/"));
}
