//! Integration tests for the `gta` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A config that finishes a run within a few milliseconds per stage.
fn write_fast_config(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
tick_interval_ms = 2
advance_delay_ms = 2
log_threshold = 2
log_probability = 1.0
"#,
    )
    .unwrap();
    path
}

fn gta() -> Command {
    Command::cargo_bin("gta").unwrap()
}

#[test]
fn test_stages_prints_blueprint() {
    gta()
        .arg("stages")
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Open Coding"))
        .stdout(predicate::str::contains("Analyst Agent"))
        .stdout(predicate::str::contains("Validation & Reporting"));
}

#[test]
fn test_stages_json_is_valid() {
    let output = gta().args(["stages", "--json"]).output().unwrap();
    assert!(output.status.success());

    let stages: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stages = stages.as_array().unwrap();
    assert_eq!(stages.len(), 6);
    assert_eq!(stages[0]["agentName"], "Analyst Agent");
    assert_eq!(stages[5]["id"], 6);
}

#[test]
fn test_run_json_reaches_final_stage() {
    let dir = TempDir::new().unwrap();
    let config = write_fast_config(&dir);

    let output = gta()
        .args(["run", "--json", "--seed", "7", "--config"])
        .arg(&config)
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();
    assert!(output.status.success());

    let events: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let completed: Vec<u64> = events
        .iter()
        .filter(|e| e["type"] == "stageCompleted")
        .map(|e| e["payload"]["stage_id"].as_u64().unwrap())
        .collect();
    assert_eq!(completed, vec![1, 2, 3, 4, 5, 6]);
    assert!(events.iter().any(|e| e["type"] == "pipelineFinished"));

    let last = events.last().unwrap();
    assert_eq!(last["type"], "snapshot");
    assert_eq!(last["payload"]["snapshot"]["running"], false);
    assert!(last["payload"]["snapshot"]["activeStageId"].is_null());
}

#[test]
fn test_run_text_prints_summary() {
    let dir = TempDir::new().unwrap();
    let config = write_fast_config(&dir);

    gta()
        .args(["run", "--config"])
        .arg(&config)
        .env("NO_COLOR", "1")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline finished"))
        .stdout(predicate::str::contains("6/6 stages completed"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "log_probability = 2.5\n").unwrap();

    gta()
        .args(["run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("log_probability"));
}

#[test]
fn test_zero_log_probability_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        "log_probability = 0.0\ntick_interval_ms = 1\nadvance_delay_ms = 1\n",
    )
    .unwrap();

    gta()
        .args(["run", "--json", "--config"])
        .arg(&config)
        .timeout(std::time::Duration::from_secs(5))
        .assert()
        .failure()
        .stderr(predicate::str::contains("log_probability"));
}

#[test]
fn test_zero_tick_override_is_rejected() {
    gta()
        .args(["run", "--tick-ms", "0", "--config", "does-not-exist.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tick_interval_ms"));
}
