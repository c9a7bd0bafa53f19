//! Integration tests for `credsmith targets`.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn credsmith() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("credsmith"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_targets_lists_every_builtin_service() {
    credsmith()
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("jenkins"))
        .stdout(predicate::str::contains("nexus"))
        .stdout(predicate::str::contains("grafana"))
        .stdout(predicate::str::contains("sonarqube"));
}

#[test]
fn test_targets_shows_handshake_variants() {
    credsmith()
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("script-console"))
        .stdout(predicate::str::contains("file-read"))
        .stdout(predicate::str::contains("default-login"));
}

#[test]
fn test_targets_needs_no_config_file() {
    // The catalog listing must work before any config exists.
    credsmith()
        .arg("targets")
        .env("CREDSMITH_CONFIG", "/nonexistent/credsmith.yaml")
        .assert()
        .success();
}

#[test]
fn test_targets_json_outputs_catalog_entries() {
    let output = credsmith()
        .args(["targets", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&output).expect("stdout must be valid JSON");
    let entries = v.as_array().expect("array of catalog entries");
    assert_eq!(entries.len(), 4);

    let jenkins = &entries[0];
    assert_eq!(jenkins["name"], "jenkins");
    assert_eq!(jenkins["secret_kind"], "token");
    assert_eq!(jenkins["handshake"], "script-console");
    assert!(
        jenkins["base_url"].as_str().expect("base_url").ends_with(":8080"),
        "jenkins should listen on 8080"
    );
    assert!(jenkins["max_attempts"].is_number());
}
