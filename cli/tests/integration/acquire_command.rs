//! Integration tests for `credsmith acquire`.
//!
//! All filesystem-touching tests set `CREDSMITH_CONFIG` (or `--config`) to a
//! temp path so they never read `~/.credsmith/config.yaml`. Channel-failure
//! tests use a host under the reserved `.invalid` TLD: DNS resolution fails
//! immediately, so the preflight fails every target without long waits.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn credsmith() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("credsmith"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

/// A syntactically valid config whose host can never resolve.
fn unreachable_host_config(dir: &TempDir) -> String {
    let key_path = dir.path().join("id_ed25519");
    std::fs::write(&key_path, "not a real key").expect("write key");
    format!(
        "host: credsmith-itest.invalid\n\
         channel:\n\
         \x20 kind: ssh\n\
         \x20 user: ubuntu\n\
         \x20 key_path: {}\n\
         \x20 timeout_secs: 5\n\
         deadline_secs: 20\n",
        key_path.display()
    )
}

fn write_config(path: &str, content: &str) {
    std::fs::write(path, content).expect("write config");
}

// ---------------------------------------------------------------------------
// Config resolution errors (exit 1)
// ---------------------------------------------------------------------------

#[test]
fn test_acquire_missing_config_file_exits_one_and_names_the_path() {
    let (_dir, path) = temp_config_path();
    credsmith()
        .arg("acquire")
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no config file"))
        .stderr(predicate::str::contains(&path));
}

#[test]
fn test_acquire_corrupt_yaml_exits_one() {
    let (_dir, path) = temp_config_path();
    write_config(&path, "{ not: valid: yaml: [[[");
    credsmith()
        .arg("acquire")
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot parse"));
}

#[test]
fn test_acquire_unknown_service_exits_one_and_lists_known_names() {
    let (dir, path) = temp_config_path();
    write_config(&path, &unreachable_host_config(&dir));
    credsmith()
        .args(["acquire", "--service", "gitlab"])
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("gitlab"))
        .stderr(predicate::str::contains("jenkins"));
}

#[test]
fn test_acquire_empty_service_list_exits_one() {
    let (_dir, path) = temp_config_path();
    write_config(
        &path,
        "host: h.invalid\nchannel:\n  kind: ssh\n  user: u\n  key_path: /k\nservices: []\n",
    );
    credsmith()
        .arg("acquire")
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("service"));
}

#[test]
fn test_acquire_config_flag_wins_over_env_var() {
    let (dir, env_path) = temp_config_path();
    write_config(&env_path, &unreachable_host_config(&dir));
    let flag_path = dir
        .path()
        .join("missing.yaml")
        .to_string_lossy()
        .into_owned();
    credsmith()
        .args(["--config", &flag_path, "acquire"])
        .env("CREDSMITH_CONFIG", &env_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.yaml"));
}

#[test]
fn test_acquire_json_config_error_is_structured() {
    let (_dir, path) = temp_config_path();
    let output = credsmith()
        .args(["acquire", "--json"])
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&output).expect("stderr must be valid JSON");
    assert_eq!(v["error"], true);
    assert!(v["message"].as_str().unwrap().contains("no config file"));
}

// ---------------------------------------------------------------------------
// Total channel failure (exit 2)
// ---------------------------------------------------------------------------

#[test]
fn test_acquire_unreachable_host_exits_two_with_sentinel_block() {
    let (dir, path) = temp_config_path();
    write_config(&path, &unreachable_host_config(&dir));
    credsmith()
        .arg("acquire")
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "JENKINS_URL=http://credsmith-itest.invalid:8080",
        ))
        .stdout(predicate::str::contains("JENKINS_USERNAME=admin"))
        .stdout(predicate::str::contains("JENKINS_TOKEN=check-manually"))
        .stdout(predicate::str::contains("NEXUS_PASSWORD=check-manually"))
        .stdout(predicate::str::contains("GRAFANA_TOKEN=check-manually"))
        .stderr(predicate::str::contains("unreachable"));
}

#[test]
fn test_acquire_service_selection_narrows_the_block() {
    let (dir, path) = temp_config_path();
    write_config(&path, &unreachable_host_config(&dir));
    credsmith()
        .args(["acquire", "--service", "grafana"])
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("GRAFANA_URL="))
        .stdout(predicate::str::contains("JENKINS_URL=").not())
        .stdout(predicate::str::contains("NEXUS_URL=").not());
}

#[test]
fn test_acquire_quiet_still_emits_the_env_block() {
    let (dir, path) = temp_config_path();
    write_config(&path, &unreachable_host_config(&dir));
    credsmith()
        .args(["acquire", "--quiet"])
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("JENKINS_TOKEN=check-manually"));
}

#[test]
fn test_acquire_json_reports_channel_failure_per_record() {
    let (dir, path) = temp_config_path();
    write_config(&path, &unreachable_host_config(&dir));
    let output = credsmith()
        .args(["acquire", "--json"])
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&output).expect("stdout must be valid JSON");
    let records = v["records"].as_array().expect("records array");
    assert_eq!(records.len(), 3);
    for record in records {
        assert_eq!(record["failure"], "channel");
        assert_eq!(record["status"], "failed");
        assert_eq!(record["secret"], "check-manually");
    }
    assert!(v["generated_at"].is_string());
}

// ---------------------------------------------------------------------------
// --output file
// ---------------------------------------------------------------------------

#[test]
fn test_acquire_output_flag_redirects_block_to_file() {
    let (dir, path) = temp_config_path();
    write_config(&path, &unreachable_host_config(&dir));
    let out_path = dir.path().join("creds.env");
    credsmith()
        .args(["acquire", "--output", out_path.to_str().unwrap()])
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("JENKINS_URL=").not());

    let content = std::fs::read_to_string(&out_path).expect("output file");
    assert!(content.contains("JENKINS_TOKEN=check-manually"));
    assert!(content.contains("NEXUS_PASSWORD=check-manually"));
}

#[test]
#[cfg(unix)]
fn test_acquire_output_file_has_0o600_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let (dir, path) = temp_config_path();
    write_config(&path, &unreachable_host_config(&dir));
    let out_path = dir.path().join("creds.env");
    credsmith()
        .args(["acquire", "--output", out_path.to_str().unwrap()])
        .env("CREDSMITH_CONFIG", &path)
        .assert()
        .code(2);

    let mode = std::fs::metadata(&out_path)
        .expect("file should exist")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600, "expected 0o600, got {mode:o}");
}
