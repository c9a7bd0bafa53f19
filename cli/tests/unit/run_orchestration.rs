//! Unit tests for whole-run orchestration: preflight, deadline, isolation.

#![allow(clippy::expect_used)]

use std::time::Duration;

use credsmith_cli::application::services::run::{preflight, run_acquisitions};
use credsmith_cli::domain::{ChannelError, PollPolicy};
use credsmith_common::{FailureKind, sentinel};

use crate::mocks::{NullReporter, StubChannel, StubHttp, exec_fail, exec_ok, http_ok, target};

const DEADLINE: Duration = Duration::from_secs(900);

// ── Preflight ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_preflight_accepts_clean_echo() {
    let channel = StubChannel::scripted(vec![exec_ok("ok\n")]);

    preflight(&channel).await.expect("echo round-trip");

    assert_eq!(channel.sent_commands(), ["echo ok"]);
}

#[tokio::test]
async fn test_preflight_rejects_garbled_echo() {
    let channel = StubChannel::scripted(vec![exec_ok("")]);

    let err = preflight(&channel).await.expect_err("empty echo is not ok");

    assert!(matches!(err, ChannelError::Unreachable(_)));
}

#[tokio::test]
async fn test_preflight_rejects_failing_echo() {
    let channel = StubChannel::scripted(vec![exec_fail(127, "sh: echo: not found")]);

    let err = preflight(&channel).await.expect_err("non-zero echo");

    assert!(matches!(err, ChannelError::Unreachable(_)));
}

// ── Whole-run behaviour ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_dead_channel_fails_every_target_without_probing() {
    let targets = vec![target("jenkins"), target("nexus"), target("grafana")];
    let channel = StubChannel::always(Err(ChannelError::Unreachable(
        "ssh: connect to host 10.0.0.5 port 22: Connection timed out".to_string(),
    )));
    let http = StubHttp::scripted(vec![]);

    let report = run_acquisitions(&targets, &channel, &http, &NullReporter, DEADLINE).await;

    assert!(report.total_channel_failure());
    assert_eq!(report.records.len(), 3);
    for record in &report.records {
        assert_eq!(record.failure, Some(FailureKind::Channel));
        assert_eq!(record.secret, sentinel::CHECK_MANUALLY);
    }
    // Preflight failed, so no service was ever probed.
    assert!(http.sent_requests().is_empty());
    assert_eq!(channel.sent_commands(), ["echo ok"]);
}

#[tokio::test(start_paused = true)]
async fn test_sibling_failure_never_disturbs_a_verified_service() {
    let targets = vec![target("nexus"), target("sonarqube")];
    let channel = StubChannel::scripted(vec![
        exec_ok("ok\n"),                           // preflight
        exec_fail(1, "No such file or directory"), // nexus primary read
        exec_ok(""),                               // nexus fallback search: nothing
    ]);
    let http = StubHttp::scripted(vec![
        http_ok(200, ""),                      // nexus probe
        http_ok(200, r#"{"status":"UP"}"#),    // sonarqube probe
        http_ok(200, r#"{"health":"GREEN"}"#), // sonarqube default-login check
        http_ok(200, r#"{"health":"GREEN"}"#), // sonarqube verification
    ]);

    let report = run_acquisitions(&targets, &channel, &http, &NullReporter, DEADLINE).await;

    assert_eq!(report.records[0].service, "nexus");
    assert_eq!(report.records[0].failure, Some(FailureKind::Extraction));
    assert_eq!(report.records[0].secret, sentinel::EXTRACTION_FAILED);

    assert_eq!(report.records[1].service, "sonarqube");
    assert!(report.records[1].is_usable());
    assert_eq!(report.records[1].secret, "admin");

    assert_eq!(report.verified_count(), 1);
    assert_eq!(report.failed_count(), 1);
    assert!(!report.total_channel_failure());
}

#[tokio::test(start_paused = true)]
async fn test_run_deadline_cancels_stragglers() {
    let mut slow = target("nexus");
    slow.poll = PollPolicy {
        max_attempts: 60,
        interval: Duration::from_secs(10),
    };
    let targets = vec![slow];
    let channel = StubChannel::scripted(vec![exec_ok("ok\n")]);
    let http = StubHttp::always(http_ok(503, "starting"));

    let report = run_acquisitions(
        &targets,
        &channel,
        &http,
        &NullReporter,
        Duration::from_secs(25),
    )
    .await;

    let record = &report.records[0];
    assert_eq!(record.failure, Some(FailureKind::Deadline));
    assert_eq!(record.secret, sentinel::TIMED_OUT);
    assert!(
        record
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("deadline"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_target_list_produces_empty_report() {
    let channel = StubChannel::scripted(vec![exec_ok("ok\n")]);
    let http = StubHttp::scripted(vec![]);

    let report = run_acquisitions(&[], &channel, &http, &NullReporter, DEADLINE).await;

    assert!(report.records.is_empty());
    assert!(!report.total_channel_failure());
}
