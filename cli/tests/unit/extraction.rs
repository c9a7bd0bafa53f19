//! Unit tests for bootstrap secret extraction.

#![allow(clippy::expect_used)]

use credsmith_cli::application::ports::Auth;
use credsmith_cli::application::services::extract::extract_initial_secret;
use credsmith_cli::domain::{ChannelError, ExtractionError};

use crate::mocks::{StubChannel, StubHttp, exec_fail, exec_ok, http_ok, target};

// ── File-read handshake ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_file_read_takes_primary_path_first() {
    let target = target("nexus");
    let channel = StubChannel::scripted(vec![exec_ok("s3cr3tpw\n")]);
    let http = StubHttp::scripted(vec![]);

    let secret = extract_initial_secret(&target, &channel, &http)
        .await
        .expect("primary file present");

    assert_eq!(secret, "s3cr3tpw");
    assert_eq!(
        channel.sent_commands(),
        ["docker exec nexus sh -c 'cat /nexus-data/admin.password'"]
    );
    assert!(http.sent_requests().is_empty());
}

#[tokio::test]
async fn test_file_read_falls_back_to_filesystem_search() {
    let target = target("nexus");
    let channel = StubChannel::scripted(vec![
        exec_fail(1, "cat: /nexus-data/admin.password: No such file or directory"),
        exec_ok("/opt/sonatype-work/nexus3/admin.password\n"),
        exec_ok("s3cr3tpw\n"),
    ]);
    let http = StubHttp::scripted(vec![]);

    let secret = extract_initial_secret(&target, &channel, &http)
        .await
        .expect("search locates the relocated file");

    assert_eq!(secret, "s3cr3tpw");
    let commands = channel.sent_commands();
    assert_eq!(commands.len(), 3);
    assert!(commands[1].contains("find /nexus-data /opt -name \"admin.password\""));
    assert!(commands[2].contains("cat /opt/sonatype-work/nexus3/admin.password"));
}

#[tokio::test]
async fn test_empty_primary_file_is_not_a_secret() {
    let target = target("nexus");
    let channel = StubChannel::scripted(vec![exec_ok("\n"), exec_ok("")]);
    let http = StubHttp::scripted(vec![]);

    let err = extract_initial_secret(&target, &channel, &http)
        .await
        .expect_err("no secret anywhere");

    assert!(matches!(
        err,
        ExtractionError::NotFound { primary } if primary == "/nexus-data/admin.password"
    ));
}

#[tokio::test]
async fn test_channel_failure_propagates_as_channel_error() {
    let target = target("nexus");
    let channel = StubChannel::always(Err(ChannelError::Unreachable("ssh exit 255".to_string())));
    let http = StubHttp::scripted(vec![]);

    let err = extract_initial_secret(&target, &channel, &http)
        .await
        .expect_err("dead channel");

    assert!(matches!(
        err,
        ExtractionError::Channel(ChannelError::Unreachable(_))
    ));
}

// ── Default-login handshake ───────────────────────────────────────────────────

#[tokio::test]
async fn test_default_login_proved_by_authenticated_call() {
    let target = target("grafana");
    let channel = StubChannel::scripted(vec![]);
    let http = StubHttp::scripted(vec![http_ok(200, r#"{"name":"Main Org."}"#)]);

    let secret = extract_initial_secret(&target, &channel, &http)
        .await
        .expect("default accepted");

    assert_eq!(secret, "admin");
    let requests = http.sent_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://10.0.0.5:3000/api/org");
    assert_eq!(
        requests[0].auth,
        Auth::Basic {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    );
    assert!(channel.sent_commands().is_empty());
}

#[tokio::test]
async fn test_rejected_default_login_is_typed_never_fabricated() {
    let target = target("grafana");
    let channel = StubChannel::scripted(vec![]);
    let http = StubHttp::scripted(vec![http_ok(
        401,
        r#"{"message":"invalid username or password"}"#,
    )]);

    let err = extract_initial_secret(&target, &channel, &http)
        .await
        .expect_err("default rejected");

    assert!(matches!(
        err,
        ExtractionError::DefaultRejected { status: 401, .. }
    ));
}

// ── Script-console handshake ──────────────────────────────────────────────────

#[tokio::test]
async fn test_script_console_reads_bootstrap_file_when_present() {
    let target = target("jenkins");
    let channel = StubChannel::scripted(vec![exec_ok("93b8ab0c2f6a4d559f9bc1af843a41cd\n")]);
    let http = StubHttp::scripted(vec![]);

    let secret = extract_initial_secret(&target, &channel, &http)
        .await
        .expect("bootstrap file present");

    assert_eq!(secret, "93b8ab0c2f6a4d559f9bc1af843a41cd");
    assert!(channel.sent_commands()[0].contains("initialAdminPassword"));
}

#[tokio::test]
async fn test_script_console_falls_back_to_default_when_file_gone() {
    // Already-initialized installations delete the bootstrap file.
    let target = target("jenkins");
    let channel = StubChannel::scripted(vec![
        exec_fail(1, "No such file or directory"),
        exec_ok(""),
    ]);
    let http = StubHttp::scripted(vec![]);

    let secret = extract_initial_secret(&target, &channel, &http)
        .await
        .expect("documented default stands in");

    assert_eq!(secret, "admin");
}
