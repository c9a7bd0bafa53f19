//! Unit tests for credential verification.

#![allow(clippy::expect_used)]

use credsmith_cli::application::ports::Auth;
use credsmith_cli::application::services::verify::verify_credential;

use crate::mocks::{StubHttp, http_ok, target, transport};

#[tokio::test]
async fn test_expected_status_verifies_basic_credential() {
    let target = target("nexus");
    let http = StubHttp::scripted(vec![http_ok(200, r#"{"healthy":true}"#)]);

    verify_credential(&target, "s3cr3tpw", &http)
        .await
        .expect("credential accepted");

    let requests = http.sent_requests();
    assert_eq!(
        requests[0].url,
        "http://10.0.0.5:8081/service/rest/v1/status/check"
    );
    assert_eq!(
        requests[0].auth,
        Auth::Basic {
            username: "admin".to_string(),
            password: "s3cr3tpw".to_string(),
        }
    );
}

#[tokio::test]
async fn test_bearer_scheme_sends_the_token() {
    let target = target("grafana");
    let http = StubHttp::scripted(vec![http_ok(200, r#"{"name":"Main Org."}"#)]);

    verify_credential(&target, "glsa_9f8e7d", &http)
        .await
        .expect("token accepted");

    assert_eq!(
        http.sent_requests()[0].auth,
        Auth::Bearer {
            token: "glsa_9f8e7d".to_string(),
        }
    );
}

#[tokio::test]
async fn test_unexpected_status_fails_with_response_preserved() {
    let target = target("nexus");
    let http = StubHttp::scripted(vec![http_ok(401, "authentication required")]);

    let err = verify_credential(&target, "wrong-pw", &http)
        .await
        .expect_err("wrong secret must not verify");

    assert_eq!(err.status, 401);
    assert_eq!(err.body, "authentication required");
    assert!(err.url.ends_with("/service/rest/v1/status/check"));
}

#[tokio::test]
async fn test_no_response_fails_with_status_zero() {
    let target = target("sonarqube");
    let http = StubHttp::always(Err(transport("connection refused")));

    let err = verify_credential(&target, "admin", &http)
        .await
        .expect_err("nothing answered");

    assert_eq!(err.status, 0);
    assert!(err.body.contains("connection refused"));
}
