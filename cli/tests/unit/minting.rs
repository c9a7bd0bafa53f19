//! Unit tests for durable token minting.

#![allow(clippy::expect_used)]

use credsmith_cli::application::ports::{Auth, HttpBody, HttpMethod};
use credsmith_cli::application::services::mint::mint_durable_token;
use credsmith_cli::domain::MintStep;

use crate::mocks::{StubHttp, http_ok, target, transport};

const CRUMB_BODY: &str = r#"{"crumb":"c-4fd2","crumbRequestField":"Jenkins-Crumb"}"#;

// ── Jenkins script console ────────────────────────────────────────────────────

#[tokio::test]
async fn test_jenkins_mints_through_crumbed_script_console() {
    let target = target("jenkins");
    let minter = target.minter.clone().expect("jenkins mints a token");
    let http = StubHttp::scripted(vec![
        http_ok(200, CRUMB_BODY),
        http_ok(200, "TOKEN:11aab4955beef:TOKEN\n"),
    ]);

    let token = mint_durable_token(&target, &minter, "bootstrap-pw", &http)
        .await
        .expect("token minted");

    assert_eq!(token, "11aab4955beef");
    let requests = http.sent_requests();
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0].method, HttpMethod::Get);
    assert!(requests[0].url.ends_with("/crumbIssuer/api/json"));
    assert_eq!(
        requests[0].auth,
        Auth::Basic {
            username: "admin".to_string(),
            password: "bootstrap-pw".to_string(),
        }
    );

    assert_eq!(requests[1].method, HttpMethod::Post);
    assert!(requests[1].url.ends_with("/scriptText"));
    assert_eq!(
        requests[1].headers,
        [("Jenkins-Crumb".to_string(), "c-4fd2".to_string())]
    );
    let HttpBody::Form(fields) = &requests[1].body else {
        panic!("script console call must be form-encoded");
    };
    assert_eq!(fields[0].0, "script");
    assert!(fields[0].1.contains("generateNewToken(\"credsmith\")"));
}

#[tokio::test]
async fn test_jenkins_goes_crumbless_when_csrf_disabled() {
    let target = target("jenkins");
    let minter = target.minter.clone().expect("jenkins mints a token");
    let http = StubHttp::scripted(vec![
        http_ok(404, "no crumb issuer"),
        http_ok(200, "TOKEN:t0k3n:TOKEN"),
    ]);

    let token = mint_durable_token(&target, &minter, "bootstrap-pw", &http)
        .await
        .expect("minted without crumb");

    assert_eq!(token, "t0k3n");
    assert!(http.sent_requests()[1].headers.is_empty());
}

#[tokio::test]
async fn test_jenkins_auth_rejection_names_the_authenticate_step() {
    let target = target("jenkins");
    let minter = target.minter.clone().expect("jenkins mints a token");
    let http = StubHttp::scripted(vec![http_ok(401, "Unauthorized")]);

    let err = mint_durable_token(&target, &minter, "wrong-pw", &http)
        .await
        .expect_err("bad bootstrap password");

    assert_eq!(err.step, MintStep::Authenticate);
}

#[tokio::test]
async fn test_one_soft_retry_recovers_from_transient_5xx() {
    let target = target("jenkins");
    let minter = target.minter.clone().expect("jenkins mints a token");
    let http = StubHttp::scripted(vec![
        http_ok(502, "bad gateway"),
        http_ok(200, CRUMB_BODY),
        http_ok(200, "TOKEN:abc:TOKEN"),
    ]);

    let token = mint_durable_token(&target, &minter, "bootstrap-pw", &http)
        .await
        .expect("retry recovers");

    assert_eq!(token, "abc");
    assert_eq!(http.sent_requests().len(), 3);
}

#[tokio::test]
async fn test_step_fails_after_its_single_retry() {
    let target = target("jenkins");
    let minter = target.minter.clone().expect("jenkins mints a token");
    let http = StubHttp::scripted(vec![
        Err(transport("connection reset")),
        Err(transport("connection reset")),
    ]);

    let err = mint_durable_token(&target, &minter, "bootstrap-pw", &http)
        .await
        .expect_err("both sends failed");

    assert_eq!(err.step, MintStep::Csrf);
    assert_eq!(http.sent_requests().len(), 2);
}

// ── Grafana service accounts ──────────────────────────────────────────────────

#[tokio::test]
async fn test_grafana_creates_account_then_mints_token() {
    let target = target("grafana");
    let minter = target.minter.clone().expect("grafana mints a token");
    let http = StubHttp::scripted(vec![
        http_ok(201, r#"{"id":7,"name":"credsmith","role":"Admin"}"#),
        http_ok(200, r#"{"id":12,"name":"credsmith-1756000000000","key":"glsa_9f8e7d"}"#),
    ]);

    let token = mint_durable_token(&target, &minter, "admin", &http)
        .await
        .expect("token minted");

    assert_eq!(token, "glsa_9f8e7d");
    let requests = http.sent_requests();
    assert!(requests[0].url.ends_with("/api/serviceaccounts"));
    let HttpBody::Json(body) = &requests[0].body else {
        panic!("creation body must be JSON");
    };
    assert_eq!(body["name"], "credsmith");
    assert_eq!(body["role"], "Admin");

    assert!(requests[1].url.ends_with("/api/serviceaccounts/7/tokens"));
    let HttpBody::Json(body) = &requests[1].body else {
        panic!("token body must be JSON");
    };
    let name = body["name"].as_str().expect("token name");
    assert!(name.starts_with("credsmith-"), "per-run suffix missing: {name}");
}

#[tokio::test]
async fn test_grafana_reuses_surviving_account_on_conflict() {
    let target = target("grafana");
    let minter = target.minter.clone().expect("grafana mints a token");
    let http = StubHttp::scripted(vec![
        http_ok(409, r#"{"message":"service account already exists"}"#),
        http_ok(200, r#"{"totalCount":1,"serviceAccounts":[{"id":3,"name":"credsmith"}]}"#),
        http_ok(200, r#"{"key":"glsa_fresh"}"#),
    ]);

    let token = mint_durable_token(&target, &minter, "admin", &http)
        .await
        .expect("conflict resolved by reuse");

    assert_eq!(token, "glsa_fresh");
    let requests = http.sent_requests();
    assert!(requests[1].url.contains("/api/serviceaccounts/search?query=credsmith"));
    assert!(requests[2].url.ends_with("/api/serviceaccounts/3/tokens"));
}

#[tokio::test]
async fn test_grafana_auth_rejection_names_the_authenticate_step() {
    let target = target("grafana");
    let minter = target.minter.clone().expect("grafana mints a token");
    let http = StubHttp::scripted(vec![http_ok(403, "forbidden")]);

    let err = mint_durable_token(&target, &minter, "wrong-pw", &http)
        .await
        .expect_err("bootstrap login rejected");

    assert_eq!(err.step, MintStep::Authenticate);
}

#[tokio::test]
async fn test_grafana_missing_key_is_a_parse_failure() {
    let target = target("grafana");
    let minter = target.minter.clone().expect("grafana mints a token");
    let http = StubHttp::scripted(vec![
        http_ok(201, r#"{"id":7}"#),
        http_ok(200, r#"{"name":"credsmith-x"}"#),
    ]);

    let err = mint_durable_token(&target, &minter, "admin", &http)
        .await
        .expect_err("token response lacks the key");

    assert_eq!(err.step, MintStep::ParseToken);
}
