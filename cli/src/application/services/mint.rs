//! Application service — durable token minting use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! Generalized sequence: authenticate, fetch a CSRF token if the API wants
//! one, create a service account/identity, parse it, mint a token against
//! it, parse the plaintext token. Each HTTP call gets exactly one soft
//! retry (transport failure or 5xx); after that the failing step is named
//! in the returned [`MintError`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::application::ports::{Auth, HttpGateway, HttpRequest, HttpResponse};
use crate::domain::{MintError, MintStep, ServiceTarget, TokenMinter};

/// Jenkins script-console output wraps the fresh token in these markers so
/// nothing else the console prints can be mistaken for it.
static TOKEN_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern, cannot fail to compile.
    #[allow(clippy::expect_used)]
    Regex::new(r"TOKEN:([A-Za-z0-9_\-]+):TOKEN").expect("valid regex")
});

/// Mint a durable API token using the bootstrap secret.
///
/// # Errors
///
/// Returns [`MintError`] naming the failing step after its one soft retry
/// is spent. Never panics; duplicate identity names are tolerated by
/// rotating (Jenkins) or reusing the account with a fresh token name
/// (Grafana).
pub async fn mint_durable_token(
    target: &ServiceTarget,
    minter: &TokenMinter,
    bootstrap_secret: &str,
    http: &impl HttpGateway,
) -> Result<String, MintError> {
    match minter {
        TokenMinter::JenkinsScriptConsole { token_name } => {
            mint_jenkins(target, token_name, bootstrap_secret, http).await
        }
        TokenMinter::GrafanaServiceAccount { account_name } => {
            mint_grafana(target, account_name, bootstrap_secret, http).await
        }
    }
}

// ── Jenkins binding ───────────────────────────────────────────────────────────

/// Crumb + script console. The crumb request doubles as the authenticate
/// step: a 401/403 there means the bootstrap password is wrong; a 404 means
/// CSRF protection is off and the script POST goes out crumbless.
async fn mint_jenkins(
    target: &ServiceTarget,
    token_name: &str,
    bootstrap_secret: &str,
    http: &impl HttpGateway,
) -> Result<String, MintError> {
    let auth = Auth::Basic {
        username: target.username.clone(),
        password: bootstrap_secret.to_string(),
    };

    let crumb_request =
        HttpRequest::get(target.url("/crumbIssuer/api/json")).with_auth(auth.clone());
    let crumb_response = send_with_retry(http, crumb_request, MintStep::Csrf).await?;
    let crumb = match crumb_response.status {
        200 => Some(parse_crumb(&crumb_response)?),
        404 => {
            tracing::debug!(service = %target.name, "CSRF protection disabled, proceeding crumbless");
            None
        }
        401 | 403 => {
            return Err(MintError::new(
                MintStep::Authenticate,
                format!("bootstrap login rejected (status {})", crumb_response.status),
            ));
        }
        status => {
            return Err(MintError::new(
                MintStep::Csrf,
                format!("crumb issuer returned status {status}"),
            ));
        }
    };

    let script = rotate_token_script(&target.username, token_name);
    let mut script_request = HttpRequest::post(target.url("/scriptText"))
        .with_auth(auth)
        .with_form(vec![("script".to_string(), script)]);
    if let Some((field, value)) = crumb {
        script_request = script_request.with_header(field, value);
    }

    let script_response = send_with_retry(http, script_request, MintStep::MintToken).await?;
    if script_response.status != 200 {
        return Err(MintError::new(
            MintStep::MintToken,
            format!("script console returned status {}", script_response.status),
        ));
    }
    parse_token_markers(&script_response.body)
}

fn parse_crumb(response: &HttpResponse) -> Result<(String, String), MintError> {
    let body = response
        .json()
        .map_err(|err| MintError::new(MintStep::Csrf, err.to_string()))?;
    let field = body["crumbRequestField"].as_str();
    let value = body["crumb"].as_str();
    match (field, value) {
        (Some(field), Some(value)) => Ok((field.to_string(), value.to_string())),
        _ => Err(MintError::new(
            MintStep::Csrf,
            "crumb response missing crumb/crumbRequestField",
        )),
    }
}

/// Groovy run through `/scriptText`: revoke any token already carrying the
/// requested name, generate a fresh one, and print it between markers.
/// Rotation makes re-runs idempotent instead of failing on the duplicate.
fn rotate_token_script(username: &str, token_name: &str) -> String {
    format!(
        r#"import jenkins.security.ApiTokenProperty
def user = hudson.model.User.getById("{username}", false)
def store = user.getProperty(ApiTokenProperty.class).getTokenStore()
store.getTokenListSortedByName().findAll {{ it.name == "{token_name}" }}.each {{
    store.revokeToken(it.getUuid())
}}
def result = store.generateNewToken("{token_name}")
user.save()
println("TOKEN:" + result.plainValue + ":TOKEN")"#
    )
}

fn parse_token_markers(body: &str) -> Result<String, MintError> {
    TOKEN_MARKER_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str().to_string())
        .ok_or_else(|| {
            MintError::new(
                MintStep::ParseToken,
                "no TOKEN:...:TOKEN marker in script output",
            )
        })
}

// ── Grafana binding ───────────────────────────────────────────────────────────

/// Service account + token. A 409 on creation means the account survived a
/// previous run; it is looked up and reused, and the per-run token name
/// suffix keeps every mint yielding a fresh token.
async fn mint_grafana(
    target: &ServiceTarget,
    account_name: &str,
    bootstrap_secret: &str,
    http: &impl HttpGateway,
) -> Result<String, MintError> {
    let auth = Auth::Basic {
        username: target.username.clone(),
        password: bootstrap_secret.to_string(),
    };

    let create_request = HttpRequest::post(target.url("/api/serviceaccounts"))
        .with_auth(auth.clone())
        .with_json(json!({ "name": account_name, "role": "Admin" }));
    let create_response =
        send_with_retry(http, create_request, MintStep::CreateIdentity).await?;

    let account_id = match create_response.status {
        200 | 201 => parse_account_id(&create_response)?,
        401 | 403 => {
            return Err(MintError::new(
                MintStep::Authenticate,
                format!("bootstrap login rejected (status {})", create_response.status),
            ));
        }
        409 => {
            tracing::debug!(service = %target.name, account = account_name, "service account exists, reusing");
            find_account_id(target, account_name, &auth, http).await?
        }
        status => {
            return Err(MintError::new(
                MintStep::CreateIdentity,
                format!("service account creation returned status {status}"),
            ));
        }
    };

    let token_name = format!("{account_name}-{}", chrono::Utc::now().timestamp_millis());
    let mint_request = HttpRequest::post(target.url(&format!(
        "/api/serviceaccounts/{account_id}/tokens"
    )))
    .with_auth(auth)
    .with_json(json!({ "name": token_name }));
    let mint_response = send_with_retry(http, mint_request, MintStep::MintToken).await?;
    if mint_response.status != 200 {
        return Err(MintError::new(
            MintStep::MintToken,
            format!("token creation returned status {}", mint_response.status),
        ));
    }

    let body = mint_response
        .json()
        .map_err(|err| MintError::new(MintStep::ParseToken, err.to_string()))?;
    body["key"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| MintError::new(MintStep::ParseToken, "token response missing 'key'"))
}

fn parse_account_id(response: &HttpResponse) -> Result<i64, MintError> {
    let body = response
        .json()
        .map_err(|err| MintError::new(MintStep::ParseIdentity, err.to_string()))?;
    body["id"]
        .as_i64()
        .ok_or_else(|| MintError::new(MintStep::ParseIdentity, "creation response missing 'id'"))
}

async fn find_account_id(
    target: &ServiceTarget,
    account_name: &str,
    auth: &Auth,
    http: &impl HttpGateway,
) -> Result<i64, MintError> {
    let search_request = HttpRequest::get(target.url(&format!(
        "/api/serviceaccounts/search?query={account_name}"
    )))
    .with_auth(auth.clone());
    let response = send_with_retry(http, search_request, MintStep::CreateIdentity).await?;
    if response.status != 200 {
        return Err(MintError::new(
            MintStep::CreateIdentity,
            format!("service account search returned status {}", response.status),
        ));
    }
    let body = response
        .json()
        .map_err(|err| MintError::new(MintStep::ParseIdentity, err.to_string()))?;
    body["serviceAccounts"]
        .as_array()
        .and_then(|accounts| {
            accounts
                .iter()
                .find(|account| account["name"].as_str() == Some(account_name))
                .or_else(|| accounts.first())
        })
        .and_then(|account| account["id"].as_i64())
        .ok_or_else(|| {
            MintError::new(
                MintStep::ParseIdentity,
                format!("no service account named '{account_name}' in search response"),
            )
        })
}

// ── Soft retry ────────────────────────────────────────────────────────────────

/// One retry on transport failure or a 5xx, then the step fails. Statuses
/// below 500 are returned for the caller to interpret.
async fn send_with_retry(
    http: &impl HttpGateway,
    request: HttpRequest,
    step: MintStep,
) -> Result<HttpResponse, MintError> {
    match http.send(request.clone()).await {
        Ok(response) if response.status < 500 => return Ok(response),
        Ok(response) => {
            tracing::debug!(step = %step, status = response.status, "retrying after server error");
        }
        Err(err) => {
            tracing::debug!(step = %step, error = %err, "retrying after transport failure");
        }
    }
    http.send(request)
        .await
        .map_err(|err| MintError::new(step, err.to_string()))
}
