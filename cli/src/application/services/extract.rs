//! Application service — bootstrap secret extraction use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use credsmith_common::sentinel;

use crate::application::ports::{Auth, HttpGateway, HttpRequest, RemoteChannel};
use crate::domain::{ExtractionError, FileReadSpec, Handshake, ServiceTarget};

/// Obtain the bootstrap secret for a service that has passed readiness.
///
/// Dispatches on the target's handshake variant:
/// - *file-read*: well-known path, then a bounded filesystem search;
/// - *default-login*: the documented default, proven by an authenticated call;
/// - *script-console*: the bootstrap file, falling back to the documented
///   default when the file is gone (already-initialized installations).
///
/// # Errors
///
/// Returns [`ExtractionError`] when no secret could be found or derived.
/// Never fabricates a password and never returns a sentinel as a secret.
pub async fn extract_initial_secret(
    target: &ServiceTarget,
    channel: &impl RemoteChannel,
    http: &impl HttpGateway,
) -> Result<String, ExtractionError> {
    match &target.handshake {
        Handshake::FileRead(spec) => read_secret_file(&target.name, spec, channel).await,
        Handshake::DefaultLogin { password } => {
            check_default_login(target, password, http).await?;
            Ok(password.clone())
        }
        Handshake::ScriptConsole {
            bootstrap,
            fallback_password,
        } => match read_secret_file(&target.name, bootstrap, channel).await {
            Ok(secret) => Ok(secret),
            Err(ExtractionError::NotFound { primary }) => match fallback_password {
                Some(password) => {
                    tracing::debug!(
                        service = %target.name,
                        "bootstrap file gone, using documented default password"
                    );
                    Ok(password.clone())
                }
                None => Err(ExtractionError::NotFound { primary }),
            },
            Err(err) => Err(err),
        },
    }
}

/// Read the generated secret file, falling back to a filesystem search when
/// the well-known path is absent.
async fn read_secret_file(
    service: &str,
    spec: &FileReadSpec,
    channel: &impl RemoteChannel,
) -> Result<String, ExtractionError> {
    let primary = channel.exec(&spec.read_primary_command()).await?;
    if primary.success() {
        if let Some(secret) = clean_secret(&primary.stdout) {
            return Ok(secret);
        }
    }

    tracing::debug!(service, path = %spec.primary_path, "primary secret path empty or missing, searching");
    let search = channel.exec(&spec.search_command()).await?;
    let found = search.stdout.trim();
    if search.success() && !found.is_empty() {
        let read = channel.exec(&spec.read_file_command(found)).await?;
        if read.success() {
            if let Some(secret) = clean_secret(&read.stdout) {
                tracing::debug!(service, path = %found, "secret recovered from fallback path");
                return Ok(secret);
            }
        }
    }

    Err(ExtractionError::NotFound {
        primary: spec.primary_path.clone(),
    })
}

/// Prove the documented default login against the target's verify endpoint.
async fn check_default_login(
    target: &ServiceTarget,
    password: &str,
    http: &impl HttpGateway,
) -> Result<(), ExtractionError> {
    let url = target.url(&target.verify.path);
    let request = HttpRequest::get(&url).with_auth(Auth::Basic {
        username: target.username.clone(),
        password: password.to_string(),
    });
    let response = http.send(request).await?;
    if response.status == target.verify.expect_status {
        Ok(())
    } else {
        Err(ExtractionError::DefaultRejected {
            url,
            status: response.status,
        })
    }
}

/// Trim the raw file content; reject empty results and anything equal to a
/// documented sentinel, which can never be a real secret.
fn clean_secret(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || sentinel::is_sentinel(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}
