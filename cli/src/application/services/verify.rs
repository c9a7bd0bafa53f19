//! Application service — credential verification use-case.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use crate::application::ports::{Auth, HttpGateway, HttpRequest};
use crate::domain::{AuthScheme, ServiceTarget, VerificationError};

/// How much of a failing response body is kept for the record's detail field.
const BODY_DETAIL_LIMIT: usize = 512;

/// Prove the final credential with one authenticated request against the
/// service's canonical read endpoint.
///
/// Verification is authoritative: the caller degrades the record to failed
/// on `Err`, never emitting an unverified secret as usable.
///
/// # Errors
///
/// Returns [`VerificationError`] with the raw (truncated) response preserved
/// when the status is not the expected one, or with status 0 when no
/// response was obtained at all.
pub async fn verify_credential(
    target: &ServiceTarget,
    secret: &str,
    http: &impl HttpGateway,
) -> Result<(), VerificationError> {
    let url = target.url(&target.verify.path);
    let auth = match target.verify.auth {
        AuthScheme::Basic => Auth::Basic {
            username: target.username.clone(),
            password: secret.to_string(),
        },
        AuthScheme::Bearer => Auth::Bearer {
            token: secret.to_string(),
        },
    };

    let response = match http.send(HttpRequest::get(&url).with_auth(auth)).await {
        Ok(response) => response,
        Err(err) => {
            return Err(VerificationError {
                url,
                status: 0,
                body: err.to_string(),
            });
        }
    };

    if response.status == target.verify.expect_status {
        tracing::debug!(service = %target.name, %url, "credential verified");
        Ok(())
    } else {
        Err(VerificationError {
            url,
            status: response.status,
            body: truncate_body(&response.body),
        })
    }
}

/// Keep failing responses readable in records without dragging whole HTML
/// error pages along.
fn truncate_body(body: &str) -> String {
    if body.chars().count() <= BODY_DETAIL_LIMIT {
        return body.to_string();
    }
    let kept: String = body.chars().take(BODY_DETAIL_LIMIT).collect();
    format!("{kept}… [truncated]")
}
