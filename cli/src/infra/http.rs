//! Infrastructure implementation of the `HttpGateway` port over reqwest.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{Auth, HttpBody, HttpGateway, HttpMethod, HttpRequest, HttpResponse};
use crate::domain::ChannelError;

/// HTTP client for service endpoints on the provisioned host.
///
/// Redirects are never followed: readiness probes treat an expected 302
/// as the signal itself, so the gateway must surface it untouched.
pub struct ReqwestGateway {
    client: reqwest::Client,
}

impl ReqwestGateway {
    /// # Errors
    ///
    /// Returns an error if the underlying TLS/client setup fails.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpGateway for ReqwestGateway {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ChannelError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        builder = match &request.auth {
            Auth::None => builder,
            Auth::Basic { username, password } => builder.basic_auth(username, Some(password)),
            Auth::Bearer { token } => builder.bearer_auth(token),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = match &request.body {
            HttpBody::Empty => builder,
            HttpBody::Json(value) => builder.json(value),
            HttpBody::Form(fields) => builder.form(fields),
        };

        let response = builder
            .send()
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}
