//! [`Transport`] implementation backed by a `ureq` agent.
//!
//! The agent stays caller-configured: timeouts, proxies and the TLS policy
//! are whatever the caller built it with. Each request turns off
//! `http_status_as_error` so 4xx/5xx responses come back as data whatever
//! the agent's own setting is.

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

/// A plain agent with status-as-error disabled.
pub fn agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// An agent that skips TLS certificate verification.
///
/// The BMC serves HTTPS with a self-signed certificate, so this is what most
/// callers talking to a stock board end up needing.
pub fn insecure_agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .tls_config(TlsConfig::builder().disable_verification(true).build())
        .build()
        .new_agent()
}

impl Transport for Agent {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self
                    .get(request.url.as_str())
                    .config()
                    .http_status_as_error(false)
                    .build();
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    // The bearer handshake sends its credentials in the body of a GET.
                    Some(body) => builder.force_send_body().send(body.as_bytes()),
                    None => builder.call(),
                }
            }
        };

        let mut response = result
            .map_err(|e| TransportError::with_source(format!("error making request: {e}"), e))?;

        let status = response.status();
        let body = response.body_mut().read_to_vec().map_err(|e| {
            TransportError::with_source(format!("error reading response body: {e}"), e)
        })?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
