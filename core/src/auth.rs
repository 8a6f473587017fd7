//! Authentication modes and header injection.
//!
//! # Design
//! The BMC accepts either HTTP basic credentials on every call, or a bearer
//! token obtained once from `/api/bmc/authenticate`. The mode is chosen when
//! the client is constructed and never changes, so it is modelled as an enum
//! carrying the mode's credentials. `Credentials::apply` is the only place
//! that knows how each mode decorates a request.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};

pub(crate) const AUTHENTICATE_PATH: &str = "/api/bmc/authenticate";
pub(crate) const BASIC_PROBE_PATH: &str = "/api/bmc?opt=get&type=info";

/// Which authentication scheme a client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Basic,
    Bearer,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Basic => "basic",
            AuthType::Bearer => "bearer",
        }
    }
}

impl FromStr for AuthType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(AuthType::Basic),
            "bearer" => Ok(AuthType::Bearer),
            other => Err(Error::Config(other.to_string())),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session token issued by `/api/bmc/authenticate`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionToken {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("id", &"<redacted>")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Resolved credentials of a connected client.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer(SessionToken),
}

impl Credentials {
    pub fn auth_type(&self) -> AuthType {
        match self {
            Credentials::Basic { .. } => AuthType::Basic,
            Credentials::Bearer(_) => AuthType::Bearer,
        }
    }

    /// Add this mode's authentication headers to `request`.
    pub fn apply(&self, request: &mut HttpRequest) {
        match self {
            Credentials::Basic { username, password } => {
                request.set_header("Authorization", basic_header(username, password));
            }
            Credentials::Bearer(token) => {
                request.set_header("Content-Type", "application/json");
                request.set_header("Authorization", format!("Bearer {}", token.id));
            }
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
        }
    }
}

pub(crate) fn basic_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// The bearer handshake: a GET that carries the credentials as a JSON body.
pub(crate) fn build_bearer_login(
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<HttpRequest> {
    let body = serde_json::to_string(&LoginBody { username, password })
        .map_err(|e| Error::parse(format!("could not encode credentials: {e}")))?;
    let mut request = HttpRequest::get(format!("{base_url}{AUTHENTICATE_PATH}"));
    request.set_header("Content-Type", "application/json");
    request.body = Some(body);
    Ok(request)
}

pub(crate) fn parse_bearer_login(response: HttpResponse) -> Result<Credentials> {
    if !response.is_ok() {
        return Err(Error::Authentication(response.status_line()));
    }
    let token: SessionToken = serde_json::from_slice(&response.body)
        .map_err(|e| Error::parse(format!("error parsing json in authenticate response: {e}")))?;
    if token.id.is_empty() {
        return Err(Error::Authentication("response missing token".to_string()));
    }
    Ok(Credentials::Bearer(token))
}

/// The basic-auth probe: an info request whose only purpose is to let the
/// BMC reject bad credentials before the client is handed out.
pub(crate) fn build_basic_probe(base_url: &str, username: &str, password: &str) -> HttpRequest {
    let mut request = HttpRequest::get(format!("{base_url}{BASIC_PROBE_PATH}"));
    request.set_header("Authorization", basic_header(username, password));
    request
}

pub(crate) fn parse_basic_probe(
    response: HttpResponse,
    username: &str,
    password: &str,
) -> Result<Credentials> {
    if !response.is_ok() {
        return Err(Error::Authentication(response.status_line()));
    }
    Ok(Credentials::Basic {
        username: username.to_string(),
        password: password.to_string(),
    })
}
