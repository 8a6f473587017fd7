//! Error types for the BMC API client.
//!
//! # Design
//! Each variant names the phase that failed. `Config` and `Validation` are
//! raised before any network activity; `Authentication` only during
//! construction; `HttpStatus` only afterwards.

use thiserror::Error;

use crate::http::TransportError;

/// Result type used across this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `BmcClient`.
#[derive(Debug, Error)]
pub enum Error {
    /// The auth type string was neither `basic` nor `bearer`.
    #[error("invalid auth type: {0}")]
    Config(String),

    /// A node or power-state argument was out of range.
    #[error("invalid argument: {0}")]
    Validation(&'static str),

    /// The handshake was rejected or returned no token.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The request could not be sent or its body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The BMC answered a call with something other than 200.
    #[error("http error in response: {status_line}")]
    HttpStatus { status: u16, status_line: String },

    /// The body was not valid JSON or did not have the envelope shape.
    #[error("error parsing response: {0}")]
    Parse(String),
}

impl Error {
    pub(crate) fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
