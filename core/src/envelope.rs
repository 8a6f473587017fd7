//! Decoding of the `{"response":[{"result": ...}]}` envelope.
//!
//! # Design
//! The BMC wraps every answer twice. Commands answer with a bare string in
//! `result`, informational calls with a one-element list of objects. Each
//! shape gets its own explicit schema; callers pick the one the endpoint is
//! documented to return.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

/// `{"response":[{"result":"<result>"}]}`
#[derive(Debug, Deserialize)]
struct ScalarEnvelope {
    response: Vec<ScalarEntry>,
}

#[derive(Debug, Deserialize)]
struct ScalarEntry {
    result: String,
}

/// `{"response":[{"result":[{<object>}]}]}`
#[derive(Debug, Deserialize)]
struct ObjectEnvelope {
    response: Vec<ObjectEntry>,
}

#[derive(Debug, Deserialize)]
struct ObjectEntry {
    result: Vec<HashMap<String, String>>,
}

/// Decode a scalar envelope into its result string.
///
/// An empty string is how the BMC reports that a command produced nothing,
/// so it is an error rather than a value.
pub fn parse_scalar(body: &[u8]) -> Result<String> {
    let parsed: ScalarEnvelope =
        serde_json::from_slice(body).map_err(|e| Error::parse(format!("invalid json: {e}")))?;

    let result = parsed
        .response
        .into_iter()
        .next()
        .ok_or_else(|| Error::parse("no data in response"))?
        .result;

    if result.is_empty() {
        return Err(Error::parse("result field in API response is empty"));
    }
    Ok(result)
}

/// Decode an object envelope into the first result object.
pub fn parse_object(body: &[u8]) -> Result<HashMap<String, String>> {
    let parsed: ObjectEnvelope =
        serde_json::from_slice(body).map_err(|e| Error::parse(format!("invalid json: {e}")))?;

    parsed
        .response
        .into_iter()
        .next()
        .and_then(|entry| entry.result.into_iter().next())
        .ok_or_else(|| Error::parse("no data in response"))
}
