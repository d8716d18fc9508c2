//! JSON decoding of server answers

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Decode a 200 answer into its record
pub fn decode<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(|e| {
        tracing::debug!(error = %e, "Undecodable response body");
        Error::Unknown(format!("invalid response: {e}"))
    })
}

/// Extract the top-level `error` text of an error answer
///
/// Dropbox sends either a plain string or an object mapping fields to
/// messages; the latter is rendered as `field: message` pairs.
pub fn decode_error(raw: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(raw).ok()?;
    match value.get("error")? {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Object(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(field, message)| match message.as_str() {
                    Some(text) => format!("{field}: {text}"),
                    None => format!("{field}: {message}"),
                })
                .collect();
            Some(parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}
