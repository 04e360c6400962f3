//! Helpers shared by the upstream API clients.
//!
//! Author: nofomo contributors

use serde_json::{json, Value};

/// Best-effort capture of an upstream error body.
///
/// JSON bodies are returned as parsed; anything else is wrapped as
/// `{"raw": <text>}` so callers always get a JSON value back.
pub fn error_details(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| json!({ "raw": body }))
}

/// `error.message` of an OpenAI/Google style error body, when present.
pub fn error_message(details: &Value) -> Option<&str> {
    details
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
}
