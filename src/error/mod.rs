// Error types for nofomo-proxy
// Author: nofomo contributors

use crate::utils::logging::sanitize;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    /// A required secret was not provided at start-up.
    #[error("{name} not configured")]
    ConfigMissing { name: &'static str, hint: String },

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Image size {actual} bytes exceeds maximum of {max} bytes (20MB)")]
    PayloadTooLarge { actual: usize, max: usize },

    #[error("Failed to fetch image: HTTP {status}")]
    ImageFetch { status: u16, url: String },

    /// Non-success answer from the vision or search API, relayed with its status.
    #[error("{error}")]
    Upstream {
        status: u16,
        error: String,
        details: Value,
        hint: Option<String>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::InvalidRequest(_) | ProxyError::PayloadTooLarge { .. } => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Messages of every error in the `source()` chain, outermost first.
    fn trace(&self) -> Vec<String> {
        let mut trace = vec![format!("{:?}", self)];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            trace.push(err.to_string());
            source = err.source();
        }
        trace
    }

    /// JSON body for this error, `None` for bodyless responses.
    pub fn body(&self) -> Option<Value> {
        let body = match self {
            ProxyError::MethodNotAllowed => return None,
            ProxyError::ConfigMissing { hint, .. } => json!({
                "error": self.to_string(),
                "hint": hint,
            }),
            ProxyError::InvalidRequest(_) => json!({ "error": self.to_string() }),
            ProxyError::PayloadTooLarge { actual, max } => json!({
                "error": "Image too large",
                "details": {
                    "message": self.to_string(),
                    "actual": actual,
                    "max": max,
                },
            }),
            ProxyError::ImageFetch { status, url } => json!({
                "error": self.to_string(),
                "details": { "status": status, "url": url },
            }),
            ProxyError::Upstream {
                error,
                details,
                hint,
                ..
            } => {
                let mut body = json!({ "error": error, "details": details });
                if let Some(hint) = hint {
                    body["hint"] = json!(hint);
                }
                body
            }
            _ => json!({
                "error": sanitize(&self.to_string()),
                "details": {
                    "trace": self.trace().iter().map(|line| sanitize(line)).collect::<Vec<_>>(),
                },
            }),
        };
        Some(body)
    }
}

// Request URLs carry the search API key as a query parameter
impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Http(err.without_url())
    }
}

// Convert ProxyError to HTTP responses for Axum
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = sanitize(&self.to_string());
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Request failed: {}", message);
        } else {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", message);
        }

        match self.body() {
            Some(body) => (status, axum::Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
