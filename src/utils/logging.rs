//! Structured logging and secret-redaction utilities.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats and providing a filter that keeps API
//! keys out of log sinks.
//!
//! Author: nofomo contributors

use crate::config::LoggingConfig;
use crate::error::{ProxyError, Result};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Whether [`sanitize`] redacts; set once by [`init`].
static SANITIZE_ENABLED: OnceCell<bool> = OnceCell::new();

/// OpenAI secret keys (`sk-...`, `sk-proj-...`).
static OPENAI_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sk-[A-Za-z0-9_\-]{8,}").expect("valid regex"));

/// Google API keys (`AIza` + 35 characters).
static GOOGLE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"AIza[0-9A-Za-z_\-]{20,}").expect("valid regex"));

/// `key=` query parameters, whatever their value looks like.
static KEY_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?&]key=)[^&\s]+").expect("valid regex"));

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    // Configure filter from environment or config file
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ProxyError::Config(format!("Invalid log level {:?}: {}", config.level, e)))?;

    let _ = SANITIZE_ENABLED.set(config.sanitize_secrets);

    let registry = tracing_subscriber::registry().with(env_filter);
    let initialized = match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    initialized.map_err(|e| ProxyError::Internal(format!("Failed to install logger: {}", e)))
}

/// Removes API keys from text that is about to be logged.
///
/// Upstream error bodies and request URLs can echo the key they were sent
/// with; OpenAI keys, Google keys and `key=` query values are replaced with
/// `[REDACTED]` placeholders. Redaction is on unless logging was initialized
/// with `sanitize_secrets = false`.
pub fn sanitize(input: &str) -> String {
    if !SANITIZE_ENABLED.get().copied().unwrap_or(true) {
        return input.to_string();
    }

    let result = KEY_PARAM.replace_all(input, "${1}[REDACTED]");
    let result = OPENAI_KEY.replace_all(&result, "[REDACTED_OPENAI_KEY]");
    let result = GOOGLE_KEY.replace_all(&result, "[REDACTED_GOOGLE_KEY]");
    result.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_openai_key() {
        let input = r#"{"error":{"message":"Incorrect API key provided: sk-proj-abc123def456"}}"#;
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_OPENAI_KEY]"));
        assert!(!output.contains("abc123def456"));
    }

    #[test]
    fn test_sanitize_google_key() {
        let input = "API key AIzaSyA1234567890abcdefghijklmnopqrs not valid";
        let output = sanitize(input);
        assert!(output.contains("[REDACTED_GOOGLE_KEY]"));
        assert!(!output.contains("AIzaSyA1234567890"));
    }

    #[test]
    fn test_sanitize_key_param() {
        let input = "GET https://www.googleapis.com/customsearch/v1?key=secret&cx=123&q=poster";
        let output = sanitize(input);
        assert_eq!(
            output,
            "GET https://www.googleapis.com/customsearch/v1?key=[REDACTED]&cx=123&q=poster"
        );
    }

    #[test]
    fn test_sanitize_leaves_plain_text() {
        assert_eq!(sanitize("bauhaus poster"), "bauhaus poster");
    }
}
