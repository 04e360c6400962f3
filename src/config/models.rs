//! Configuration data structures for nofomo-proxy.
//!
//! This module defines the schema for the application settings: the HTTP
//! server, the two upstream APIs (vision completions and image search), the
//! remote image fetcher and logging.
//!
//! Author: nofomo contributors

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings (host, port, body limit).
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream vision-completion API settings.
    #[serde(default)]
    pub vision: VisionConfig,

    /// Upstream image-search API settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Remote image download settings (URL input mode).
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Performance and resource management settings.
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Settings for the built-in HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8888`
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest request body accepted, in bytes. Must stay above the image
    /// ceiling so oversized uploads get a descriptive error instead of a 413.
    /// Default: 50 MiB
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Answer CORS preflights for any origin.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub cors_allow_any_origin: bool,
}

/// Settings for the vision-completion API (OpenAI chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Base URL; `/chat/completions` is appended.
    /// Default: `https://api.openai.com/v1`
    #[serde(default = "default_vision_base_url")]
    pub api_base_url: String,

    /// Bearer key. Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<ApiKey>,

    /// Default: `gpt-4o`
    #[serde(default = "default_vision_model")]
    pub model: String,

    /// Response token ceiling.
    /// Default: `2000`
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Default: `60`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for the image-search API (Google Custom Search JSON API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default: `https://www.googleapis.com/customsearch/v1`
    #[serde(default = "default_search_base_url")]
    pub api_base_url: String,

    /// Falls back to `NOFOMO_GOOGLE_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<ApiKey>,

    /// Programmable search engine identifier (`cx`).
    #[serde(default = "default_engine_id")]
    pub engine_id: String,

    /// Default: `60`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for downloading images given by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Default: `60`
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to mask API keys in logged URLs and upstream bodies.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub sanitize_secrets: bool,
}

/// Settings for tuning application performance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Whether to enable GZIP compression for HTTP responses.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

/// An upstream API secret. Wiped on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

// Default trait implementations linking to custom logic

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            cors_allow_any_origin: true,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_vision_base_url(),
            api_key: None,
            model: default_vision_model(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_search_base_url(),
            api_key: None,
            engine_id: default_engine_id(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            sanitize_secrets: true,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            enable_compression: true,
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_max_body_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_vision_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_search_base_url() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_engine_id() -> String {
    "5193fa5af2abc4287".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
