// Configuration module
// Author: nofomo contributors

mod models;

pub use models::*;

use crate::error::{ProxyError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};

/// Conventional variable holding the vision API key.
pub const VISION_KEY_ENV: &str = "OPENAI_API_KEY";

/// Conventional variable holding the image-search API key.
pub const SEARCH_KEY_ENV: &str = "NOFOMO_GOOGLE_API_KEY";

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (`NOFOMO_SECTION__FIELD`)
    /// 2. Config file (`path`, or `~/.nofomo/config.toml`)
    /// 3. Defaults (lowest)
    ///
    /// Keys still missing afterwards are taken from `OPENAI_API_KEY` and
    /// `NOFOMO_GOOGLE_API_KEY`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&Self::default())?)
            // An explicitly given file must exist; the default one is optional
            .add_source(File::from(file_path).required(path.is_some()))
            .add_source(
                Environment::with_prefix("NOFOMO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        let mut config: Self = config
            .try_deserialize()
            .map_err(|e| ProxyError::Config(e.to_string()))?;

        config.apply_key_fallbacks(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Fill empty API keys from the conventional variables via `lookup`.
    pub fn apply_key_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fill_key(&mut self.vision.api_key, lookup(VISION_KEY_ENV));
        fill_key(&mut self.search.api_key, lookup(SEARCH_KEY_ENV));
    }

    fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".nofomo")
            .join("config.toml")
    }
}

fn fill_key(slot: &mut Option<ApiKey>, fallback: Option<String>) {
    if slot.as_ref().map_or(true, ApiKey::is_empty) {
        *slot = fallback.map(ApiKey::new).filter(|key| !key.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.vision.model, "gpt-4o");
        assert_eq!(config.vision.max_tokens, 2000);
        assert_eq!(config.search.engine_id, "5193fa5af2abc4287");
        assert!(config.server.max_body_bytes > crate::vision::MAX_IMAGE_SIZE_BYTES);
        assert!(config.vision.api_key.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9999\n\n[vision]\nmodel = \"gpt-4o-mini\"\napi_key = \"sk-file\"\n"
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.vision.model, "gpt-4o-mini");
        assert_eq!(config.vision.api_key.unwrap().expose(), "sk-file");
        // Untouched sections keep their defaults
        assert_eq!(config.search.engine_id, "5193fa5af2abc4287");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/nofomo.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_key_fallbacks() {
        let mut config = AppConfig::default();
        config.search.api_key = Some(ApiKey::new("configured"));

        config.apply_key_fallbacks(|name| match name {
            VISION_KEY_ENV => Some("sk-from-env".to_string()),
            SEARCH_KEY_ENV => Some("AIza-from-env".to_string()),
            _ => None,
        });

        assert_eq!(config.vision.api_key.unwrap().expose(), "sk-from-env");
        // Configured keys win over the conventional variables
        assert_eq!(config.search.api_key.unwrap().expose(), "configured");
    }

    #[test]
    fn test_blank_fallback_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_key_fallbacks(|_| Some("   ".to_string()));
        assert!(config.vision.api_key.is_none());
        assert!(config.search.api_key.is_none());
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret");
        assert!(!format!("{:?}", key).contains("sk-secret"));
    }
}
