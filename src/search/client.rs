// Google Custom Search client
// Author: nofomo contributors

use super::models::{SearchQuery, SearchResultEnvelope};
use crate::config::{SearchConfig, SEARCH_KEY_ENV};
use crate::error::{ProxyError, Result};
use crate::utils::logging::sanitize;
use crate::utils::upstream::error_details;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Client for the Custom Search JSON API, restricted to image results.
pub struct SearchClient {
    http_client: Client,
    config: SearchConfig,
}

impl SearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .use_rustls_tls()
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    /// Whether an API key was provided at start-up.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_ref().is_some_and(|key| !key.is_empty())
    }

    /// Fail with the configuration-missing error when no key is set.
    pub fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ProxyError::ConfigMissing {
                name: SEARCH_KEY_ENV,
                hint: format!(
                    "Make sure {} is set in the environment (or search.api_key in the config file)",
                    SEARCH_KEY_ENV
                ),
            })
        }
    }

    /// Query parameters of the upstream call, API key first.
    pub fn query_params(&self, query: &SearchQuery) -> Result<Vec<(&'static str, String)>> {
        self.ensure_configured()?;
        let key = self
            .config
            .api_key
            .as_ref()
            .map(|key| key.expose().to_string())
            .unwrap_or_default();

        let mut params = vec![
            ("key", key),
            ("cx", self.config.engine_id.clone()),
            ("q", query.text.clone()),
            ("searchType", "image".to_string()),
            ("imgSize", "medium".to_string()),
            ("safe", "active".to_string()),
        ];
        if let Some(start) = query.start_offset {
            params.push(("start", start.to_string()));
        }
        Ok(params)
    }

    /// Run one image search and normalize its pagination metadata.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResultEnvelope> {
        let params = self.query_params(query)?;

        info!(
            "Calling Google Custom Search: q={:?} cx={} start={}",
            query.text,
            self.config.engine_id,
            query.start_offset.unwrap_or(1)
        );

        let start = Instant::now();
        let response = self
            .http_client
            .get(&self.config.api_base_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        crate::metrics::record_upstream_call(
            "google_search",
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "Google Custom Search API error: HTTP {} - Response body: {}",
                status,
                sanitize(&error_text)
            );

            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                error: format!(
                    "Google Custom Search API error: {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string(),
                details: error_details(&error_text),
                hint: None,
            });
        }

        let data: Value = response.json().await?;
        let envelope = SearchResultEnvelope::from_upstream(data);

        debug!(
            "Search returned {} items: {:?}",
            envelope.results.len(),
            envelope.search_information
        );

        Ok(envelope)
    }
}
