// OpenAI chat completions client for image analysis
// Author: nofomo contributors

use super::prompt::{AnalysisReport, ANALYSIS_INSTRUCTION};
use super::{
    AnalysisResult, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart,
    ImageUrl, ResponseFormat,
};
use crate::config::{ApiKey, VisionConfig, VISION_KEY_ENV};
use crate::error::{ProxyError, Result};
use crate::utils::logging::sanitize;
use crate::utils::upstream::{error_details, error_message};
use crate::vision::EncodedImage;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Answer used when the model returns no message content.
const EMPTY_ANSWER: &str = "No response received";

/// Client for the vision-capable chat completions endpoint.
///
/// Sends exactly one request per analysis, with no retries: a failure is
/// reported to the caller together with the upstream status.
pub struct VisionClient {
    http_client: Client,
    config: VisionConfig,
    endpoint: String,
}

impl VisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/chat/completions",
            config.api_base_url.trim_end_matches('/')
        );

        debug!("Vision endpoint: {}", endpoint);

        Ok(Self {
            http_client,
            config: config.clone(),
            endpoint,
        })
    }

    /// Whether an API key was provided at start-up.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_ref().is_some_and(|key| !key.is_empty())
    }

    /// The configured key, or the configuration-missing error.
    pub fn api_key(&self) -> Result<&ApiKey> {
        self.config
            .api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProxyError::ConfigMissing {
                name: VISION_KEY_ENV,
                hint: format!(
                    "Set {} (or vision.api_key in the config file) before starting the server",
                    VISION_KEY_ENV
                ),
            })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the single-message request: instruction first, then the image.
    pub fn build_request(&self, image: &EncodedImage) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat::json_object(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: ANALYSIS_INSTRUCTION.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_uri(),
                        },
                    },
                ],
            }],
        }
    }

    /// Ask the model to analyze `image` and return its answer verbatim.
    pub async fn analyze(&self, image: &EncodedImage) -> Result<AnalysisResult> {
        let api_key = self.api_key()?;
        let request = self.build_request(image);

        info!(
            "Calling vision model {} ({}, {} base64 chars)",
            self.config.model,
            image.mime_type,
            image.data.len()
        );

        let start = Instant::now();
        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(api_key.expose())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        crate::metrics::record_upstream_call(
            "openai",
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "OpenAI API error: HTTP {} - Response body: {}",
                status,
                sanitize(&error_text)
            );

            let details = error_details(&error_text);
            let hint = error_hint(status.as_u16(), &details);
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                error: format!("OpenAI API error: {}", status.as_u16()),
                details,
                hint,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let result = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| EMPTY_ANSWER.to_string());

        if AnalysisReport::parse(&result).is_none() {
            warn!("Model answer does not match the analysis schema; passing it through");
        }

        Ok(AnalysisResult {
            result,
            model: completion
                .model
                .unwrap_or_else(|| self.config.model.clone()),
        })
    }
}

/// Human-readable guidance for a failed vision call.
pub fn error_hint(status: u16, details: &Value) -> Option<String> {
    match status {
        401 => Some(format!(
            "Verify that {} is valid and has not been revoked",
            VISION_KEY_ENV
        )),
        400 => {
            let mut hint =
                "Verify that the image is valid and in a supported format (jpeg, png, gif, webp)"
                    .to_string();
            if let Some(message) = error_message(details) {
                hint.push_str(": ");
                hint.push_str(message);
            }
            Some(hint)
        }
        403 => Some("The API key does not have access to the requested model".to_string()),
        429 => Some("Rate limit or quota exceeded; check the account's usage and billing".to_string()),
        _ => None,
    }
}
