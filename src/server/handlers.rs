// HTTP request handlers
// Author: nofomo contributors

use super::routes::AppState;
use crate::error::{ProxyError, Result};
use crate::openai::AnalysisResult;
use crate::search::models::SearchParams;
use crate::search::{SearchQuery, SearchResultEnvelope};
use crate::vision::ImageInput;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: HashMap<String, HealthCheck>,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: String,
    pub message: String,
}

impl HealthCheck {
    fn for_key(configured: bool, name: &str) -> Self {
        if configured {
            Self {
                status: "ok".to_string(),
                message: format!("{} configured", name),
            }
        } else {
            Self {
                status: "error".to_string(),
                message: format!("{} not configured", name),
            }
        }
    }
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let vision_ok = state.vision.is_configured();
    let search_ok = state.search.is_configured();

    let mut checks = HashMap::new();
    checks.insert(
        "vision_api_key".to_string(),
        HealthCheck::for_key(vision_ok, crate::config::VISION_KEY_ENV),
    );
    checks.insert(
        "search_api_key".to_string(),
        HealthCheck::for_key(search_ok, crate::config::SEARCH_KEY_ENV),
    );
    checks.insert(
        "vision_model".to_string(),
        HealthCheck {
            status: "ok".to_string(),
            message: state.vision.model().to_string(),
        },
    );

    let status = if vision_ok && search_ok {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Prometheus scrape endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

/// Answer for any method the route does not serve
pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

/// Handler for the image analysis endpoint.
///
/// Accepts `application/json` (`{"imageUrl": ...}`) or `multipart/form-data`
/// (`image` part) and returns `{result, model}` from the vision model.
pub async fn analyze_handler(
    State(state): State<AppState>,
    req: Request,
) -> Result<Json<AnalysisResult>> {
    // Configuration problems take precedence over input problems
    state.vision.api_key()?;

    let input = ImageInput::from_request(req).await?;
    match &input {
        ImageInput::Upload { bytes, .. } => info!("Received image upload ({} bytes)", bytes.len()),
        ImageInput::RemoteUrl { url } => info!("Received image URL: {}", url),
    }

    let image = input.resolve(&state.fetcher).await?;
    crate::metrics::record_image_size(&image.mime_type, image.binary_len());
    debug!("Resolved image as {}", image.mime_type);

    let result = state.vision.analyze(&image).await?;
    info!("Analysis completed by {}", result.model);

    Ok(Json(result))
}

/// Handler for the image search endpoint (`?q=...&start=...`).
pub async fn search_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResultEnvelope>> {
    state.search.ensure_configured()?;

    let Query(params) = params.map_err(|rejection| {
        ProxyError::InvalidRequest(format!("Invalid query string: {}", rejection.body_text()))
    })?;
    let query = SearchQuery::from_params(params)?;

    let envelope = state.search.search(&query).await?;
    info!(
        "Search for {:?} returned {} results",
        query.text,
        envelope.results.len()
    );

    Ok(Json(envelope))
}
