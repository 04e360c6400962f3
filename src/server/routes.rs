// HTTP routes configuration
// Author: nofomo contributors

use super::handlers::{
    analyze_handler, health_handler, method_not_allowed, metrics_handler, search_handler,
};
use super::middleware::{request_id_layers, track_metrics};
use crate::config::AppConfig;
use crate::error::Result;
use crate::openai::VisionClient;
use crate::search::SearchClient;
use crate::vision::ImageFetcher;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub vision: Arc<VisionClient>,
    pub search: Arc<SearchClient>,
    pub fetcher: Arc<ImageFetcher>,
}

impl AppState {
    /// Build the upstream clients from the start-up configuration.
    pub fn new(config: AppConfig) -> Result<Self> {
        Ok(Self {
            vision: Arc::new(VisionClient::new(&config.vision)?),
            search: Arc::new(SearchClient::new(&config.search)?),
            fetcher: Arc::new(ImageFetcher::new(&config.fetch)?),
            config: Arc::new(config),
        })
    }
}

pub fn create_router(config: AppConfig) -> Result<Router> {
    let state = AppState::new(config)?;
    let max_body_bytes = state.config.server.max_body_bytes;
    let allow_any_origin = state.config.server.cors_allow_any_origin;
    let enable_compression = state.config.performance.enable_compression;

    let (set_request_id, propagate_request_id) = request_id_layers();

    let analyze = post(analyze_handler).fallback(method_not_allowed);
    // axum answers HEAD with the GET handler unless HEAD has its own
    let search = get(search_handler)
        .head(method_not_allowed)
        .fallback(method_not_allowed);

    let mut app = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/analyze", analyze.clone())
        .route("/api/google-search", search.clone())
        // Paths the frontend used when these were serverless functions
        .route("/.netlify/functions/analyze", analyze)
        .route("/.netlify/functions/google-search", search)
        // Uploads larger than the image ceiling must still reach the handler
        // so it can report their size
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(axum::middleware::from_fn(track_metrics))
        .with_state(state);

    if allow_any_origin {
        app = app.layer(CorsLayer::permissive());
    }
    if enable_compression {
        app = app.layer(CompressionLayer::new());
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id);

    Ok(app)
}
