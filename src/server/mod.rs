//! Axum-based HTTP server for nofomo-proxy.
//!
//! This module sets up the HTTP server, configures routes and handles
//! requests from the inspiration-board frontend, bridging them to the
//! vision-completion and image-search APIs.
//!
//! # Components
//!
//! - `handlers`: Implementation of individual endpoints (analyze, search, health, metrics).
//! - `middleware`: Request ID tracking and request metrics.
//! - `routes`: The main router configuration that ties everything together.
//!
//! Author: nofomo contributors

mod handlers;
mod middleware;
mod routes;

pub use handlers::{HealthResponse, HealthStatus};
pub use routes::{create_router, AppState};
