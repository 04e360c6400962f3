//! Image search proxy backed by the Google Custom Search JSON API.
//!
//! # Submodules
//!
//! - `models`: The query accepted from callers and the normalized result envelope.
//! - `client`: The upstream HTTP call.
//!
//! Author: nofomo contributors

mod client;
pub mod models;

pub use client::SearchClient;
pub use models::{SearchQuery, SearchResultEnvelope};
