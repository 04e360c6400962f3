// nofomo-proxy - image analysis and image search proxy
// Author: nofomo contributors

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod openai;
pub mod search;
pub mod server;
pub mod utils;
pub mod vision;
