//! Utility functions and helpers for nofomo-proxy.
//!
//! This module provides cross-cutting concerns like structured logging,
//! secret redaction and upstream error capture.
//!
//! # Submodules
//!
//! - `logging`: Tracing and logging initialization with security filters.
//! - `upstream`: Best-effort parsing of upstream error bodies.
//!
//! Author: nofomo contributors

pub mod logging;
pub mod upstream;
