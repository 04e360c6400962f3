//! Image intake for the analysis endpoint.
//!
//! This module turns an incoming analysis request into a single
//! [`EncodedImage`]: it decides between the JSON (`imageUrl`) and multipart
//! (`image` part) input modes, downloads remote images, normalizes MIME types
//! against the vision model's allow-list and enforces the 20 MiB ceiling.
//!
//! # Submodules
//!
//! - `models`: Input variants, the encoded form and validation constraints.
//! - `input`: Request inspection and resolution into an encoded image.
//! - `fetch`: HTTP download of images given by URL.
//!
//! Author: nofomo contributors

pub mod fetch;
pub mod input;
pub mod models;

pub use fetch::ImageFetcher;
pub use models::{
    normalize_mime_type, EncodedImage, ImageFormat, ImageInput, MAX_IMAGE_SIZE_BYTES,
};
