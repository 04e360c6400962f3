// Remote image download for URL input mode
// Author: nofomo contributors

use super::models::MAX_IMAGE_SIZE_BYTES;
use crate::config::FetchConfig;
use crate::error::{ProxyError, Result};
use bytes::{Bytes, BytesMut};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A downloaded image body together with the host's declared content type.
#[derive(Debug)]
pub struct FetchedImage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Downloads images referenced by `imageUrl`.
pub struct ImageFetcher {
    http_client: Client,
}

impl ImageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .use_rustls_tls()
            .build()
            .map_err(|e| ProxyError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// GET `url` and read the whole body, enforcing the image size ceiling.
    pub async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        debug!("Fetching image from {}", url);

        let start = Instant::now();
        let mut response = self.http_client.get(url).send().await?;

        let status = response.status();
        crate::metrics::record_upstream_call(
            "image_host",
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );

        if !status.is_success() {
            warn!("Image host answered HTTP {} for {}", status, url);
            return Err(ProxyError::ImageFetch {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Reject early when the host announces an oversized body
        if let Some(length) = response.content_length() {
            let length = usize::try_from(length).unwrap_or(usize::MAX);
            if length > MAX_IMAGE_SIZE_BYTES {
                return Err(ProxyError::PayloadTooLarge {
                    actual: length,
                    max: MAX_IMAGE_SIZE_BYTES,
                });
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        // Chunked bodies carry no length, so count while reading
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            let received = body.len() + chunk.len();
            if received > MAX_IMAGE_SIZE_BYTES {
                warn!("Image from {} exceeds the size ceiling, aborting download", url);
                return Err(ProxyError::PayloadTooLarge {
                    actual: received,
                    max: MAX_IMAGE_SIZE_BYTES,
                });
            }
            body.extend_from_slice(&chunk);
        }
        let bytes = body.freeze();

        debug!(
            "Fetched {} bytes ({})",
            bytes.len(),
            content_type.as_deref().unwrap_or("no content type")
        );

        Ok(FetchedImage {
            bytes,
            content_type,
        })
    }
}
