// Image input resolution for the analysis endpoint
// Author: nofomo contributors

use super::fetch::ImageFetcher;
use super::models::{EncodedImage, ImageInput};
use crate::error::{ProxyError, Result};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

/// Form field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// JSON body of URL mode.
#[derive(Debug, Deserialize)]
struct ImageUrlRequest {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
}

impl ImageInput {
    /// Pick the input variant from the request's content type.
    ///
    /// `application/json` bodies carry `{"imageUrl": ...}`; everything else is
    /// read as `multipart/form-data` with an `image` part.
    pub async fn from_request(req: Request) -> Result<Self> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|ct| ct.trim_start().to_lowercase().starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(req).await
        } else {
            Self::from_multipart(req).await
        }
    }

    async fn from_json(req: Request) -> Result<Self> {
        let Json(body) = Json::<ImageUrlRequest>::from_request(req, &())
            .await
            .map_err(|rejection| {
                ProxyError::InvalidRequest(format!("Invalid JSON body: {}", rejection.body_text()))
            })?;

        match body.image_url.map(|url| url.trim().to_string()) {
            Some(url) if !url.is_empty() => Ok(ImageInput::RemoteUrl { url }),
            _ => Err(ProxyError::InvalidRequest(
                "No imageUrl provided".to_string(),
            )),
        }
    }

    async fn from_multipart(req: Request) -> Result<Self> {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|rejection| {
                ProxyError::InvalidRequest(format!("Invalid form data: {}", rejection.body_text()))
            })?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ProxyError::InvalidRequest(format!("Invalid form data: {}", e.body_text())))?
        {
            if field.name() != Some(IMAGE_FIELD) {
                continue;
            }

            let declared_mime = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|e| {
                ProxyError::InvalidRequest(format!("Failed to read image part: {}", e.body_text()))
            })?;

            return Ok(ImageInput::Upload {
                bytes,
                declared_mime,
            });
        }

        Err(ProxyError::InvalidRequest("No image provided".to_string()))
    }

    /// Turn the input into an [`EncodedImage`], downloading remote URLs first.
    pub async fn resolve(self, fetcher: &ImageFetcher) -> Result<EncodedImage> {
        match self {
            ImageInput::Upload {
                bytes,
                declared_mime,
            } => {
                debug!("Encoding uploaded image ({} bytes)", bytes.len());
                EncodedImage::encode(&bytes, declared_mime.as_deref())
            }
            ImageInput::RemoteUrl { url } => {
                let fetched = fetcher.fetch(&url).await?;
                EncodedImage::encode(&fetched.bytes, fetched.content_type.as_deref())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use axum::body::Body;

    const BOUNDARY: &str = "nofomo-test-boundary";

    fn multipart_request(name: &str, content_type: Option<&str>, data: &[u8]) -> Request {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"upload.bin\"\r\n",
                name
            )
            .as_bytes(),
        );
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        axum::http::Request::builder()
            .method("POST")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_with_image_url() {
        let input = ImageInput::from_request(json_request(r#"{"imageUrl":"https://example.com/a.png"}"#))
            .await
            .unwrap();
        match input {
            ImageInput::RemoteUrl { url } => assert_eq!(url, "https://example.com/a.png"),
            other => panic!("unexpected input: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_json_without_image_url() {
        let err = ImageInput::from_request(json_request(r#"{"url":"https://example.com"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let err = ImageInput::from_request(json_request("{not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_multipart_image_part() {
        let req = multipart_request("image", Some("image/png"), b"\x89PNG\r\n\x1a\n");
        match ImageInput::from_request(req).await.unwrap() {
            ImageInput::Upload {
                bytes,
                declared_mime,
            } => {
                assert_eq!(&bytes[..], b"\x89PNG\r\n\x1a\n");
                assert_eq!(declared_mime.as_deref(), Some("image/png"));
            }
            other => panic!("unexpected input: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multipart_missing_image_part() {
        let req = multipart_request("avatar", Some("image/png"), b"data");
        let err = ImageInput::from_request(req).await.unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_upload_without_type_defaults_to_jpeg() {
        let fetcher = ImageFetcher::new(&FetchConfig::default()).unwrap();
        let input = ImageInput::Upload {
            bytes: bytes::Bytes::from_static(b"\xFF\xD8\xFF\xE0"),
            declared_mime: None,
        };
        let image = input.resolve(&fetcher).await.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "/9j/4A==");
    }

    #[tokio::test]
    async fn test_remote_url_strips_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/a.png")
            .with_status(200)
            .with_header("content-type", "image/png; charset=binary")
            .with_body(b"\x89PNG\r\n\x1a\n".to_vec())
            .create_async()
            .await;

        let fetcher = ImageFetcher::new(&FetchConfig::default()).unwrap();
        let input = ImageInput::RemoteUrl {
            url: format!("{}/a.png", server.url()),
        };
        let image = input.resolve(&fetcher).await.unwrap();

        mock.assert_async().await;
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "iVBORw0KGgo=");
    }

    #[tokio::test]
    async fn test_remote_url_failure_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.png")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = ImageFetcher::new(&FetchConfig::default()).unwrap();
        let input = ImageInput::RemoteUrl {
            url: format!("{}/missing.png", server.url()),
        };
        let err = input.resolve(&fetcher).await.unwrap_err();
        assert!(matches!(err, ProxyError::ImageFetch { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_remote_url_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/empty.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .create_async()
            .await;

        let fetcher = ImageFetcher::new(&FetchConfig::default()).unwrap();
        let input = ImageInput::RemoteUrl {
            url: format!("{}/empty.png", server.url()),
        };
        let err = input.resolve(&fetcher).await.unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
    }
}
