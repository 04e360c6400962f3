// Vision models and types
// Author: nofomo contributors

use crate::error::{ProxyError, Result};
use base64::Engine;
use bytes::Bytes;
use phf::phf_map;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
}

/// MIME types the vision model accepts, keyed by their lowercase spelling.
static ALLOWED_MIME_TYPES: phf::Map<&'static str, ImageFormat> = phf_map! {
    "image/jpeg" => ImageFormat::Jpeg,
    "image/jpg" => ImageFormat::Jpeg,
    "image/png" => ImageFormat::Png,
    "image/gif" => ImageFormat::Gif,
    "image/webp" => ImageFormat::WebP,
};

/// MIME type used when the source declares none or an unsupported one.
pub const FALLBACK_MIME_TYPE: &str = "image/jpeg";

impl ImageFormat {
    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Try to detect format from MIME type
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        ALLOWED_MIME_TYPES.get(mime.to_lowercase().as_str()).copied()
    }
}

/// Reduce a `Content-Type` value to an allow-listed MIME type.
///
/// Parameters such as `; charset=binary` are dropped. Anything outside the
/// allow-list, including a missing value, becomes `image/jpeg`.
pub fn normalize_mime_type(content_type: Option<&str>) -> String {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_lowercase())
        .unwrap_or_default();

    if ALLOWED_MIME_TYPES.contains_key(essence.as_str()) {
        essence
    } else {
        FALLBACK_MIME_TYPE.to_string()
    }
}

/// Validation limits
pub const MAX_IMAGE_SIZE_BYTES: usize = 20 * 1024 * 1024; // 20MB (OpenAI vision limit)

/// Validate image data size
pub fn validate_image_size(data_len: usize) -> Result<()> {
    if data_len > MAX_IMAGE_SIZE_BYTES {
        return Err(ProxyError::PayloadTooLarge {
            actual: data_len,
            max: MAX_IMAGE_SIZE_BYTES,
        });
    }
    Ok(())
}

/// Where the image of an analysis request comes from.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Multipart `image` part.
    Upload {
        bytes: Bytes,
        declared_mime: Option<String>,
    },
    /// JSON `imageUrl`, downloaded before analysis.
    RemoteUrl { url: String },
}

/// An image ready to be embedded in a vision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    /// Standard (padded) base64 of the binary payload.
    pub data: String,
}

impl EncodedImage {
    /// Normalize the MIME type, enforce the size ceiling and base64-encode.
    pub fn encode(bytes: &[u8], content_type: Option<&str>) -> Result<Self> {
        validate_image_size(bytes.len())?;

        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        if data.is_empty() {
            return Err(ProxyError::InvalidRequest(
                "Image payload is empty".to_string(),
            ));
        }

        Ok(Self {
            mime_type: normalize_mime_type(content_type),
            data,
        })
    }

    /// Size of the binary payload the base64 text encodes.
    pub fn binary_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }

    /// `data:` URI form expected by the chat completions `image_url` part.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_parameters() {
        assert_eq!(normalize_mime_type(Some("image/png; charset=binary")), "image/png");
        assert_eq!(normalize_mime_type(Some(" IMAGE/WEBP ")), "image/webp");
    }

    #[test]
    fn test_normalize_keeps_jpg_spelling() {
        assert_eq!(normalize_mime_type(Some("image/jpg")), "image/jpg");
    }

    #[test]
    fn test_normalize_coerces_unsupported() {
        assert_eq!(normalize_mime_type(Some("image/bmp")), "image/jpeg");
        assert_eq!(normalize_mime_type(Some("text/html; charset=utf-8")), "image/jpeg");
        assert_eq!(normalize_mime_type(Some("")), "image/jpeg");
        assert_eq!(normalize_mime_type(None), "image/jpeg");
    }

    #[test]
    fn test_format_lookup() {
        assert_eq!(ImageFormat::from_mime_type("image/JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime_type("image/gif").unwrap().mime_type(), "image/gif");
        assert_eq!(ImageFormat::from_mime_type("image/heic"), None);
    }

    #[test]
    fn test_size_ceiling() {
        assert!(validate_image_size(MAX_IMAGE_SIZE_BYTES).is_ok());

        let err = validate_image_size(MAX_IMAGE_SIZE_BYTES + 1).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&(MAX_IMAGE_SIZE_BYTES + 1).to_string()));
        assert!(message.contains("20MB"));
    }

    #[test]
    fn test_encode_rejects_empty_payload() {
        let err = EncodedImage::encode(&[], Some("image/png")).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
    }

    #[test]
    fn test_data_uri() {
        let image = EncodedImage::encode(b"GIF89a", Some("image/gif")).unwrap();
        assert_eq!(image.data_uri(), "data:image/gif;base64,R0lGODlh");
        assert_eq!(image.binary_len(), 6);

        let padded = EncodedImage::encode(b"\x89PNG\r\n\x1a\n", Some("image/png")).unwrap();
        assert_eq!(padded.binary_len(), 8);
    }
}
