//! Sandbox image validation and captioning
//!
//! Only JPEG and PNG uploads are accepted. The format is taken from the
//! magic bytes, never from the client-supplied content type.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Largest accepted upload (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const MOCK_DESCRIPTIONS: [&str; 10] = [
    "A tree in the middle of the sandbox with small figures around it",
    "A house made of blocks with a path leading to it",
    "Several animals arranged in a circle",
    "A bridge connecting two areas of the sandbox",
    "A castle with towers and a moat",
    "A garden with flowers and a small pond",
    "A family of figures standing together",
    "A car on a road leading to a building",
    "A forest with trees and animals",
    "A beach with sand, water and shells",
];

/// Caption and validation errors
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("Image is empty")]
    Empty,

    #[error("Image is {size} bytes (max {limit})")]
    TooLarge { size: usize, limit: usize },

    /// Detected type, or "unknown"
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Caption generation failed: {0}")]
    Failed(String),
}

impl CaptionError {
    /// True when the upload itself is at fault
    pub fn is_validation(&self) -> bool {
        !matches!(self, CaptionError::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// Check size and format of an uploaded image
pub fn validate_image(bytes: &[u8]) -> Result<ImageFormat, CaptionError> {
    if bytes.is_empty() {
        return Err(CaptionError::Empty);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(CaptionError::TooLarge {
            size: bytes.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }

    match infer::get(bytes).map(|kind| kind.mime_type()) {
        Some("image/jpeg") => Ok(ImageFormat::Jpeg),
        Some("image/png") => Ok(ImageFormat::Png),
        Some(other) => Err(CaptionError::UnsupportedFormat(other.to_string())),
        None => Err(CaptionError::UnsupportedFormat("unknown".to_string())),
    }
}

/// Produces a one-line description of a validated sandbox image
#[async_trait]
pub trait Captioner: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    async fn caption(&self, image: &[u8], format: ImageFormat) -> Result<String, CaptionError>;
}

/// Picks a fixed scene description from the image digest
///
/// The same bytes always get the same caption.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCaptioner;

impl MockCaptioner {
    pub fn describe(image: &[u8]) -> &'static str {
        let digest = Sha256::digest(image);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let index = u64::from_be_bytes(prefix) % MOCK_DESCRIPTIONS.len() as u64;
        MOCK_DESCRIPTIONS[index as usize]
    }
}

#[async_trait]
impl Captioner for MockCaptioner {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn caption(&self, image: &[u8], format: ImageFormat) -> Result<String, CaptionError> {
        tracing::debug!(?format, bytes = image.len(), "Generating mock caption");
        Ok(Self::describe(image).to_string())
    }
}
