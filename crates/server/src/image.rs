//! Uploaded prescription images: validation and base64 encoding

use base64::Engine as _;
use thiserror::Error;

/// Largest accepted upload (20 MiB)
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

pub const ACCEPTED_MEDIA_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "image/gif",
];

/// An uploaded image as received
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

/// An image ready for the model transport
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub media_type: String,
    pub data: String,
}

/// Image precondition failures; the messages are shown to users as-is
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("No file selected")]
    Missing,

    #[error("Please upload a valid image file (JPEG, PNG, WebP, or GIF)")]
    UnsupportedType(String),

    #[error("Image size must be less than 20MB")]
    TooLarge,

    #[error("Failed to convert image to base64")]
    EncodingFailed,
}

impl ImageUpload {
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Check media type and size
    pub fn validate(&self) -> Result<(), ImageError> {
        let media_type = self.media_type.to_ascii_lowercase();
        if !ACCEPTED_MEDIA_TYPES.contains(&media_type.as_str()) {
            return Err(ImageError::UnsupportedType(self.media_type.clone()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge);
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<EncodedImage, ImageError> {
        let data = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        if data.is_empty() {
            return Err(ImageError::EncodingFailed);
        }
        Ok(EncodedImage {
            media_type: self.media_type.to_ascii_lowercase(),
            data,
        })
    }
}
