//! Prescription image analysis endpoint

use std::sync::Arc;

use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use prescription_core::{ErrorCategory, Outcome, PrescriptionRecord};

use crate::ai::ModelTransport;
use crate::error::OperationResponse;
use crate::image::{ImageError, ImageUpload};
use crate::orchestrator::Orchestrator;

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

const UNREADABLE_IMAGE: &str = "Failed to read image file";

/// POST /api/prescriptions/analyze - Transcribe an uploaded prescription image
///
/// Expects `multipart/form-data` with the photo in the `image` field.
pub async fn analyze<T: ModelTransport + 'static>(
    State(orchestrator): State<Arc<Orchestrator<T>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> OperationResponse<PrescriptionRecord> {
    let upload = match multipart {
        Ok(multipart) => match read_image(multipart).await {
            Ok(upload) => upload,
            Err(err) => return unreadable(err),
        },
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Analyze request is not multipart");
            None
        }
    };

    orchestrator.analyze(upload.as_ref()).await.into()
}

/// Pull the image field out of the form, if there is one
async fn read_image(mut multipart: Multipart) -> Result<Option<ImageUpload>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let media_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(ImageUpload::new(media_type, bytes.to_vec())));
    }
    Ok(None)
}

fn unreadable(err: MultipartError) -> OperationResponse<PrescriptionRecord> {
    tracing::warn!(error = %err, "Failed to read uploaded image");
    let message = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ImageError::TooLarge.to_string()
    } else {
        UNREADABLE_IMAGE.to_string()
    };
    Outcome::failure(ErrorCategory::InvalidRequest, message).into()
}
