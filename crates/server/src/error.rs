//! HTTP mapping for operation outcomes

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use prescription_core::{ErrorCategory, Outcome};
use serde::Serialize;

/// Wraps an [`Outcome`] so it can be returned from a handler
pub struct OperationResponse<T>(pub Outcome<T>);

impl<T: Serialize> IntoResponse for OperationResponse<T> {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Outcome::Success { .. } => StatusCode::OK,
            Outcome::Failure(err) => status_for(err.category),
        };

        (status, Json(self.0)).into_response()
    }
}

impl<T> From<Outcome<T>> for OperationResponse<T> {
    fn from(outcome: Outcome<T>) -> Self {
        Self(outcome)
    }
}

/// HTTP status reported for a failure category
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCategory::EmptyResult => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCategory::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCategory::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorCategory::InvalidApiKey => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::ConnectionFailure
        | ErrorCategory::AccessDenied
        | ErrorCategory::ServerError
        | ErrorCategory::MalformedResponse => StatusCode::BAD_GATEWAY,
        ErrorCategory::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
