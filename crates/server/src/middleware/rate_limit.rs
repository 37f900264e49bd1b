//! Rate limiting middleware
//!
//! Every accepted request can cost one paid model call, so the limiter sits
//! in front of the API routes.

use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState};
use prescription_core::{ErrorCategory, Outcome};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::OperationResponse;

/// Rate limiter state (shared across requests)
pub type SharedRateLimiter =
    Arc<RateLimiter<governor::state::NotKeyed, InMemoryState, DefaultClock>>;

const RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded. Please try again later.";

/// Create a new rate limiter with specified requests per second
pub fn create_rate_limiter(requests_per_second: u32) -> SharedRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(request: Request<Body>, next: Next) -> Response {
    let limiter = request.extensions().get::<SharedRateLimiter>().cloned();

    if let Some(limiter) = limiter {
        if limiter.check().is_err() {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            let outcome: Outcome<()> =
                Outcome::failure(ErrorCategory::RateLimited, RATE_LIMIT_EXCEEDED);
            return OperationResponse(outcome).into_response();
        }
    }

    next.run(request).await
}
