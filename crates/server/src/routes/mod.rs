mod alternatives;
pub mod health;
pub mod metrics;
mod prescriptions;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::ai::ModelTransport;
use crate::orchestrator::Orchestrator;

pub use prescriptions::IMAGE_FIELD;

/// Build the analysis API routes
pub fn api_routes<T: ModelTransport + 'static>() -> Router<Arc<Orchestrator<T>>> {
    Router::new()
        .route("/prescriptions/analyze", post(prescriptions::analyze::<T>))
        .route("/alternatives", post(alternatives::find::<T>))
        .route("/status", get(health::status::<T>))
}
