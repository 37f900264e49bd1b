//! Health and configuration status endpoints

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::ai::ModelTransport;
use crate::orchestrator::Orchestrator;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    configured: bool,
}

/// Configuration status response
#[derive(Serialize)]
pub struct StatusResponse {
    configured: bool,
}

/// GET /health - Liveness, plus whether the model credential is present
pub async fn check<T: ModelTransport + 'static>(
    State(orchestrator): State<Arc<Orchestrator<T>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        configured: orchestrator.is_configured(),
    })
}

/// GET /api/status - Whether analysis and lookups can be offered at all
pub async fn status<T: ModelTransport + 'static>(
    State(orchestrator): State<Arc<Orchestrator<T>>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        configured: orchestrator.is_configured(),
    })
}
