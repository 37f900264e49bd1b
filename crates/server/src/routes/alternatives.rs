//! Medication alternatives endpoint

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use prescription_core::AlternativesRecord;
use serde::Deserialize;

use crate::ai::ModelTransport;
use crate::error::OperationResponse;
use crate::orchestrator::Orchestrator;

/// Request body for an alternatives lookup
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativesRequest {
    #[serde(default)]
    medication_name: String,
}

/// POST /api/alternatives - Find market alternatives for a medication
pub async fn find<T: ModelTransport + 'static>(
    State(orchestrator): State<Arc<Orchestrator<T>>>,
    body: Result<Json<AlternativesRequest>, JsonRejection>,
) -> OperationResponse<AlternativesRecord> {
    // An unreadable body is treated like a missing name
    let medication_name = match body {
        Ok(Json(body)) => body.medication_name,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Invalid alternatives request body");
            String::new()
        }
    };

    orchestrator.find_alternatives(&medication_name).await.into()
}
