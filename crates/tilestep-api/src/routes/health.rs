//! Health check endpoint.

use std::sync::Arc;

use axum::{extract::State, Json};
use tilestep_core::GenerationEngine;

use crate::types::{ApiResponse, ApiState, HealthResponse};

/// Handler for GET /api/health
pub async fn health_handler<E: GenerationEngine>(
    State(state): State<Arc<ApiState<E>>>,
) -> Json<ApiResponse<HealthResponse>> {
    let response = HealthResponse {
        status: "ok".to_string(),
        engine: state.gate.engine().name().to_string(),
        engine_ready: state.gate.is_ready(),
        active_sessions: state.active_sessions(),
    };
    Json(ApiResponse::new(response))
}
