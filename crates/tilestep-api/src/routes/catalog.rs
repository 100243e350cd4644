//! Preset catalog endpoint.

use axum::Json;
use tilestep_core::{BacktrackVariant, Preset};

use crate::types::{ApiResponse, CatalogResponse, PresetInfo};

/// Handler for GET /api/presets
pub async fn presets_handler() -> Json<ApiResponse<CatalogResponse>> {
    Json(ApiResponse::new(CatalogResponse {
        presets: Preset::ALL.into_iter().map(PresetInfo::from).collect(),
        backtrackers: BacktrackVariant::ALL.to_vec(),
    }))
}
