//! API types and DTOs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tilestep_core::{BacktrackVariant, Preset, TileState};
use tilestep_ops::{Config, EngineGate};

/// Shared application state for the API.
pub struct ApiState<E> {
    /// Engine shared by every session worker.
    pub gate: Arc<EngineGate<E>>,
    /// Configuration handed to each worker.
    pub config: Config,
    /// Number of open WebSocket sessions.
    pub active_sessions: AtomicUsize,
}

impl<E> ApiState<E> {
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::SeqCst)
    }
}

/// Counts one open session for as long as it lives.
pub(crate) struct SessionGuard<E> {
    state: Arc<ApiState<E>>,
}

impl<E> SessionGuard<E> {
    pub(crate) fn open(state: Arc<ApiState<E>>) -> Self {
        state.active_sessions.fetch_add(1, Ordering::SeqCst);
        Self { state }
    }
}

impl<E> Drop for SessionGuard<E> {
    fn drop(&mut self) {
        self.state.active_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Response wrapper with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Response data.
    pub data: T,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl<T> ApiResponse<T> {
    /// Create a new API response with current timestamp.
    pub fn new(data: T) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { data, timestamp }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Engine name.
    pub engine: String,
    /// Whether the engine has been initialized.
    pub engine_ready: bool,
    /// Number of open sessions.
    pub active_sessions: usize,
}

/// One entry of the preset catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetInfo {
    /// Name used as the `rules` selector.
    pub name: String,
    /// State forced into the bottom-left cell of every new grid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_anchor: Option<TileState>,
}

impl From<Preset> for PresetInfo {
    fn from(preset: Preset) -> Self {
        Self {
            name: preset.as_str().to_string(),
            ground_anchor: preset.ground_anchor(),
        }
    }
}

/// Catalog served at `/presets`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub presets: Vec<PresetInfo>,
    pub backtrackers: Vec<BacktrackVariant>,
}
