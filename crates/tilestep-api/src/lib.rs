//! WebSocket session API for tilestep.
//!
//! Each WebSocket connection gets its own session worker. Workers share one
//! engine, initialized on the first request.
//!
//! ## Endpoints
//!
//! - `GET /api/health` - Health check with engine status and session count
//! - `GET /api/presets` - Preset catalog and backtracking variants
//! - `GET /api/ws` - WebSocket session, one JSON request per text frame
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tilestep_api::{create_api_router, create_api_state};
//! use tilestep_ops::Config;
//! use tilestep_wfc::WfcEngine;
//!
//! let state = create_api_state(WfcEngine::new(), Config::default());
//! let router = create_api_router(state);
//! ```

mod routes;
mod types;
mod ws;

pub use routes::create_api_router;
pub use types::{ApiResponse, ApiState, CatalogResponse, HealthResponse, PresetInfo};

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tilestep_core::GenerationEngine;
use tilestep_ops::{Config, EngineGate};

/// Create a new API state around an engine.
pub fn create_api_state<E: GenerationEngine>(engine: E, config: Config) -> Arc<ApiState<E>> {
    Arc::new(ApiState {
        gate: EngineGate::new(engine),
        config,
        active_sessions: AtomicUsize::new(0),
    })
}
