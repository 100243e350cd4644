//! Tilestep Session Controller
//!
//! This crate turns typed requests into operations on a generation engine
//! session and typed responses back. It is consumed by the WebSocket API and
//! by the CLI's stdio mode, so both surfaces behave the same.
//!
//! ## Architecture
//!
//! - **Requests**: [`WorkerRequest`], one variant per operation, each carrying
//!   the session settings
//! - **Responses**: [`WorkerResponse`] with a [`RenderedState`]
//! - **SessionContext**: serves requests against one session
//! - **SessionWorker**: runs a context on its own task behind channels
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tilestep_core::{Dimensions, Preset};
//! use tilestep_ops::{Config, EngineGate, SessionSettings, SessionWorker, WorkerRequest};
//! use tilestep_wfc::WfcEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gate = EngineGate::new(WfcEngine::new());
//!     let mut worker = SessionWorker::spawn(gate, Config::load()?);
//!
//!     let settings = SessionSettings::new(Dimensions::new(20, 20), Preset::Terrain);
//!     let response = worker.request(WorkerRequest::Tick { settings }).await?;
//!     println!("{:?}", response.state().map(|s| s.history_len));
//!     Ok(())
//! }
//! ```

mod backtrack;
mod config;
mod context;
mod error;
mod history;
mod requests;
mod responses;
mod rules;
mod seed;
mod session;
mod worker;

// Re-export public API
pub use backtrack::BacktrackSelector;
pub use config::Config;
pub use context::SessionContext;
pub use error::{OpsError, OpsResult};
pub use history::render;
pub use requests::*;
pub use responses::*;
pub use rules::{extract, resolve, CustomRuleBundle, CustomRuleRegistry, RulesetSelector};
pub use seed::{SeedPolicy, RANDOM_SEED_END};
pub use session::{ResetCause, Session, SessionManager};
pub use worker::{EngineGate, RequestSender, ResponseReceiver, SessionWorker, WorkerHandle};
