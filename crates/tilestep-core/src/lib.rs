//! Core domain model for tilestep.
//!
//! This crate holds the vocabulary shared by every other crate in the workspace:
//!
//! - **Space**: tile states, the four grid directions and grid dimensions
//! - **Catalog**: built-in rulesets, backtracking variants and extraction parameters
//! - **Engine contract**: the traits a generation engine implements so the session
//!   controller can drive it without knowing how constraint propagation works
//!
//! ## The Engine Contract
//!
//! ```text
//! GenerationEngine
//!   ├── preset_rules / deserialize_rules  -> Rules   (RuleData)
//!   ├── build_strategy(variant)           -> Strategy
//!   ├── extract_rules(image, options)     -> serialized rules
//!   └── create_handle(seed, rules, dims)  -> Handle  (GridHandle)
//! ```
//!
//! A handle is exclusively owned by whoever created it. Rendering a past step
//! through [`GridHandle::render`] never moves the live position.

mod catalog;
mod engine;
mod error;
mod space;

pub use catalog::{BacktrackVariant, ExtractionOptions, Preset};
pub use engine::{GenerationEngine, GridHandle, RuleData};
pub use error::{EngineError, EngineResult};
pub use space::{Dimensions, Direction2D, Location2D, TileState};
