//! Reference wave function collapse engine for tilestep.
//!
//! Implements the [`GenerationEngine`](tilestep_core::GenerationEngine) contract
//! with a seeded 2D solver:
//!
//! - **Rules**: which states exist and which may sit next to each other
//! - **Grid**: per-cell sets of possible states, lowest-entropy collapse and
//!   breadth-first constraint propagation
//! - **History**: every mutating call that changes cells records one step, so
//!   any past step can be replayed for rendering
//! - **Backtracking**: full reset or gradual reset around a contradiction
//! - **Extraction**: overlapping N×N pattern rules from a sample image
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tilestep_core::{Dimensions, GenerationEngine, GridHandle, Preset};
//! use tilestep_wfc::WfcEngine;
//!
//! let engine = WfcEngine::new();
//! let rules = engine.preset_rules(Preset::Checkers)?;
//! let mut handle = engine.create_handle(42, rules, Dimensions::new(8, 8))?;
//! handle.run(64, None);
//! println!("{}", handle.render(256, 256, None));
//! # Ok::<(), tilestep_core::EngineError>(())
//! ```

mod backtracking;
mod engine;
mod extraction;
mod grid;
pub mod presets;
mod render;
mod rules;

pub use backtracking::Backtracker;
pub use engine::{WfcEngine, WfcHandle};
pub use extraction::extract_rules;
pub use grid::{Grid, Interruption, StepResult};
pub use render::render_svg;
pub use rules::RuleSet;
