//! The contract between the session controller and a generation engine.

use crate::catalog::{BacktrackVariant, ExtractionOptions, Preset};
use crate::error::EngineResult;
use crate::space::{Dimensions, Direction2D, TileState};

/// Engine-ready rule data.
pub trait RuleData: Send {
    /// Filter the states of `target` down to those allowed next to a
    /// neighbour holding `source`, where the neighbour lies in `direction`
    /// as seen from the target.
    fn check(
        &self,
        target: &[TileState],
        source: &[TileState],
        direction: Direction2D,
    ) -> Vec<TileState>;
}

/// One live grid/solver instance.
///
/// Step results follow one convention: `Some(true)` when the grid is
/// finished, `Some(false)` when progress was made, `None` when the step
/// ended in an unresolved contradiction and produced no change.
pub trait GridHandle: Send {
    /// Backtracking strategy accepted by the stepping calls.
    type Strategy: Send;

    /// Seed the handle was built with.
    fn seed(&self) -> u64;

    /// Grid size in cells.
    fn dimensions(&self) -> Dimensions;

    /// Collapse one cell and propagate.
    fn tick(&mut self, strategy: Option<&mut Self::Strategy>) -> Option<bool>;

    /// Tick until finished, stuck, or `max_steps` ticks were spent.
    fn run(&mut self, max_steps: usize, strategy: Option<&mut Self::Strategy>) -> Option<bool>;

    /// Force the cell at `(x, y)` into `state`, or into a state of the
    /// engine's choosing when `state` is `None`.
    fn collapse(&mut self, x: usize, y: usize, state: Option<TileState>)
        -> EngineResult<Option<bool>>;

    /// Treat the live state as the starting point: history is cleared and
    /// step 0 renders what the grid holds now.
    fn rebase(&mut self);

    /// Render the grid into a `width` by `height` frame, either at the live
    /// position or as of history step `t`.
    fn render(&self, width: usize, height: usize, t: Option<usize>) -> String;

    /// True once every cell holds exactly one state.
    fn is_finished(&self) -> bool;

    /// Number of recorded history steps.
    fn history_len(&self) -> usize;
}

/// A generation engine: builds rules, strategies and handles.
pub trait GenerationEngine: Send + Sync + 'static {
    type Rules: RuleData;
    type Strategy: Send;
    type Handle: GridHandle<Strategy = Self::Strategy>;

    /// Short engine name, used in logs and health output.
    fn name(&self) -> &str;

    /// One-time setup, performed before the first request is served.
    fn initialize(&self) -> EngineResult<()>;

    /// Rules of a built-in preset.
    fn preset_rules(&self, preset: Preset) -> EngineResult<Self::Rules>;

    /// Load rules from their serialized form.
    fn deserialize_rules(&self, serialized: &str) -> EngineResult<Self::Rules>;

    /// Derive serialized rules from an encoded sample image.
    fn extract_rules(&self, image: &[u8], options: &ExtractionOptions) -> EngineResult<String>;

    /// Build a fresh strategy object for a backtracking variant.
    fn build_strategy(&self, variant: BacktrackVariant) -> Self::Strategy;

    /// Build a new handle. This is the expensive call.
    fn create_handle(
        &self,
        seed: u64,
        rules: Self::Rules,
        dimensions: Dimensions,
    ) -> EngineResult<Self::Handle>;
}
