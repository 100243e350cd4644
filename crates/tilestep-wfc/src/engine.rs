//! [`GenerationEngine`] implementation backed by [`Grid`].

use tilestep_core::{
    BacktrackVariant, Dimensions, EngineResult, ExtractionOptions, GenerationEngine, GridHandle,
    Preset, TileState,
};
use tracing::{debug, info};

use crate::backtracking::Backtracker;
use crate::extraction::extract_rules;
use crate::grid::{Grid, Interruption, StepResult};
use crate::presets;
use crate::render::render_svg;
use crate::rules::RuleSet;

/// The reference engine.
#[derive(Debug, Clone, Default)]
pub struct WfcEngine;

impl WfcEngine {
    pub fn new() -> Self {
        Self
    }
}

impl GenerationEngine for WfcEngine {
    type Rules = RuleSet;
    type Strategy = Backtracker;
    type Handle = WfcHandle;

    fn name(&self) -> &str {
        "wfc"
    }

    fn initialize(&self) -> EngineResult<()> {
        info!(presets = Preset::ALL.len(), "wfc_engine_ready");
        Ok(())
    }

    fn preset_rules(&self, preset: Preset) -> EngineResult<RuleSet> {
        Ok(presets::rules(preset))
    }

    fn deserialize_rules(&self, serialized: &str) -> EngineResult<RuleSet> {
        RuleSet::from_json(serialized)
    }

    fn extract_rules(&self, image: &[u8], options: &ExtractionOptions) -> EngineResult<String> {
        extract_rules(image, options)?.to_json()
    }

    fn build_strategy(&self, variant: BacktrackVariant) -> Backtracker {
        Backtracker::new(variant)
    }

    fn create_handle(
        &self,
        seed: u64,
        rules: RuleSet,
        dimensions: Dimensions,
    ) -> EngineResult<WfcHandle> {
        Ok(WfcHandle {
            grid: Grid::new(rules, dimensions, seed)?,
        })
    }
}

/// A live grid owned by one session.
#[derive(Debug, Clone)]
pub struct WfcHandle {
    grid: Grid,
}

impl WfcHandle {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// One step with optional recovery, committed to history.
    fn advance(&mut self, strategy: Option<&mut Backtracker>) -> StepResult {
        let result = match self.grid.step() {
            Err(Interruption::Contradiction(at)) => match strategy {
                Some(backtracker) => {
                    debug!(x = at.x, y = at.y, variant = %backtracker.variant(), "backtracking");
                    backtracker.recover(&mut self.grid, at)
                }
                None => Err(Interruption::Contradiction(at)),
            },
            other => other,
        };
        self.grid.commit();
        result
    }

    fn outcome(&self, result: StepResult) -> Option<bool> {
        match result {
            Ok(()) => Some(self.grid.is_finished()),
            Err(Interruption::Finished) => Some(true),
            Err(Interruption::Contradiction(_)) => None,
        }
    }
}

impl GridHandle for WfcHandle {
    type Strategy = Backtracker;

    fn seed(&self) -> u64 {
        self.grid.seed()
    }

    fn dimensions(&self) -> Dimensions {
        self.grid.dimensions()
    }

    fn tick(&mut self, strategy: Option<&mut Backtracker>) -> Option<bool> {
        let result = self.advance(strategy);
        self.outcome(result)
    }

    fn run(&mut self, max_steps: usize, mut strategy: Option<&mut Backtracker>) -> Option<bool> {
        for _ in 0..max_steps {
            match self.advance(strategy.as_deref_mut()) {
                Ok(()) if !self.grid.is_finished() => continue,
                result => return self.outcome(result),
            }
        }
        Some(self.grid.is_finished())
    }

    fn collapse(
        &mut self,
        x: usize,
        y: usize,
        state: Option<TileState>,
    ) -> EngineResult<Option<bool>> {
        let result = self.grid.collapse(x, y, state)?;
        self.grid.commit();
        Ok(self.outcome(result))
    }

    fn rebase(&mut self) {
        self.grid.rebase();
    }

    fn render(&self, width: usize, height: usize, t: Option<usize>) -> String {
        let dimensions = self.grid.dimensions();
        match t {
            Some(t) => {
                let tiles = self.grid.tiles_at(t);
                render_svg(self.grid.rules(), dimensions, &tiles, width, height)
            }
            None => render_svg(self.grid.rules(), dimensions, self.grid.tiles(), width, height),
        }
    }

    fn is_finished(&self) -> bool {
        self.grid.is_finished()
    }

    fn history_len(&self) -> usize {
        self.grid.history_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::checkers::STATE_WHITE;

    fn handle(preset: Preset, width: usize, height: usize, seed: u64) -> WfcHandle {
        let engine = WfcEngine::new();
        let rules = engine.preset_rules(preset).unwrap();
        engine
            .create_handle(seed, rules, Dimensions::new(width, height))
            .unwrap()
    }

    #[test]
    fn handle_reports_its_seed() {
        assert_eq!(handle(Preset::Checkers, 5, 5, 42).seed(), 42);
    }

    #[test]
    fn each_tick_records_one_step() {
        let mut h = handle(Preset::Terrain, 6, 6, 1);
        for expected in 1..=3 {
            h.tick(None);
            assert_eq!(h.history_len(), expected);
        }
    }

    #[test]
    fn checkers_finishes_in_one_tick() {
        let mut h = handle(Preset::Checkers, 5, 5, 9);
        assert_eq!(h.tick(None), Some(true));
        assert!(h.is_finished());
        assert_eq!(h.tick(None), Some(true));
        assert_eq!(h.history_len(), 1);
    }

    #[test]
    fn run_stops_when_finished() {
        let mut h = handle(Preset::Stripes, 4, 4, 5);
        assert_eq!(h.run(100, None), Some(true));
        assert_eq!(h.history_len(), 1);
    }

    #[test]
    fn run_respects_budget() {
        let mut h = handle(Preset::Terrain, 10, 10, 2);
        let mut strategy = Backtracker::new(BacktrackVariant::Reset);
        h.run(2, Some(&mut strategy));
        assert!(h.history_len() <= 2);
    }

    #[test]
    fn collapse_then_render_shows_the_state() {
        let mut h = handle(Preset::Checkers, 2, 1, 0);
        assert_eq!(h.collapse(0, 0, Some(STATE_WHITE)).unwrap(), Some(true));
        let svg = h.render(20, 10, None);
        assert!(svg.contains(r#"x="0" y="0" width="10" height="10" fill="rgba(255,255,255,1.00)""#));
        assert!(svg.contains(r#"x="10" y="0" width="10" height="10" fill="rgba(0,0,0,1.00)""#));

        // before the collapse every cell was undecided
        let past = h.render(20, 10, Some(0));
        assert!(past.contains("rgba(128,128,128,1.00)"));
        assert!(!past.contains("rgba(0,0,0,1.00)"));
        assert_eq!(h.history_len(), 1);
    }

    #[test]
    fn serialized_rules_load_back() {
        let engine = WfcEngine::new();
        let json = engine.preset_rules(Preset::Stripes).unwrap().to_json().unwrap();
        let rules = engine.deserialize_rules(&json).unwrap();
        assert_eq!(rules, presets::stripes::rules());
        assert!(engine.deserialize_rules("[]").is_err());
    }
}
