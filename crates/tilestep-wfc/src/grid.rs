//! The solver grid: possible-state sets per cell, collapse, propagation and
//! step history.

use std::collections::{BTreeSet, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tilestep_core::{Dimensions, Direction2D, EngineError, EngineResult, Location2D, TileState};
use tracing::trace;

use crate::rules::RuleSet;

/// Possible states of one cell.
pub type Tile = BTreeSet<TileState>;

/// Why a solver step stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interruption {
    /// Every cell holds exactly one state.
    #[error("grid is finished")]
    Finished,
    /// A cell lost all of its possible states.
    #[error("contradiction at {0:?}")]
    Contradiction(Location2D),
}

/// Result of one solver step.
pub type StepResult = Result<(), Interruption>;

/// A pending recheck: `target` is re-filtered against its neighbour `source`,
/// which lies in `direction` as seen from `target`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Recheck {
    pub source: usize,
    pub target: usize,
    pub direction: Direction2D,
}

/// One recorded history step: the cells it changed and their new states.
type Step = Vec<(usize, Tile)>;

/// A seeded wave function collapse grid.
#[derive(Debug, Clone)]
pub struct Grid {
    rules: RuleSet,
    dimensions: Dimensions,
    seed: u64,
    rng: StdRng,
    tiles: Vec<Tile>,
    initial: Vec<Tile>,
    history: Vec<Step>,
    pending: Step,
}

impl Grid {
    /// Create a grid where every cell may take every state.
    pub fn new(rules: RuleSet, dimensions: Dimensions, seed: u64) -> EngineResult<Self> {
        if dimensions.area() == 0 {
            return Err(EngineError::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
            });
        }
        if rules.possible.is_empty() {
            return Err(EngineError::invalid_rules("no possible states"));
        }

        let tiles = vec![rules.possible.clone(); dimensions.area()];
        Ok(Self {
            rules,
            dimensions,
            seed,
            rng: StdRng::seed_from_u64(seed),
            initial: tiles.clone(),
            tiles,
            history: Vec::new(),
            pending: Vec::new(),
        })
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Possible states of the cell at `location`.
    pub fn tile(&self, location: Location2D) -> Option<&Tile> {
        self.dimensions
            .contains(location)
            .then(|| &self.tiles[self.dimensions.index_of(location)])
    }

    /// Live cell states, row-major.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// True once every cell holds exactly one state.
    pub fn is_finished(&self) -> bool {
        self.tiles.iter().all(|tile| tile.len() == 1)
    }

    /// Number of recorded steps.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Cell states as of step `t`, replayed from the initial grid.
    ///
    /// `t` is clamped to the history length.
    pub fn tiles_at(&self, t: usize) -> Vec<Tile> {
        let mut tiles = self.initial.clone();
        for step in self.history.iter().take(t) {
            for (index, tile) in step {
                tiles[*index] = tile.clone();
            }
        }
        tiles
    }

    /// Record every change made since the last commit as one step.
    ///
    /// Returns whether a step was recorded.
    pub fn commit(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        let step = std::mem::take(&mut self.pending);
        trace!(step = self.history.len(), changes = step.len(), "grid_step");
        self.history.push(step);
        true
    }

    /// Make the live state the initial state and forget all history.
    pub fn rebase(&mut self) {
        self.pending.clear();
        self.history.clear();
        self.initial = self.tiles.clone();
    }

    pub(crate) fn set_tile(&mut self, index: usize, tile: Tile) {
        if self.tiles[index] == tile {
            return;
        }
        self.pending.push((index, tile.clone()));
        self.tiles[index] = tile;
    }

    /// Allow every state everywhere again.
    pub fn reset(&mut self) {
        for index in 0..self.tiles.len() {
            self.set_tile(index, self.rules.possible.clone());
        }
    }

    /// Pick the uncollapsed cell with the lowest entropy.
    ///
    /// A little seeded noise breaks ties so equal cells are not always
    /// visited in grid order.
    fn lowest_entropy(&mut self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for index in 0..self.tiles.len() {
            let tile = &self.tiles[index];
            if tile.len() <= 1 {
                continue;
            }
            let entropy = shannon_entropy(&self.rules, tile) + self.rng.random::<f64>() * 1e-6;
            if best.is_none_or(|(_, lowest)| entropy < lowest) {
                best = Some((index, entropy));
            }
        }
        best.map(|(index, _)| index)
    }

    /// Pick one state of a tile, weighted by the rule weights.
    fn choose_state(&mut self, tile: &Tile) -> Option<TileState> {
        // weights come from caller-supplied rule data
        let total = tile
            .iter()
            .map(|state| self.rules.weight(*state))
            .fold(0usize, usize::saturating_add);
        if total == 0 {
            return tile.iter().next().copied();
        }
        let mut roll = self.rng.random_range(0..total);
        for state in tile {
            let weight = self.rules.weight(*state);
            if roll < weight {
                return Some(*state);
            }
            roll -= weight;
        }
        None
    }

    /// Force the cell at `index` into `state` (or a weighted random pick)
    /// and propagate the consequences.
    pub(crate) fn collapse_index(&mut self, index: usize, state: Option<TileState>) -> StepResult {
        let tile = self.tiles[index].clone();
        let chosen = match state {
            Some(state) => Some(state),
            None => self.choose_state(&tile),
        };
        let Some(chosen) = chosen else {
            return Err(Interruption::Contradiction(self.dimensions.location_of(index)));
        };

        self.set_tile(index, BTreeSet::from([chosen]));
        let queue = self.rechecks_around(index);
        self.propagate(queue)
    }

    /// Validate and collapse the cell at `(x, y)`.
    pub fn collapse(
        &mut self,
        x: usize,
        y: usize,
        state: Option<TileState>,
    ) -> EngineResult<StepResult> {
        let location = Location2D::new(x, y);
        if !self.dimensions.contains(location) {
            return Err(EngineError::OutOfBounds {
                x,
                y,
                width: self.dimensions.width,
                height: self.dimensions.height,
            });
        }
        let index = self.dimensions.index_of(location);
        if let Some(state) = state {
            if !self.tiles[index].contains(&state) {
                return Err(EngineError::InvalidState { x, y, state });
            }
        }
        Ok(self.collapse_index(index, state))
    }

    /// Rechecks of every neighbour of `index` against it.
    pub(crate) fn rechecks_around(&self, index: usize) -> VecDeque<Recheck> {
        let location = self.dimensions.location_of(index);
        self.dimensions
            .neighbours(location)
            .map(|(direction, neighbour)| Recheck {
                source: index,
                target: self.dimensions.index_of(neighbour),
                direction: direction.mirror(),
            })
            .collect()
    }

    /// Rechecks of `index` against each of its neighbours.
    pub(crate) fn rechecks_of(&self, index: usize) -> impl Iterator<Item = Recheck> + '_ {
        let location = self.dimensions.location_of(index);
        self.dimensions
            .neighbours(location)
            .map(move |(direction, neighbour)| Recheck {
                source: self.dimensions.index_of(neighbour),
                target: index,
                direction,
            })
    }

    /// Breadth-first constraint propagation.
    pub(crate) fn propagate(&mut self, mut queue: VecDeque<Recheck>) -> StepResult {
        while let Some(recheck) = queue.pop_front() {
            let checked = self.rules.check_states(
                &self.tiles[recheck.target],
                &self.tiles[recheck.source],
                recheck.direction,
            );
            if checked == self.tiles[recheck.target] {
                continue;
            }

            let emptied = checked.is_empty();
            self.set_tile(recheck.target, checked);
            if emptied {
                return Err(Interruption::Contradiction(
                    self.dimensions.location_of(recheck.target),
                ));
            }
            queue.extend(self.rechecks_around(recheck.target));
        }
        Ok(())
    }

    /// Collapse the lowest-entropy cell.
    pub fn step(&mut self) -> StepResult {
        if let Some(index) = self.lowest_entropy() {
            return self.collapse_index(index, None);
        }
        match self.tiles.iter().position(|tile| tile.is_empty()) {
            Some(index) => Err(Interruption::Contradiction(self.dimensions.location_of(index))),
            None => Err(Interruption::Finished),
        }
    }
}

/// Weighted Shannon entropy of a tile.
fn shannon_entropy(rules: &RuleSet, tile: &Tile) -> f64 {
    let weights: Vec<f64> = tile.iter().map(|state| rules.weight(*state) as f64).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted_log: f64 = weights
        .iter()
        .filter(|w| **w > 0.0)
        .map(|w| w * w.ln())
        .sum();
    total.ln() - weighted_log / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{checkers, stripes, terrain_simple};

    fn checkers_grid(width: usize, height: usize) -> Grid {
        Grid::new(checkers::rules(), Dimensions::new(width, height), 7).unwrap()
    }

    #[test]
    fn new_grid_allows_everything() {
        let grid = checkers_grid(3, 2);
        assert_eq!(grid.tiles().len(), 6);
        assert!(grid.tiles().iter().all(|tile| tile.len() == 2));
        assert_eq!(grid.history_len(), 0);
        assert!(!grid.is_finished());
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        let result = Grid::new(checkers::rules(), Dimensions::new(0, 4), 1);
        assert!(matches!(result, Err(EngineError::InvalidDimensions { .. })));
    }

    #[test]
    fn huge_weights_do_not_overflow_the_weighted_pick() {
        let mut rules = checkers::rules();
        rules.weights = std::collections::HashMap::from([
            (checkers::STATE_BLACK, usize::MAX),
            (checkers::STATE_WHITE, usize::MAX - 1),
        ]);
        let mut grid = Grid::new(rules, Dimensions::new(2, 2), 7).unwrap();

        assert_eq!(grid.collapse(0, 0, None).unwrap(), Ok(()));
        assert_eq!(grid.tile(Location2D::new(0, 0)).unwrap().len(), 1);
        assert!(grid.is_finished());
    }

    #[test]
    fn collapsing_one_checkers_cell_solves_the_grid() {
        let mut grid = checkers_grid(4, 4);
        let result = grid.collapse(0, 0, Some(checkers::STATE_BLACK)).unwrap();
        assert_eq!(result, Ok(()));
        assert!(grid.is_finished());

        for y in 0..4 {
            for x in 0..4 {
                let expected = if (x + y) % 2 == 0 {
                    checkers::STATE_BLACK
                } else {
                    checkers::STATE_WHITE
                };
                let tile = grid.tile(Location2D::new(x, y)).unwrap();
                assert_eq!(tile, &BTreeSet::from([expected]));
            }
        }
    }

    #[test]
    fn collapse_validates_input() {
        let mut grid = checkers_grid(2, 2);
        assert!(matches!(
            grid.collapse(2, 0, None),
            Err(EngineError::OutOfBounds { x: 2, y: 0, .. })
        ));
        assert!(matches!(
            grid.collapse(0, 0, Some(9)),
            Err(EngineError::InvalidState { state: 9, .. })
        ));

        grid.collapse(0, 0, Some(checkers::STATE_BLACK)).unwrap().unwrap();
        assert!(matches!(
            grid.collapse(1, 0, Some(checkers::STATE_BLACK)),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn commit_groups_changes_into_one_step() {
        let mut grid = checkers_grid(3, 3);
        grid.collapse(1, 1, None).unwrap().unwrap();
        assert!(grid.commit());
        assert!(!grid.commit());
        assert_eq!(grid.history_len(), 1);
    }

    #[test]
    fn replay_matches_live_state() {
        let mut grid = Grid::new(stripes::rules(), Dimensions::new(5, 5), 3).unwrap();
        while !grid.is_finished() {
            let result = grid.step();
            grid.commit();
            if result.is_err() {
                break;
            }
        }

        let len = grid.history_len();
        assert!(len > 0);
        assert_eq!(grid.tiles_at(len), grid.tiles());
        assert_eq!(grid.tiles_at(len + 10), grid.tiles());
        assert!(grid.tiles_at(0).iter().all(|tile| tile.len() == 3));
    }

    #[test]
    fn rebase_starts_history_from_the_live_state() {
        let mut grid = Grid::new(terrain_simple::rules(), Dimensions::new(4, 4), 2).unwrap();
        grid.collapse(0, 3, Some(terrain_simple::STATE_SEA)).unwrap().unwrap();
        grid.commit();
        grid.rebase();

        assert_eq!(grid.history_len(), 0);
        assert_eq!(grid.tiles_at(0), grid.tiles());

        grid.step().unwrap();
        grid.commit();
        assert_eq!(grid.history_len(), 1);
        assert_eq!(
            grid.tiles_at(0)[grid.dimensions().index_of(Location2D::new(0, 3))],
            BTreeSet::from([terrain_simple::STATE_SEA])
        );
    }

    #[test]
    fn step_reports_finished() {
        let mut grid = checkers_grid(2, 2);
        grid.collapse(0, 0, None).unwrap().unwrap();
        assert_eq!(grid.step(), Err(Interruption::Finished));
    }

    #[test]
    fn same_seed_same_outcome() {
        let run = |seed| {
            let mut grid =
                Grid::new(stripes::rules(), Dimensions::new(6, 6), seed).unwrap();
            for _ in 0..36 {
                if grid.step().is_err() {
                    break;
                }
                grid.commit();
            }
            grid.tiles().to_vec()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn entropy_prefers_fewer_states() {
        let rules = stripes::rules();
        let two: Tile = BTreeSet::from([stripes::STATE_ONE, stripes::STATE_TWO]);
        assert!(shannon_entropy(&rules, &two) < shannon_entropy(&rules, &rules.possible));
    }
}
