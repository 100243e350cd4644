//! Contradiction recovery strategies.

use std::collections::{BTreeSet, HashMap, VecDeque};

use tilestep_core::{BacktrackVariant, Location2D};
use tracing::debug;

use crate::grid::{Grid, Interruption, StepResult};

/// How often a strategy may retry before a contradiction is reported.
const MAX_RECOVERY_TRIES: usize = 8;

/// A backtracking strategy, built fresh for each variant selection.
#[derive(Debug, Clone)]
pub enum Backtracker {
    /// Reset the whole grid on contradiction.
    Reset,
    /// Reset an area around the contradiction whose radius grows
    /// quadratically with the number of contradictions seen at that cell.
    GradualReset {
        reset_count: HashMap<Location2D, usize>,
    },
}

impl Backtracker {
    pub fn new(variant: BacktrackVariant) -> Self {
        match variant {
            BacktrackVariant::Reset => Backtracker::Reset,
            BacktrackVariant::GradualReset => Backtracker::GradualReset {
                reset_count: HashMap::new(),
            },
        }
    }

    pub fn variant(&self) -> BacktrackVariant {
        match self {
            Backtracker::Reset => BacktrackVariant::Reset,
            Backtracker::GradualReset { .. } => BacktrackVariant::GradualReset,
        }
    }

    /// Handle a contradiction, retrying while handling produces new ones.
    pub fn recover(&mut self, grid: &mut Grid, at: Location2D) -> StepResult {
        let mut location = at;
        for attempt in 1..=MAX_RECOVERY_TRIES {
            match self.handle(grid, location) {
                Ok(()) | Err(Interruption::Finished) => return Ok(()),
                Err(Interruption::Contradiction(next)) => {
                    debug!(attempt, x = next.x, y = next.y, "recovery_contradiction");
                    location = next;
                }
            }
        }
        Err(Interruption::Contradiction(location))
    }

    fn handle(&mut self, grid: &mut Grid, at: Location2D) -> StepResult {
        match self {
            Backtracker::Reset => {
                grid.reset();
                Ok(())
            }
            Backtracker::GradualReset { reset_count } => {
                let count = reset_count.entry(at).or_insert(0);
                *count += 1;
                gradual_reset(grid, at, count.pow(2))
            }
        }
    }
}

/// Reset every cell within `radius` steps of `at`, then rebuild the cells
/// bordering that area from their untouched neighbours.
fn gradual_reset(grid: &mut Grid, at: Location2D, radius: usize) -> StepResult {
    let dimensions = grid.dimensions();

    let mut area = BTreeSet::from([at]);
    let mut queue = VecDeque::from([(at, 0)]);
    while let Some((current, distance)) = queue.pop_front() {
        if distance == radius {
            continue;
        }
        for (_, neighbour) in dimensions.neighbours(current) {
            if area.insert(neighbour) {
                queue.push_back((neighbour, distance + 1));
            }
        }
    }

    if area.len() == dimensions.area() {
        grid.reset();
        return Ok(());
    }

    let border: BTreeSet<Location2D> = area
        .iter()
        .flat_map(|location| dimensions.neighbours(*location))
        .map(|(_, neighbour)| neighbour)
        .filter(|neighbour| !area.contains(neighbour))
        .collect();

    debug!(
        x = at.x,
        y = at.y,
        radius,
        area = area.len(),
        border = border.len(),
        "gradual_reset"
    );

    let possible = grid.rules().possible.clone();
    for location in area.iter().chain(border.iter()) {
        grid.set_tile(dimensions.index_of(*location), possible.clone());
    }

    let mut rechecks = VecDeque::new();
    for location in &border {
        let index = dimensions.index_of(*location);
        rechecks.extend(grid.rechecks_of(index));
    }
    grid.propagate(rechecks)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use tilestep_core::{Dimensions, Direction2D};

    use super::*;
    use crate::rules::RuleSet;

    const STATE_A: u64 = 0;
    const STATE_B: u64 = 1;

    /// A 2x2 grid where `target` is contradicted and every other cell is A.
    fn contradicted_grid(width: usize, height: usize, target: Location2D) -> Grid {
        let rules = RuleSet::new(
            BTreeSet::from([STATE_A, STATE_B]),
            HashSet::from([
                (STATE_A, Direction2D::Down, STATE_A),
                (STATE_A, Direction2D::Left, STATE_A),
                (STATE_B, Direction2D::Down, STATE_B),
                (STATE_B, Direction2D::Left, STATE_B),
                (STATE_A, Direction2D::Up, STATE_B),
                (STATE_A, Direction2D::Right, STATE_B),
                (STATE_A, Direction2D::Down, STATE_B),
                (STATE_A, Direction2D::Left, STATE_B),
            ]),
            HashMap::new(),
            HashMap::new(),
        );
        let dimensions = Dimensions::new(width, height);
        let mut grid = Grid::new(rules, dimensions, 0).unwrap();
        for index in 0..dimensions.area() {
            let tile = if dimensions.location_of(index) == target {
                BTreeSet::new()
            } else {
                BTreeSet::from([STATE_A])
            };
            grid.set_tile(index, tile);
        }
        grid.commit();
        grid
    }

    fn states(grid: &Grid, x: usize, y: usize) -> Vec<u64> {
        grid.tile(Location2D::new(x, y)).unwrap().iter().copied().collect()
    }

    #[test]
    fn reset_clears_the_whole_grid() {
        let target = Location2D::new(0, 0);
        let mut grid = contradicted_grid(2, 2, target);
        let mut backtracker = Backtracker::new(BacktrackVariant::Reset);

        backtracker.recover(&mut grid, target).unwrap();
        assert!(grid.tiles().iter().all(|tile| tile.len() == 2));
    }

    #[test]
    fn gradual_reset_grows_with_repeated_contradictions() {
        let target = Location2D::new(0, 0);
        let mut backtracker = Backtracker::new(BacktrackVariant::GradualReset);

        // first time: radius 1 covers the target and its direct neighbours
        let mut grid = contradicted_grid(3, 3, target);
        backtracker.recover(&mut grid, target).unwrap();
        assert_eq!(states(&grid, 0, 0), vec![STATE_A, STATE_B]);
        assert_eq!(states(&grid, 1, 0), vec![STATE_A, STATE_B]);
        assert_eq!(states(&grid, 0, 1), vec![STATE_A, STATE_B]);
        assert_eq!(states(&grid, 2, 2), vec![STATE_A]);

        // second time: radius 4 covers the whole grid
        let mut grid = contradicted_grid(3, 3, target);
        backtracker.recover(&mut grid, target).unwrap();
        assert!(grid.tiles().iter().all(|tile| tile.len() == 2));
    }

    #[test]
    fn variant_round_trips() {
        for variant in [BacktrackVariant::Reset, BacktrackVariant::GradualReset] {
            assert_eq!(Backtracker::new(variant).variant(), variant);
        }
    }
}
