//! Which states exist and which may be placed next to each other.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tilestep_core::{Direction2D, EngineError, EngineResult, RuleData, TileState};

/// A 2D adjacency ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Every state a tile may take.
    pub possible: BTreeSet<TileState>,

    /// If `(A, RIGHT, B)` is present, B may sit to the right of A and A to
    /// the left of B. Both orientations are always stored.
    pub allowed: HashSet<(TileState, Direction2D, TileState)>,

    /// Relative frequency of a state. Missing states weigh 1.
    #[serde(default)]
    pub weights: HashMap<TileState, usize>,

    /// ARGB color of each state.
    #[serde(default)]
    pub state_representations: HashMap<TileState, u32>,
}

impl RuleSet {
    /// Build a ruleset, adding the mirrored entry of every adjacency.
    pub fn new(
        possible: BTreeSet<TileState>,
        allowed: HashSet<(TileState, Direction2D, TileState)>,
        weights: HashMap<TileState, usize>,
        state_representations: HashMap<TileState, u32>,
    ) -> Self {
        Self {
            possible,
            allowed: with_mirrored(allowed),
            weights,
            state_representations,
        }
    }

    /// Load a ruleset from JSON and validate it.
    pub fn from_json(serialized: &str) -> EngineResult<Self> {
        let raw: RuleSet = serde_json::from_str(serialized)?;
        let rules = Self::new(
            raw.possible,
            raw.allowed,
            raw.weights,
            raw.state_representations,
        );
        rules.validate()?;
        Ok(rules)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn validate(&self) -> EngineResult<()> {
        if self.possible.is_empty() {
            return Err(EngineError::invalid_rules("no possible states"));
        }
        if let Some((a, direction, b)) = self
            .allowed
            .iter()
            .find(|(a, _, b)| !self.possible.contains(a) || !self.possible.contains(b))
        {
            return Err(EngineError::invalid_rules(format!(
                "adjacency ({a}, {direction}, {b}) refers to an unknown state"
            )));
        }
        Ok(())
    }

    /// Keep the states of `target` that are allowed next to at least one
    /// state of `source`, where `source` lies in `direction` from the target.
    pub fn check_states(
        &self,
        target: &BTreeSet<TileState>,
        source: &BTreeSet<TileState>,
        direction: Direction2D,
    ) -> BTreeSet<TileState> {
        target
            .iter()
            .copied()
            .filter(|state| {
                source
                    .iter()
                    .any(|other| self.allowed.contains(&(*state, direction, *other)))
            })
            .collect()
    }

    /// Weight of a state.
    pub fn weight(&self, state: TileState) -> usize {
        self.weights.get(&state).copied().unwrap_or(1)
    }

    /// ARGB color of a state, if it has one.
    pub fn represent(&self, state: TileState) -> Option<u32> {
        self.state_representations.get(&state).copied()
    }
}

impl RuleData for RuleSet {
    fn check(
        &self,
        target: &[TileState],
        source: &[TileState],
        direction: Direction2D,
    ) -> Vec<TileState> {
        let target: BTreeSet<_> = target.iter().copied().collect();
        let source: BTreeSet<_> = source.iter().copied().collect();
        self.check_states(&target, &source, direction)
            .into_iter()
            .collect()
    }
}

fn with_mirrored(
    allowed: HashSet<(TileState, Direction2D, TileState)>,
) -> HashSet<(TileState, Direction2D, TileState)> {
    let mut mirrored = HashSet::with_capacity(allowed.len() * 2);
    for (a, direction, b) in allowed {
        mirrored.insert((a, direction, b));
        mirrored.insert((b, direction.mirror(), a));
    }
    mirrored
}
