//! The session's backtracking strategy.

use tilestep_core::{BacktrackVariant, GenerationEngine};
use tracing::debug;

/// Holds the strategy object for the selected variant.
///
/// A strategy is built when a variant is first selected and rebuilt only
/// when the variant changes, so per-variant state survives across steps.
#[derive(Debug)]
pub struct BacktrackSelector<S> {
    active: Option<(BacktrackVariant, S)>,
}

impl<S> BacktrackSelector<S> {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Select `variant`, building a strategy through `engine` if needed.
    /// `None` turns backtracking off.
    pub fn select<E>(&mut self, engine: &E, variant: Option<BacktrackVariant>)
    where
        E: GenerationEngine<Strategy = S>,
    {
        match variant {
            None => {
                if self.active.take().is_some() {
                    debug!("backtracking_disabled");
                }
            }
            Some(variant) if self.variant() == Some(variant) => {}
            Some(variant) => {
                debug!(variant = %variant, "backtracker_built");
                self.active = Some((variant, engine.build_strategy(variant)));
            }
        }
    }

    /// Currently selected variant.
    pub fn variant(&self) -> Option<BacktrackVariant> {
        self.active.as_ref().map(|(variant, _)| *variant)
    }

    /// Strategy to pass to the stepping calls.
    pub fn strategy_mut(&mut self) -> Option<&mut S> {
        self.active.as_mut().map(|(_, strategy)| strategy)
    }
}

impl<S> Default for BacktrackSelector<S> {
    fn default() -> Self {
        Self::new()
    }
}
