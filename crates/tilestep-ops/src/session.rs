//! Session state: the live grid handle, its seed and strategy, plus the
//! custom rule registry that outlives handle rebuilds.

use std::fmt;
use std::sync::Arc;

use tilestep_core::{Dimensions, GenerationEngine, GridHandle, TileState};
use tracing::info;

use crate::backtrack::BacktrackSelector;
use crate::error::{OpsError, OpsResult};
use crate::history;
use crate::requests::{RequestKind, SessionSettings};
use crate::responses::RenderedState;
use crate::rules::{self, CustomRuleRegistry};
use crate::seed::SeedPolicy;

/// Why a session was (re)built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    /// First request of the worker.
    FirstUse,
    /// An explicit `reset` request.
    Requested,
    /// A grid-moving request arrived after the grid finished.
    Finished,
}

impl ResetCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetCause::FirstUse => "first_use",
            ResetCause::Requested => "requested",
            ResetCause::Finished => "finished",
        }
    }
}

impl fmt::Display for ResetCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One live grid and everything built alongside it.
pub struct Session<E: GenerationEngine> {
    handle: E::Handle,
    backtrack: BacktrackSelector<E::Strategy>,
}

impl<E: GenerationEngine> Session<E> {
    pub fn handle(&self) -> &E::Handle {
        &self.handle
    }

    /// Seed the live handle was built with.
    pub fn seed(&self) -> u64 {
        self.handle.seed()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.handle.dimensions()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn tick(&mut self) -> Option<bool> {
        self.handle.tick(self.backtrack.strategy_mut())
    }

    pub fn run(&mut self, max_steps: usize) -> Option<bool> {
        self.handle.run(max_steps, self.backtrack.strategy_mut())
    }

    pub fn collapse(
        &mut self,
        x: usize,
        y: usize,
        state: Option<TileState>,
    ) -> OpsResult<Option<bool>> {
        Ok(self.handle.collapse(x, y, state)?)
    }

    pub fn render(&self, output_size: usize, t: Option<usize>) -> RenderedState {
        history::render(&self.handle, output_size, t)
    }
}

/// Owns the session of one worker.
pub struct SessionManager<E: GenerationEngine> {
    engine: Arc<E>,
    session: Option<Session<E>>,
    registry: CustomRuleRegistry,
    seeds: SeedPolicy,
}

impl<E: GenerationEngine> SessionManager<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self::with_seed_policy(engine, SeedPolicy::new())
    }

    pub fn with_seed_policy(engine: Arc<E>, seeds: SeedPolicy) -> Self {
        Self {
            engine,
            session: None,
            registry: CustomRuleRegistry::new(),
            seeds,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn registry(&self) -> &CustomRuleRegistry {
        &self.registry
    }

    /// True when a session exists and its grid is finished.
    pub fn is_finished(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_finished)
    }

    /// Bring the session up to date with `settings`.
    ///
    /// Applies `customRules` to the registry, builds the session if none
    /// exists yet and re-selects the backtracking variant. Returns true when
    /// a new handle was built.
    pub fn ensure(&mut self, settings: &SessionSettings, kind: RequestKind) -> OpsResult<bool> {
        if let Some(bundles) = &settings.custom_rules {
            self.registry.replace(bundles.iter().cloned());
        }

        if let Some(session) = self.session.as_mut() {
            session.backtrack.select(&*self.engine, settings.backtracker);
            return Ok(false);
        }
        self.reset(settings, kind, ResetCause::FirstUse)?;
        Ok(true)
    }

    /// Build a new session from `settings` and swap it in.
    ///
    /// The first build of a worker takes `settings.seed.value` as is; later
    /// rebuilds go through the seed policy. The old session stays live if
    /// building fails. The registry is kept.
    pub fn reset(
        &mut self,
        settings: &SessionSettings,
        kind: RequestKind,
        cause: ResetCause,
    ) -> OpsResult<()> {
        let engine = &*self.engine;
        let rules = rules::resolve(engine, &settings.rules, &self.registry)?;
        let seed = match cause {
            ResetCause::FirstUse => settings.seed.value,
            _ => self.seeds.choose(&settings.seed, kind),
        };
        let mut handle = engine.create_handle(seed, rules, settings.dimensions)?;

        if let Some(ground) = settings.rules.as_preset().and_then(|p| p.ground_anchor()) {
            let bottom = handle.dimensions().height.saturating_sub(1);
            handle.collapse(0, bottom, Some(ground))?;
            handle.rebase();
        }

        let mut backtrack = BacktrackSelector::new();
        backtrack.select(engine, settings.backtracker);

        info!(
            cause = %cause,
            kind = %kind,
            rules = settings.rules.name(),
            seed = handle.seed(),
            width = settings.dimensions.width,
            height = settings.dimensions.height,
            "session_built"
        );
        self.session = Some(Session { handle, backtrack });
        Ok(())
    }

    /// The live session.
    pub fn live(&mut self) -> OpsResult<&mut Session<E>> {
        self.session
            .as_mut()
            .ok_or_else(|| OpsError::protocol("no session has been built"))
    }

    /// Render the live session.
    pub fn render(&self, output_size: usize, t: Option<usize>) -> OpsResult<RenderedState> {
        self.session
            .as_ref()
            .map(|session| session.render(output_size, t))
            .ok_or_else(|| OpsError::protocol("no session has been built"))
    }
}
