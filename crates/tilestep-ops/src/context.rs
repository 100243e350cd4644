//! SessionContext - dispatches requests against one session.
//!
//! The context holds the configuration and the worker's [`SessionManager`].
//! Requests are served strictly one at a time, in arrival order.

use std::sync::Arc;

use tilestep_core::{ExtractionOptions, GenerationEngine, RuleData};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{OpsError, OpsResult};
use crate::requests::*;
use crate::responses::*;
use crate::rules;
use crate::seed::SeedPolicy;
use crate::session::{ResetCause, SessionManager};

/// Request dispatcher for one worker.
pub struct SessionContext<E: GenerationEngine> {
    /// Configuration for operations.
    pub config: Config,
    sessions: SessionManager<E>,
}

impl<E: GenerationEngine> SessionContext<E> {
    /// Create a new context around an initialized engine.
    pub fn new(engine: Arc<E>, config: Config) -> Self {
        Self {
            config,
            sessions: SessionManager::new(engine),
        }
    }

    /// Same as [`SessionContext::new`] with deterministic seed draws.
    pub fn with_seed_policy(engine: Arc<E>, config: Config, seeds: SeedPolicy) -> Self {
        Self {
            config,
            sessions: SessionManager::with_seed_policy(engine, seeds),
        }
    }

    pub fn sessions(&self) -> &SessionManager<E> {
        &self.sessions
    }

    /// Serve one request.
    ///
    /// Any error is fatal for the worker that owns this context.
    pub async fn handle(&mut self, request: WorkerRequest) -> OpsResult<WorkerResponse> {
        let kind = request.kind();
        debug!(kind = %kind, "request");

        let Some(settings) = request.settings().cloned() else {
            return self.extract(request);
        };
        if kind == RequestKind::SetCustomRules && settings.custom_rules.is_none() {
            return Err(OpsError::protocol("setCustomRules without customRules"));
        }

        let mut fresh = self.sessions.ensure(&settings, kind)?;

        // =====================================================================
        // Completion policy
        // =====================================================================

        if !fresh && kind.advances_grid() && self.sessions.is_finished() {
            if kind == RequestKind::Tick {
                let delay = self.config.observation_delay();
                info!(delay_ms = delay.as_millis() as u64, "generation_finished");
                tokio::time::sleep(delay).await;
                self.sessions.reset(&settings, kind, ResetCause::Finished)?;
                return Ok(WorkerResponse::TickUpdate {
                    state: self.sessions.render(settings.output_size, None)?,
                    result: None,
                });
            }
            self.sessions.reset(&settings, kind, ResetCause::Finished)?;
            fresh = true;
        }

        // =====================================================================
        // Dispatch
        // =====================================================================

        let size = settings.output_size;
        match request {
            WorkerRequest::Reset { .. } => {
                if !fresh {
                    self.sessions.reset(&settings, kind, ResetCause::Requested)?;
                }
                Ok(WorkerResponse::StateUpdate {
                    state: self.sessions.render(size, None)?,
                })
            }
            WorkerRequest::Tick { .. } => {
                let session = self.sessions.live()?;
                let result = session.tick();
                Ok(WorkerResponse::TickUpdate {
                    state: session.render(size, None),
                    result,
                })
            }
            WorkerRequest::Run { .. } => {
                let session = self.sessions.live()?;
                let budget = self.config.run_budget(session.dimensions());
                let result = session.run(budget);
                debug!(budget, ?result, "run_finished");
                Ok(WorkerResponse::StateUpdate {
                    state: session.render(size, None),
                })
            }
            WorkerRequest::Collapse { x, y, state, .. } => {
                let session = self.sessions.live()?;
                session.collapse(x, y, state)?;
                Ok(WorkerResponse::StateUpdate {
                    state: session.render(size, None),
                })
            }
            WorkerRequest::ReadPast { t, .. } => Ok(WorkerResponse::StateUpdate {
                state: self.sessions.render(size, Some(t))?,
            }),
            WorkerRequest::RuleCheck {
                from,
                target,
                direction,
                ..
            } => {
                let rules = rules::resolve(
                    self.sessions.engine(),
                    &settings.rules,
                    self.sessions.registry(),
                )?;
                let allowed = rules.check(&target, &from, direction);
                Ok(WorkerResponse::RuleCheck {
                    allowed,
                    state: self.sessions.render(size, None)?,
                })
            }
            WorkerRequest::SetCustomRules { .. } => {
                info!(
                    names = ?self.sessions.registry().names(),
                    "custom_rules_set"
                );
                Ok(WorkerResponse::StateUpdate {
                    state: self.sessions.render(size, None)?,
                })
            }
            WorkerRequest::ExtractRules { .. } => {
                Err(OpsError::protocol("extract_rules does not address a session"))
            }
        }
    }

    // =========================================================================
    // Extraction
    // =========================================================================

    fn extract(&self, request: WorkerRequest) -> OpsResult<WorkerResponse> {
        match request {
            WorkerRequest::ExtractRules {
                name,
                source,
                options,
            } => self.extract_rules(&name, &source, options),
            other => Err(OpsError::protocol(format!(
                "{} needs session settings",
                other.kind()
            ))),
        }
    }

    /// Derive a custom rule bundle from an encoded image.
    ///
    /// Runs regardless of session state and leaves the session untouched.
    pub fn extract_rules(
        &self,
        name: &str,
        source: &[u8],
        options: ExtractionOptions,
    ) -> OpsResult<WorkerResponse> {
        let result = rules::extract(self.sessions.engine(), name, source, options)?;
        Ok(WorkerResponse::ExtractedRules { result })
    }
}
