//! Session workers: one background task per session, fed over channels.
//!
//! A worker owns its [`SessionContext`] outright, so requests never share
//! state across sessions. All workers of a process share one
//! [`EngineGate`], which initializes the engine before the first request
//! anywhere is served.

use std::sync::Arc;

use tilestep_core::GenerationEngine;
use tokio::sync::{mpsc, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::context::SessionContext;
use crate::error::{OpsError, OpsResult};
use crate::requests::WorkerRequest;
use crate::responses::WorkerResponse;

/// One-shot engine initialization shared by every worker.
pub struct EngineGate<E> {
    engine: Arc<E>,
    ready: OnceCell<()>,
}

impl<E: GenerationEngine> EngineGate<E> {
    pub fn new(engine: E) -> Arc<Self> {
        Arc::new(Self {
            engine: Arc::new(engine),
            ready: OnceCell::new(),
        })
    }

    /// Wait until the engine is initialized, running the initialization if
    /// nobody has yet. A failed initialization is retried by the next caller.
    pub async fn ready(&self) -> OpsResult<&Arc<E>> {
        self.ready
            .get_or_try_init(|| async {
                info!(engine = self.engine.name(), "engine_initializing");
                self.engine.initialize().map_err(OpsError::from)
            })
            .await?;
        Ok(&self.engine)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// The engine, initialized or not.
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }
}

/// Starts session workers.
pub struct SessionWorker;

impl SessionWorker {
    /// Spawn a worker task and return the handle that talks to it.
    pub fn spawn<E: GenerationEngine>(gate: Arc<EngineGate<E>>, config: Config) -> WorkerHandle {
        Self::spawn_with(gate, config, SessionContext::new)
    }

    /// Spawn a worker whose context is built by `make_context` once the
    /// engine is ready.
    pub fn spawn_with<E, F>(gate: Arc<EngineGate<E>>, config: Config, make_context: F) -> WorkerHandle
    where
        E: GenerationEngine,
        F: FnOnce(Arc<E>, Config) -> SessionContext<E> + Send + 'static,
    {
        let capacity = config.channel_capacity.max(1);
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (response_tx, response_rx) = mpsc::channel(capacity);
        let task = tokio::spawn(run_worker(gate, config, make_context, request_rx, response_tx));
        WorkerHandle {
            requests: RequestSender {
                requests: request_tx,
            },
            responses: ResponseReceiver {
                responses: response_rx,
                task,
            },
        }
    }
}

async fn run_worker<E, F>(
    gate: Arc<EngineGate<E>>,
    config: Config,
    make_context: F,
    mut requests: mpsc::Receiver<WorkerRequest>,
    responses: mpsc::Sender<OpsResult<WorkerResponse>>,
) where
    E: GenerationEngine,
    F: FnOnce(Arc<E>, Config) -> SessionContext<E>,
{
    let mut make_context = Some(make_context);
    let mut context: Option<SessionContext<E>> = None;

    while let Some(request) = requests.recv().await {
        let result = match gate.ready().await {
            Ok(engine) => {
                if context.is_none() {
                    if let Some(make) = make_context.take() {
                        context = Some(make(Arc::clone(engine), config.clone()));
                    }
                }
                match context.as_mut() {
                    Some(context) => context.handle(request).await,
                    None => Err(OpsError::WorkerClosed),
                }
            }
            Err(e) => Err(e),
        };

        let fatal = result.as_ref().err().map(ToString::to_string);
        if responses.send(result).await.is_err() {
            debug!("worker_owner_gone");
            break;
        }
        if let Some(message) = fatal {
            warn!(error = %message, "worker_failed");
            break;
        }
    }
    debug!("worker_stopped");
}

/// The owner's end of a session worker.
///
/// Dropping the handle closes the request channel, which stops the worker.
pub struct WorkerHandle {
    requests: RequestSender,
    responses: ResponseReceiver,
}

impl WorkerHandle {
    /// Queue a request.
    pub async fn send(&self, request: WorkerRequest) -> OpsResult<()> {
        self.requests.send(request).await
    }

    /// Next response, `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<OpsResult<WorkerResponse>> {
        self.responses.recv().await
    }

    /// Send one request and wait for its response.
    pub async fn request(&mut self, request: WorkerRequest) -> OpsResult<WorkerResponse> {
        self.send(request).await?;
        self.recv().await.unwrap_or(Err(OpsError::WorkerClosed))
    }

    /// True once the worker task has exited.
    pub fn is_finished(&self) -> bool {
        self.responses.is_finished()
    }

    /// Stop the worker without waiting for queued requests.
    pub fn terminate(self) {
        self.responses.terminate();
    }

    /// Separate the two directions, so one task can keep queueing requests
    /// while another drains responses.
    pub fn split(self) -> (RequestSender, ResponseReceiver) {
        (self.requests, self.responses)
    }
}

/// Request half of a split [`WorkerHandle`].
///
/// Once every sender is dropped the worker finishes its queue and stops.
#[derive(Clone)]
pub struct RequestSender {
    requests: mpsc::Sender<WorkerRequest>,
}

impl RequestSender {
    /// Queue a request, waiting while the queue is full.
    pub async fn send(&self, request: WorkerRequest) -> OpsResult<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| OpsError::WorkerClosed)
    }
}

/// Response half of a split [`WorkerHandle`]. Owns the worker task.
pub struct ResponseReceiver {
    responses: mpsc::Receiver<OpsResult<WorkerResponse>>,
    task: JoinHandle<()>,
}

impl ResponseReceiver {
    /// Next response, `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<OpsResult<WorkerResponse>> {
        self.responses.recv().await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the worker without waiting for queued requests.
    pub fn terminate(self) {
        self.task.abort();
    }
}
