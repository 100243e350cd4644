//! WebSocket sessions: one session worker per connection.
//!
//! Every text frame is one JSON request; every response is one text frame.
//! A failed request produces a single error frame, after which the
//! connection and its worker are torn down.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tilestep_core::GenerationEngine;
use tilestep_ops::{ErrorFrame, OpsError, RequestSender, SessionWorker, WorkerRequest, WorkerResponse};
use tracing::{debug, error, info, warn};

use crate::types::{ApiState, SessionGuard};

type SocketSink = SplitSink<WebSocket, Message>;

/// How the request reader stopped.
enum ReadOutcome {
    /// The client went away.
    Closed,
    /// A frame could not be decoded or queued.
    Rejected(OpsError),
}

/// Handler for WebSocket upgrade at GET /api/ws
pub async fn ws_handler<E: GenerationEngine>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState<E>>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
///
/// Requests are read on their own task. A full request queue then only
/// holds up the reader while responses keep flowing out.
async fn handle_socket<E: GenerationEngine>(socket: WebSocket, state: Arc<ApiState<E>>) {
    let _guard = SessionGuard::open(Arc::clone(&state));
    let worker = SessionWorker::spawn(Arc::clone(&state.gate), state.config.clone());
    info!(active = state.active_sessions(), "session_opened");

    let (requests, mut responses) = worker.split();
    let (mut sink, stream) = socket.split();
    let mut reader = tokio::spawn(read_requests(stream, requests));
    let mut reader_done = false;
    let mut rejected: Option<OpsError> = None;

    loop {
        tokio::select! {
            // Request reader stopped
            outcome = &mut reader, if !reader_done => {
                reader_done = true;
                match outcome {
                    // answer what was queued before the bad frame, then fail
                    Ok(ReadOutcome::Rejected(e)) => rejected = Some(e),
                    Ok(ReadOutcome::Closed) => break,
                    Err(e) => {
                        error!("WebSocket reader failed: {}", e);
                        break;
                    }
                }
            }

            // Responses from the session worker
            response = responses.recv() => {
                match response {
                    Some(Ok(response)) => {
                        if let Err(e) = send_response(&mut sink, &response).await {
                            error!("Failed to send WebSocket message: {}", e);
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        fail(&mut sink, &e).await;
                        break;
                    }
                    None => {
                        let e = rejected.take().unwrap_or(OpsError::WorkerClosed);
                        fail(&mut sink, &e).await;
                        break;
                    }
                }
            }
        }
    }

    reader.abort();
    responses.terminate();
    info!("session_closed");
}

/// Decode client frames and queue them on the worker.
async fn read_requests(mut stream: SplitStream<WebSocket>, requests: RequestSender) -> ReadOutcome {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let sent = match WorkerRequest::from_json(&text) {
                    Ok(request) => requests.send(request).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = sent {
                    return ReadOutcome::Rejected(e);
                }
            }
            Ok(Message::Close(_)) => {
                debug!("WebSocket client disconnected");
                return ReadOutcome::Closed;
            }
            Ok(_) => {
                // Ignore binary, ping, pong frames
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                return ReadOutcome::Closed;
            }
        }
    }
    debug!("WebSocket stream ended");
    ReadOutcome::Closed
}

/// Send a response to the client.
async fn send_response(
    sink: &mut SocketSink,
    response: &WorkerResponse,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let json = serde_json::to_string(response)?;
    sink.send(Message::Text(json.into())).await?;
    Ok(())
}

/// Report a fatal error and close the connection.
async fn fail(sink: &mut SocketSink, error: &OpsError) {
    warn!(code = error.code(), error = %error, "session_failed");
    let frame = ErrorFrame::from(error);
    if let Ok(json) = serde_json::to_string(&frame) {
        let _ = sink.send(Message::Text(json.into())).await;
    }
    let _ = sink.send(Message::Close(None)).await;
}
