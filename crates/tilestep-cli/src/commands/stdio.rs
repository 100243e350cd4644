//! Stdio command implementation.
//!
//! Drives one session over standard streams: each input line is a JSON
//! request, each output line a JSON response. A failed request prints one
//! error frame and ends the process with an error.

use anyhow::Result;
use serde::Serialize;
use tilestep_ops::{Config, EngineGate, ErrorFrame, SessionWorker, WorkerRequest};
use tilestep_wfc::WfcEngine;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

/// Serve requests from stdin until it closes or a request fails.
pub async fn execute(config: Config) -> Result<()> {
    let mut worker = SessionWorker::spawn(EngineGate::new(WfcEngine::new()), config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match WorkerRequest::from_json(line) {
            Ok(request) => worker.request(request).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => write_line(&mut stdout, &response).await?,
            Err(e) => {
                warn!(code = e.code(), error = %e, "session_failed");
                write_line(&mut stdout, &ErrorFrame::from(&e)).await?;
                worker.terminate();
                return Err(e.into());
            }
        }
    }

    debug!("stdin closed");
    Ok(())
}

async fn write_line<T: Serialize>(
    stdout: &mut tokio::io::Stdout,
    value: &T,
) -> Result<()> {
    let mut json = serde_json::to_string(value)?;
    json.push('\n');
    stdout.write_all(json.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
