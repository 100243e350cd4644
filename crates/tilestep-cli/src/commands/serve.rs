//! Serve command implementation.
//!
//! Serves WebSocket sessions backed by the reference engine.
//!
//! - `/api/health` - Health check
//! - `/api/presets` - Preset catalog
//! - `/api/ws` - One session per connection

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use tilestep_api::{create_api_router, create_api_state};
use tilestep_ops::Config;
use tilestep_wfc::WfcEngine;
use tokio::net::TcpListener;
use tracing::info;

/// Run the server until interrupted.
pub async fn execute(config: Config, port: u16) -> Result<()> {
    let state = create_api_state(WfcEngine::new(), config);
    let app = Router::new().nest("/api", create_api_router(state));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!();
    println!("Tilestep Server");
    println!("   API: http://localhost:{}/api/health", port);
    println!("   WS:  ws://localhost:{}/api/ws", port);
    println!();
    println!("   Press Ctrl+C to stop");
    println!();

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "server_listening");
    axum::serve(listener, app).await?;
    Ok(())
}
