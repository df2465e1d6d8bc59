//! Talentia · Adaptive Practice Backend
//!
//! - Task generators for 12 kinds of early-math and visual-logic tasks
//! - Adaptive difficulty controller (level 1..=3 plus a range modifier)
//! - Axum HTTP + WebSocket API over 3-task sessions
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   TALENTIA_CONFIG_PATH  : path to TOML config (store + analytics caps)
//!   TALENTIA_DATA_DIR     : JSON record directory; overrides the config file
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod achievements;
mod analytics;
mod config;
mod difficulty;
mod domain;
mod generators;
mod logic;
mod profile;
mod progress;
mod protocol;
mod routes;
mod state;
mod store;
mod telemetry;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

use crate::config::load_config_from_env;
use crate::routes::build_router;
use crate::state::AppState;

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "talentia_backend", error = %e, "Cannot listen for ctrl-c; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "talentia_backend", "Shutdown signal received");
}

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, key/value store, in-flight sessions.
  let state = Arc::new(AppState::new(load_config_from_env()));

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "talentia_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  Ok(())
}
