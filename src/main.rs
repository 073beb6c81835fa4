//! Tally · Contest Judging Backend
//!
//! - Axum HTTP API for judge score sheets (single-team and batch)
//! - Optional remote scores API integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT            : u16 (default 3000)
//!   SCORES_API_URL    : enables the remote persistence backend if present
//!   SCORES_API_TOKEN  : bearer token for the remote scores API
//!   JUDGING_CONFIG_PATH : path to TOML config (contest metadata + roster)
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod config;
mod catalog;
mod codec;
mod complete;
mod lifecycle;
mod batch;
mod store;
mod client;
mod protocol;
mod state;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalogs, persistence backend).
  let state = Arc::new(AppState::new().await);
  info!(target: "tally_backend", contest = %state.contest, backend = state.backend.describe(), "State ready");

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "tally_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
