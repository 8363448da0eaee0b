//! Curriculum backend: coding-practice API server and data tooling.
//!
//! - Axum HTTP API (topics, problems, rendering, run/submit, leaderboard)
//! - Mentor chat, single-shot and SSE-streamed, via OpenAI when configured
//! - Offline `merge`, `clean` and `audit` subcommands for the JSON data files
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT            : u16 (default 3000)
//!   CONFIG_PATH     : path to TOML config (curriculum path, judge, prompts)
//!   CURRICULUM_PATH : aggregate curriculum JSON (overrides config)
//!   RUNNER_URL      : Piston-compatible code runner base URL (overrides config)
//!   OPENAI_API_KEY  : enables the OpenAI mentor if present
//!   OPENAI_BASE_URL : default "https://api.openai.com/v1"
//!   OPENAI_MODEL    : default "gpt-4o-mini"
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod boilerplate;
mod cli;
mod config;
mod curation;
mod domain;
mod error;
mod judge;
mod leaderboard;
mod logic;
mod normalize;
mod openai;
mod protocol;
mod render;
mod routes;
mod seeds;
mod state;
mod store;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::cli::{Cli, Commands};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  telemetry::init_tracing();

  let cli = Cli::parse();
  match cli.command.unwrap_or(Commands::Serve) {
    Commands::Serve => serve().await,
    Commands::Merge { dir, output } => cli::run_merge(&dir, &output),
    Commands::Clean { input, output, passes } => cli::run_clean(&input, output.as_deref(), &passes),
    Commands::Audit { input, json, strict } => cli::run_audit(&input, json, strict),
  }
}

#[instrument(level = "info")]
async fn serve() -> anyhow::Result<()> {
  // Build shared application state (curriculum, in-memory stores, clients, prompts).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await.with_context(|| format!("binding {addr}"))?;
  info!(target: "curriculum_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server error")?;
  info!(target: "curriculum_backend", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "curriculum_backend", error = %e, "Failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
  info!(target: "curriculum_backend", "Shutdown signal received");
}
