//! HTTP host that drives one simulation instance remotely.
//!
//! Routes:
//! - `POST /api/init`: initialize from a JSON config body, `?preset=`, or the baseline
//! - `POST /api/reset`: re-initialize from the current config
//! - `POST /api/step`: advance by `{"dt": seconds, "steps": n}`
//! - `GET /api/metrics`: latest sample and KPIs
//! - `GET /api/state`: config and mutable state
//! - `GET /api/trajectory?from=&to=`: retained samples with window statistics
//! - `GET /api/kpis`: KPI snapshot
//! - `GET /api/info`: build information

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::sync::Mutex;
use tracing::info;

use crate::sim::engine::Engine;

pub use types::{BuildInfo, ErrorResponse, StepRequest};

/// Application state shared across request handlers.
///
/// Steps mutate the engine, so it sits behind an async mutex; requests are
/// serialized and a step is never observed half-applied.
#[derive(Debug, Default)]
pub struct AppState {
    pub engine: Mutex<Engine>,
}

impl AppState {
    /// Wraps an existing engine (initialized or not).
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Mutex::new(engine),
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/init", post(handlers::init))
        .route("/api/reset", post(handlers::reset))
        .route("/api/step", post(handlers::step))
        .route("/api/metrics", get(handlers::metrics))
        .route("/api/state", get(handlers::state))
        .route("/api/trajectory", get(handlers::trajectory))
        .route("/api/kpis", get(handlers::kpis))
        .route("/api/info", get(handlers::info))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
