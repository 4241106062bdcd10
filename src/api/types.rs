//! API request, response and error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::config::MicrogridConfig;
use crate::error::{SimError, StepError};
use crate::sim::kpi::KpiSnapshot;
use crate::sim::trajectory::WindowStats;
use crate::sim::types::{Sample, StateView};

/// JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `POST /api/init` query.
#[derive(Debug, Default, Deserialize)]
pub struct InitQuery {
    pub preset: Option<String>,
}

/// `POST /api/step` body.
#[derive(Debug, Deserialize)]
pub struct StepRequest {
    /// Step size in seconds.
    pub dt: f64,
    /// Number of steps to run (default 1).
    #[serde(default)]
    pub steps: Option<usize>,
}

/// Response to `POST /api/step`: the last sample produced.
#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub version: u64,
    pub sample: Sample,
}

/// Response to `POST /api/init` and `POST /api/reset`.
#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub version: u64,
    pub time_s: f64,
    pub frequency_hz: f64,
    pub soc: f64,
    pub diesel_online: usize,
}

/// `GET /api/metrics`: latest sample plus KPIs.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub sample: Option<Sample>,
    pub kpis: KpiSnapshot,
}

/// `GET /api/state`: configuration and the mutable state.
#[derive(Debug, Serialize)]
pub struct StateResponse<'a> {
    pub config: &'a MicrogridConfig,
    pub state: StateView<'a>,
}

/// `GET /api/trajectory` query (seconds, inclusive).
#[derive(Debug, Default, Deserialize)]
pub struct TrajectoryQuery {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

/// `GET /api/trajectory`: samples in the window and their statistics.
#[derive(Debug, Serialize)]
pub struct TrajectoryResponse {
    pub samples: Vec<Sample>,
    pub stats: Option<WindowStats>,
}

/// `GET /api/info`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error returned by handlers, mapped to an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    Sim(SimError),
    BadRequest(String),
    Internal(String),
}

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        Self::Sim(err)
    }
}

impl From<crate::config::ConfigError> for ApiError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Sim(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Sim(SimError::InvalidStep(StepError::NotInitialized)) => {
                (StatusCode::CONFLICT, SimError::from(StepError::NotInitialized).to_string())
            }
            Self::Sim(err @ (SimError::Config(_) | SimError::InvalidStep(_))) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Sim(err @ SimError::NumericOverflow(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}
