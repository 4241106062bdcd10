//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};

use super::AppState;
use super::types::{
    ApiError, BuildInfo, InitQuery, InitResponse, MetricsResponse, StateResponse, StepRequest,
    StepResponse, TrajectoryQuery, TrajectoryResponse,
};
use crate::config::MicrogridConfig;
use crate::error::{SimError, StepError};
use crate::sim::kpi::KpiSnapshot;
use crate::sim::types::SimState;

fn init_response(state: &SimState) -> InitResponse {
    InitResponse {
        version: state.version,
        time_s: state.time_s,
        frequency_hz: state.frequency_hz,
        soc: state.battery.soc(),
        diesel_online: state.fleet.online_count(),
    }
}

fn not_initialized() -> ApiError {
    SimError::from(StepError::NotInitialized).into()
}

/// Initializes a fresh simulation.
///
/// `POST /api/init` with a JSON `MicrogridConfig` body → that config
/// `POST /api/init?preset=load_spike` → named preset
/// `POST /api/init` with an empty body → baseline
/// Invalid config → 400 + `ErrorResponse`
pub async fn init(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InitQuery>,
    body: Bytes,
) -> Result<Json<InitResponse>, ApiError> {
    let config = if !body.is_empty() {
        serde_json::from_slice::<MicrogridConfig>(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid config body: {e}")))?
    } else if let Some(name) = query.preset.as_deref() {
        MicrogridConfig::from_preset(name)?
    } else {
        MicrogridConfig::baseline()
    };

    let mut engine = state.engine.lock().await;
    let sim = engine.initialize(config)?;
    Ok(Json(init_response(sim)))
}

/// Re-initializes from the current config.
///
/// `POST /api/reset` → 200, or 409 before the first init
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<Json<InitResponse>, ApiError> {
    let mut engine = state.engine.lock().await;
    let sim = engine.reset()?;
    Ok(Json(init_response(sim)))
}

/// Advances the simulation and returns the last sample.
///
/// `POST /api/step {"dt": 1.0}` → one tick
/// `POST /api/step {"dt": 1.0, "steps": 60}` → sixty ticks
/// `dt <= 0` or `steps == 0` → 400; before init → 409
pub async fn step(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> Result<Json<StepResponse>, ApiError> {
    let steps = req.steps.unwrap_or(1);
    if steps == 0 {
        return Err(ApiError::BadRequest("`steps` must be at least 1".to_string()));
    }

    let mut engine = state.engine.lock().await;
    let samples = engine.run(steps, req.dt)?;
    let version = engine.state().map_or(0, |s| s.version);
    let sample = samples.into_iter().last().ok_or_else(not_initialized)?;
    Ok(Json(StepResponse { version, sample }))
}

/// Latest sample and KPIs.
///
/// `GET /api/metrics` → 200 + `MetricsResponse` JSON
pub async fn metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricsResponse>, ApiError> {
    let engine = state.engine.lock().await;
    let sim = engine.state().ok_or_else(not_initialized)?;
    Ok(Json(MetricsResponse {
        sample: sim.trajectory.latest().cloned(),
        kpis: crate::sim::kpis(sim),
    }))
}

/// Config and mutable state.
///
/// `GET /api/state` → 200 + `StateResponse` JSON
pub async fn state(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = state.engine.lock().await;
    let sim = engine.state().ok_or_else(not_initialized)?;
    let body = StateResponse {
        config: &sim.config,
        state: sim.view(),
    };
    serde_json::to_value(&body)
        .map(Json)
        .map_err(|e| ApiError::Internal(format!("state serialization failed: {e}")))
}

/// Retained samples, optionally filtered by time range in seconds.
///
/// `GET /api/trajectory` → every retained sample
/// `GET /api/trajectory?from=10&to=20` → inclusive window
/// `GET /api/trajectory?from=20&to=10` → 400 + `ErrorResponse`
pub async fn trajectory(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrajectoryQuery>,
) -> Result<Json<TrajectoryResponse>, ApiError> {
    let from = query.from.unwrap_or(f64::NEG_INFINITY);
    let to = query.to.unwrap_or(f64::INFINITY);
    if from > to {
        return Err(ApiError::BadRequest(format!(
            "`from` ({from}) must be <= `to` ({to})"
        )));
    }

    let engine = state.engine.lock().await;
    let sim = engine.state().ok_or_else(not_initialized)?;
    Ok(Json(TrajectoryResponse {
        samples: sim.trajectory.window(from, to),
        stats: sim.trajectory.window_stats(from, to),
    }))
}

/// KPI snapshot.
///
/// `GET /api/kpis` → 200 + `KpiSnapshot` JSON
pub async fn kpis(State(state): State<Arc<AppState>>) -> Result<Json<KpiSnapshot>, ApiError> {
    let engine = state.engine.lock().await;
    Ok(Json(engine.kpis()?))
}

/// `GET /api/info` → crate name and version.
pub async fn info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::sim::engine::Engine;

    fn initialized_state() -> Arc<AppState> {
        let mut engine = Engine::new();
        engine
            .initialize(MicrogridConfig::baseline())
            .expect("baseline is valid");
        engine.run(30, 1.0).expect("run");
        Arc::new(AppState::new(engine))
    }

    async fn send(
        state: Arc<AppState>,
        method: &str,
        uri: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn step_before_init_is_conflict() {
        let state = Arc::new(AppState::default());
        let (status, json) = send(state, "POST", "/api/step", r#"{"dt":1.0}"#).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn init_with_empty_body_uses_baseline() {
        let state = Arc::new(AppState::default());
        let (status, json) = send(Arc::clone(&state), "POST", "/api/init", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["version"], 0);
        assert_eq!(json["frequency_hz"], 60.0);
        let engine = state.engine.lock().await;
        let cfg = engine.state().map(|s| (*s.config).clone());
        assert_eq!(cfg, Some(MicrogridConfig::baseline()));
    }

    #[tokio::test]
    async fn init_with_preset_query() {
        let state = Arc::new(AppState::default());
        let (status, json) = send(state, "POST", "/api/init?preset=solar_noon", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["diesel_online"], 0);
    }

    #[tokio::test]
    async fn init_with_invalid_config_is_bad_request() {
        let mut cfg = MicrogridConfig::baseline();
        cfg.system.damping = 0.0;
        let body = serde_json::to_string(&cfg).unwrap();
        let state = Arc::new(AppState::default());
        let (status, json) = send(state, "POST", "/api/init", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("damping"));
    }

    #[tokio::test]
    async fn step_advances_version() {
        let state = initialized_state();
        let (status, json) =
            send(state, "POST", "/api/step", r#"{"dt":1.0,"steps":5}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["version"], 35);
        assert_eq!(json["sample"]["t_s"], 35.0);
    }

    #[tokio::test]
    async fn step_with_non_positive_dt_is_bad_request() {
        let state = initialized_state();
        let (status, _) = send(Arc::clone(&state), "POST", "/api/step", r#"{"dt":0.0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let engine = state.engine.lock().await;
        assert_eq!(engine.state().map(|s| s.version), Some(30));
    }

    #[tokio::test]
    async fn metrics_returns_latest_sample_and_kpis() {
        let (status, json) = send(initialized_state(), "GET", "/api/metrics", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sample"]["t_s"], 30.0);
        assert!(json["kpis"].get("fuel_used_l").is_some());
    }

    #[tokio::test]
    async fn state_includes_config_and_view() {
        let (status, json) = send(initialized_state(), "GET", "/api/state", "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json.get("config").is_some());
        assert_eq!(json["state"]["version"], 30);
        assert_eq!(json["state"]["trajectory_len"], 30);
    }

    #[tokio::test]
    async fn trajectory_filters_inclusive_window() {
        let (status, json) =
            send(initialized_state(), "GET", "/api/trajectory?from=10&to=14", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["samples"].as_array().map(Vec::len), Some(5));
        assert_eq!(json["stats"]["samples"], 5);
    }

    #[tokio::test]
    async fn trajectory_inverted_range_is_bad_request() {
        let (status, json) =
            send(initialized_state(), "GET", "/api/trajectory?from=20&to=10", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn reset_discards_history() {
        let state = initialized_state();
        let (status, json) = send(Arc::clone(&state), "POST", "/api/reset", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["version"], 0);
        let (_, traj) = send(state, "GET", "/api/trajectory", "").await;
        assert_eq!(traj["samples"].as_array().map(Vec::len), Some(0));
        assert!(traj["stats"].is_null());
    }

    #[tokio::test]
    async fn info_reports_package() {
        let (status, json) = send(Arc::new(AppState::default()), "GET", "/api/info", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "microgrid-sim");
    }
}
