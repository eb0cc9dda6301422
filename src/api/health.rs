use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::controller::AppState;
use crate::domain::{SimulationKind, SimulationStatus};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check))
        .with_state(state)
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    simulations: Vec<SimulationHealth>,
}

/// Health of one simulation
#[derive(Debug, Serialize)]
pub struct SimulationHealth {
    simulation: SimulationKind,
    status: SimulationStatus,
    ticking: bool,
}

/// GET /health - Health check endpoint
///
/// Reports every simulation and whether its tick loop is alive
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let simulations: Vec<SimulationHealth> = state
        .simulations
        .iter()
        .map(|handle| SimulationHealth {
            simulation: handle.kind(),
            status: handle.status(),
            ticking: handle.is_ticking(),
        })
        .collect();

    // A running simulation without a loop will never advance
    let healthy = simulations
        .iter()
        .all(|s| s.status == SimulationStatus::Stopped || s.ticking);

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now(),
        simulations,
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

/// GET /health/ready - Readiness probe
///
/// Returns 200 once simulations are registered
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.simulations.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /health/live - Liveness probe
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
