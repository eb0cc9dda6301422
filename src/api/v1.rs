use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use strum::Display;
use tokio_stream::{wrappers::WatchStream, Stream, StreamExt};

use super::{error::ApiError, response::ApiResponse};
use crate::{
    controller::{AppState, SimulationHandle},
    domain::{SimulationKind, SimulationSnapshot, SimulationStatus, TimeUnit},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/simulations", get(list_simulations))
        .route("/simulations/:kind", get(get_simulation))
        .route("/simulations/:kind/events", get(stream_simulation))
        .route("/simulations/:kind/start", post(start_simulation))
        .route("/simulations/:kind/pause", post(pause_simulation))
        .route("/simulations/:kind/stop", post(stop_simulation))
        .route("/simulations/:kind/reset", post(reset_simulation))
        .route("/simulations/:kind/spike", post(trigger_spike))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

fn lookup(state: &AppState, kind: &str) -> Result<Arc<SimulationHandle>, ApiError> {
    kind.parse::<SimulationKind>()
        .ok()
        .and_then(|kind| state.simulations.get(kind).cloned())
        .ok_or_else(|| ApiError::NotFound(format!("simulation '{kind}'")))
}

#[derive(Debug, Serialize)]
pub struct SimulationSummary {
    pub simulation: SimulationKind,
    pub status: SimulationStatus,
    pub current_time: f64,
    pub max_time: f64,
    pub time_unit: TimeUnit,
    pub environments: Vec<String>,
}

impl From<SimulationSnapshot> for SimulationSummary {
    fn from(snapshot: SimulationSnapshot) -> Self {
        Self {
            simulation: snapshot.simulation,
            status: snapshot.status,
            current_time: snapshot.current_time,
            max_time: snapshot.max_time,
            time_unit: snapshot.time_unit,
            environments: snapshot.environments.into_iter().map(|env| env.id).collect(),
        }
    }
}

pub async fn list_simulations(State(st): State<AppState>) -> impl IntoResponse {
    let summaries: Vec<SimulationSummary> = st
        .simulations
        .iter()
        .map(|handle| handle.snapshot().into())
        .collect();
    Json(summaries)
}

pub async fn get_simulation(
    State(st): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<SimulationSnapshot>, ApiError> {
    Ok(Json(lookup(&st, &kind)?.snapshot()))
}

/// Server-sent events: one `state` event per published snapshot
pub async fn stream_simulation(
    State(st): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let handle = lookup(&st, &kind)?;
    let stream = WatchStream::new(handle.subscribe()).filter_map(|snapshot| {
        snapshot.map(|snapshot| Event::default().event("state").json_data(snapshot))
    });
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    Start,
    Pause,
    Stop,
    Reset,
    Spike,
}

#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub simulation: SimulationKind,
    pub command: Command,
    /// `false` when the command's preconditions were not met and nothing changed
    pub accepted: bool,
    pub status: SimulationStatus,
    pub current_time: f64,
}

fn run_command(
    st: &AppState,
    kind: &str,
    command: Command,
) -> Result<ApiResponse<CommandResult>, ApiError> {
    let handle = lookup(st, kind)?;
    let accepted = match command {
        Command::Start => handle.start(),
        Command::Pause => handle.pause(),
        Command::Stop => handle.stop(),
        Command::Reset => {
            handle.reset();
            true
        }
        Command::Spike => handle.trigger_spike(),
    };
    tracing::debug!(simulation = %handle.kind(), %command, accepted, "command handled");

    Ok(ApiResponse::success(CommandResult {
        simulation: handle.kind(),
        command,
        accepted,
        status: handle.status(),
        current_time: handle.current_time(),
    }))
}

pub async fn start_simulation(
    State(st): State<AppState>,
    Path(kind): Path<String>,
) -> Result<ApiResponse<CommandResult>, ApiError> {
    run_command(&st, &kind, Command::Start)
}

pub async fn pause_simulation(
    State(st): State<AppState>,
    Path(kind): Path<String>,
) -> Result<ApiResponse<CommandResult>, ApiError> {
    run_command(&st, &kind, Command::Pause)
}

pub async fn stop_simulation(
    State(st): State<AppState>,
    Path(kind): Path<String>,
) -> Result<ApiResponse<CommandResult>, ApiError> {
    run_command(&st, &kind, Command::Stop)
}

pub async fn reset_simulation(
    State(st): State<AppState>,
    Path(kind): Path<String>,
) -> Result<ApiResponse<CommandResult>, ApiError> {
    run_command(&st, &kind, Command::Reset)
}

pub async fn trigger_spike(
    State(st): State<AppState>,
    Path(kind): Path<String>,
) -> Result<ApiResponse<CommandResult>, ApiError> {
    run_command(&st, &kind, Command::Spike)
}
