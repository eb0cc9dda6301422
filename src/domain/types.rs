use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

// ============================================================================
// Identifiers & Units
// ============================================================================

/// The simulation variants a host can run
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SimulationKind {
    /// Thirty simulated minutes, classroom against park, frame driven
    ClassroomPark,
    /// One simulated day across classroom, park, road and corridor
    DailyEnvironments,
}

/// Unit of the simulated time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeUnit {
    Seconds,
    Hours,
}

/// Lifecycle state of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SimulationStatus {
    #[default]
    Stopped,
    Running,
    Paused,
}

// ============================================================================
// Recorded Data
// ============================================================================

/// One charted point of an environment's history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub ppm: f64,
}

impl Sample {
    /// Sample with `ppm` rounded to one decimal place
    pub fn rounded(time: f64, ppm: f64) -> Self {
        Self {
            time,
            ppm: round_to_tenth(ppm),
        }
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Transient perturbation bookkeeping for the monitored environment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeState {
    pub active: bool,
    pub start_time: f64,
    pub duration: f64,
    pub peak_ppm: f64,
}

// ============================================================================
// Snapshots
// ============================================================================

/// Per-environment view inside a [`SimulationSnapshot`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentSnapshot {
    pub id: String,
    pub display_name: String,
    pub baseline_ppm: f64,
    pub current_ppm: f64,
    pub history: Vec<Sample>,
}

/// Read-only copy of a controller's state handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    pub simulation: SimulationKind,
    pub run_id: Option<Uuid>,
    pub status: SimulationStatus,
    pub current_time: f64,
    pub max_time: f64,
    pub time_unit: TimeUnit,
    pub environments: Vec<EnvironmentSnapshot>,
    /// Present only for simulations with a monitored environment
    pub spike: Option<SpikeState>,
}

impl SimulationSnapshot {
    pub fn environment(&self, id: &str) -> Option<&EnvironmentSnapshot> {
        self.environments.iter().find(|env| env.id == id)
    }
}
