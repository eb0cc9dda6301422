use thiserror::Error;

/// Errors raised while building environments and simulation definitions.
///
/// Lifecycle calls on a running simulation never fail; everything that can be
/// wrong is caught here, before a controller exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Pattern needs at least two points, got {0}")]
    PatternTooShort(usize),
    #[error("Pattern must start at or before 0, first point is at {0}")]
    PatternStartsLate(f64),
    #[error("Pattern times must be strictly increasing (point {index} at {at})")]
    PatternNotIncreasing { index: usize, at: f64 },
    #[error("Pattern multiplier must be positive and finite, got {0}")]
    InvalidMultiplier(f64),
    #[error("Pattern for '{environment}' ends at {ends_at} but the horizon is {horizon}")]
    PatternShorterThanHorizon {
        environment: String,
        ends_at: f64,
        horizon: f64,
    },
    #[error("No environments configured")]
    NoEnvironments,
    #[error("Duplicate environment id: {0}")]
    DuplicateEnvironment(String),
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),
    #[error("Smoothing factor must be in (0, 1], got {0}")]
    InvalidSmoothing(f64),
    #[error("Invalid clock setting: {0}")]
    InvalidClock(String),
    #[error("Invalid spike setting: {0}")]
    InvalidSpike(String),
    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}
