//! # Spike Injection
//!
//! A spike is a short, triggered rise of the monitored environment toward a
//! peak concentration: a quick linear rise over the first 30 % of its
//! duration, then a slower linear fall back to the trend.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ModelError, SpikeState};

/// Fraction of the spike spent rising
pub const RISE_FRACTION: f64 = 0.3;

/// Shape parameters of a spike
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpikeSettings {
    /// Simulated time the spike lasts
    pub duration: f64,
    /// Concentration reached at the top of the spike
    pub peak_ppm: f64,
}

impl Default for SpikeSettings {
    fn default() -> Self {
        Self {
            duration: 120.0,
            peak_ppm: 900.0,
        }
    }
}

impl SpikeSettings {
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ModelError::InvalidSpike(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !(self.peak_ppm.is_finite() && self.peak_ppm > 0.0) {
            return Err(ModelError::InvalidSpike(format!(
                "peak_ppm must be positive, got {}",
                self.peak_ppm
            )));
        }
        Ok(())
    }
}

/// Envelope of a spike at `progress` (elapsed / duration).
///
/// Rises linearly from 0 to 1 until [`RISE_FRACTION`], then falls linearly back
/// to 0 at `progress == 1`.
pub fn spike_factor(progress: f64) -> f64 {
    if progress < RISE_FRACTION {
        progress / RISE_FRACTION
    } else {
        1.0 - (progress - RISE_FRACTION) / (1.0 - RISE_FRACTION)
    }
}

#[derive(Debug, Clone)]
pub struct SpikeInjector {
    environment: String,
    state: SpikeState,
}

impl SpikeInjector {
    /// Injector bound to the environment with id `environment`
    pub fn new(environment: impl Into<String>, settings: SpikeSettings) -> Self {
        Self {
            environment: environment.into(),
            state: SpikeState {
                active: false,
                start_time: 0.0,
                duration: settings.duration,
                peak_ppm: settings.peak_ppm,
            },
        }
    }

    /// Id of the monitored environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn state(&self) -> SpikeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Start a spike at `time`. Returns `false` when one is already running.
    pub fn trigger(&mut self, time: f64) -> bool {
        if self.state.active {
            return false;
        }
        self.state.active = true;
        self.state.start_time = time;
        true
    }

    /// Drop any running spike
    pub fn clear(&mut self) {
        self.state.active = false;
        self.state.start_time = 0.0;
    }

    /// Offset for `env_id` at `time`, `None` when no spike applies.
    ///
    /// A spike whose duration has elapsed is deactivated here.
    pub fn offset_at(&mut self, env_id: &str, time: f64, trend: f64) -> Option<f64> {
        if !self.state.active || env_id != self.environment {
            return None;
        }

        let elapsed = time - self.state.start_time;
        if elapsed >= self.state.duration {
            self.state.active = false;
            debug!(environment = %self.environment, time, "spike ended");
            return None;
        }

        let progress = elapsed / self.state.duration;
        Some((self.state.peak_ppm - trend) * spike_factor(progress))
    }

    /// Offset for `env_id` at `time`, `0.0` when no spike applies
    pub fn current_offset(&mut self, env_id: &str, time: f64, trend: f64) -> f64 {
        self.offset_at(env_id, time, trend).unwrap_or(0.0)
    }
}
