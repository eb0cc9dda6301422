use serde::Serialize;

use super::{ModelError, PatternTable};

/// How an environment's spike-free trend evolves over the horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendStrategy {
    /// Straight line from the baseline to `target_ppm` at the end of the horizon
    Linear { target_ppm: f64 },
    /// Baseline scaled by a time-of-day pattern
    Pattern(PatternTable),
}

/// Natural variation layered on top of the trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Variation {
    None,
    /// `sin(time / period) * amplitude` plus uniform noise in `[-jitter, jitter]`
    Oscillating {
        period: f64,
        amplitude: f64,
        jitter: f64,
    },
    /// Multiplies the trend by a uniform factor in `[1 - spread, 1 + spread)`
    Proportional { spread: f64 },
}

/// Immutable description of one monitored place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Environment {
    pub id: String,
    pub display_name: String,
    pub baseline_ppm: f64,
    pub trend: TrendStrategy,
    pub variation: Variation,
}

impl Environment {
    /// Environment that drifts linearly from `baseline_ppm` to `target_ppm`
    pub fn linear(
        id: impl Into<String>,
        display_name: impl Into<String>,
        baseline_ppm: f64,
        target_ppm: f64,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            baseline_ppm,
            trend: TrendStrategy::Linear { target_ppm },
            variation: Variation::None,
        }
    }

    /// Environment following a daily pattern around `baseline_ppm`
    pub fn patterned(
        id: impl Into<String>,
        display_name: impl Into<String>,
        baseline_ppm: f64,
        pattern: PatternTable,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            baseline_ppm,
            trend: TrendStrategy::Pattern(pattern),
            variation: Variation::None,
        }
    }

    pub fn with_variation(mut self, variation: Variation) -> Self {
        self.variation = variation;
        self
    }

    pub fn pattern(&self) -> Option<&PatternTable> {
        match &self.trend {
            TrendStrategy::Pattern(pattern) => Some(pattern),
            TrendStrategy::Linear { .. } => None,
        }
    }

    /// Check the numeric fields that construction cannot enforce
    pub fn validate(&self) -> Result<(), ModelError> {
        if !(self.baseline_ppm.is_finite() && self.baseline_ppm > 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "baseline_ppm",
                value: self.baseline_ppm,
            });
        }
        if let TrendStrategy::Linear { target_ppm } = self.trend {
            if !(target_ppm.is_finite() && target_ppm > 0.0) {
                return Err(ModelError::InvalidParameter {
                    name: "target_ppm",
                    value: target_ppm,
                });
            }
        }
        match self.variation {
            Variation::None => Ok(()),
            Variation::Oscillating {
                period,
                amplitude,
                jitter,
            } => {
                if !(period.is_finite() && period > 0.0) {
                    Err(ModelError::InvalidParameter {
                        name: "variation period",
                        value: period,
                    })
                } else if !(amplitude.is_finite() && amplitude >= 0.0) {
                    Err(ModelError::InvalidParameter {
                        name: "variation amplitude",
                        value: amplitude,
                    })
                } else if !(jitter.is_finite() && jitter >= 0.0) {
                    Err(ModelError::InvalidParameter {
                        name: "variation jitter",
                        value: jitter,
                    })
                } else {
                    Ok(())
                }
            }
            Variation::Proportional { spread } => {
                if (0.0..1.0).contains(&spread) {
                    Ok(())
                } else {
                    Err(ModelError::InvalidParameter {
                        name: "variation spread",
                        value: spread,
                    })
                }
            }
        }
    }
}
