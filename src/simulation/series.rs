//! # Smoothed Series
//!
//! Tracks an exponentially smoothed current value per environment and records
//! a sparse, rounded sample history for charting.

use std::collections::BTreeMap;

use crate::domain::{ModelError, Sample};

/// Smoothing factor used unless a simulation asks for another one
pub const DEFAULT_SMOOTHING: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SmoothedSeries {
    alpha: f64,
    current: BTreeMap<String, f64>,
    history: BTreeMap<String, Vec<Sample>>,
}

impl SmoothedSeries {
    /// `alpha` must lie in `(0, 1]`; `1.0` tracks the target exactly
    pub fn new(alpha: f64) -> Result<Self, ModelError> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ModelError::InvalidSmoothing(alpha));
        }
        Ok(Self {
            alpha,
            current: BTreeMap::new(),
            history: BTreeMap::new(),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Forget all history and set every environment's value to its baseline
    pub fn reset<'a>(&mut self, baselines: impl IntoIterator<Item = (&'a str, f64)>) {
        self.current.clear();
        self.history.clear();
        for (env, baseline) in baselines {
            self.current.insert(env.to_string(), baseline);
            self.history.insert(env.to_string(), Vec::new());
        }
    }

    /// Move `env` a fraction `alpha` of the way toward `target`
    pub fn update(&mut self, env: &str, target: f64) -> f64 {
        let current = self.current.entry(env.to_string()).or_insert(target);
        *current += (target - *current) * self.alpha;
        *current
    }

    /// Record the current value of `env` at `time` if at least `min_interval`
    /// has passed since the last sample. Returns whether a sample was added.
    pub fn maybe_sample(&mut self, env: &str, time: f64, min_interval: f64) -> bool {
        let Some(&value) = self.current.get(env) else {
            return false;
        };
        let history = self.history.entry(env.to_string()).or_default();

        let due = match history.last() {
            None => true,
            Some(last) => time > last.time && time - last.time >= min_interval,
        };
        if due {
            history.push(Sample::rounded(time, value));
        }
        due
    }

    pub fn current(&self, env: &str) -> Option<f64> {
        self.current.get(env).copied()
    }

    pub fn history(&self, env: &str) -> &[Sample] {
        self.history.get(env).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of environments holding at least one sample
    pub fn sampled_environments(&self) -> usize {
        self.history.values().filter(|h| !h.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series() -> SmoothedSeries {
        let mut series = SmoothedSeries::new(DEFAULT_SMOOTHING).unwrap();
        series.reset([("classroom", 460.0), ("park", 460.0)]);
        series
    }

    #[test]
    fn test_update_moves_tenth_of_the_gap() {
        let mut series = series();
        assert!((series.update("classroom", 560.0) - 470.0).abs() < 1e-9);
        assert!((series.update("classroom", 560.0) - 479.0).abs() < 1e-9);
        assert_eq!(series.current("park"), Some(460.0));
    }

    #[test]
    fn test_first_sample_always_recorded() {
        let mut series = series();
        assert!(series.maybe_sample("classroom", 0.0, 60.0));
        assert_eq!(series.history("classroom"), &[Sample { time: 0.0, ppm: 460.0 }]);
    }

    #[test]
    fn test_samples_respect_min_interval() {
        let mut series = series();
        series.maybe_sample("classroom", 0.0, 60.0);
        assert!(!series.maybe_sample("classroom", 30.0, 60.0));
        assert!(!series.maybe_sample("classroom", 59.0, 60.0));
        assert!(series.maybe_sample("classroom", 60.0, 60.0));
        assert_eq!(series.history("classroom").len(), 2);
    }

    #[test]
    fn test_sample_values_rounded() {
        let mut series = series();
        series.update("classroom", 461.234);
        series.maybe_sample("classroom", 0.0, 60.0);
        assert_eq!(series.history("classroom")[0].ppm, 460.1);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut series = series();
        series.update("classroom", 900.0);
        series.maybe_sample("classroom", 0.0, 60.0);
        series.reset([("classroom", 460.0), ("park", 460.0)]);
        assert!(series.history("classroom").is_empty());
        assert_eq!(series.current("classroom"), Some(460.0));
        assert_eq!(series.sampled_environments(), 0);
    }

    #[test]
    fn test_unknown_environment_not_sampled() {
        let mut series = series();
        assert!(!series.maybe_sample("road", 0.0, 1.0));
        assert!(series.history("road").is_empty());
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        assert_eq!(
            SmoothedSeries::new(0.0).unwrap_err(),
            ModelError::InvalidSmoothing(0.0)
        );
        assert!(SmoothedSeries::new(1.5).is_err());
        assert!(SmoothedSeries::new(1.0).is_ok());
    }

    proptest! {
        #[test]
        fn prop_update_converges_without_overshoot(
            start in 300.0f64..1000.0,
            target in 300.0f64..1000.0,
            alpha in 0.01f64..0.99,
        ) {
            let mut series = SmoothedSeries::new(alpha).unwrap();
            series.reset([("env", start)]);
            let mut previous_gap = (target - start).abs();
            for _ in 0..200 {
                let value = series.update("env", target);
                let gap = (target - value).abs();
                prop_assert!(gap <= previous_gap);
                // Never crosses to the other side of the target
                prop_assert!((value - target) * (start - target) >= 0.0);
                previous_gap = gap;
            }
        }

        #[test]
        fn prop_sample_times_strictly_increase(
            times in proptest::collection::vec(0.0f64..2000.0, 1..200),
            interval in 0.0f64..120.0,
        ) {
            let mut series = SmoothedSeries::new(DEFAULT_SMOOTHING).unwrap();
            series.reset([("env", 460.0)]);
            for time in times {
                series.maybe_sample("env", time, interval);
            }
            let history = series.history("env");
            for pair in history.windows(2) {
                prop_assert!(pair[1].time > pair[0].time);
                prop_assert!(pair[1].time - pair[0].time >= interval);
            }
        }
    }
}
