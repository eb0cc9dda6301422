//! # Trend Model
//!
//! Computes the spike-free trajectory of every environment and layers natural
//! variation on top of it. Variation noise comes from a seedable generator so
//! that a fixed seed reproduces a run exactly.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::{Environment, TrendStrategy, Variation};

pub struct TrendModel {
    max_time: f64,
    random_seed: Option<u64>,
    rng: StdRng,
}

impl TrendModel {
    /// Create a trend model for a horizon of `max_time` simulated units
    pub fn new(max_time: f64, random_seed: Option<u64>) -> Self {
        Self {
            max_time,
            random_seed,
            rng: Self::make_rng(random_seed),
        }
    }

    fn make_rng(random_seed: Option<u64>) -> StdRng {
        match random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Restart the noise stream; with a seed, the next run repeats the last one
    pub fn restart(&mut self) {
        self.rng = Self::make_rng(self.random_seed);
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Spike-free, noise-free trend value at `time`
    pub fn trend_value(&self, env: &Environment, time: f64) -> f64 {
        match &env.trend {
            TrendStrategy::Linear { target_ppm } => {
                let progress = time.clamp(0.0, self.max_time) / self.max_time;
                env.baseline_ppm + (target_ppm - env.baseline_ppm) * progress
            }
            TrendStrategy::Pattern(pattern) => env.baseline_ppm * pattern.multiplier_at(time),
        }
    }

    /// Apply `env`'s natural variation to an already computed trend value.
    ///
    /// Always draws from the generator for noisy variations, which keeps the
    /// noise stream aligned across environments regardless of spikes.
    pub fn vary(&mut self, env: &Environment, time: f64, trend: f64) -> f64 {
        match env.variation {
            Variation::None => trend,
            Variation::Oscillating {
                period,
                amplitude,
                jitter,
            } => {
                let noise = if jitter > 0.0 {
                    self.rng.gen_range(-jitter..jitter)
                } else {
                    0.0
                };
                trend + (time / period).sin() * amplitude + noise
            }
            Variation::Proportional { spread } => {
                let factor = if spread > 0.0 {
                    self.rng.gen_range(1.0 - spread..1.0 + spread)
                } else {
                    1.0
                };
                trend * factor
            }
        }
    }

    /// Trend plus natural variation at `time`
    pub fn target_value(&mut self, env: &Environment, time: f64) -> f64 {
        let trend = self.trend_value(env, time);
        self.vary(env, time, trend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PatternTable;
    use proptest::prelude::*;

    fn classroom() -> Environment {
        Environment::linear("classroom", "Classroom", 460.0, 700.0).with_variation(
            Variation::Oscillating {
                period: 300.0,
                amplitude: 10.0,
                jitter: 2.5,
            },
        )
    }

    fn road() -> Environment {
        let pattern = PatternTable::from_pairs(&[
            (0.0, 1.2),
            (6.0, 1.8),
            (8.0, 2.5),
            (17.0, 2.8),
            (24.0, 1.2),
        ])
        .unwrap();
        Environment::patterned("road", "Road", 420.0, pattern)
            .with_variation(Variation::Proportional { spread: 0.05 })
    }

    #[test]
    fn test_linear_trend_endpoints() {
        let model = TrendModel::new(1800.0, Some(1));
        let env = classroom();
        assert_eq!(model.trend_value(&env, 0.0), 460.0);
        assert_eq!(model.trend_value(&env, 900.0), 580.0);
        assert!((model.trend_value(&env, 1800.0) - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_trend_clamps_time() {
        let model = TrendModel::new(1800.0, Some(1));
        let env = classroom();
        assert_eq!(model.trend_value(&env, -60.0), 460.0);
        assert_eq!(model.trend_value(&env, 3600.0), 700.0);
    }

    #[test]
    fn test_pattern_trend_scales_baseline() {
        let model = TrendModel::new(24.0, Some(1));
        let env = road();
        assert!((model.trend_value(&env, 8.0) - 1050.0).abs() < 1e-9);
        assert!((model.trend_value(&env, 7.0) - 420.0 * 2.15).abs() < 1e-9);
    }

    #[test]
    fn test_oscillating_variation_bounds() {
        let mut model = TrendModel::new(1800.0, Some(7));
        let env = classroom();
        for step in 0..1800 {
            let time = step as f64;
            let trend = model.trend_value(&env, time);
            let target = model.target_value(&env, time);
            assert!((target - trend).abs() <= 10.0 + 2.5);
        }
    }

    #[test]
    fn test_proportional_variation_bounds() {
        let mut model = TrendModel::new(24.0, None);
        let env = road();
        for hour in 0..=24 {
            let time = hour as f64;
            let trend = model.trend_value(&env, time);
            let target = model.target_value(&env, time);
            assert!(target >= trend * 0.95 && target < trend * 1.05);
        }
    }

    #[test]
    fn test_seeded_models_are_reproducible() {
        let env = classroom();
        let mut a = TrendModel::new(1800.0, Some(42));
        let mut b = TrendModel::new(1800.0, Some(42));
        let first: Vec<f64> = (0..50).map(|t| a.target_value(&env, t as f64)).collect();
        let second: Vec<f64> = (0..50).map(|t| b.target_value(&env, t as f64)).collect();
        assert_eq!(first, second);

        a.restart();
        let replay: Vec<f64> = (0..50).map(|t| a.target_value(&env, t as f64)).collect();
        assert_eq!(first, replay);
    }

    #[test]
    fn test_no_variation_is_exact() {
        let mut model = TrendModel::new(1800.0, None);
        let env = Environment::linear("park", "Park", 460.0, 430.0);
        assert_eq!(model.target_value(&env, 900.0), 445.0);
    }

    proptest! {
        #[test]
        fn prop_linear_trend_is_monotonic(a in 0.0f64..1800.0, b in 0.0f64..1800.0) {
            let model = TrendModel::new(1800.0, Some(3));
            let rising = classroom();
            let falling = Environment::linear("park", "Park", 460.0, 430.0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(model.trend_value(&rising, lo) <= model.trend_value(&rising, hi));
            prop_assert!(model.trend_value(&falling, lo) >= model.trend_value(&falling, hi));
        }
    }
}
