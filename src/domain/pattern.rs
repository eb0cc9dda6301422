//! # Pattern Tables
//!
//! Piecewise-linear multiplier curves keyed by time of day. A pattern scales an
//! environment's baseline: `1.0` is the baseline itself, `2.5` a busy hour.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::ModelError;

/// One knot of a pattern curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternPoint {
    /// Position on the simulation time axis (hours for the daily patterns)
    pub at: f64,
    /// Baseline multiplier at this point
    pub multiplier: f64,
}

impl PatternPoint {
    pub const fn new(at: f64, multiplier: f64) -> Self {
        Self { at, multiplier }
    }
}

/// Validated, ascending pattern curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternTable {
    points: Vec<PatternPoint>,
}

impl PatternTable {
    /// Build a pattern from its knots.
    ///
    /// The first knot must sit at or before `0`, times must be strictly
    /// increasing and every multiplier must be positive.
    pub fn new(points: Vec<PatternPoint>) -> Result<Self, ModelError> {
        if points.len() < 2 {
            return Err(ModelError::PatternTooShort(points.len()));
        }
        if points[0].at > 0.0 {
            return Err(ModelError::PatternStartsLate(points[0].at));
        }
        for (index, point) in points.iter().enumerate() {
            if !point.at.is_finite() {
                return Err(ModelError::PatternNotIncreasing { index, at: point.at });
            }
            if !(point.multiplier.is_finite() && point.multiplier > 0.0) {
                return Err(ModelError::InvalidMultiplier(point.multiplier));
            }
        }
        if let Some((index, (_, next))) = points
            .iter()
            .tuple_windows()
            .enumerate()
            .find(|(_, (prev, next))| next.at <= prev.at)
        {
            return Err(ModelError::PatternNotIncreasing {
                index: index + 1,
                at: next.at,
            });
        }

        Ok(Self { points })
    }

    /// Build a pattern from `(time, multiplier)` pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, ModelError> {
        Self::new(
            pairs
                .iter()
                .map(|&(at, multiplier)| PatternPoint::new(at, multiplier))
                .collect(),
        )
    }

    pub fn points(&self) -> &[PatternPoint] {
        &self.points
    }

    /// Time of the last knot
    pub fn horizon(&self) -> f64 {
        self.points[self.points.len() - 1].at
    }

    /// Interpolated multiplier at `time`.
    ///
    /// Past the last knot the last multiplier is held (no extrapolation). A
    /// time that falls into no bracket (negative or NaN) yields `1.0`.
    pub fn multiplier_at(&self, time: f64) -> f64 {
        let last = self.points[self.points.len() - 1];
        if time >= last.at {
            return last.multiplier;
        }

        self.points
            .iter()
            .tuple_windows()
            .find(|(lower, upper)| time >= lower.at && time <= upper.at)
            .map(|(lower, upper)| {
                let t = (time - lower.at) / (upper.at - lower.at);
                lower.multiplier + t * (upper.multiplier - lower.multiplier)
            })
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn school_day() -> PatternTable {
        PatternTable::from_pairs(&[(0.0, 1.0), (6.0, 1.0), (8.0, 1.8), (10.0, 2.2), (24.0, 1.0)])
            .unwrap()
    }

    #[test]
    fn test_multiplier_at_knots() {
        let pattern = school_day();
        assert_eq!(pattern.multiplier_at(0.0), 1.0);
        assert_eq!(pattern.multiplier_at(8.0), 1.8);
        assert_eq!(pattern.multiplier_at(10.0), 2.2);
        assert_eq!(pattern.multiplier_at(24.0), 1.0);
    }

    #[test]
    fn test_multiplier_interpolates_between_knots() {
        let pattern = school_day();
        assert!((pattern.multiplier_at(7.0) - 1.4).abs() < 1e-12);
        assert!((pattern.multiplier_at(9.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_multiplier_holds_last_value_past_horizon() {
        let pattern = PatternTable::from_pairs(&[(0.0, 1.1), (24.0, 1.3)]).unwrap();
        assert_eq!(pattern.multiplier_at(30.0), 1.3);
        assert_eq!(pattern.horizon(), 24.0);
    }

    #[test]
    fn test_multiplier_falls_back_outside_brackets() {
        let pattern = school_day();
        assert_eq!(pattern.multiplier_at(-1.0), 1.0);
        assert_eq!(pattern.multiplier_at(f64::NAN), 1.0);
    }

    #[rstest]
    #[case(vec![(0.0, 1.0)], ModelError::PatternTooShort(1))]
    #[case(vec![(1.0, 1.0), (24.0, 1.0)], ModelError::PatternStartsLate(1.0))]
    #[case(vec![(0.0, 1.0), (8.0, 0.0)], ModelError::InvalidMultiplier(0.0))]
    #[case(vec![(0.0, 1.0), (8.0, 1.2), (8.0, 1.4)], ModelError::PatternNotIncreasing { index: 2, at: 8.0 })]
    #[case(vec![(0.0, 1.0), (12.0, 1.2), (6.0, 1.4)], ModelError::PatternNotIncreasing { index: 2, at: 6.0 })]
    fn test_invalid_patterns_rejected(#[case] pairs: Vec<(f64, f64)>, #[case] expected: ModelError) {
        assert_eq!(PatternTable::from_pairs(&pairs).unwrap_err(), expected);
    }

    proptest! {
        #[test]
        fn prop_multiplier_is_continuous(time in 0.0f64..24.0) {
            let pattern = school_day();
            let eps = 1e-6;
            let here = pattern.multiplier_at(time);
            let next = pattern.multiplier_at(time + eps);
            // Steepest segment rises 0.4 per hour
            prop_assert!((next - here).abs() <= 0.4 * eps + 1e-9);
        }

        #[test]
        fn prop_multiplier_stays_within_knot_range(time in 0.0f64..48.0) {
            let pattern = school_day();
            let m = pattern.multiplier_at(time);
            prop_assert!((1.0..=2.2).contains(&m));
        }
    }
}
