//! # Simulation Clock
//!
//! Advances simulated time by a fixed amount per real-time tick and reports
//! when the horizon has been reached.

use serde::Serialize;
use std::time::Duration;

use crate::domain::ModelError;

/// Frame rates above this would tick faster than once per millisecond
pub const MAX_FRAMES_PER_SECOND: u32 = 1000;

/// How real-time ticks map onto simulated time
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickDiscipline {
    /// Redraw driven: every frame adds `speed / frames_per_second` simulated
    /// units, frames arrive `frames_per_second` times per real second.
    FrameDriven { speed: f64, frames_per_second: u32 },
    /// Timer driven: every `period_ms` of real time adds exactly `step`
    /// simulated units.
    IntervalDriven { period_ms: u64, step: f64 },
}

impl TickDiscipline {
    /// Simulated time added per tick
    pub fn step(&self) -> f64 {
        match *self {
            TickDiscipline::FrameDriven {
                speed,
                frames_per_second,
            } => speed / frames_per_second as f64,
            TickDiscipline::IntervalDriven { step, .. } => step,
        }
    }

    /// Real time between two ticks
    pub fn tick_period(&self) -> Duration {
        match *self {
            TickDiscipline::FrameDriven {
                frames_per_second, ..
            } => Duration::from_secs_f64(1.0 / frames_per_second.max(1) as f64)
                .max(Duration::from_millis(1)),
            TickDiscipline::IntervalDriven { period_ms, .. } => {
                Duration::from_millis(period_ms.max(1))
            }
        }
    }

    fn validate(&self) -> Result<(), ModelError> {
        match *self {
            TickDiscipline::FrameDriven {
                speed,
                frames_per_second,
            } => {
                if frames_per_second == 0 || frames_per_second > MAX_FRAMES_PER_SECOND {
                    return Err(ModelError::InvalidClock(format!(
                        "frames_per_second must be within 1..={MAX_FRAMES_PER_SECOND}, got {frames_per_second}"
                    )));
                }
                if !(speed.is_finite() && speed > 0.0) {
                    return Err(ModelError::InvalidClock(format!(
                        "speed must be positive, got {speed}"
                    )));
                }
            }
            TickDiscipline::IntervalDriven { period_ms, step } => {
                if period_ms == 0 {
                    return Err(ModelError::InvalidClock(
                        "period_ms must be at least 1".to_string(),
                    ));
                }
                if !(step.is_finite() && step > 0.0) {
                    return Err(ModelError::InvalidClock(format!(
                        "step must be positive, got {step}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    discipline: TickDiscipline,
    max_time: f64,
    current_time: f64,
}

impl SimulationClock {
    pub fn new(discipline: TickDiscipline, max_time: f64) -> Result<Self, ModelError> {
        discipline.validate()?;
        if !(max_time.is_finite() && max_time > 0.0) {
            return Err(ModelError::InvalidClock(format!(
                "max_time must be positive, got {max_time}"
            )));
        }

        Ok(Self {
            discipline,
            max_time,
            current_time: 0.0,
        })
    }

    /// Move forward by one tick, never past `max_time`
    pub fn advance(&mut self) -> f64 {
        self.current_time = (self.current_time + self.discipline.step()).min(self.max_time);
        self.current_time
    }

    pub fn is_complete(&self) -> bool {
        self.current_time >= self.max_time
    }

    pub fn reset(&mut self) {
        self.current_time = 0.0;
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    /// Fraction of the horizon already simulated, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.current_time / self.max_time
    }

    pub fn discipline(&self) -> TickDiscipline {
        self.discipline
    }

    pub fn tick_period(&self) -> Duration {
        self.discipline.tick_period()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_clock() -> SimulationClock {
        SimulationClock::new(
            TickDiscipline::FrameDriven {
                speed: 60.0,
                frames_per_second: 60,
            },
            1800.0,
        )
        .unwrap()
    }

    #[test]
    fn test_frame_driven_step_and_period() {
        let clock = frame_clock();
        assert_eq!(clock.discipline().step(), 1.0);
        assert_eq!(clock.tick_period(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn test_interval_driven_adds_one_hour_per_tick() {
        let mut clock = SimulationClock::new(
            TickDiscipline::IntervalDriven {
                period_ms: 800,
                step: 1.0,
            },
            24.0,
        )
        .unwrap();

        assert_eq!(clock.tick_period(), Duration::from_millis(800));
        assert_eq!(clock.advance(), 1.0);
        assert_eq!(clock.advance(), 2.0);
        for _ in 0..22 {
            clock.advance();
        }
        assert!(clock.is_complete());
        assert_eq!(clock.current_time(), 24.0);
    }

    #[test]
    fn test_advance_completes_at_horizon() {
        let mut clock = frame_clock();
        for _ in 0..1799 {
            clock.advance();
        }
        assert!(!clock.is_complete());
        assert_eq!(clock.advance(), 1800.0);
        assert!(clock.is_complete());
        assert_eq!(clock.progress(), 1.0);
    }

    #[test]
    fn test_advance_clamps_to_horizon() {
        let mut clock = SimulationClock::new(
            TickDiscipline::IntervalDriven {
                period_ms: 10,
                step: 7.0,
            },
            10.0,
        )
        .unwrap();

        clock.advance();
        assert_eq!(clock.advance(), 10.0);
        assert_eq!(clock.advance(), 10.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = frame_clock();
        clock.advance();
        clock.advance();
        clock.reset();
        assert_eq!(clock.current_time(), 0.0);
        assert!(!clock.is_complete());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(SimulationClock::new(
            TickDiscipline::FrameDriven {
                speed: 60.0,
                frames_per_second: 0
            },
            1800.0
        )
        .is_err());
        assert!(SimulationClock::new(
            TickDiscipline::IntervalDriven {
                period_ms: 800,
                step: 1.0
            },
            0.0
        )
        .is_err());    }

    #[test]
    fn test_frame_rate_above_one_per_millisecond_rejected() {
        let discipline = TickDiscipline::FrameDriven {
            speed: 60.0,
            frames_per_second: u32::MAX,
        };
        assert!(matches!(
            SimulationClock::new(discipline, 1800.0),
            Err(ModelError::InvalidClock(_))
        ));
        assert_eq!(discipline.tick_period(), Duration::from_millis(1));

        let fastest = TickDiscipline::FrameDriven {
            speed: 60.0,
            frames_per_second: MAX_FRAMES_PER_SECOND,
        };
        assert!(SimulationClock::new(fastest, 1800.0).is_ok());
        assert_eq!(fastest.tick_period(), Duration::from_millis(1));
    }
}
