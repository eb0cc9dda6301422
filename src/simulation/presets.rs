//! # Built-in Simulations
//!
//! The two variants shipped with the simulator:
//!
//! - **classroom-park**: thirty simulated minutes in which a classroom drifts from
//!   460 to 700 ppm while a park eases down to 430 ppm. The classroom is the
//!   monitored environment and accepts spikes.
//! - **daily-environments**: one simulated day (one hour per tick) for a
//!   classroom, a park, a road and a school corridor, each following its own
//!   time-of-day pattern.

use super::{SimulationDefinition, SpikePlan, SpikeSettings, TickDiscipline, DEFAULT_SMOOTHING};
use crate::config::{ClassroomParkConfig, DailyEnvironmentsConfig};
use crate::domain::{Environment, ModelError, PatternTable, SimulationKind, TimeUnit, Variation};

pub const CLASSROOM: &str = "classroom";
pub const PARK: &str = "park";
pub const ROAD: &str = "road";
pub const CORRIDOR: &str = "corridor";

pub fn classroom_park(cfg: &ClassroomParkConfig, random_seed: Option<u64>) -> SimulationDefinition {
    let classroom = Environment::linear(
        CLASSROOM,
        "Classroom",
        cfg.baseline_ppm,
        cfg.classroom_target_ppm,
    )
    .with_variation(Variation::Oscillating {
        period: 300.0,
        amplitude: 10.0,
        jitter: 2.5,
    });
    let park = Environment::linear(PARK, "Park", cfg.baseline_ppm, cfg.park_target_ppm)
        .with_variation(Variation::Oscillating {
            period: 400.0,
            amplitude: 5.0,
            jitter: 1.5,
        });

    SimulationDefinition {
        kind: SimulationKind::ClassroomPark,
        environments: vec![classroom, park],
        discipline: TickDiscipline::FrameDriven {
            speed: cfg.speed,
            frames_per_second: cfg.frames_per_second,
        },
        max_time: cfg.duration_secs,
        time_unit: TimeUnit::Seconds,
        sample_interval: cfg.sample_interval_secs,
        smoothing: DEFAULT_SMOOTHING,
        spike: Some(SpikePlan {
            environment: CLASSROOM.to_string(),
            settings: SpikeSettings {
                duration: cfg.spike_duration_secs,
                peak_ppm: cfg.spike_peak_ppm,
            },
        }),
        random_seed,
    }
}

pub fn daily_environments(
    cfg: &DailyEnvironmentsConfig,
    random_seed: Option<u64>,
) -> Result<SimulationDefinition, ModelError> {
    let variation = Variation::Proportional {
        spread: cfg.variation_spread,
    };
    let environments = vec![
        Environment::patterned(CLASSROOM, "Classroom", 450.0, classroom_day()?),
        Environment::patterned(PARK, "Park", 380.0, park_day()?),
        Environment::patterned(ROAD, "Road", 420.0, road_day()?),
        Environment::patterned(CORRIDOR, "School Corridor", 480.0, corridor_day()?),
    ]
    .into_iter()
    .map(|env| env.with_variation(variation))
    .collect();

    Ok(SimulationDefinition {
        kind: SimulationKind::DailyEnvironments,
        environments,
        discipline: TickDiscipline::IntervalDriven {
            period_ms: cfg.tick_period_ms,
            step: 1.0,
        },
        max_time: cfg.hours,
        time_unit: TimeUnit::Hours,
        sample_interval: 1.0,
        // Hourly readings are charted as computed
        smoothing: 1.0,
        spike: None,
        random_seed,
    })
}

/// School hours peak mid-morning and mid-afternoon
pub fn classroom_day() -> Result<PatternTable, ModelError> {
    PatternTable::from_pairs(&[
        (0.0, 1.0),
        (6.0, 1.0),
        (8.0, 1.8),
        (10.0, 2.2),
        (12.0, 1.6),
        (14.0, 2.0),
        (15.0, 1.2),
        (18.0, 1.0),
        (24.0, 1.0),
    ])
}

/// Photosynthesis pulls the park below baseline around noon
pub fn park_day() -> Result<PatternTable, ModelError> {
    PatternTable::from_pairs(&[
        (0.0, 1.1),
        (6.0, 1.2),
        (8.0, 0.9),
        (12.0, 0.8),
        (15.0, 0.85),
        (18.0, 1.0),
        (21.0, 1.1),
        (24.0, 1.1),
    ])
}

/// Morning and evening rush hours
pub fn road_day() -> Result<PatternTable, ModelError> {
    PatternTable::from_pairs(&[
        (0.0, 1.2),
        (6.0, 1.8),
        (8.0, 2.5),
        (10.0, 1.6),
        (12.0, 1.8),
        (15.0, 1.7),
        (17.0, 2.8),
        (19.0, 2.0),
        (22.0, 1.4),
        (24.0, 1.2),
    ])
}

/// Class changes, breaks and dismissal
pub fn corridor_day() -> Result<PatternTable, ModelError> {
    PatternTable::from_pairs(&[
        (0.0, 1.0),
        (7.0, 1.5),
        (8.0, 2.5),
        (9.0, 1.3),
        (10.0, 2.0),
        (11.0, 1.4),
        (12.0, 2.3),
        (13.0, 1.5),
        (15.0, 2.8),
        (16.0, 1.2),
        (18.0, 1.0),
        (24.0, 1.0),
    ])
}
