//! # CO2 Simulation Module
//!
//! Numeric building blocks behind every simulated CO2 trajectory.
//!
//! ## Components
//!
//! - **Clock**: advances simulated time per real-time tick and detects completion
//! - **Trend**: linear or pattern-driven trend with seeded natural variation
//! - **Spike**: transient rise of the monitored environment toward a peak
//! - **Series**: exponentially smoothed current values and sampled history
//! - **Presets**: the classroom/park and daily four-environment simulations
//!
//! ## Usage
//!
//! ```rust
//! use co2_simulator::domain::Environment;
//! use co2_simulator::simulation::TrendModel;
//!
//! let classroom = Environment::linear("classroom", "Classroom", 460.0, 700.0);
//! let model = TrendModel::new(1800.0, Some(42));
//!
//! // Halfway through the horizon the trend is halfway to the target
//! assert_eq!(model.trend_value(&classroom, 900.0), 580.0);
//! ```

pub mod clock;
pub mod definition;
pub mod presets;
pub mod series;
pub mod spike;
pub mod trend;

pub use clock::{SimulationClock, TickDiscipline};
pub use definition::{SimulationDefinition, SpikePlan};
pub use series::{SmoothedSeries, DEFAULT_SMOOTHING};
pub use spike::{spike_factor, SpikeInjector, SpikeSettings, RISE_FRACTION};
pub use trend::TrendModel;
