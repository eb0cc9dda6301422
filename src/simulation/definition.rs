use std::collections::HashSet;

use super::{SpikeSettings, TickDiscipline};
use crate::domain::{Environment, ModelError, SimulationKind, TimeUnit};

/// Which environment receives spikes, and their shape
#[derive(Debug, Clone, PartialEq)]
pub struct SpikePlan {
    pub environment: String,
    pub settings: SpikeSettings,
}

/// Everything a controller needs to run one simulation variant
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationDefinition {
    pub kind: SimulationKind,
    pub environments: Vec<Environment>,
    pub discipline: TickDiscipline,
    /// Simulation horizon, in `time_unit`
    pub max_time: f64,
    pub time_unit: TimeUnit,
    /// Minimum simulated time between two recorded samples
    pub sample_interval: f64,
    /// Exponential smoothing factor, `(0, 1]`. Hourly variants use `1.0` so
    /// each sample is the computed value for that hour.
    pub smoothing: f64,
    pub spike: Option<SpikePlan>,
    /// Seed for the variation noise; `None` draws from entropy
    pub random_seed: Option<u64>,
}

impl SimulationDefinition {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.environments.is_empty() {
            return Err(ModelError::NoEnvironments);
        }

        let mut seen = HashSet::new();
        for env in &self.environments {
            if !seen.insert(env.id.as_str()) {
                return Err(ModelError::DuplicateEnvironment(env.id.clone()));
            }
            env.validate()?;
            if let Some(pattern) = env.pattern() {
                if pattern.horizon() < self.max_time {
                    return Err(ModelError::PatternShorterThanHorizon {
                        environment: env.id.clone(),
                        ends_at: pattern.horizon(),
                        horizon: self.max_time,
                    });
                }
            }
        }

        if !(self.sample_interval.is_finite() && self.sample_interval > 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "sample_interval",
                value: self.sample_interval,
            });
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ModelError::InvalidSmoothing(self.smoothing));
        }

        if let Some(plan) = &self.spike {
            if !seen.contains(plan.environment.as_str()) {
                return Err(ModelError::UnknownEnvironment(plan.environment.clone()));
            }
            plan.settings.validate()?;
        }

        Ok(())
    }

    pub fn environment(&self, id: &str) -> Option<&Environment> {
        self.environments.iter().find(|env| env.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PatternTable;
    use crate::simulation::DEFAULT_SMOOTHING;

    fn definition() -> SimulationDefinition {
        SimulationDefinition {
            kind: SimulationKind::ClassroomPark,
            environments: vec![
                Environment::linear("classroom", "Classroom", 460.0, 700.0),
                Environment::linear("park", "Park", 460.0, 430.0),
            ],
            discipline: TickDiscipline::FrameDriven {
                speed: 60.0,
                frames_per_second: 60,
            },
            max_time: 1800.0,
            time_unit: TimeUnit::Seconds,
            sample_interval: 60.0,
            smoothing: DEFAULT_SMOOTHING,
            spike: Some(SpikePlan {
                environment: "classroom".to_string(),
                settings: SpikeSettings::default(),
            }),
            random_seed: Some(1),
        }
    }

    #[test]
    fn test_valid_definition() {
        assert!(definition().validate().is_ok());
        assert!(definition().environment("park").is_some());
    }

    #[test]
    fn test_duplicate_environment_rejected() {
        let mut def = definition();
        def.environments
            .push(Environment::linear("park", "Park again", 460.0, 430.0));
        assert_eq!(
            def.validate(),
            Err(ModelError::DuplicateEnvironment("park".to_string()))
        );
    }

    #[test]
    fn test_empty_environments_rejected() {
        let mut def = definition();
        def.environments.clear();
        assert_eq!(def.validate(), Err(ModelError::NoEnvironments));
    }

    #[test]
    fn test_unknown_spike_target_rejected() {
        let mut def = definition();
        def.spike = Some(SpikePlan {
            environment: "office".to_string(),
            settings: SpikeSettings::default(),
        });
        assert_eq!(
            def.validate(),
            Err(ModelError::UnknownEnvironment("office".to_string()))
        );
    }

    #[test]
    fn test_short_pattern_rejected() {
        let mut def = definition();
        def.max_time = 24.0;
        def.environments = vec![Environment::patterned(
            "road",
            "Road",
            420.0,
            PatternTable::from_pairs(&[(0.0, 1.2), (12.0, 1.8)]).unwrap(),
        )];
        def.spike = None;
        assert!(matches!(
            def.validate(),
            Err(ModelError::PatternShorterThanHorizon { .. })
        ));
    }
}
