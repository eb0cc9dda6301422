pub mod lifecycle;
pub mod observer;
pub mod scheduler;

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, SimulationConfig};
use crate::domain::{ModelError, SimulationKind};
use crate::simulation::presets;

pub use lifecycle::{SimulationController, TickOutcome};
#[cfg(test)]
pub use observer::MockStateObserver;
pub use observer::{SnapshotPublisher, StateObserver, TracingObserver};
pub use scheduler::SimulationHandle;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub simulations: Arc<SimulationRegistry>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self> {
        let simulations = Arc::new(SimulationRegistry::from_config(&cfg.simulation)?);
        info!(
            simulations = simulations.len(),
            seeded = cfg.simulation.random_seed.is_some(),
            "simulations ready"
        );
        Ok(Self { cfg, simulations })
    }
}

/// One handle per simulation variant
pub struct SimulationRegistry {
    handles: BTreeMap<SimulationKind, Arc<SimulationHandle>>,
}

impl SimulationRegistry {
    pub fn from_config(cfg: &SimulationConfig) -> Result<Self, ModelError> {
        let definitions = [
            presets::classroom_park(&cfg.classroom_park, cfg.random_seed),
            presets::daily_environments(&cfg.daily, cfg.random_seed)?,
        ];

        let mut handles = BTreeMap::new();
        for definition in definitions {
            let kind = definition.kind;
            let mut controller = SimulationController::new(definition)?;
            controller.subscribe(Arc::new(TracingObserver));
            handles.insert(kind, Arc::new(SimulationHandle::new(controller)));
        }
        Ok(Self { handles })
    }

    pub fn get(&self, kind: SimulationKind) -> Option<&Arc<SimulationHandle>> {
        self.handles.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SimulationHandle>> {
        self.handles.values()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Stop every running or paused simulation
    pub fn stop_all(&self) {
        for handle in self.handles.values() {
            handle.stop();
        }
    }
}
