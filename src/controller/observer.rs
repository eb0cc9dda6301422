use tokio::sync::watch;
use tracing::{debug, trace};

use crate::domain::SimulationSnapshot;

/// Receives a read-only snapshot after every tick and after a reset.
///
/// Renderers implement this; the controller never looks past the call.
#[cfg_attr(test, mockall::automock)]
pub trait StateObserver: Send + Sync {
    fn on_state_changed(&self, snapshot: &SimulationSnapshot);
}

/// Logs every state change
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StateObserver for TracingObserver {
    fn on_state_changed(&self, snapshot: &SimulationSnapshot) {
        for env in &snapshot.environments {
            trace!(
                simulation = %snapshot.simulation,
                environment = %env.id,
                current_ppm = env.current_ppm,
                samples = env.history.len(),
                "environment state"
            );
        }
        debug!(
            simulation = %snapshot.simulation,
            status = %snapshot.status,
            time = snapshot.current_time,
            spike_active = snapshot.spike.map(|s| s.active).unwrap_or(false),
            "simulation state changed"
        );
    }
}

/// Keeps the latest snapshot in a `watch` channel for the HTTP host
pub struct SnapshotPublisher {
    tx: watch::Sender<Option<SimulationSnapshot>>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn publish(&self, snapshot: SimulationSnapshot) {
        self.tx.send_replace(Some(snapshot));
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SimulationSnapshot>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Option<SimulationSnapshot> {
        self.tx.borrow().clone()
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StateObserver for SnapshotPublisher {
    fn on_state_changed(&self, snapshot: &SimulationSnapshot) {
        self.publish(snapshot.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SimulationKind, SimulationStatus, TimeUnit};

    fn snapshot(time: f64) -> SimulationSnapshot {
        SimulationSnapshot {
            simulation: SimulationKind::DailyEnvironments,
            run_id: None,
            status: SimulationStatus::Running,
            current_time: time,
            max_time: 24.0,
            time_unit: TimeUnit::Hours,
            environments: Vec::new(),
            spike: None,
        }
    }

    #[test]
    fn test_publisher_keeps_latest_snapshot() {
        let publisher = SnapshotPublisher::new();
        assert!(publisher.latest().is_none());

        let rx = publisher.subscribe();
        publisher.on_state_changed(&snapshot(1.0));
        publisher.on_state_changed(&snapshot(2.0));

        assert_eq!(publisher.latest().unwrap().current_time, 2.0);
        assert_eq!(rx.borrow().as_ref().unwrap().current_time, 2.0);
    }

    #[test]
    fn test_tracing_observer_accepts_snapshots() {
        TracingObserver.on_state_changed(&snapshot(3.0));
    }
}
