use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::debug;

use super::{SimulationController, SnapshotPublisher, StateObserver, TickOutcome};
use crate::domain::{SimulationKind, SimulationSnapshot, SimulationStatus};

/// Host-side owner of one controller and its tick loop.
///
/// Commands lock the controller, apply the transition and publish the new
/// snapshot. `start` spawns a tokio task bound to the epoch the controller
/// handed out; that task ends on its own once the epoch goes stale.
pub struct SimulationHandle {
    kind: SimulationKind,
    controller: Arc<Mutex<SimulationController>>,
    publisher: Arc<SnapshotPublisher>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SimulationHandle {
    pub fn new(mut controller: SimulationController) -> Self {
        let publisher = Arc::new(SnapshotPublisher::new());
        controller.subscribe(publisher.clone());
        publisher.publish(controller.snapshot());

        Self {
            kind: controller.kind(),
            controller: Arc::new(Mutex::new(controller)),
            publisher,
            task: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> SimulationKind {
        self.kind
    }

    pub fn add_observer(&self, observer: Arc<dyn StateObserver>) {
        self.controller.lock().subscribe(observer);
    }

    /// Start a new run and its tick loop. Must be called inside a tokio runtime.
    ///
    /// The loop is spawned and stored while the controller is still locked, so
    /// the stored task always belongs to the controller's current epoch.
    pub fn start(&self) -> bool {
        let mut controller = self.controller.lock();
        let Some(epoch) = controller.start() else {
            return false;
        };
        let period = controller.tick_period();
        self.publisher.publish(controller.snapshot());

        let task = tokio::spawn(run_tick_loop(self.controller.clone(), epoch, period));
        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
        true
    }

    pub fn pause(&self) -> bool {
        self.command(SimulationController::pause)
    }

    pub fn stop(&self) -> bool {
        let mut controller = self.controller.lock();
        let stopped = controller.stop();
        if stopped {
            self.publisher.publish(controller.snapshot());
        }
        self.abort_task();
        stopped
    }

    pub fn reset(&self) {
        // Observers, the publisher included, are notified by the controller
        let mut controller = self.controller.lock();
        controller.reset();
        self.abort_task();
    }

    pub fn trigger_spike(&self) -> bool {
        self.command(SimulationController::trigger_spike)
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        self.controller.lock().snapshot()
    }

    pub fn status(&self) -> SimulationStatus {
        self.controller.lock().status()
    }

    pub fn current_time(&self) -> f64 {
        self.controller.lock().current_time()
    }

    /// Latest published snapshot, updated on every tick and command
    pub fn subscribe(&self) -> watch::Receiver<Option<SimulationSnapshot>> {
        self.publisher.subscribe()
    }

    /// Whether a tick loop task is still alive
    pub fn is_ticking(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    fn command(&self, apply: impl FnOnce(&mut SimulationController) -> bool) -> bool {
        let mut controller = self.controller.lock();
        let accepted = apply(&mut *controller);
        if accepted {
            self.publisher.publish(controller.snapshot());
        }
        accepted
    }

    /// Lock order is controller, then task
    fn abort_task(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        self.abort_task();
    }
}

/// Drive `controller` every `period` until the epoch goes stale or the run
/// completes. Paused ticks keep the loop alive without touching state.
async fn run_tick_loop(
    controller: Arc<Mutex<SimulationController>>,
    epoch: u64,
    period: Duration,
) {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let outcome = controller.lock().tick(epoch);
        match outcome {
            TickOutcome::Advanced | TickOutcome::Paused => {}
            TickOutcome::Completed => {
                debug!(epoch, "tick loop finished");
                break;
            }
            TickOutcome::Stale => {
                debug!(epoch, "tick loop cancelled");
                break;
            }
        }
    }
}
