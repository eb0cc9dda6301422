//! # Simulation Lifecycle
//!
//! `SimulationController` owns all mutable simulation state and moves it
//! through `Stopped → Running ⇄ Paused → Stopped`.
//!
//! Ticks are driven from outside (see [`super::scheduler`]). Every `start`,
//! `stop` and `reset` bumps an epoch; a tick carrying an older epoch is
//! discarded without touching state, so a tick scheduled before a stop can
//! never run after it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use super::StateObserver;
use crate::domain::{
    Environment, EnvironmentSnapshot, ModelError, Sample, SimulationKind, SimulationSnapshot,
    SimulationStatus, SpikeState, TimeUnit,
};
use crate::simulation::{
    SimulationClock, SimulationDefinition, SmoothedSeries, SpikeInjector, TrendModel,
};

/// Result of presenting a tick to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Epoch is outdated or the simulation is stopped; the loop should exit
    Stale,
    /// Paused; nothing changed, keep ticking
    Paused,
    /// Time advanced and values were updated
    Advanced,
    /// Time reached the horizon on this tick; the controller is now stopped
    Completed,
}

pub struct SimulationController {
    kind: SimulationKind,
    environments: Vec<Environment>,
    time_unit: TimeUnit,
    sample_interval: f64,
    clock: SimulationClock,
    trend: TrendModel,
    spike: Option<SpikeInjector>,
    series: SmoothedSeries,
    status: SimulationStatus,
    epoch: u64,
    run_id: Option<Uuid>,
    ticks: u64,
    observers: Vec<Arc<dyn StateObserver>>,
}

fn baselines(environments: &[Environment]) -> impl Iterator<Item = (&str, f64)> + '_ {
    environments
        .iter()
        .map(|env| (env.id.as_str(), env.baseline_ppm))
}

impl SimulationController {
    pub fn new(definition: SimulationDefinition) -> Result<Self, ModelError> {
        definition.validate()?;

        let clock = SimulationClock::new(definition.discipline, definition.max_time)?;
        let mut series = SmoothedSeries::new(definition.smoothing)?;
        series.reset(baselines(&definition.environments));
        let spike = definition
            .spike
            .map(|plan| SpikeInjector::new(plan.environment, plan.settings));

        Ok(Self {
            kind: definition.kind,
            trend: TrendModel::new(definition.max_time, definition.random_seed),
            environments: definition.environments,
            time_unit: definition.time_unit,
            sample_interval: definition.sample_interval,
            clock,
            spike,
            series,
            status: SimulationStatus::Stopped,
            epoch: 0,
            run_id: None,
            ticks: 0,
            observers: Vec::new(),
        })
    }

    /// Register a renderer; it is called once per tick and once per reset
    pub fn subscribe(&mut self, observer: Arc<dyn StateObserver>) {
        self.observers.push(observer);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Begin a new run from time zero.
    ///
    /// Returns the epoch the tick loop must present, or `None` when the
    /// simulation is not stopped.
    pub fn start(&mut self) -> Option<u64> {
        if self.status != SimulationStatus::Stopped {
            debug!(simulation = %self.kind, status = %self.status, "start ignored");
            return None;
        }

        self.clear_state();
        self.trend.restart();
        for env in &self.environments {
            self.series.maybe_sample(&env.id, 0.0, self.sample_interval);
        }

        self.status = SimulationStatus::Running;
        self.epoch += 1;
        let run_id = Uuid::new_v4();
        self.run_id = Some(run_id);

        info!(
            simulation = %self.kind,
            %run_id,
            epoch = self.epoch,
            max_time = self.clock.max_time(),
            "simulation started"
        );
        Some(self.epoch)
    }

    /// Toggle between running and paused. Returns `false` when stopped.
    pub fn pause(&mut self) -> bool {
        self.status = match self.status {
            SimulationStatus::Running => SimulationStatus::Paused,
            SimulationStatus::Paused => SimulationStatus::Running,
            SimulationStatus::Stopped => {
                debug!(simulation = %self.kind, "pause ignored while stopped");
                return false;
            }
        };
        info!(
            simulation = %self.kind,
            status = %self.status,
            time = self.clock.current_time(),
            "simulation pause toggled"
        );
        true
    }

    /// Stop a running or paused simulation, keeping its data readable
    pub fn stop(&mut self) -> bool {
        if self.status == SimulationStatus::Stopped {
            return false;
        }
        self.status = SimulationStatus::Stopped;
        self.epoch += 1;
        info!(
            simulation = %self.kind,
            time = self.clock.current_time(),
            ticks = self.ticks,
            "simulation stopped"
        );
        true
    }

    /// Stop, drop all recorded data and notify observers of the empty state
    pub fn reset(&mut self) {
        if !self.stop() {
            self.epoch += 1;
        }
        self.clear_state();
        self.run_id = None;
        self.ticks = 0;
        info!(simulation = %self.kind, "simulation reset");
        self.notify();
    }

    /// Start a spike on the monitored environment.
    ///
    /// Ignored unless running, when a spike is already active, or when this
    /// simulation has no monitored environment.
    pub fn trigger_spike(&mut self) -> bool {
        if self.status != SimulationStatus::Running {
            debug!(simulation = %self.kind, status = %self.status, "spike ignored");
            return false;
        }
        let time = self.clock.current_time();
        let Some(spike) = self.spike.as_mut() else {
            debug!(simulation = %self.kind, "simulation has no monitored environment");
            return false;
        };

        let triggered = spike.trigger(time);
        if triggered {
            info!(
                simulation = %self.kind,
                environment = %spike.environment(),
                time,
                "spike triggered"
            );
        }
        triggered
    }

    fn clear_state(&mut self) {
        self.clock.reset();
        self.series.reset(baselines(&self.environments));
        if let Some(spike) = self.spike.as_mut() {
            spike.clear();
        }
    }

    // ------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------

    /// Run one simulation step on behalf of the loop started at `epoch`
    pub fn tick(&mut self, epoch: u64) -> TickOutcome {
        if epoch != self.epoch {
            return TickOutcome::Stale;
        }
        match self.status {
            SimulationStatus::Stopped => return TickOutcome::Stale,
            SimulationStatus::Paused => return TickOutcome::Paused,
            SimulationStatus::Running => {}
        }

        let time = self.clock.advance();
        for env in &self.environments {
            let trend = self.trend.trend_value(env, time);
            let varied = self.trend.vary(env, time, trend);
            let target = match self
                .spike
                .as_mut()
                .and_then(|spike| spike.offset_at(&env.id, time, trend))
            {
                Some(offset) => trend + offset,
                None => varied,
            };
            self.series.update(&env.id, target);
            self.series.maybe_sample(&env.id, time, self.sample_interval);
        }
        self.ticks += 1;

        let outcome = if self.clock.is_complete() {
            self.status = SimulationStatus::Stopped;
            self.epoch += 1;
            info!(
                simulation = %self.kind,
                run_id = ?self.run_id,
                ticks = self.ticks,
                "simulation complete"
            );
            TickOutcome::Completed
        } else {
            TickOutcome::Advanced
        };

        self.notify();
        outcome
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &self.observers {
            observer.on_state_changed(&snapshot);
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            simulation: self.kind,
            run_id: self.run_id,
            status: self.status,
            current_time: self.clock.current_time(),
            max_time: self.clock.max_time(),
            time_unit: self.time_unit,
            environments: self
                .environments
                .iter()
                .map(|env| EnvironmentSnapshot {
                    id: env.id.clone(),
                    display_name: env.display_name.clone(),
                    baseline_ppm: env.baseline_ppm,
                    current_ppm: self.series.current(&env.id).unwrap_or(env.baseline_ppm),
                    history: self.series.history(&env.id).to_vec(),
                })
                .collect(),
            spike: self.spike_state(),
        }
    }

    pub fn kind(&self) -> SimulationKind {
        self.kind
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn max_time(&self) -> f64 {
        self.clock.max_time()
    }

    pub fn tick_period(&self) -> Duration {
        self.clock.tick_period()
    }

    pub fn environments(&self) -> &[Environment] {
        &self.environments
    }

    pub fn current_value(&self, env: &str) -> Option<f64> {
        self.series.current(env)
    }

    pub fn history(&self, env: &str) -> &[Sample] {
        self.series.history(env)
    }

    pub fn spike_state(&self) -> Option<SpikeState> {
        self.spike.as_ref().map(SpikeInjector::state)
    }

    /// Spike-free trend of `env` at `time`
    pub fn trend_value(&self, env: &str, time: f64) -> Option<f64> {
        self.environments
            .iter()
            .find(|e| e.id == env)
            .map(|e| self.trend.trend_value(e, time))
    }
}
