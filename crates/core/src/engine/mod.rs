//! Simulation engine.
//!
//! The SimulationEngine is the single owner of the [`StageStore`] and the
//! [`StageSimulator`]. It runs as one tokio task that reacts to three
//! sources in a `select!` loop:
//!
//! - `Op`s from the UI
//! - the tick timer, armed only while the store is running
//! - the advance deadline, armed after a stage completes
//!
//! Both timers are cancelled on pause, on reset and when the task ends, so
//! no tick can mutate the store after the run has stopped.

pub mod timer;

use crate::simulator::phrases::{PhraseSource, RandomPhrases};
use crate::simulator::{StageSimulator, TickOutcome};
use crate::state::store::StageStore;
use anyhow::{anyhow, Result};
use gta_protocol::config_models::SimulationConfig;
use gta_protocol::ipc::{Event, Op, PipelineSnapshot};
use std::time::Duration;
use timer::{Deadline, Ticker};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// The engine task state.
pub struct SimulationEngine {
    store: StageStore,
    simulator: StageSimulator,
    ticker: Ticker,
    advance: Deadline,
}

impl SimulationEngine {
    /// Create an engine over `store`, drawing log lines from `phrases`.
    pub fn new(
        config: &SimulationConfig,
        store: StageStore,
        phrases: Box<dyn PhraseSource + Send>,
    ) -> Self {
        Self {
            store,
            simulator: StageSimulator::from_config(config, phrases),
            ticker: Ticker::new(Duration::from_millis(config.tick_interval_ms)),
            advance: Deadline::new(Duration::from_millis(config.advance_delay_ms)),
        }
    }

    /// Create an engine over the built-in catalog with random phrases.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config,
            StageStore::with_catalog(),
            Box::new(RandomPhrases::from_config(config)),
        )
    }

    /// Spawn the engine task and return its handle.
    pub fn spawn(self) -> EngineHandle {
        let (op_tx, op_rx) = mpsc::unbounded_channel();
        let events_tx = self.store.events_sender();
        let task = tokio::spawn(self.run(op_rx));

        EngineHandle {
            op_tx,
            events_tx,
            task,
        }
    }

    async fn run(mut self, mut op_rx: mpsc::UnboundedReceiver<Op>) {
        tracing::debug!("simulation engine started");

        loop {
            tokio::select! {
                op = op_rx.recv() => match op {
                    Some(Op::Shutdown) | None => break,
                    Some(op) => self.handle_op(op),
                },
                _ = self.ticker.tick() => self.on_tick(),
                _ = self.advance.fire() => self.on_advance(),
            }
        }

        self.ticker.cancel();
        self.advance.cancel();
        tracing::debug!("simulation engine stopped");
    }

    fn handle_op(&mut self, op: Op) {
        tracing::debug!(?op, "handling op");
        match op {
            Op::Start => {
                if self.store.start() {
                    self.ticker.arm();
                    // A pause during the hand-over cancelled the deadline
                    if !self.advance.is_armed() && self.store.pending_advance().is_some() {
                        self.advance.arm();
                    }
                }
            }
            Op::Pause => {
                self.store.pause();
                self.cancel_timers();
            }
            Op::Reset => {
                self.cancel_timers();
                self.store.reset();
            }
            Op::SelectStage { stage_id } => {
                self.store.select_stage(stage_id);
            }
            Op::GetSnapshot => self.store.publish_snapshot(),
            Op::Shutdown => {}
        }
    }

    fn on_tick(&mut self) {
        match self.simulator.tick(&mut self.store) {
            TickOutcome::Stopped => self.ticker.cancel(),
            TickOutcome::Completed {
                stage_id,
                next: Some(next),
            } => {
                tracing::debug!(stage_id, next, "scheduling advance");
                self.advance.arm();
            }
            TickOutcome::Completed { next: None, .. } => self.cancel_timers(),
            TickOutcome::Waiting { .. } | TickOutcome::Progressed { .. } => {}
        }
    }

    fn on_advance(&mut self) {
        if !self.store.is_running() {
            return;
        }
        if self.store.advance().is_some() {
            // A newly active stage gets a full period before its first tick
            self.ticker.rearm();
        }
    }

    fn cancel_timers(&mut self) {
        self.ticker.cancel();
        self.advance.cancel();
    }
}

/// Handle to a running engine task.
///
/// Dropping every op sender stops the task.
pub struct EngineHandle {
    op_tx: mpsc::UnboundedSender<Op>,
    events_tx: broadcast::Sender<Event>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Send an operation to the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine task has stopped.
    pub fn send(&self, op: Op) -> Result<()> {
        self.op_tx
            .send(op)
            .map_err(|e| anyhow!("simulation engine stopped, dropped {:?}", e.0))
    }

    /// A sender the UI can keep for its own commands.
    pub fn op_sender(&self) -> mpsc::UnboundedSender<Op> {
        self.op_tx.clone()
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events_tx.subscribe()
    }

    /// Fetch the current state from the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine stops before answering.
    pub async fn snapshot(&self) -> Result<PipelineSnapshot> {
        let mut events = self.subscribe();
        self.send(Op::GetSnapshot)?;
        loop {
            match events.recv().await {
                Ok(Event::Snapshot { snapshot }) => return Ok(snapshot),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(anyhow!("simulation engine stopped"))
                }
            }
        }
    }

    /// Stop the engine and wait for its task to end.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.op_tx.send(Op::Shutdown);
        self.task
            .await
            .map_err(|e| anyhow!("simulation engine task failed: {e}"))
    }
}
