//! The stage store.
//!
//! StageStore owns the ordered stage list, the active pointer, the running
//! flag and the dashboard selection. Every mutation is published on a
//! broadcast channel so any number of views can mirror the state.
//!
//! Invariants:
//! - Stages are sorted by id and ids are unique.
//! - Only the active stage can be `Processing`, so at most one stage is.
//! - The active pointer only ever moves to the immediate successor of a
//!   completed stage.

use crate::state::stage::{append_log, begin_processing, complete_stage};
use gta_protocol::ipc::{Event, PipelineSnapshot};
use gta_protocol::stage_models::{Stage, StageId};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered events per subscriber before it starts lagging.
pub const EVENT_CAPACITY: usize = 512;

/// Owner of all stage state.
pub struct StageStore {
    /// Pristine copy restored by `reset`.
    initial: Vec<Stage>,
    stages: Vec<Stage>,
    active_stage_id: Option<StageId>,
    running: bool,
    selected_stage_id: StageId,
    /// Set when a run starts from an all-idle pipeline.
    run_id: Option<Uuid>,
    events_tx: broadcast::Sender<Event>,
}

impl StageStore {
    /// Create a store over `stages`.
    ///
    /// Stages are sorted by id, duplicate ids are dropped and runtime fields
    /// are cleared, so the store always starts from an all-idle pipeline.
    pub fn new(stages: Vec<Stage>) -> Self {
        let mut initial: Vec<Stage> = stages.iter().map(Stage::pristine).collect();
        initial.sort_by_key(|s| s.id);
        let before = initial.len();
        initial.dedup_by_key(|s| s.id);
        if initial.len() != before {
            tracing::warn!(dropped = before - initial.len(), "duplicate stage ids dropped");
        }

        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let selected_stage_id = first_id(&initial);

        Self {
            stages: initial.clone(),
            initial,
            active_stage_id: None,
            running: false,
            selected_stage_id,
            run_id: None,
            events_tx,
        }
    }

    /// Create a store over the built-in catalog.
    pub fn with_catalog() -> Self {
        Self::new(crate::state::catalog::initial_stages())
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events_tx.subscribe()
    }

    /// A sender that can create new subscriptions after the store has moved.
    pub fn events_sender(&self) -> broadcast::Sender<Event> {
        self.events_tx.clone()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn active_stage_id(&self) -> Option<StageId> {
        self.active_stage_id
    }

    pub fn active_stage(&self) -> Option<&Stage> {
        self.active_stage_id.and_then(|id| self.stage(id))
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn selected_stage_id(&self) -> StageId {
        self.selected_stage_id
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run_id
    }

    /// Whether every stage has completed.
    pub fn is_finished(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(Stage::is_completed)
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            stages: self.stages.clone(),
            active_stage_id: self.active_stage_id,
            running: self.running,
            selected_stage_id: self.selected_stage_id,
        }
    }

    /// Publish the current state as an `Event::Snapshot`.
    pub fn publish_snapshot(&self) {
        let _ = self.events_tx.send(Event::Snapshot {
            snapshot: self.snapshot(),
        });
    }

    /// Start or resume the simulation.
    ///
    /// Activates the lowest id if no stage is active, then sets running.
    /// Idempotent while running. A finished pipeline stays finished until
    /// it is reset.
    ///
    /// # Returns
    ///
    /// Whether the store is running afterwards.
    pub fn start(&mut self) -> bool {
        if self.running {
            return true;
        }

        if self.active_stage_id.is_none() {
            if self.is_finished() {
                tracing::debug!("start ignored, pipeline already finished");
                return false;
            }
            let Some(first) = self.stages.first().map(|s| s.id) else {
                tracing::debug!("start ignored, no stages");
                return false;
            };

            let run_id = Uuid::new_v4();
            self.active_stage_id = Some(first);
            self.run_id = Some(run_id);
            tracing::info!(%run_id, stage_id = first, "run started");
            let _ = self.events_tx.send(Event::RunStarted {
                run_id,
                stage_id: first,
            });
        }

        self.running = true;
        self.publish_run_state();
        true
    }

    /// Stop ticking without touching the active stage or its progress.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        tracing::info!(active_stage_id = ?self.active_stage_id, "run paused");
        self.publish_run_state();
    }

    /// Restore every stage to its initial state and clear the run.
    pub fn reset(&mut self) {
        self.running = false;
        self.active_stage_id = None;
        self.run_id = None;
        self.stages = self.initial.clone();
        self.selected_stage_id = first_id(&self.initial);
        tracing::info!("pipeline reset");
        let _ = self.events_tx.send(Event::PipelineReset {
            snapshot: self.snapshot(),
        });
    }

    /// Show `id` in the dashboard detail panel.
    ///
    /// Unknown ids leave the selection unchanged. Returns whether it changed.
    pub fn select_stage(&mut self, id: StageId) -> bool {
        if self.stage(id).is_none() {
            tracing::debug!(stage_id = id, "ignoring selection of unknown stage");
            return false;
        }
        self.selected_stage_id = id;
        let _ = self.events_tx.send(Event::StageSelected { stage_id: id });
        true
    }

    /// The stage after `id` in execution order.
    pub fn successor_of(&self, id: StageId) -> Option<StageId> {
        self.stages.iter().map(|s| s.id).find(|&other| other > id)
    }

    /// The successor of the active stage if the active stage has completed
    /// and is waiting to hand over.
    pub fn pending_advance(&self) -> Option<StageId> {
        let active = self.active_stage()?;
        if !active.is_completed() {
            return None;
        }
        self.successor_of(active.id)
    }

    /// Move the active pointer from a completed stage to its successor.
    ///
    /// # Returns
    ///
    /// The new active id, or `None` if there is nothing to advance.
    pub fn advance(&mut self) -> Option<StageId> {
        let next = self.pending_advance()?;
        tracing::info!(from = ?self.active_stage_id, to = next, "advancing active stage");
        self.active_stage_id = Some(next);
        self.publish_run_state();
        Some(next)
    }

    /// Transition the active stage from Idle to Processing.
    pub fn begin_active(&mut self) -> bool {
        let events_tx = self.events_tx.clone();
        match self.active_stage_mut() {
            Some(stage) => begin_processing(stage, &events_tx),
            None => false,
        }
    }

    /// Append a log line to the active stage.
    pub fn log_active(&mut self, line: String) {
        let events_tx = self.events_tx.clone();
        if let Some(stage) = self.active_stage_mut() {
            append_log(stage, &events_tx, line);
        }
    }

    /// Complete the active stage with its templated output.
    pub fn complete_active(&mut self) -> bool {
        let events_tx = self.events_tx.clone();
        match self.active_stage_mut() {
            Some(stage) => {
                let completed = complete_stage(stage, &events_tx);
                if completed {
                    tracing::info!(stage_id = stage.id, name = %stage.name, "stage completed");
                }
                completed
            }
            None => false,
        }
    }

    /// End the run after the last stage: not running, no active stage.
    pub fn finish(&mut self) {
        self.running = false;
        self.active_stage_id = None;
        self.publish_run_state();
        if let Some(run_id) = self.run_id {
            tracing::info!(%run_id, "pipeline finished");
            let _ = self.events_tx.send(Event::PipelineFinished { run_id });
        }
    }

    fn active_stage_mut(&mut self) -> Option<&mut Stage> {
        let id = self.active_stage_id?;
        self.stages.iter_mut().find(|s| s.id == id)
    }

    fn publish_run_state(&self) {
        let _ = self.events_tx.send(Event::RunStateChanged {
            running: self.running,
            active_stage_id: self.active_stage_id,
        });
    }
}

impl Default for StageStore {
    fn default() -> Self {
        Self::with_catalog()
    }
}

fn first_id(stages: &[Stage]) -> StageId {
    stages.first().map(|s| s.id).unwrap_or(1)
}
