//! The stage simulator.
//!
//! One call to [`StageSimulator::tick`] is one firing of the simulation
//! timer. Per tick, only the active stage changes:
//!
//! 1. An idle active stage becomes `Processing`.
//! 2. The phrase source may append one log line.
//! 3. If the stage now holds more lines than the threshold it completes in
//!    the same tick, and either hands over to its successor (after the
//!    engine's advance delay) or finishes the run.
//!
//! The simulator owns no timers. Scheduling lives in the engine.

pub mod phrases;

use crate::state::stage::exceeds_threshold;
use crate::state::store::StageStore;
use gta_protocol::config_models::SimulationConfig;
use gta_protocol::stage_models::{StageId, StageStatus};
use phrases::PhraseSource;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or no active stage. The timer should be cancelled.
    Stopped,

    /// The active stage already completed and is waiting for the advance.
    Waiting { stage_id: StageId },

    /// The active stage is processing and stayed below the threshold.
    Progressed { stage_id: StageId, logged: bool },

    /// The active stage completed on this tick.
    ///
    /// `next` is the stage to activate after the advance delay; `None`
    /// means this was the last stage and the run has finished.
    Completed {
        stage_id: StageId,
        next: Option<StageId>,
    },
}

/// Drives the active stage of a [`StageStore`] one tick at a time.
pub struct StageSimulator {
    phrases: Box<dyn PhraseSource + Send>,
    log_threshold: usize,
}

impl StageSimulator {
    pub fn new(phrases: Box<dyn PhraseSource + Send>, log_threshold: usize) -> Self {
        Self {
            phrases,
            log_threshold,
        }
    }

    pub fn from_config(config: &SimulationConfig, phrases: Box<dyn PhraseSource + Send>) -> Self {
        Self::new(phrases, config.log_threshold)
    }

    pub fn log_threshold(&self) -> usize {
        self.log_threshold
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, store: &mut StageStore) -> TickOutcome {
        if !store.is_running() {
            return TickOutcome::Stopped;
        }
        let Some(active) = store.active_stage() else {
            return TickOutcome::Stopped;
        };
        let stage_id = active.id;
        if matches!(active.status, StageStatus::Completed | StageStatus::Error) {
            return TickOutcome::Waiting { stage_id };
        }

        if store.begin_active() {
            tracing::debug!(stage_id, "stage processing");
        }

        let logged = match self.phrases.next_line() {
            Some(line) => {
                tracing::debug!(stage_id, %line, "log line");
                store.log_active(line);
                true
            }
            None => false,
        };

        let over_threshold = store
            .active_stage()
            .is_some_and(|stage| exceeds_threshold(stage, self.log_threshold));
        if !over_threshold {
            return TickOutcome::Progressed { stage_id, logged };
        }

        store.complete_active();
        let next = store.successor_of(stage_id);
        if next.is_none() {
            store.finish();
        }
        TickOutcome::Completed { stage_id, next }
    }
}
