//! Inter-process communication protocol.
//!
//! This module defines the message types for asynchronous communication
//! between the TUI (user interface) and the Core (simulation engine).
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from TUI to Core
//! - `Event`: State changes published by Core to every subscriber
//!
//! The engine is the only owner of the stage list; subscribers keep a
//! mirror that they update from events, and can ask for a full
//! [`PipelineSnapshot`] when they fall behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::stage_models::{Stage, StageId, StageStatus};

/// Operations sent from the UI to the simulation engine.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// { "type": "selectStage", "payload": { "stage_id": 3 } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Start the pipeline, or resume it after a pause.
    ///
    /// Activates the first stage if none is active.
    Start,

    /// Stop ticking. The active stage and its progress are kept.
    Pause,

    /// Stop ticking and restore every stage to its initial state.
    Reset,

    /// Change which stage the dashboard detail panel shows.
    SelectStage { stage_id: StageId },

    /// Request a full snapshot. Core answers with `Event::Snapshot`.
    GetSnapshot,

    /// Stop the engine task.
    Shutdown,
}

/// Events published by the simulation engine.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "stageLogChunk",
///   "payload": { "stage_id": 1, "content": "Querying vector database..." }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A fresh run began on an all-idle pipeline.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        stage_id: StageId,
    },

    /// The running flag or the active pointer changed.
    RunStateChanged {
        running: bool,
        active_stage_id: Option<StageId>,
    },

    /// A stage's status changed at `at`, by the engine's clock.
    StageStatusUpdate {
        stage_id: StageId,
        status: StageStatus,
        at: DateTime<Utc>,
    },

    /// A stage produced a new log line.
    ///
    /// The TUI should append this to the stage's activity log.
    StageLogChunk { stage_id: StageId, content: String },

    /// A stage reached its log threshold and produced its output.
    StageCompleted { stage_id: StageId, output: String },

    /// The dashboard selection changed.
    StageSelected { stage_id: StageId },

    /// The last stage completed; the run is over.
    PipelineFinished {
        #[ts(type = "string")]
        run_id: Uuid,
    },

    /// Every stage was restored to its initial state.
    PipelineReset { snapshot: PipelineSnapshot },

    /// Answer to `Op::GetSnapshot`.
    Snapshot { snapshot: PipelineSnapshot },
}

/// The full observable state of the stage store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    pub stages: Vec<Stage>,
    pub active_stage_id: Option<StageId>,
    pub running: bool,
    pub selected_stage_id: StageId,
}

impl PipelineSnapshot {
    pub fn stage(&self, id: StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn stage_mut(&mut self, id: StageId) -> Option<&mut Stage> {
        self.stages.iter_mut().find(|s| s.id == id)
    }

    /// The stage shown in the dashboard detail panel.
    pub fn selected_stage(&self) -> Option<&Stage> {
        self.stage(self.selected_stage_id)
    }

    pub fn all_idle(&self) -> bool {
        self.stages.iter().all(Stage::is_idle)
    }

    pub fn all_completed(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(Stage::is_completed)
    }

    /// Which primary control the UI should offer.
    pub fn control(&self) -> Control {
        if self.running {
            Control::Pause
        } else if self.all_idle() {
            Control::Start
        } else if self.all_completed() {
            Control::Finished
        } else {
            Control::Resume
        }
    }
}

/// The primary control offered next to Reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub enum Control {
    /// Nothing has run yet.
    Start,
    /// The simulation is ticking.
    Pause,
    /// Paused with progress left to make.
    Resume,
    /// Every stage completed; only Reset is meaningful.
    Finished,
}

impl Control {
    pub fn label(self) -> &'static str {
        match self {
            Control::Start => "Start Workflow",
            Control::Pause => "Pause",
            Control::Resume => "Resume",
            Control::Finished => "Finished",
        }
    }

    /// The op this control sends, if it is enabled.
    pub fn op(self) -> Option<Op> {
        match self {
            Control::Start | Control::Resume => Some(Op::Start),
            Control::Pause => Some(Op::Pause),
            Control::Finished => None,
        }
    }
}
