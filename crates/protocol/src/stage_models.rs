//! Pipeline stage models.
//!
//! A stage is one step of the simulated analysis pipeline. The static fields
//! describe the agent behind the step; `status`, `logs`, `output` and the
//! timestamps are the only fields the simulation mutates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Identifier of a stage. Ids are 1-based and define the execution order.
pub type StageId = u32;

/// Lifecycle status of a single stage.
///
/// Normal progression is `Idle -> Processing -> Completed`. `Error` is part
/// of the model so views can render it, but the simulation never produces it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// Not started yet (or restored by a reset).
    #[default]
    Idle,

    /// The active stage, accumulating log lines.
    Processing,

    /// Reached the log threshold and produced its output.
    Completed,

    /// Reserved for failed stages.
    Error,
}

impl StageStatus {
    /// Lowercase label used by the views and the headless printer.
    pub fn label(self) -> &'static str {
        match self {
            StageStatus::Idle => "idle",
            StageStatus::Processing => "processing",
            StageStatus::Completed => "completed",
            StageStatus::Error => "error",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One step of the analysis pipeline.
///
/// # Example
///
/// ```json
/// {
///   "id": 1,
///   "name": "Open Coding",
///   "agentName": "Analyst Agent",
///   "status": "processing",
///   "logs": ["Querying vector database..."],
///   "output": null,
///   "model": "GPT-4o",
///   "temperature": 0.2
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    /// Unique, 1-based position in the pipeline.
    pub id: StageId,

    /// Display name of the step.
    pub name: String,

    /// Name of the agent responsible for the step.
    pub agent_name: String,

    /// What the step does to the data.
    pub description: String,

    /// Current lifecycle status.
    pub status: StageStatus,

    /// Activity log lines, appended while processing.
    ///
    /// Only a full reset clears this list.
    pub logs: Vec<String>,

    /// Generated artifact text, set once on completion.
    pub output: Option<String>,

    /// Model shown in the blueprint drawer.
    pub model: String,

    /// Sampling temperature shown in the blueprint drawer.
    pub temperature: f32,

    /// Tools the agent has access to.
    pub tools: Vec<String>,

    /// Artifacts consumed by the step.
    pub inputs: Vec<String>,

    /// Artifacts produced by the step.
    pub outputs: Vec<String>,

    /// When the stage entered `Processing`.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    /// When the stage entered `Completed`.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Stage {
    pub fn is_idle(&self) -> bool {
        self.status == StageStatus::Idle
    }

    pub fn is_completed(&self) -> bool {
        self.status == StageStatus::Completed
    }

    /// Return a copy with all runtime fields cleared.
    ///
    /// Static metadata is untouched, so `stage.pristine()` of any stage
    /// equals the catalog record it was created from.
    pub fn pristine(&self) -> Self {
        Self {
            status: StageStatus::Idle,
            logs: Vec::new(),
            output: None,
            started_at: None,
            completed_at: None,
            ..self.clone()
        }
    }
}
