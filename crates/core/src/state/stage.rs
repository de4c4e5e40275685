//! Stage lifecycle transitions.
//!
//! Each function mutates a single stage and publishes the matching event.
//! Publishing never fails: a broadcast with no subscribers is dropped.

use chrono::Utc;
use gta_protocol::ipc::Event;
use gta_protocol::stage_models::{Stage, StageStatus};
use tokio::sync::broadcast::Sender;

/// Text stored as a stage's output when it completes.
pub fn completion_output(stage_name: &str) -> String {
    format!("Generated output for {stage_name}. Ready for next agent.")
}

/// Transition an idle stage to Processing and emit a status update.
///
/// # Returns
///
/// `false` if the stage was not idle, in which case nothing changes.
pub fn begin_processing(stage: &mut Stage, events_tx: &Sender<Event>) -> bool {
    if stage.status != StageStatus::Idle {
        return false;
    }

    let now = Utc::now();
    stage.status = StageStatus::Processing;
    stage.started_at = Some(now);
    let _ = events_tx.send(Event::StageStatusUpdate {
        stage_id: stage.id,
        status: stage.status,
        at: now,
    });
    true
}

/// Append a log line to the stage and emit it.
pub fn append_log(stage: &mut Stage, events_tx: &Sender<Event>, line: String) {
    stage.logs.push(line.clone());
    let _ = events_tx.send(Event::StageLogChunk {
        stage_id: stage.id,
        content: line,
    });
}

/// Mark the stage completed, set its output and emit both events.
///
/// # Returns
///
/// `false` if the stage was not processing. Output is only ever set once.
pub fn complete_stage(stage: &mut Stage, events_tx: &Sender<Event>) -> bool {
    if stage.status != StageStatus::Processing {
        return false;
    }

    let output = completion_output(&stage.name);
    let now = Utc::now();
    stage.status = StageStatus::Completed;
    stage.output = Some(output.clone());
    stage.completed_at = Some(now);
    let _ = events_tx.send(Event::StageStatusUpdate {
        stage_id: stage.id,
        status: stage.status,
        at: now,
    });
    let _ = events_tx.send(Event::StageCompleted {
        stage_id: stage.id,
        output,
    });
    true
}

/// Whether the stage holds more log lines than `threshold`.
pub fn exceeds_threshold(stage: &Stage, threshold: usize) -> bool {
    stage.logs.len() > threshold
}
