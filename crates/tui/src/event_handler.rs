//! Event handling utilities for the TUI.
//!
//! - Core events update the local mirror of the pipeline.
//! - Global keys switch views, drive the controls and move the selection.
//!
//! Widget-specific keys (log scrolling, blueprint focus) are handled by the
//! widgets themselves before these.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use gta_protocol::ipc::{Event, Op, PipelineSnapshot};
use gta_protocol::stage_models::{StageId, StageStatus};
use tokio::sync::mpsc::UnboundedSender;

use crate::app::ViewMode;

/// Apply an event from the engine to the local mirror.
pub fn handle_core_event(snapshot: &mut PipelineSnapshot, event: Event) {
    match event {
        Event::RunStarted { stage_id, .. } => {
            snapshot.running = true;
            snapshot.active_stage_id = Some(stage_id);
        }
        Event::RunStateChanged {
            running,
            active_stage_id,
        } => {
            snapshot.running = running;
            snapshot.active_stage_id = active_stage_id;
        }
        Event::StageStatusUpdate {
            stage_id,
            status,
            at,
        } => {
            if let Some(stage) = snapshot.stage_mut(stage_id) {
                stage.status = status;
                match status {
                    StageStatus::Processing => stage.started_at = Some(at),
                    StageStatus::Completed => stage.completed_at = Some(at),
                    StageStatus::Idle | StageStatus::Error => {}
                }
            }
        }
        Event::StageLogChunk { stage_id, content } => {
            if let Some(stage) = snapshot.stage_mut(stage_id) {
                stage.logs.push(content);
            }
        }
        Event::StageCompleted { stage_id, output } => {
            if let Some(stage) = snapshot.stage_mut(stage_id) {
                stage.status = StageStatus::Completed;
                stage.output = Some(output);
            }
        }
        Event::StageSelected { stage_id } => {
            snapshot.selected_stage_id = stage_id;
        }
        Event::PipelineFinished { .. } => {
            snapshot.running = false;
            snapshot.active_stage_id = None;
        }
        Event::PipelineReset { snapshot: fresh } | Event::Snapshot { snapshot: fresh } => {
            *snapshot = fresh;
        }
    }
}

/// Handle a key that no widget consumed.
///
/// Returns `true` if the application should exit, `false` otherwise.
pub fn handle_keyboard_event(
    key_event: KeyEvent,
    view: &mut ViewMode,
    snapshot: &PipelineSnapshot,
    op_tx: &UnboundedSender<Op>,
) -> bool {
    if key_event.kind != KeyEventKind::Press {
        return false;
    }

    match key_event.code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => *view = view.toggle(),
        KeyCode::Char('1') => *view = ViewMode::Dashboard,
        KeyCode::Char('2') => *view = ViewMode::Blueprint,
        KeyCode::Char('s') | KeyCode::Char(' ') => {
            if let Some(op) = snapshot.control().op() {
                send(op_tx, op);
            }
        }
        KeyCode::Char('r') => send(op_tx, Op::Reset),
        KeyCode::Up | KeyCode::Char('k') if *view == ViewMode::Dashboard => {
            if let Some(stage_id) = neighbour(snapshot, -1) {
                send(op_tx, Op::SelectStage { stage_id });
            }
        }
        KeyCode::Down | KeyCode::Char('j') if *view == ViewMode::Dashboard => {
            if let Some(stage_id) = neighbour(snapshot, 1) {
                send(op_tx, Op::SelectStage { stage_id });
            }
        }
        _ => {}
    }

    false
}

/// The stage `step` rows away from the selection, if there is one.
fn neighbour(snapshot: &PipelineSnapshot, step: isize) -> Option<StageId> {
    let current = snapshot
        .stages
        .iter()
        .position(|s| s.id == snapshot.selected_stage_id)?;
    let target = current.checked_add_signed(step)?;
    snapshot.stages.get(target).map(|s| s.id)
}

fn send(op_tx: &UnboundedSender<Op>, op: Op) {
    if op_tx.send(op).is_err() {
        tracing::warn!("simulation engine is gone, dropping op");
    }
}
