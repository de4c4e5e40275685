//! Custom assertion helpers for stage state and event streams.

use gta_protocol::ipc::{Event, PipelineSnapshot};
use gta_protocol::stage_models::{Stage, StageId, StageStatus};

/// Assert that no more than one stage is processing.
pub fn assert_at_most_one_processing(stages: &[Stage]) {
    let processing: Vec<StageId> = stages
        .iter()
        .filter(|s| s.status == StageStatus::Processing)
        .map(|s| s.id)
        .collect();
    assert!(
        processing.len() <= 1,
        "expected at most one processing stage, got {:?}",
        processing
    );
}

/// Assert that the snapshot is the freshly loaded pipeline.
pub fn assert_pristine(snapshot: &PipelineSnapshot) {
    assert!(!snapshot.running, "pipeline should not be running");
    assert_eq!(snapshot.active_stage_id, None, "active pointer should be cleared");
    for stage in &snapshot.stages {
        assert_eq!(stage.status, StageStatus::Idle, "stage {} not idle", stage.id);
        assert!(stage.logs.is_empty(), "stage {} still has logs", stage.id);
        assert!(stage.output.is_none(), "stage {} still has output", stage.id);
    }
}

/// Every active stage id announced by the event stream, in order.
pub fn activation_order(events: &[Event]) -> Vec<StageId> {
    let mut order: Vec<StageId> = Vec::new();
    for event in events {
        if let Event::RunStateChanged {
            active_stage_id: Some(id),
            ..
        } = event
        {
            if order.last() != Some(id) {
                order.push(*id);
            }
        }
    }
    order
}

/// Assert that activations move strictly upward one stage at a time.
pub fn assert_monotonic_activation(events: &[Event], stage_ids: &[StageId]) {
    let order = activation_order(events);
    let expected: Vec<StageId> = stage_ids.iter().copied().take(order.len()).collect();
    assert_eq!(order, expected, "activation skipped or revisited a stage");
}

/// Count log chunk events.
pub fn count_log_chunks(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, Event::StageLogChunk { .. }))
        .count()
}
