//! Test fixtures for creating configurations, engines and event logs.

use gta_core::engine::{EngineHandle, SimulationEngine};
use gta_core::simulator::phrases::ScriptedPhrases;
use gta_core::simulator::{StageSimulator, TickOutcome};
use gta_core::state::StageStore;
use gta_protocol::config_models::SimulationConfig;
use gta_protocol::ipc::Event;
use tokio::sync::broadcast;

/// Default cadence with a custom log threshold.
#[allow(dead_code)]
pub fn create_test_config(log_threshold: usize) -> SimulationConfig {
    SimulationConfig {
        log_threshold,
        ..SimulationConfig::default()
    }
}

/// Spawn an engine over the built-in catalog with scripted phrases.
#[allow(dead_code)]
pub fn spawn_test_engine(config: &SimulationConfig, phrases: ScriptedPhrases) -> EngineHandle {
    SimulationEngine::new(config, StageStore::with_catalog(), Box::new(phrases)).spawn()
}

/// A simulator that logs on every tick.
#[allow(dead_code)]
pub fn eager_simulator(log_threshold: usize) -> StageSimulator {
    StageSimulator::new(
        Box::new(ScriptedPhrases::always("Querying vector database...")),
        log_threshold,
    )
}

/// Collect every event currently buffered for `rx`.
#[allow(dead_code)]
pub fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Tick and advance synchronously until the run finishes.
///
/// `after_tick` sees the store after every tick, which lets tests check
/// invariants over every reachable state. Panics after `max_ticks`.
#[allow(dead_code)]
pub fn run_to_completion<F>(
    store: &mut StageStore,
    simulator: &mut StageSimulator,
    max_ticks: usize,
    mut after_tick: F,
) where
    F: FnMut(&StageStore, TickOutcome),
{
    store.start();
    for _ in 0..max_ticks {
        let outcome = simulator.tick(store);
        after_tick(store, outcome);
        match outcome {
            TickOutcome::Completed { next: None, .. } | TickOutcome::Stopped => return,
            TickOutcome::Completed { next: Some(_), .. } => {
                store.advance();
            }
            _ => {}
        }
    }
    panic!("run did not finish within {max_ticks} ticks");
}
