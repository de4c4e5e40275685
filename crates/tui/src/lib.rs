//! # gta-tui
//!
//! Terminal User Interface for the Grounded Theory Automator.
//!
//! The TUI shows the live dashboard and the system blueprint. It talks to
//! the simulation engine from `gta-core` only through the `Op` and `Event`
//! types defined in `gta-protocol`.

pub mod app;
pub mod event;
pub mod event_handler;
pub mod tui;
pub mod widgets;

pub use app::App;
pub use tui::Tui;

use anyhow::Result;
use gta_core::engine::SimulationEngine;
use gta_protocol::config_models::SimulationConfig;

/// Spawn a simulation engine for `config` and run the TUI until the user
/// quits.
pub async fn run_app(config: SimulationConfig) -> Result<()> {
    let engine = SimulationEngine::from_config(&config).spawn();
    let event_rx = engine.subscribe();
    let snapshot = engine.snapshot().await?;

    let mut app = App::new(engine.op_sender(), event_rx, snapshot);
    let mut tui = Tui::init()?;
    let result = app.run(&mut tui).await;
    tui.restore()?;
    drop(tui);

    engine.shutdown().await?;
    result
}
