//! Standalone entry point for the dashboard TUI.
//!
//! Reads `.gta/config.toml` from the current directory if present.

use anyhow::Result;
use gta_core::config::loader::{default_config_path, load_config};
use gta_tui::run_app;

#[tokio::main]
async fn main() -> Result<()> {
    let root = std::env::current_dir()?;
    let config = load_config(&default_config_path(&root))?;
    run_app(config).await
}
