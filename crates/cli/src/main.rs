//! `gta`: the Grounded Theory Automator command line.
//!
//! Without a subcommand it launches the dashboard TUI.
//!
//! ```bash
//! gta                      # TUI
//! gta run --json --seed 7  # headless run, JSON lines on stdout
//! gta stages               # print the stage blueprint
//! ```

mod headless;
mod logging;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use gta_core::config::loader::{load_config, validate, CONFIG_DIR, CONFIG_FILE};
use gta_protocol::config_models::SimulationConfig;
use headless::OutputFormat;
use logging::LogTarget;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gta", version, about = "Multi-agent workflow orchestrator dashboard")]
struct Cli {
    /// Settings file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value_os_t = default_config())]
    config: PathBuf,

    /// Seed for the log generator, for reproducible runs.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Simulation tick interval in milliseconds.
    #[arg(long = "tick-ms", global = true)]
    tick_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Launch the interactive dashboard (default).
    Tui,
    /// Run the pipeline once without a UI and print its events.
    Run {
        /// Print one JSON event per line.
        #[arg(long)]
        json: bool,
    },
    /// Print the stage blueprint.
    Stages {
        #[arg(long)]
        json: bool,
    },
}

fn default_config() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join(CONFIG_FILE)
}

impl Cli {
    /// Load the settings file and apply command line overrides.
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = load_config(&self.config)?;
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(tick_ms) = self.tick_ms {
            config.tick_interval_ms = tick_ms;
        }
        validate(&config, &self.config)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Command::Tui) {
        Command::Tui => {
            logging::init_logging(LogTarget::File);
            let config = cli.simulation_config()?;
            gta_tui::run_app(config).await.map_err(|e| eyre!(e))
        }
        Command::Run { json } => {
            logging::init_logging(LogTarget::Stderr);
            let config = cli.simulation_config()?;
            headless::run_headless(&config, OutputFormat::from_json_flag(*json)).await?;
            Ok(())
        }
        Command::Stages { json } => headless::print_stages(OutputFormat::from_json_flag(*json)),
    }
}
