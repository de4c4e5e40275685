//! Simulation settings for `.gta/config.toml`.
//!
//! Every field has a default, so an absent or empty file yields the
//! cadence of the original dashboard.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Canned activity lines the simulator draws from.
pub const DEFAULT_PHRASES: &[&str] = &[
    "Analyzing semantic patterns...",
    "Querying vector database...",
    "Identifying key themes in segment...",
    "Cross-referencing with previous context...",
    "Optimizing token usage...",
    "Generating intermediate reasoning...",
];

/// Settings that drive the stage simulation.
///
/// # Example
///
/// ```toml
/// # .gta/config.toml
/// tick_interval_ms = 800
/// advance_delay_ms = 1000
/// log_threshold = 8
/// log_probability = 0.3
/// seed = 42
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(default)]
pub struct SimulationConfig {
    /// Period of the simulation tick in milliseconds.
    pub tick_interval_ms: u64,

    /// Delay between a stage completing and its successor becoming active.
    pub advance_delay_ms: u64,

    /// A stage completes once it holds more than this many log lines.
    pub log_threshold: usize,

    /// Chance that a tick appends a log line, in `0.0..=1.0`.
    pub log_probability: f64,

    /// Seed for the phrase generator. `None` seeds from entropy.
    #[ts(type = "number | null")]
    pub seed: Option<u64>,

    /// Phrases appended to the activity log.
    pub phrases: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 800,
            advance_delay_ms: 1000,
            log_threshold: 8,
            log_probability: 0.3,
            seed: None,
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}
