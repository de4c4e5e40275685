//! Configuration loading.
//!
//! This module loads simulation settings from `.gta/config.toml` and
//! rejects values the simulator cannot run with.

pub mod error;
pub mod loader;
