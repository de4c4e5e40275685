//! # gta-protocol
//!
//! Core data models and protocol definitions for the Grounded Theory Automator.
//!
//! This crate defines all shared data structures used for:
//! - The pipeline stage records shown in both dashboard views
//! - Simulation settings loaded from `config.toml`
//! - Communication between the TUI and the simulation engine
//!
//! ## Modules
//!
//! - [`stage_models`]: Stage records and their lifecycle status
//! - [`config_models`]: Simulation settings
//! - [`ipc`]: Operations, Events and snapshots for Core-TUI communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other workspace crates

pub mod config_models;
pub mod ipc;
pub mod stage_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use ipc::*;
pub use stage_models::*;
