//! # gta-core
//!
//! Stage simulation core for the Grounded Theory Automator.
//!
//! This crate provides:
//! - Configuration loading from the `.gta/` directory
//! - StageStore, the owner of the stage list and active pointer
//! - StageSimulator, the per-tick stage state machine
//! - SimulationEngine, the timer-driven task that ties them together
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`state`]: Stage catalog, lifecycle transitions and the store
//! - [`simulator`]: Tick state machine and phrase sources
//! - [`engine`]: Engine task, handle and timers

pub mod config;
pub mod engine;
pub mod simulator;
pub mod state;
