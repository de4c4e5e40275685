//! State management for pipeline stages.
//!
//! This module provides:
//! - The built-in stage catalog
//! - Stage lifecycle transitions and event emission
//! - StageStore, the single owner of the stage list and active pointer

pub mod catalog;
pub mod stage;
pub mod store;

pub use catalog::initial_stages;
pub use store::StageStore;
