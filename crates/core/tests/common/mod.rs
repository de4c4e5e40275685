//! Common test utilities shared by the integration suites.
//!
//! This module provides:
//! - Test fixtures (configs, engines, event draining)
//! - Custom assertions over stages and event streams

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
