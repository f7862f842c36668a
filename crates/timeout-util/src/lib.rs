//! Shared utilities for timeoutd
//!
//! This crate provides:
//! - ID types (TabId)
//! - Time utilities (mockable wall clock, minute conversions, formatting)
//! - Error types
//! - Default paths for config and the shared activity store

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
