//! Host trait interfaces for timeoutd
//!
//! This crate defines the interface between the runtime and the server that
//! owns the session. It contains no network code itself.

mod location;
mod mock;
mod traits;

pub use location::*;
pub use mock::*;
pub use traits::*;
