//! Protocol types for timeoutd
//!
//! This crate defines the stable line protocol between a tab coordinator and
//! whatever renders it:
//! - Commands (dialog buttons and activity, read from the consumer)
//! - Responses
//! - Events (dialogs opening and closing, sign-out, redirect)
//! - Versioning

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
