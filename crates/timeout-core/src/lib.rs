//! Session-timeout coordinator for timeoutd
//!
//! This crate is the heart of timeoutd, containing:
//! - Deferred timers, one slot per kind (warning, logout, grace, expiry)
//! - Dialog set enforcing that at most one dialog is open
//! - The coordinator state machine
//!   (Active -> WarningShown -> LogoutShown -> SignedOut, with * -> Expired)
//! - Cross-tab deferral through the shared activity store
//!
//! The coordinator never reads the clock itself: every operation takes `now`,
//! so the runtime drives it from a tick and tests drive it with fixed times.

mod coordinator;
mod dialogs;
mod events;
mod timers;

pub use coordinator::*;
pub use dialogs::*;
pub use events::*;
pub use timers::*;
