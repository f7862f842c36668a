//! Mock host for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use timeout_api::SignOutReason;

use crate::{sign_in_location, HostError, HostResult, SessionHost};

/// Mock host for unit/integration testing
#[derive(Default)]
pub struct MockHost {
    sign_outs: AtomicU32,
    redirects: Mutex<Vec<String>>,

    /// Configure sign-out to fail
    pub fail_sign_out: Arc<Mutex<bool>>,

    /// Configure the sign-in location to fail
    pub fail_location: Arc<Mutex<bool>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sign-out requests made
    pub fn sign_out_count(&self) -> u32 {
        self.sign_outs.load(Ordering::SeqCst)
    }

    /// Locations handed out, oldest first
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionHost for MockHost {
    async fn sign_out(&self) -> HostResult<()> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);

        if *self.fail_sign_out.lock().unwrap() {
            return Err(HostError::Request("mock sign-out failure".into()));
        }
        Ok(())
    }

    fn sign_in_location(&self, next: &str, reason: SignOutReason) -> HostResult<String> {
        if *self.fail_location.lock().unwrap() {
            return Err(HostError::InvalidUrl("mock location failure".into()));
        }

        let location = sign_in_location("/sign-in", next, reason);
        self.redirects.lock().unwrap().push(location.clone());
        Ok(location)
    }
}
