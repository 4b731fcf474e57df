//! Single-attempt guard
//!
//! Held for the lifetime of an attempt; released on drop, including when the
//! attempt future is dropped mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};

use super::OrchestratorError;

pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    pub fn acquire(flag: &'a AtomicBool) -> Result<Self, OrchestratorError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OrchestratorError::AttemptInFlight)?;

        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
