//! Fault injection for exercising error paths
//!
//! Faults are armed by tests and consumed by the next matching operation.

use parking_lot::Mutex;

use strata_core::{StrataError, StrataResult};

/// Armed faults shared by a region and its scanners
#[derive(Debug, Default)]
pub struct FaultPlan {
    next_get: Mutex<Option<String>>,
    scanner_after: Mutex<Option<(usize, String)>>,
}

impl FaultPlan {
    /// No faults armed
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next point lookup fail with `message`
    pub fn fail_next_get(&self, message: impl Into<String>) {
        *self.next_get.lock() = Some(message.into());
    }

    /// Make scanners fail once they have returned `rows` batches
    pub fn fail_scanner_after(&self, rows: usize, message: impl Into<String>) {
        *self.scanner_after.lock() = Some((rows, message.into()));
    }

    /// Disarm every fault
    pub fn clear(&self) {
        *self.next_get.lock() = None;
        *self.scanner_after.lock() = None;
    }

    pub(crate) fn check_get(&self) -> StrataResult<()> {
        match self.next_get.lock().take() {
            Some(message) => Err(StrataError::storage_failure(message)),
            None => Ok(()),
        }
    }

    pub(crate) fn check_scanner(&self, returned: usize) -> StrataResult<()> {
        let mut armed = self.scanner_after.lock();
        match armed.as_ref() {
            Some((rows, _)) if returned >= *rows => {
                let (_, message) = armed.take().unwrap_or_default();
                Err(StrataError::storage_failure(message))
            }
            _ => Ok(()),
        }
    }
}
