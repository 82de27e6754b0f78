//! Per-address claim tracking.

use std::collections::HashSet;
use std::sync::Mutex;

use mintgate_core::Address;

use crate::{GateError, Result};

/// Tracks which addresses have already exercised their one-time claim.
///
/// The set is monotonic: entries are only ever inserted, and only via
/// `try_claim` on behalf of a verified caller. Nothing removes an entry;
/// replacing the allowlist root does not reset claims.
#[derive(Debug, Default)]
pub struct ClaimRegistry {
    claimed: Mutex<HashSet<Address>>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the registry from persisted entries.
    pub(crate) fn restore(entries: impl IntoIterator<Item = Address>) -> Self {
        Self {
            claimed: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Atomically check-and-mark `addr` as claimed.
    ///
    /// The test and the insert happen under one lock acquisition, so of
    /// two racing calls for the same address exactly one succeeds and the
    /// other gets `AlreadyClaimed`.
    pub fn try_claim(&self, addr: &Address) -> Result<()> {
        let mut claimed = self.claimed.lock().unwrap();
        if !claimed.insert(*addr) {
            return Err(GateError::AlreadyClaimed);
        }
        Ok(())
    }

    /// Whether `addr` has already claimed. Read-only.
    pub fn has_claimed(&self, addr: &Address) -> bool {
        self.claimed.lock().unwrap().contains(addr)
    }

    /// Number of recorded claims.
    pub fn len(&self) -> usize {
        self.claimed.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted snapshot of claimed addresses (for the state file).
    pub(crate) fn snapshot(&self) -> Vec<Address> {
        let mut entries: Vec<Address> = self.claimed.lock().unwrap().iter().copied().collect();
        entries.sort_unstable();
        entries
    }
}
