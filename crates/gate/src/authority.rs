//! Trusted-root slot.

use std::sync::Mutex;

use tracing::info;

use mintgate_core::{short_hex, Digest};

use crate::{GateError, Result};

/// Holds the single currently-trusted allowlist root.
///
/// Replacing the root immediately invalidates every proof generated
/// against the old one; no history is kept. Restricting who may call
/// `set` is the embedder's concern — the gate only exposes the operator
/// method.
#[derive(Debug, Default)]
pub struct RootAuthority {
    root: Mutex<Option<Digest>>,
}

impl RootAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_root(root: Option<Digest>) -> Self {
        Self {
            root: Mutex::new(root),
        }
    }

    /// The currently trusted root.
    ///
    /// Fails with `RootNotSet` until the operator has configured one.
    pub fn current(&self) -> Result<Digest> {
        (*self.root.lock().unwrap()).ok_or(GateError::RootNotSet)
    }

    /// Whether a root has been configured.
    pub fn is_set(&self) -> bool {
        self.root.lock().unwrap().is_some()
    }

    /// Unconditionally overwrite the trusted root.
    pub fn set(&self, root: Digest) {
        let mut slot = self.root.lock().unwrap();
        match slot.replace(root) {
            Some(old) => info!(
                "Replaced trusted root {} with {}",
                short_hex(&old),
                short_hex(&root),
            ),
            None => info!("Trusted root set to {}", short_hex(&root)),
        }
    }
}
