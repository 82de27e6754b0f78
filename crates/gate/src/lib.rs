//! MintGate Gate
//!
//! The privileged-action gate: verifies a caller's Merkle inclusion proof
//! against the trusted allowlist root, enforces the one-time claim per
//! address, and invokes the minting backend exactly once per claimant.
//!
//! Call flow for `claim_mint`:
//! 1. hash the caller address into its leaf
//! 2. read the trusted root — `RootNotSet` if unconfigured
//! 3. fold the proof and compare against the root — `InvalidProof` on
//!    mismatch
//! 4. atomically mark the caller claimed — `AlreadyClaimed` on replay
//! 5. invoke the minter
//!
//! Verification always precedes claim registration and registration
//! precedes the mint, so a rejected call never leaves a claim behind. If
//! the mint itself fails the claim stays recorded and the failure is
//! surfaced as `MintFailed`; there is no compensation path.
//!
//! `check_validity` exposes steps 1-3 on their own: membership can be
//! checked any number of times without recording a claim.

mod authority;
mod registry;

pub use authority::RootAuthority;
pub use registry::ClaimRegistry;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use mintgate_core::{short_hex, Address, Digest, GateConfig, TokenId};
use mintgate_merkle::{leaf_digest, verify_inclusion};
use mintgate_minter::{MintError, Minter};

/// Gate errors. All are surfaced to the caller; nothing is retried
/// internally.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("No trusted root has been configured")]
    RootNotSet,

    #[error("Proof does not recompute to the trusted root")]
    InvalidProof,

    #[error("Address has already claimed")]
    AlreadyClaimed,

    #[error("Mint failed: {0}")]
    MintFailed(#[from] MintError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, GateError>;

/// Gate-wide statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Number of addresses that have claimed
    pub claimed: usize,
    /// Whether a trusted root is configured
    pub root_set: bool,
}

// === Persistence types (private, for JSON serialization) ===

#[derive(Serialize, Deserialize)]
struct GateStateFile {
    /// Hex-encoded trusted root, if one was configured
    root: Option<String>,
    /// Hex-encoded claimed addresses
    claimed: Vec<String>,
}

/// Decode a hex-encoded 32-byte value from the state file.
fn decode_digest(s: &str) -> Option<Digest> {
    let bytes = hex::decode(s).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

/// The claim gate.
///
/// Owns the trusted-root slot and the claim registry, and drives the
/// pluggable minting backend. All methods take `&self`; internal state is
/// mutex-guarded, so the gate can be shared across threads.
pub struct MintGate {
    authority: RootAuthority,
    registry: ClaimRegistry,
    minter: Box<dyn Minter>,
    config: GateConfig,
}

impl MintGate {
    /// Create an in-memory gate with no root configured.
    pub fn new(minter: Box<dyn Minter>) -> Self {
        Self::with_config(minter, GateConfig::default())
    }

    /// Create a gate with explicit runtime settings.
    pub fn with_config(minter: Box<dyn Minter>, config: GateConfig) -> Self {
        Self {
            authority: RootAuthority::new(),
            registry: ClaimRegistry::new(),
            minter,
            config,
        }
    }

    /// Operator path: overwrite the trusted allowlist root.
    ///
    /// Proofs generated against the previous root stop verifying from
    /// this point on. Existing claims are unaffected.
    pub fn set_root(&self, root: Digest) {
        self.authority.set(root);
        self.autosave();
    }

    /// The currently trusted root, if one has been configured.
    pub fn current_root(&self) -> Option<Digest> {
        self.authority.current().ok()
    }

    /// Read-only membership check for `caller`.
    ///
    /// Verifies the supplied proof against the current trusted root
    /// without touching the claim registry: membership can be re-checked
    /// any number of times, before or after claiming.
    pub fn check_validity(&self, caller: &Address, proof: &[Digest]) -> Result<()> {
        let leaf = leaf_digest(caller);
        let root = self.authority.current()?;

        if !verify_inclusion(&leaf, proof, &root) {
            return Err(GateError::InvalidProof);
        }
        Ok(())
    }

    /// Exercise the one-time privilege for `caller`.
    ///
    /// `proof` is the caller-supplied sibling path for its own leaf,
    /// leaf level first. On success the minter is invoked exactly once
    /// and the new token id is returned.
    pub fn claim_mint(&self, caller: &Address, proof: &[Digest]) -> Result<TokenId> {
        if let Err(e) = self.check_validity(caller, proof) {
            if matches!(e, GateError::InvalidProof) {
                warn!("Rejected proof from {}", short_hex(caller));
            }
            return Err(e);
        }

        if let Err(e) = self.registry.try_claim(caller) {
            debug!("Repeat claim from {}", short_hex(caller));
            return Err(e);
        }

        // The claim is recorded from here on, even if the mint below
        // fails — there is no un-claim path
        let minted = self.minter.mint(caller);
        self.autosave();

        let token_id = minted?;
        info!("Minted token {} for {}", token_id, short_hex(caller));
        Ok(token_id)
    }

    /// Whether `addr` has already claimed. Never mutates state.
    pub fn has_claimed(&self, addr: &Address) -> bool {
        self.registry.has_claimed(addr)
    }

    /// Number of addresses that have claimed.
    pub fn claim_count(&self) -> usize {
        self.registry.len()
    }

    /// Current gate statistics.
    pub fn stats(&self) -> GateStats {
        GateStats {
            claimed: self.registry.len(),
            root_set: self.authority.is_set(),
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Save root + claim set to a JSON file.
    ///
    /// Uses atomic write (tmp + rename) to prevent corruption.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let state = GateStateFile {
            root: self.current_root().map(hex::encode),
            claimed: self
                .registry
                .snapshot()
                .iter()
                .map(hex::encode)
                .collect(),
        };

        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| GateError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, path)?;

        debug!(
            "Saved gate state: {} claims to {}",
            state.claimed.len(),
            path.display(),
        );
        Ok(())
    }

    /// Load root + claim set from a JSON file written by `save_to_file`.
    ///
    /// Malformed entries are skipped with a warning rather than failing
    /// the whole load.
    pub fn load_from_file(
        path: &Path,
        minter: Box<dyn Minter>,
        config: GateConfig,
    ) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let state: GateStateFile = serde_json::from_str(&contents)
            .map_err(|e| GateError::Serialization(e.to_string()))?;

        let root = match state.root.as_deref() {
            Some(s) => {
                let root = decode_digest(s);
                if root.is_none() {
                    warn!("Ignoring malformed root in {}", path.display());
                }
                root
            }
            None => None,
        };

        let mut claimed = Vec::new();
        for entry in &state.claimed {
            match decode_digest(entry) {
                Some(addr) => claimed.push(addr),
                None => warn!("Skipping malformed claim entry in {}", path.display()),
            }
        }

        info!(
            "Loaded gate state: root {}, {} claims from {}",
            if root.is_some() { "set" } else { "unset" },
            claimed.len(),
            path.display(),
        );

        Ok(Self {
            authority: RootAuthority::with_root(root),
            registry: ClaimRegistry::restore(claimed),
            minter,
            config,
        })
    }

    /// Write the state file if autosave is configured.
    fn autosave(&self) {
        if !self.config.autosave {
            return;
        }
        let Some(path) = self.config.state_path.clone() else {
            return;
        };
        if let Err(e) = self.save_to_file(&path) {
            warn!("Failed to autosave gate state to {}: {}", path.display(), e);
        }
    }
}
