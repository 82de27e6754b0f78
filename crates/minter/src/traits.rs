//! Minter trait for pluggable token backends.

use mintgate_core::{Address, TokenId};

/// Errors from minting.
///
/// Backends are expected to fail only on resource exhaustion, never on
/// business logic — eligibility is decided before the gate calls in.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MintError {
    #[error("Mint capacity exhausted")]
    Exhausted,
}

/// Pluggable minting backend.
///
/// `mint` is not idempotent: the gate guarantees at most one call per
/// address by checking the claim registry first.
pub trait Minter: Send + Sync {
    /// Mint one token to `recipient`, returning its unique id.
    fn mint(&self, recipient: &Address) -> Result<TokenId, MintError>;
}

impl<M: Minter + ?Sized> Minter for std::sync::Arc<M> {
    fn mint(&self, recipient: &Address) -> Result<TokenId, MintError> {
        (**self).mint(recipient)
    }
}
