//! MintGate Minter
//!
//! Pluggable minting backend for the claim gate. The gate invokes the
//! backend exactly once per verified, not-yet-claimed address; everything
//! beyond handing out a token id and bumping the recipient's balance is
//! the backend's own business.
//!
//! `TokenLedger` is the in-memory implementation. A chain-backed minter
//! can be swapped in behind the same trait.

mod ledger;
mod traits;

pub use ledger::TokenLedger;
pub use traits::{MintError, Minter};
