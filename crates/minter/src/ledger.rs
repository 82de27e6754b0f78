//! In-memory token ledger.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use mintgate_core::{short_hex, Address, TokenId};

use crate::traits::{MintError, Minter};

/// In-memory minting backend.
///
/// Token ids increase monotonically and a recipient's balance only ever
/// increments. There is no transfer or burn; ownership semantics live
/// outside this crate.
#[derive(Debug, Default)]
pub struct TokenLedger {
    inner: Mutex<LedgerState>,
}

#[derive(Debug, Default)]
struct LedgerState {
    next_token_id: TokenId,
    balances: HashMap<Address, u64>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens held by `addr`.
    pub fn balance_of(&self, addr: &Address) -> u64 {
        self.inner
            .lock()
            .unwrap()
            .balances
            .get(addr)
            .copied()
            .unwrap_or(0)
    }

    /// Total number of tokens minted so far.
    pub fn total_minted(&self) -> u64 {
        self.inner.lock().unwrap().next_token_id
    }
}

impl Minter for TokenLedger {
    fn mint(&self, recipient: &Address) -> Result<TokenId, MintError> {
        let mut state = self.inner.lock().unwrap();
        let token_id = state.next_token_id;
        state.next_token_id = token_id.checked_add(1).ok_or(MintError::Exhausted)?;
        *state.balances.entry(*recipient).or_insert(0) += 1;

        debug!("Minted token {} to {}", token_id, short_hex(recipient));
        Ok(token_id)
    }
}
