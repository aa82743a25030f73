//! Confidential Token
//!
//! Reference fungible token over encrypted balances. Only the authorized
//! minter (the staking ledger) can mint. Transfers move
//! `min(amount, balance)` so an oversized request neither fails nor reveals
//! that it was oversized.
//!
//! Every balance the token writes is shared with its holder and with the
//! token itself.

use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cstake_common::{
    errors::{StakingError, StakingResult},
    fhe::{ConfidentialToken, EncryptedOps},
    types::{Address, EncryptedU64},
};

// ============ Token State ============

/// Token configuration and status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenState {
    /// The token's own address
    pub address: Address,
    /// Authorized minter (the staking ledger)
    pub authorized_minter: Address,
    /// While paused, every mint and transfer is rejected
    pub paused: bool,
}

// NOTE: Default intentionally not implemented; a zero-address minter would
// let anyone holding that key mint.

impl TokenState {
    /// Create new token state with authorized minter
    pub fn new(address: Address, authorized_minter: Address) -> Self {
        Self {
            address,
            authorized_minter,
            paused: false,
        }
    }
}

// ============ Token ============

/// In-memory confidential token
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    state: TokenState,
    balances: BTreeMap<Address, EncryptedU64>,
    total_supply: Option<EncryptedU64>,
}

impl InMemoryToken {
    pub fn new(address: Address, authorized_minter: Address) -> Self {
        Self {
            state: TokenState::new(address, authorized_minter),
            balances: BTreeMap::new(),
            total_supply: None,
        }
    }

    pub fn state(&self) -> &TokenState {
        &self.state
    }

    /// Pause or resume the token
    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    /// Encrypted balance of `holder`, `None` if never credited
    pub fn balance_of(&self, holder: &Address) -> Option<EncryptedU64> {
        self.balances.get(holder).copied()
    }

    /// Encrypted total supply, `None` before the first mint
    pub fn total_supply(&self) -> Option<EncryptedU64> {
        self.total_supply
    }

    fn ensure_active(&self, operation: &'static str) -> StakingResult<()> {
        if self.state.paused {
            warn!(operation, "token paused, rejecting");
            return Err(StakingError::TokenRejected { operation });
        }
        Ok(())
    }

    /// Add `amount` to `holder`'s balance and share the new balance.
    ///
    /// Always stores a fresh handle so grants on the balance never leak onto
    /// the caller's `amount` handle.
    fn credit<F: EncryptedOps>(&mut self, fhe: &mut F, holder: &Address, amount: &EncryptedU64) {
        let base = match self.balances.get(holder) {
            Some(balance) => *balance,
            None => fhe.encrypt_constant(0),
        };
        let new_balance = fhe.add(&base, amount);
        self.set_balance(fhe, holder, new_balance);
    }

    fn set_balance<F: EncryptedOps>(
        &mut self,
        fhe: &mut F,
        holder: &Address,
        balance: EncryptedU64,
    ) {
        fhe.grant_access(&balance, holder);
        fhe.grant_access(&balance, &self.state.address);
        self.balances.insert(*holder, balance);
    }
}

impl<F: EncryptedOps> ConfidentialToken<F> for InMemoryToken {
    fn mint(
        &mut self,
        fhe: &mut F,
        minter: &Address,
        to: &Address,
        amount: &EncryptedU64,
    ) -> StakingResult<EncryptedU64> {
        self.ensure_active("mint")?;

        // Caller must be the authorized minter
        if *minter != self.state.authorized_minter {
            return Err(StakingError::MintUnauthorized { caller: *minter });
        }

        self.credit(fhe, to, amount);

        let base = match self.total_supply {
            Some(supply) => supply,
            None => fhe.encrypt_constant(0),
        };
        let supply = fhe.add(&base, amount);
        fhe.grant_access(&supply, &self.state.address);
        self.total_supply = Some(supply);

        debug!(to = ?to, "minted");
        Ok(*amount)
    }

    fn transfer(
        &mut self,
        fhe: &mut F,
        from: &Address,
        to: &Address,
        amount: &EncryptedU64,
    ) -> StakingResult<EncryptedU64> {
        self.ensure_active("transfer")?;

        let moved = match self.balances.get(from).copied() {
            Some(balance) => {
                let moved = fhe.min(amount, &balance);
                let remaining = fhe.sub(&balance, &moved);
                self.set_balance(fhe, from, remaining);
                moved
            }
            None => fhe.encrypt_constant(0),
        };

        self.credit(fhe, to, &moved);

        debug!(from = ?from, to = ?to, "transferred");
        Ok(moved)
    }

    fn balance_of(&self, holder: &Address) -> Option<EncryptedU64> {
        InMemoryToken::balance_of(self, holder)
    }
}

// ============ Tests ============
