//! Account Position Store
//!
//! Keyed storage for stake positions, airdrop flags and last-claimed
//! rewards. Operations never write the store directly: they stage a copy of
//! one account with [`PositionStore::stage`], mutate the copy, and hand it
//! back to [`PositionStore::commit`] once every fallible step succeeded.
//!
//! Encrypted fields of a staged account can only be written through setters
//! that also queue the ACL grants for the new value, so a write can never
//! leave its value unshared.

use std::collections::{BTreeMap, BTreeSet};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use cstake_common::{
    acl::AclBatch,
    types::{Address, EncryptedU64, Timestamp},
};

// ============================================================================
// Types
// ============================================================================

/// Stake position of one account
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct AccountPosition {
    /// Encrypted staked amount; `None` until the first stake
    principal: Option<EncryptedU64>,
    /// Encrypted interest accrued but not yet claimed; `None` until the
    /// first accrual produces a reward
    rewards: Option<EncryptedU64>,
    /// Accrual watermark in seconds, 0 = never touched
    last_accrual: Timestamp,
}

impl AccountPosition {
    pub fn principal(&self) -> Option<EncryptedU64> {
        self.principal
    }

    pub fn rewards(&self) -> Option<EncryptedU64> {
        self.rewards
    }

    pub fn last_accrual(&self) -> Timestamp {
        self.last_accrual
    }
}

/// Working copy of one account for the duration of an operation
#[derive(Debug, Clone)]
pub struct StagedAccount {
    owner: Address,
    position: AccountPosition,
    airdrop_claimed: bool,
    last_claimed_reward: Option<EncryptedU64>,
    acl: AclBatch,
}

impl StagedAccount {
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn position(&self) -> &AccountPosition {
        &self.position
    }

    pub fn airdrop_claimed(&self) -> bool {
        self.airdrop_claimed
    }

    /// Grants queued so far
    pub fn acl(&self) -> &AclBatch {
        &self.acl
    }

    pub fn set_principal(&mut self, value: EncryptedU64) {
        self.acl.share(&self.owner, &value);
        self.position.principal = Some(value);
    }

    pub fn set_rewards(&mut self, value: EncryptedU64) {
        self.acl.share(&self.owner, &value);
        self.position.rewards = Some(value);
    }

    pub fn set_last_claimed_reward(&mut self, value: EncryptedU64) {
        self.acl.share(&self.owner, &value);
        self.last_claimed_reward = Some(value);
    }

    /// Advance the accrual watermark; never moves it backwards
    pub fn set_last_accrual(&mut self, now: Timestamp) {
        self.position.last_accrual = self.position.last_accrual.max(now);
    }

    /// One-shot; there is no way to clear it
    pub fn mark_airdrop_claimed(&mut self) {
        self.airdrop_claimed = true;
    }

    /// Share a handle returned to the owner (amount minted or sent)
    pub fn share(&mut self, value: &EncryptedU64) {
        self.acl.share(&self.owner, value);
    }

    /// Re-share both encrypted position fields
    pub fn share_position(&mut self) {
        let principal = self.position.principal;
        let rewards = self.position.rewards;
        self.acl
            .share_all(&self.owner, &[principal.as_ref(), rewards.as_ref()]);
    }
}

/// Keyed store owned by the ledger
#[derive(Debug, Clone, Default)]
pub struct PositionStore {
    positions: BTreeMap<Address, AccountPosition>,
    airdrop_claimed: BTreeSet<Address>,
    last_claimed_reward: BTreeMap<Address, EncryptedU64>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored position, `None` if the account never interacted
    pub fn position(&self, account: &Address) -> Option<&AccountPosition> {
        self.positions.get(account)
    }

    pub fn has_claimed(&self, account: &Address) -> bool {
        self.airdrop_claimed.contains(account)
    }

    pub fn last_claimed_reward(&self, account: &Address) -> Option<EncryptedU64> {
        self.last_claimed_reward.get(account).copied()
    }

    /// Copy `owner`'s record into a staged account. Accounts with no record
    /// start from an empty position.
    pub fn stage(&self, owner: Address, ledger: Address) -> StagedAccount {
        StagedAccount {
            owner,
            position: self.positions.get(&owner).cloned().unwrap_or_default(),
            airdrop_claimed: self.has_claimed(&owner),
            last_claimed_reward: self.last_claimed_reward(&owner),
            acl: AclBatch::new(ledger),
        }
    }

    /// Write a staged account back and return its pending grants.
    ///
    /// The position is only materialized once it holds something, so an
    /// airdrop claim alone does not create an empty position.
    pub fn commit(&mut self, staged: StagedAccount) -> AclBatch {
        let StagedAccount {
            owner,
            position,
            airdrop_claimed,
            last_claimed_reward,
            acl,
        } = staged;

        if position != AccountPosition::default() || self.positions.contains_key(&owner) {
            self.positions.insert(owner, position);
        }
        if airdrop_claimed {
            self.airdrop_claimed.insert(owner);
        }
        if let Some(reward) = last_claimed_reward {
            self.last_claimed_reward.insert(owner, reward);
        }
        acl
    }
}

// ============================================================================
// Tests
// ============================================================================
