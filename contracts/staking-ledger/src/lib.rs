//! Confidential Staking Ledger
//!
//! Users stake an encrypted amount of a confidential token, accrue interest
//! at a fixed annual rate, and withdraw principal or claim minted rewards.
//! The ledger never sees an amount in cleartext.
//!
//! ## Operation shape
//!
//! Every public operation runs the same way:
//!
//! 1. Stage a copy of the caller's record ([`store::StagedAccount`])
//! 2. Run the accrual engine on the copy
//! 3. Apply the operation's own encrypted delta
//! 4. Call the token (mint or transfer)
//! 5. Commit: write the record, apply the staged grants, emit the event
//!
//! Any error before step 5 drops the staged copy, so a failed operation
//! leaves positions, flags, grants and events exactly as they were.
//!
//! ## Sharing
//!
//! Every encrypted value the ledger writes or returns is granted to the
//! owning account and to the ledger, and to nobody else.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod accrual;
pub mod store;


use cstake_common::{
    constants::staking::{AIRDROP_AMOUNT, BPS_DENOMINATOR, RATE_BPS},
    errors::{StakingError, StakingResult},
    events::{EventLog, StakingEvent},
    fhe::{is_initialized, ConfidentialToken, EncryptedOps},
    types::{Address, CallContext, EncryptedInput, EncryptedU64, Timestamp},
};

pub use accrual::{accrue, AccrualOutcome};
pub use store::{AccountPosition, PositionStore, StagedAccount};

// ============ Ledger Config ============

/// Configuration for the staking ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StakingConfig {
    /// The ledger's own address; holds staked funds, mints rewards and is
    /// co-granted on every encrypted value it writes
    pub ledger: Address,
    /// Annual interest rate in basis points
    pub rate_bps: u64,
    /// Amount minted by the one-time airdrop
    pub airdrop_amount: u64,
}

impl StakingConfig {
    /// Config with protocol defaults for the ledger at `ledger`
    pub fn new(ledger: Address) -> Self {
        Self {
            ledger,
            rate_bps: RATE_BPS,
            airdrop_amount: AIRDROP_AMOUNT,
        }
    }

    pub fn with_rate_bps(mut self, rate_bps: u64) -> Self {
        self.rate_bps = rate_bps;
        self
    }

    pub fn with_airdrop_amount(mut self, airdrop_amount: u64) -> Self {
        self.airdrop_amount = airdrop_amount;
        self
    }

    /// Check parameter ranges
    pub fn validate(&self) -> StakingResult<()> {
        if self.rate_bps == 0 {
            return Err(StakingError::InvalidConfig {
                param: "rate_bps",
                reason: "must be positive",
            });
        }
        if self.rate_bps > BPS_DENOMINATOR {
            return Err(StakingError::InvalidConfig {
                param: "rate_bps",
                reason: "exceeds 100% APR",
            });
        }
        Ok(())
    }
}

// ============ Ledger ============

/// The staking ledger with its encrypted-arithmetic capability and token
pub struct StakingLedger<F, T> {
    config: StakingConfig,
    fhe: F,
    token: T,
    store: PositionStore,
    events: EventLog,
}

fn rejected(operation: &'static str, ctx: &CallContext, err: StakingError) -> StakingError {
    warn!(
        operation,
        caller = %short(&ctx.caller),
        code = err.code(),
        "operation rejected"
    );
    err
}

/// First four address bytes as hex, for log lines
fn short(address: &Address) -> String {
    address[..4].iter().map(|b| format!("{:02x}", b)).collect()
}

impl<F: EncryptedOps, T: ConfidentialToken<F>> StakingLedger<F, T> {
    /// Create a ledger over `fhe` and `token`; the token must accept the
    /// ledger address as its minter
    pub fn new(config: StakingConfig, fhe: F, token: T) -> StakingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fhe,
            token,
            store: PositionStore::new(),
            events: EventLog::new(),
        })
    }

    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// The encrypted-arithmetic capability
    pub fn coprocessor(&self) -> &F {
        &self.fhe
    }

    pub fn coprocessor_mut(&mut self) -> &mut F {
        &mut self.fhe
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    /// Committed events, oldest first
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    fn stage(&self, ctx: &CallContext) -> StagedAccount {
        self.store.stage(ctx.caller, self.config.ledger)
    }

    fn commit(&mut self, staged: StagedAccount, event: StakingEvent) {
        let acl = self.store.commit(staged);
        acl.apply(&mut self.fhe);
        info!(
            event = ?event.event_type(),
            account = %short(event.account()),
            timestamp = event.timestamp(),
            "committed"
        );
        self.events.emit(event);
    }

    // ============ Operations ============

    /// Mint the one-time airdrop to the caller's token balance.
    ///
    /// Fails with `AlreadyClaimed` on any later call.
    pub fn claim_airdrop(&mut self, ctx: &CallContext) -> StakingResult<EncryptedU64> {
        let mut account = self.stage(ctx);
        if account.airdrop_claimed() {
            return Err(rejected("claim_airdrop", ctx, StakingError::AlreadyClaimed));
        }

        let amount = self.fhe.encrypt_constant(self.config.airdrop_amount);
        let minted = self
            .token
            .mint(&mut self.fhe, &self.config.ledger, &ctx.caller, &amount)
            .map_err(|e| rejected("claim_airdrop", ctx, e))?;

        account.mark_airdrop_claimed();
        account.share(&minted);

        self.commit(
            account,
            StakingEvent::AirdropClaimed {
                account: ctx.caller,
                amount: minted,
                timestamp: ctx.now,
            },
        );
        Ok(minted)
    }

    /// Stake a client-encrypted amount.
    ///
    /// Interest up to `now` accrues on the pre-deposit principal. The amount
    /// the token reports as moved, not the amount requested, is added.
    pub fn stake(
        &mut self,
        ctx: &CallContext,
        input: &EncryptedInput,
    ) -> StakingResult<EncryptedU64> {
        let mut account = self.stage(ctx);
        let requested = self
            .fhe
            .decode_input(input, &ctx.caller, &self.config.ledger)
            .map_err(|e| rejected("stake", ctx, e))?;

        let first_stake = !is_initialized(account.position().principal().as_ref());
        accrue(&mut self.fhe, &mut account, ctx.now, self.config.rate_bps);

        let moved = self
            .token
            .transfer(&mut self.fhe, &ctx.caller, &self.config.ledger, &requested)
            .map_err(|e| rejected("stake", ctx, e))?;

        let principal = match account.position().principal() {
            Some(principal) => self.fhe.add(&principal, &moved),
            None => moved,
        };
        account.set_principal(principal);
        if first_stake {
            account.set_last_accrual(ctx.now);
        }
        account.share(&moved);

        self.commit(
            account,
            StakingEvent::Staked {
                account: ctx.caller,
                amount: moved,
                timestamp: ctx.now,
            },
        );
        Ok(moved)
    }

    /// Withdraw up to the requested amount of principal.
    ///
    /// The request is clamped with an encrypted `min`, so the caller cannot
    /// learn whether it exceeded the stake. Returns the amount sent.
    pub fn withdraw_stake(
        &mut self,
        ctx: &CallContext,
        input: &EncryptedInput,
    ) -> StakingResult<EncryptedU64> {
        let mut account = self.stage(ctx);
        let Some(principal) = account.position().principal() else {
            return Err(rejected("withdraw_stake", ctx, StakingError::NothingStaked));
        };
        let requested = self
            .fhe
            .decode_input(input, &ctx.caller, &self.config.ledger)
            .map_err(|e| rejected("withdraw_stake", ctx, e))?;

        accrue(&mut self.fhe, &mut account, ctx.now, self.config.rate_bps);

        let withdrawable = self.fhe.min(&principal, &requested);
        let remaining = self.fhe.sub(&principal, &withdrawable);
        account.set_principal(remaining);

        let sent = self
            .token
            .transfer(&mut self.fhe, &self.config.ledger, &ctx.caller, &withdrawable)
            .map_err(|e| rejected("withdraw_stake", ctx, e))?;
        account.share(&sent);

        self.commit(
            account,
            StakingEvent::StakeWithdrawn {
                account: ctx.caller,
                amount: sent,
                full: false,
                timestamp: ctx.now,
            },
        );
        Ok(sent)
    }

    /// Withdraw the entire principal; the stake becomes an encryption of
    /// zero. Returns the amount sent.
    pub fn withdraw_all_stake(&mut self, ctx: &CallContext) -> StakingResult<EncryptedU64> {
        let mut account = self.stage(ctx);
        let Some(principal) = account.position().principal() else {
            return Err(rejected("withdraw_all_stake", ctx, StakingError::NothingStaked));
        };

        accrue(&mut self.fhe, &mut account, ctx.now, self.config.rate_bps);

        let zero = self.fhe.encrypt_constant(0);
        account.set_principal(zero);

        let sent = self
            .token
            .transfer(&mut self.fhe, &self.config.ledger, &ctx.caller, &principal)
            .map_err(|e| rejected("withdraw_all_stake", ctx, e))?;
        account.share(&sent);

        self.commit(
            account,
            StakingEvent::StakeWithdrawn {
                account: ctx.caller,
                amount: sent,
                full: true,
                timestamp: ctx.now,
            },
        );
        Ok(sent)
    }

    /// Mint all accrued interest to the caller and reset rewards to zero.
    pub fn claim_interest(&mut self, ctx: &CallContext) -> StakingResult<EncryptedU64> {
        let mut account = self.stage(ctx);
        accrue(&mut self.fhe, &mut account, ctx.now, self.config.rate_bps);

        let Some(rewards) = account.position().rewards() else {
            return Err(rejected("claim_interest", ctx, StakingError::NoRewards));
        };

        let zero = self.fhe.encrypt_constant(0);
        account.set_rewards(zero);

        let minted = self
            .token
            .mint(&mut self.fhe, &self.config.ledger, &ctx.caller, &rewards)
            .map_err(|e| rejected("claim_interest", ctx, e))?;
        account.set_last_claimed_reward(minted);

        self.commit(
            account,
            StakingEvent::InterestClaimed {
                account: ctx.caller,
                amount: minted,
                timestamp: ctx.now,
            },
        );
        Ok(minted)
    }

    /// Checkpoint the caller's accrued interest without moving funds.
    pub fn accrue(&mut self, ctx: &CallContext) -> AccrualOutcome {
        let mut account = self.stage(ctx);
        let outcome = accrue(&mut self.fhe, &mut account, ctx.now, self.config.rate_bps);

        self.commit(
            account,
            StakingEvent::RewardsAccrued {
                account: ctx.caller,
                timestamp: ctx.now,
            },
        );
        outcome
    }

    // ============ Reads ============

    pub fn has_claimed(&self, account: &Address) -> bool {
        self.store.has_claimed(account)
    }

    /// Encrypted principal, `None` if the account never staked
    pub fn encrypted_stake_of(&self, account: &Address) -> Option<EncryptedU64> {
        self.store.position(account).and_then(|p| p.principal())
    }

    /// Encrypted unclaimed rewards as of the last accrual
    pub fn encrypted_rewards_of(&self, account: &Address) -> Option<EncryptedU64> {
        self.store.position(account).and_then(|p| p.rewards())
    }

    /// Accrual watermark, 0 if never touched
    pub fn last_accrual_of(&self, account: &Address) -> Timestamp {
        self.store
            .position(account)
            .map(|p| p.last_accrual())
            .unwrap_or(0)
    }

    /// Amount minted by the most recent interest claim
    pub fn last_claimed_reward(&self, account: &Address) -> Option<EncryptedU64> {
        self.store.last_claimed_reward(account)
    }

    pub fn position(&self, account: &Address) -> Option<&AccountPosition> {
        self.store.position(account)
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: Address = [9u8; 32];

    #[test]
    fn test_config_defaults() {
        let config = StakingConfig::new(LEDGER);
        assert_eq!(config.rate_bps, RATE_BPS);
        assert_eq!(config.airdrop_amount, AIRDROP_AMOUNT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides() {
        let config = StakingConfig::new(LEDGER)
            .with_rate_bps(250)
            .with_airdrop_amount(5);
        assert_eq!(config.rate_bps, 250);
        assert_eq!(config.airdrop_amount, 5);
    }

    #[test]
    fn test_config_rejects_bad_rates() {
        let zero = StakingConfig::new(LEDGER).with_rate_bps(0);
        assert!(matches!(
            zero.validate(),
            Err(StakingError::InvalidConfig { param: "rate_bps", .. })
        ));

        let too_high = StakingConfig::new(LEDGER).with_rate_bps(BPS_DENOMINATOR + 1);
        assert!(too_high.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = StakingConfig::new(LEDGER).with_rate_bps(300);
        let bytes = borsh::to_vec(&config).unwrap();
        let restored: StakingConfig = borsh::from_slice(&bytes).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn test_short_address() {
        let mut address = [0u8; 32];
        address[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(short(&address), "deadbeef");
    }
}
