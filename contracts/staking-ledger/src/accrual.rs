//! Accrual Engine
//!
//! Folds fixed-rate interest for the time elapsed since the last watermark
//! into a staged account:
//!
//! ```text
//! reward  = principal * min(elapsed * rate_bps, MAX_SCALAR)
//!           / (SECONDS_PER_YEAR * BPS_DENOMINATOR)
//! rewards = rewards + reward
//! ```
//!
//! The multiply and divide run on the encrypted principal with cleartext
//! scalars. Division floors and the remainder is dropped, so while the
//! product `principal * scaled` fits in a u64 each pass loses strictly less
//! than one base unit.
//!
//! The product is not checked: encrypted multiplication wraps at 2^64 and the
//! ledger cannot see the principal to detect it. A pass over `elapsed`
//! seconds is exact only for `principal <= u64::MAX / (elapsed * rate_bps)`
//! (for a full year at the default rate,
//! [`MAX_EXACT_YEAR_PRINCIPAL`](cstake_common::constants::staking::MAX_EXACT_YEAR_PRINCIPAL)).
//! Above that the reward is the wrapped product divided down.
//!
//! Accrual is infallible and idempotent within one timestamp. Operations
//! call it before touching principal or rewards so interest only compounds
//! on the balance that was actually staked during the window.

use tracing::debug;

use cstake_common::{
    constants::staking::ACCRUAL_DIVISOR,
    fhe::EncryptedOps,
    math::{elapsed_since, scaled_elapsed},
    types::Timestamp,
};

use crate::store::StagedAccount;

/// What a single accrual pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualOutcome {
    /// No principal yet; watermark moved to `now`
    NoPrincipal,
    /// First touch of a staked position; watermark started at `now`
    Started,
    /// Zero seconds elapsed; nothing changed
    Unchanged,
    /// Reward folded in for `elapsed` seconds
    Accrued { elapsed: u64 },
}

/// Run one accrual pass on `account` at `now`.
pub fn accrue<F: EncryptedOps>(
    fhe: &mut F,
    account: &mut StagedAccount,
    now: Timestamp,
    rate_bps: u64,
) -> AccrualOutcome {
    let Some(principal) = account.position().principal() else {
        account.set_last_accrual(now);
        return AccrualOutcome::NoPrincipal;
    };

    let last_accrual = account.position().last_accrual();
    if last_accrual == 0 {
        account.set_last_accrual(now);
        return AccrualOutcome::Started;
    }

    let elapsed = elapsed_since(last_accrual, now);
    if elapsed == 0 {
        return AccrualOutcome::Unchanged;
    }

    let scalar = scaled_elapsed(elapsed, rate_bps);
    let weighted = fhe.mul_scalar(&principal, scalar);
    let reward = fhe.div_scalar(&weighted, ACCRUAL_DIVISOR);

    let rewards = match account.position().rewards() {
        Some(accrued) => fhe.add(&accrued, &reward),
        None => reward,
    };
    account.set_rewards(rewards);
    account.set_last_accrual(now);
    account.share_position();

    debug!(elapsed, scalar, "accrued");
    AccrualOutcome::Accrued { elapsed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PositionStore;
    use cstake_common::constants::staking::{
        MAX_EXACT_YEAR_PRINCIPAL, MAX_SCALAR, RATE_BPS, SECONDS_PER_YEAR,
    };
    use cstake_common::math::expected_reward;
    use cstake_common::mock::CleartextCoprocessor;
    use cstake_common::types::Address;

    const LEDGER: Address = [9u8; 32];
    const ALICE: Address = [1u8; 32];

    fn staked(fhe: &mut CleartextCoprocessor, amount: u64, at: Timestamp) -> StagedAccount {
        let store = PositionStore::new();
        let mut account = store.stage(ALICE, LEDGER);
        account.set_principal(fhe.encrypt_constant(amount));
        account.set_last_accrual(at);
        account
    }

    fn rewards(fhe: &CleartextCoprocessor, account: &StagedAccount) -> Option<u64> {
        account
            .position()
            .rewards()
            .map(|r| fhe.decrypt(&r, &ALICE).unwrap_or(u64::MAX))
    }

    /// Applies the staged grants so decrypt checks see them
    fn flush(fhe: &mut CleartextCoprocessor, account: &StagedAccount) {
        account.acl().clone().apply(fhe);
    }

    #[test]
    fn test_no_principal_moves_watermark() {
        let mut fhe = CleartextCoprocessor::new();
        let store = PositionStore::new();
        let mut account = store.stage(ALICE, LEDGER);

        let outcome = accrue(&mut fhe, &mut account, 1_000, RATE_BPS);

        assert_eq!(outcome, AccrualOutcome::NoPrincipal);
        assert_eq!(account.position().last_accrual(), 1_000);
        assert!(account.position().rewards().is_none());
    }

    #[test]
    fn test_first_touch_starts_watermark() {
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, 1_000, 0);

        let outcome = accrue(&mut fhe, &mut account, 5_000, RATE_BPS);

        assert_eq!(outcome, AccrualOutcome::Started);
        assert_eq!(account.position().last_accrual(), 5_000);
        assert!(account.position().rewards().is_none());
    }

    #[test]
    fn test_zero_elapsed_is_noop() {
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, 1_000_000, 100);

        accrue(&mut fhe, &mut account, 100 + SECONDS_PER_YEAR, RATE_BPS);
        let before = account.position().clone();

        let outcome = accrue(&mut fhe, &mut account, 100 + SECONDS_PER_YEAR, RATE_BPS);

        assert_eq!(outcome, AccrualOutcome::Unchanged);
        assert_eq!(account.position(), &before);
    }

    #[test]
    fn test_one_year_at_one_percent() {
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, 1_000_000, 100);

        let outcome = accrue(&mut fhe, &mut account, 100 + SECONDS_PER_YEAR, RATE_BPS);
        flush(&mut fhe, &account);

        assert_eq!(outcome, AccrualOutcome::Accrued { elapsed: SECONDS_PER_YEAR });
        assert_eq!(rewards(&fhe, &account), Some(10_000));
        assert_eq!(account.position().last_accrual(), 100 + SECONDS_PER_YEAR);
    }

    #[test]
    fn test_rewards_accumulate_across_passes() {
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, 1_000_000, 100);
        let half = SECONDS_PER_YEAR / 2;

        accrue(&mut fhe, &mut account, 100 + half, RATE_BPS);
        accrue(&mut fhe, &mut account, 100 + 2 * half, RATE_BPS);
        flush(&mut fhe, &account);

        assert_eq!(rewards(&fhe, &account), Some(10_000));
    }

    #[test]
    fn test_time_going_backwards_accrues_nothing() {
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, 1_000_000, 10_000);

        let outcome = accrue(&mut fhe, &mut account, 5_000, RATE_BPS);

        assert_eq!(outcome, AccrualOutcome::Unchanged);
        assert_eq!(account.position().last_accrual(), 10_000);
    }

    #[test]
    fn test_accrual_shares_both_fields() {
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, 1_000_000, 100);

        accrue(&mut fhe, &mut account, 100 + SECONDS_PER_YEAR, RATE_BPS);

        let principal = account.position().principal().unwrap();
        let reward = account.position().rewards().unwrap();
        let grants = account.acl().grants();
        for value in [principal, reward] {
            assert!(grants.iter().any(|g| g.value == value && g.principal == ALICE));
            assert!(grants.iter().any(|g| g.value == value && g.principal == LEDGER));
        }
    }

    #[test]
    fn test_scalar_clamp_for_extreme_idle() {
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, 1, 1);

        accrue(&mut fhe, &mut account, u64::MAX, RATE_BPS);
        flush(&mut fhe, &account);

        // 1 * MAX_SCALAR / ACCRUAL_DIVISOR
        assert_eq!(rewards(&fhe, &account), Some(MAX_SCALAR / ACCRUAL_DIVISOR));
    }

    #[test]
    fn test_exact_at_principal_ceiling() {
        let principal = MAX_EXACT_YEAR_PRINCIPAL;
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, principal, 100);

        accrue(&mut fhe, &mut account, 100 + SECONDS_PER_YEAR, RATE_BPS);
        flush(&mut fhe, &account);

        let expected = expected_reward(principal, SECONDS_PER_YEAR, RATE_BPS);
        assert_eq!(rewards(&fhe, &account), Some(expected));
    }

    #[test]
    fn test_wraps_above_principal_ceiling() {
        let principal = MAX_EXACT_YEAR_PRINCIPAL + 1;
        let mut fhe = CleartextCoprocessor::new();
        let mut account = staked(&mut fhe, principal, 100);

        accrue(&mut fhe, &mut account, 100 + SECONDS_PER_YEAR, RATE_BPS);
        flush(&mut fhe, &account);

        // Modular product, then floor division
        let scalar = SECONDS_PER_YEAR * RATE_BPS;
        let wrapped = principal.wrapping_mul(scalar) / ACCRUAL_DIVISOR;
        assert!((principal as u128) * (scalar as u128) > u64::MAX as u128);
        assert_eq!(rewards(&fhe, &account), Some(wrapped));
        assert_ne!(
            rewards(&fhe, &account),
            Some(expected_reward(principal, SECONDS_PER_YEAR, RATE_BPS))
        );
    }
}
