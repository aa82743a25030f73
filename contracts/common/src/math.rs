//! Cleartext Math for Accrual
//!
//! Only timestamps and rates are cleartext; these helpers prepare the
//! scalars fed to the encrypted-arithmetic capability.

use crate::constants::staking::{ACCRUAL_DIVISOR, MAX_SCALAR};
use crate::types::Timestamp;

/// Seconds elapsed since the last accrual watermark.
///
/// A `now` behind the watermark yields zero, so a watermark never moves
/// backwards.
pub fn elapsed_since(last_accrual: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(last_accrual)
}

/// Calculate the scalar multiplied into the encrypted principal
///
/// scaled = elapsed * rate_bps, clamped to [`MAX_SCALAR`]
///
/// # Arguments
/// * `elapsed` - Seconds since the last accrual
/// * `rate_bps` - Annual rate in basis points
pub fn scaled_elapsed(elapsed: u64, rate_bps: u64) -> u64 {
    let scaled = (elapsed as u128) * (rate_bps as u128);
    scaled.min(MAX_SCALAR as u128) as u64
}

/// Cleartext reference for the reward one accrual pass produces
///
/// reward = floor(principal * scaled_elapsed / (SECONDS_PER_YEAR * BPS_DENOMINATOR))
///
/// Computed in u128, so it is the exact floor even where encrypted u64
/// arithmetic would wrap. Clients use it to estimate pending interest from a
/// decrypted principal.
pub fn expected_reward(principal: u64, elapsed: u64, rate_bps: u64) -> u64 {
    let scaled = scaled_elapsed(elapsed, rate_bps);
    let reward = (principal as u128) * (scaled as u128) / (ACCRUAL_DIVISOR as u128);
    reward.min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::staking::{BPS_DENOMINATOR, RATE_BPS, SECONDS_PER_YEAR};
    use crate::constants::time::SECONDS_PER_DAY;

    #[test]
    fn test_elapsed_since() {
        assert_eq!(elapsed_since(100, 160), 60);
        assert_eq!(elapsed_since(100, 100), 0);
        assert_eq!(elapsed_since(100, 40), 0);
    }

    #[test]
    fn test_scaled_elapsed() {
        assert_eq!(scaled_elapsed(10, RATE_BPS), 1_000);
        assert_eq!(scaled_elapsed(0, RATE_BPS), 0);
    }

    #[test]
    fn test_scaled_elapsed_clamps_at_max_scalar() {
        assert_eq!(scaled_elapsed(u64::MAX, RATE_BPS), MAX_SCALAR);
        assert_eq!(scaled_elapsed(u64::MAX / 100 + 1, 100), MAX_SCALAR);
        assert_eq!(scaled_elapsed(u64::MAX / 100, 100), (u64::MAX / 100) * 100);
    }

    #[test]
    fn test_expected_reward_thirty_days() {
        let reward = expected_reward(500, 30 * SECONDS_PER_DAY, RATE_BPS);
        let reference = (500u128 * 100 * 2_592_000) / (31_536_000 * 10_000);
        assert_eq!(reward as u128, reference);
    }

    #[test]
    fn test_expected_reward_full_year() {
        // 1% of 1_000_000 over one year
        let reward = expected_reward(1_000_000, SECONDS_PER_YEAR, RATE_BPS);
        assert_eq!(reward, 1_000_000 * RATE_BPS / BPS_DENOMINATOR);
    }
}
