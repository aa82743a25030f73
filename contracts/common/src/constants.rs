//! Protocol Constants
//!
//! All magic numbers and configuration defaults for the confidential
//! staking ledger. Runtime overrides live in `StakingConfig`.

/// Staking and accrual parameters
pub mod staking {
    /// Default annual interest rate (1% APR)
    pub const RATE_BPS: u64 = 100;

    /// Basis points denominator
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// Seconds in a 365-day year
    pub const SECONDS_PER_YEAR: u64 = 31_536_000;

    /// Divisor applied after scaling principal by `elapsed * rate_bps`
    pub const ACCRUAL_DIVISOR: u64 = SECONDS_PER_YEAR * BPS_DENOMINATOR;

    /// Largest cleartext scalar accepted by `mul_scalar`.
    ///
    /// `elapsed * rate_bps` is clamped here. Idle windows long enough to hit
    /// the clamp accrue as if they had ended at the clamp.
    pub const MAX_SCALAR: u64 = u64::MAX;

    /// Largest principal whose one-year accrual at [`RATE_BPS`] is exact.
    ///
    /// Accrual multiplies the encrypted principal by `elapsed * rate_bps`
    /// before dividing, and encrypted u64 multiplication wraps at 2^64. The
    /// reward is exact only while `principal * elapsed * rate_bps <=
    /// u64::MAX`; past that the product wraps and the reward is meaningless.
    /// Frequent accrual (any operation, or the public `accrue`) shortens
    /// `elapsed` and raises the exact ceiling proportionally.
    ///
    /// `u64::MAX / (SECONDS_PER_YEAR * RATE_BPS)`, about 5_849 whole tokens
    /// of a 6-decimal token.
    pub const MAX_EXACT_YEAR_PRINCIPAL: u64 = u64::MAX / (SECONDS_PER_YEAR * RATE_BPS);

    /// Fixed amount minted once per account by the airdrop, in base units
    pub const AIRDROP_AMOUNT: u64 = 1_000;
}

/// Time-related constants
pub mod time {
    /// Seconds per day
    pub const SECONDS_PER_DAY: u64 = 86_400;
}
