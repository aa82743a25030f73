//! Encrypted Arithmetic and Token Interfaces
//!
//! The ledger consumes two external collaborators through these traits:
//!
//! - **EncryptedOps**: the homomorphic coprocessor. Every operation returns
//!   a fresh opaque handle; cleartext never reaches the caller.
//! - **ConfidentialToken**: mint and transfer over encrypted amounts, each
//!   returning the amount actually moved.
//!
//! Encrypted u64 arithmetic is modular (wraps at 2^64), as ciphertext
//! arithmetic is, and the capability cannot report an overflow. The ledger's
//! subtractions never wrap (the subtrahend is bounded by `min` against the
//! minuend), but accrual's `mul_scalar` does once `principal * scalar`
//! exceeds `u64::MAX`; see `constants::staking::MAX_EXACT_YEAR_PRINCIPAL`.

use crate::errors::StakingResult;
use crate::types::{Address, EncryptedInput, EncryptedU64};

/// Homomorphic operations over encrypted u64 values.
pub trait EncryptedOps {
    /// Trivially encrypt a public constant
    fn encrypt_constant(&mut self, value: u64) -> EncryptedU64;

    /// Decode a client-encrypted input submitted by `user` to `contract`.
    ///
    /// Fails with `InvalidProof` when the proof does not bind the handle to
    /// that (user, contract) pair.
    fn decode_input(
        &mut self,
        input: &EncryptedInput,
        user: &Address,
        contract: &Address,
    ) -> StakingResult<EncryptedU64>;

    fn add(&mut self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64;

    fn sub(&mut self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64;

    /// Multiply by a cleartext scalar, modulo 2^64
    fn mul_scalar(&mut self, lhs: &EncryptedU64, scalar: u64) -> EncryptedU64;

    /// Floor-divide by a non-zero cleartext scalar
    fn div_scalar(&mut self, lhs: &EncryptedU64, divisor: u64) -> EncryptedU64;

    /// Encrypted minimum; reveals nothing about which operand won
    fn min(&mut self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64;

    /// Let `principal` compute on and request decryption of `value`.
    /// Granting twice is a no-op.
    fn grant_access(&mut self, value: &EncryptedU64, principal: &Address);

    /// Whether `principal` holds a grant on `value`
    fn is_allowed(&self, value: &EncryptedU64, principal: &Address) -> bool;
}

/// Whether an optional encrypted field has been written.
///
/// Uninitialized (`None`) is distinct from an encryption of zero.
pub fn is_initialized(value: Option<&EncryptedU64>) -> bool {
    value.is_some()
}

/// Confidential fungible token operations the ledger relies on.
///
/// Each call is atomic on the token side: on error the token's balances are
/// untouched.
pub trait ConfidentialToken<F: EncryptedOps> {
    /// Mint `amount` to `to` on behalf of `minter`; returns the amount minted
    fn mint(
        &mut self,
        fhe: &mut F,
        minter: &Address,
        to: &Address,
        amount: &EncryptedU64,
    ) -> StakingResult<EncryptedU64>;

    /// Move up to `amount` from `from` to `to`; returns the amount moved
    fn transfer(
        &mut self,
        fhe: &mut F,
        from: &Address,
        to: &Address,
        amount: &EncryptedU64,
    ) -> StakingResult<EncryptedU64>;

    /// Encrypted balance of `holder`, `None` if never credited
    fn balance_of(&self, holder: &Address) -> Option<EncryptedU64>;
}
