//! Cleartext Reference Coprocessor
//!
//! An [`EncryptedOps`] backend that keeps plaintext behind sha256-derived
//! handles. It reproduces the observable contract of a real coprocessor
//! (fresh handle per result, modular u64 arithmetic, per-handle ACL, input
//! proofs bound to user and contract) without any encryption. Use it for
//! tests and local simulation only.

use std::collections::{BTreeSet, HashMap};

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::errors::{StakingError, StakingResult};
use crate::fhe::EncryptedOps;
use crate::types::{Address, EncryptedInput, EncryptedU64, HandleBytes};

/// Domain tags mixed into derived handles
mod tag {
    pub const CONSTANT: &[u8] = b"const";
    pub const INPUT: &[u8] = b"input";
    pub const ADD: &[u8] = b"add";
    pub const SUB: &[u8] = b"sub";
    pub const MUL: &[u8] = b"mul";
    pub const DIV: &[u8] = b"div";
    pub const MIN: &[u8] = b"min";
}

/// In-memory coprocessor with cleartext storage
#[derive(Debug, Default)]
pub struct CleartextCoprocessor {
    values: HashMap<EncryptedU64, u64>,
    acl: HashMap<EncryptedU64, BTreeSet<Address>>,
    nonce: u64,
}

impl CleartextCoprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    fn derive_handle(&mut self, tag: &[u8]) -> HandleBytes {
        let mut hasher = Sha256::new();
        hasher.update(tag);
        hasher.update(self.nonce.to_le_bytes());
        self.nonce += 1;
        let mut handle = [0u8; 32];
        handle.copy_from_slice(&hasher.finalize());
        handle
    }

    fn store(&mut self, tag: &[u8], value: u64) -> EncryptedU64 {
        let handle = EncryptedU64::from_handle(self.derive_handle(tag));
        self.values.insert(handle, value);
        handle
    }

    fn load(&self, value: &EncryptedU64) -> u64 {
        match self.values.get(value) {
            Some(v) => *v,
            None => {
                warn!(handle = ?value, "unknown handle read as zero");
                0
            }
        }
    }

    fn input_proof(handle: &HandleBytes, user: &Address, contract: &Address) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(handle);
        hasher.update(user);
        hasher.update(contract);
        hasher.finalize().to_vec()
    }

    /// Client side: encrypt `value` for submission by `user` to `contract`
    pub fn encrypt_input(
        &mut self,
        value: u64,
        user: &Address,
        contract: &Address,
    ) -> EncryptedInput {
        let handle = self.store(tag::INPUT, value);
        let proof = Self::input_proof(handle.handle(), user, contract);
        EncryptedInput::new(*handle.handle(), proof)
    }

    /// Relayer side: decrypt `value` on behalf of `requester`
    pub fn decrypt(&self, value: &EncryptedU64, requester: &Address) -> StakingResult<u64> {
        let plain = self.values.get(value).ok_or(StakingError::UnknownHandle)?;
        if !self.is_allowed(value, requester) {
            return Err(StakingError::AccessDenied);
        }
        Ok(*plain)
    }

    /// Every principal holding a grant on `value`
    pub fn allowed_principals(&self, value: &EncryptedU64) -> BTreeSet<Address> {
        self.acl.get(value).cloned().unwrap_or_default()
    }
}

impl EncryptedOps for CleartextCoprocessor {
    fn encrypt_constant(&mut self, value: u64) -> EncryptedU64 {
        self.store(tag::CONSTANT, value)
    }

    fn decode_input(
        &mut self,
        input: &EncryptedInput,
        user: &Address,
        contract: &Address,
    ) -> StakingResult<EncryptedU64> {
        let handle = EncryptedU64::from_handle(input.handle);
        if !self.values.contains_key(&handle) {
            return Err(StakingError::InvalidProof);
        }
        if input.proof != Self::input_proof(&input.handle, user, contract) {
            return Err(StakingError::InvalidProof);
        }
        Ok(handle)
    }

    fn add(&mut self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64 {
        let value = self.load(lhs).wrapping_add(self.load(rhs));
        self.store(tag::ADD, value)
    }

    fn sub(&mut self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64 {
        let value = self.load(lhs).wrapping_sub(self.load(rhs));
        self.store(tag::SUB, value)
    }

    fn mul_scalar(&mut self, lhs: &EncryptedU64, scalar: u64) -> EncryptedU64 {
        let value = self.load(lhs).wrapping_mul(scalar);
        self.store(tag::MUL, value)
    }

    fn div_scalar(&mut self, lhs: &EncryptedU64, divisor: u64) -> EncryptedU64 {
        // Division by a zero scalar yields all ones, like the hardware op
        let value = self.load(lhs).checked_div(divisor).unwrap_or(u64::MAX);
        self.store(tag::DIV, value)
    }

    fn min(&mut self, lhs: &EncryptedU64, rhs: &EncryptedU64) -> EncryptedU64 {
        let value = self.load(lhs).min(self.load(rhs));
        self.store(tag::MIN, value)
    }

    fn grant_access(&mut self, value: &EncryptedU64, principal: &Address) {
        self.acl.entry(*value).or_default().insert(*principal);
    }

    fn is_allowed(&self, value: &EncryptedU64, principal: &Address) -> bool {
        self.acl
            .get(value)
            .is_some_and(|principals| principals.contains(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: Address = [1u8; 32];
    const CONTRACT: Address = [9u8; 32];
    const OTHER: Address = [3u8; 32];

    fn reveal(fhe: &mut CleartextCoprocessor, value: &EncryptedU64) -> u64 {
        fhe.grant_access(value, &USER);
        fhe.decrypt(value, &USER).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        let mut fhe = CleartextCoprocessor::new();
        let a = fhe.encrypt_constant(40);
        let b = fhe.encrypt_constant(15);

        let sum = fhe.add(&a, &b);
        let diff = fhe.sub(&a, &b);
        let prod = fhe.mul_scalar(&a, 3);
        let quot = fhe.div_scalar(&a, 6);
        let low = fhe.min(&a, &b);

        assert_eq!(reveal(&mut fhe, &sum), 55);
        assert_eq!(reveal(&mut fhe, &diff), 25);
        assert_eq!(reveal(&mut fhe, &prod), 120);
        assert_eq!(reveal(&mut fhe, &quot), 6);
        assert_eq!(reveal(&mut fhe, &low), 15);
    }

    #[test]
    fn test_every_result_is_a_fresh_handle() {
        let mut fhe = CleartextCoprocessor::new();
        let a = fhe.encrypt_constant(7);
        let b = fhe.encrypt_constant(7);
        let c = fhe.min(&a, &b);

        assert_ne!(a, b);
        assert_ne!(c, a);
        assert_ne!(c, b);
        assert_eq!(fhe.decrypt(&c, &USER), Err(StakingError::AccessDenied));
    }

    #[test]
    fn test_decrypt_requires_grant() {
        let mut fhe = CleartextCoprocessor::new();
        let value = fhe.encrypt_constant(42);

        assert_eq!(fhe.decrypt(&value, &USER), Err(StakingError::AccessDenied));

        fhe.grant_access(&value, &USER);
        fhe.grant_access(&value, &USER);
        assert_eq!(fhe.decrypt(&value, &USER), Ok(42));
        assert_eq!(fhe.decrypt(&value, &OTHER), Err(StakingError::AccessDenied));
        assert_eq!(fhe.allowed_principals(&value).len(), 1);
    }

    #[test]
    fn test_decrypt_unknown_handle() {
        let fhe = CleartextCoprocessor::new();
        let bogus = EncryptedU64::from_handle([0xee; 32]);
        assert_eq!(fhe.decrypt(&bogus, &USER), Err(StakingError::UnknownHandle));
    }

    #[test]
    fn test_input_proof_binds_user_and_contract() {
        let mut fhe = CleartextCoprocessor::new();
        let input = fhe.encrypt_input(500, &USER, &CONTRACT);

        let decoded = fhe.decode_input(&input, &USER, &CONTRACT).unwrap();
        assert_eq!(reveal(&mut fhe, &decoded), 500);

        assert_eq!(
            fhe.decode_input(&input, &OTHER, &CONTRACT),
            Err(StakingError::InvalidProof)
        );
        assert_eq!(
            fhe.decode_input(&input, &USER, &OTHER),
            Err(StakingError::InvalidProof)
        );
    }

    #[test]
    fn test_tampered_proof_rejected() {
        let mut fhe = CleartextCoprocessor::new();
        let mut input = fhe.encrypt_input(1, &USER, &CONTRACT);
        input.proof[0] ^= 0xff;

        assert_eq!(
            fhe.decode_input(&input, &USER, &CONTRACT),
            Err(StakingError::InvalidProof)
        );
    }

    #[test]
    fn test_wrapping_semantics() {
        let mut fhe = CleartextCoprocessor::new();
        let small = fhe.encrypt_constant(1);
        let big = fhe.encrypt_constant(2);
        let wrapped = fhe.sub(&small, &big);
        assert_eq!(reveal(&mut fhe, &wrapped), u64::MAX);
    }
}
