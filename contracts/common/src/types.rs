//! Core Types for the Confidential Staking Ledger
//!
//! This module defines the fundamental data structures shared by the
//! ledger, the token and the encrypted-arithmetic capability.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for account and contract addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for ciphertext handle bytes
pub type HandleBytes = [u8; 32];

/// Cleartext timestamp in seconds
pub type Timestamp = u64;

// ============ Encrypted Values ============

/// Opaque handle to an encrypted 64-bit unsigned integer.
///
/// The handle only references ciphertext held by the encrypted-arithmetic
/// capability. It deliberately implements no arithmetic and no ordering:
/// every computation goes through [`crate::fhe::EncryptedOps`], so the
/// ledger can never branch on a magnitude. Equality compares handle
/// identity, not the encrypted amounts.
///
/// Handles carry no secret: anyone may rebuild one from its bytes (it is
/// serializable), but only principals the capability granted can use it.
/// [`EncryptedU64::from_handle`] is meant for capability backends wrapping
/// their own ciphertext references; ledger code only ever receives handles
/// as results of capability calls.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct EncryptedU64(HandleBytes);

impl EncryptedU64 {
    /// Wrap a ciphertext reference issued by a capability backend
    pub fn from_handle(handle: HandleBytes) -> Self {
        Self(handle)
    }

    /// Raw handle bytes, for indexing and event payloads
    pub fn handle(&self) -> &HandleBytes {
        &self.0
    }
}

impl core::fmt::Debug for EncryptedU64 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "EncryptedU64(0x{:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Ciphertext encrypted off-chain by a client, together with the proof
/// binding it to the submitting user and the receiving contract.
///
/// The ledger never inspects either field; it hands both to the capability,
/// which decodes them or fails with `InvalidProof`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct EncryptedInput {
    /// External ciphertext handle
    pub handle: HandleBytes,
    /// Input proof
    pub proof: Vec<u8>,
}

impl EncryptedInput {
    pub fn new(handle: HandleBytes, proof: Vec<u8>) -> Self {
        Self { handle, proof }
    }
}

// ============ Call Context ============

/// Who is calling and when.
///
/// The serializing execution environment supplies this for every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Account invoking the operation
    pub caller: Address,
    /// Current timestamp in seconds
    pub now: Timestamp,
}

impl CallContext {
    pub fn new(caller: Address, now: Timestamp) -> Self {
        Self { caller, now }
    }
}
