//! Access Control Module
//!
//! Decides who may decrypt or compute on each encrypted value the ledger
//! writes. Every written value is shared with exactly two principals: the
//! owning account and the ledger itself.
//!
//! ## Staged grants
//!
//! Grants are collected in an [`AclBatch`] while an operation runs and are
//! pushed to the capability only when the operation commits. A failed
//! operation drops its batch, so no grant outlives a rolled-back write.

use tracing::debug;

use crate::fhe::EncryptedOps;
use crate::types::{Address, EncryptedU64};

// ============================================================================
// Types
// ============================================================================

/// A single pending permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    /// Value being shared
    pub value: EncryptedU64,
    /// Principal receiving operate + decrypt rights
    pub principal: Address,
}

/// Pending grants for one operation
#[derive(Debug, Clone)]
pub struct AclBatch {
    /// The ledger's own identity, co-granted on every value
    ledger: Address,
    grants: Vec<Grant>,
}

impl AclBatch {
    /// Create an empty batch for the ledger at `ledger`
    pub fn new(ledger: Address) -> Self {
        Self {
            ledger,
            grants: Vec::new(),
        }
    }

    /// Share `value` with `owner` and the ledger
    pub fn share(&mut self, owner: &Address, value: &EncryptedU64) {
        self.push(*value, *owner);
        self.push(*value, self.ledger);
    }

    /// Share every initialized value with `owner` and the ledger; skips
    /// uninitialized fields
    pub fn share_all(&mut self, owner: &Address, values: &[Option<&EncryptedU64>]) {
        for value in values.iter().flatten() {
            self.share(owner, value);
        }
    }

    fn push(&mut self, value: EncryptedU64, principal: Address) {
        let grant = Grant { value, principal };
        if !self.grants.contains(&grant) {
            self.grants.push(grant);
        }
    }

    /// Pending grants in insertion order
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Number of pending grants
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Push every pending grant to the capability
    pub fn apply<F: EncryptedOps>(self, fhe: &mut F) {
        debug!(grants = self.grants.len(), "applying acl batch");
        for grant in &self.grants {
            fhe.grant_access(&grant.value, &grant.principal);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: Address = [9u8; 32];
    const OWNER: Address = [1u8; 32];

    fn handle(byte: u8) -> EncryptedU64 {
        EncryptedU64::from_handle([byte; 32])
    }

    #[test]
    fn test_share_grants_owner_and_ledger() {
        let mut batch = AclBatch::new(LEDGER);
        batch.share(&OWNER, &handle(1));

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.grants()[0].principal, OWNER);
        assert_eq!(batch.grants()[1].principal, LEDGER);
    }

    #[test]
    fn test_share_is_idempotent() {
        let mut batch = AclBatch::new(LEDGER);
        batch.share(&OWNER, &handle(1));
        batch.share(&OWNER, &handle(1));

        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_share_all_skips_uninitialized() {
        let mut batch = AclBatch::new(LEDGER);
        let principal = handle(1);
        batch.share_all(&OWNER, &[Some(&principal), None]);

        assert_eq!(batch.len(), 2);
        assert!(batch.grants().iter().all(|g| g.value == principal));
    }

    #[test]
    fn test_empty_batch() {
        let mut batch = AclBatch::new(LEDGER);
        batch.share_all(&OWNER, &[None, None]);
        assert!(batch.is_empty());
    }
}
