//! Error Types for the Confidential Staking Ledger
//!
//! Typed errors with stable codes for logging and client-side matching.
//! Every error aborts the single operation that raised it; nothing is
//! retried or swallowed at this layer.

use thiserror::Error;

/// Result type alias for staking operations
pub type StakingResult<T> = Result<T, StakingError>;

/// Main error enum for all staking ledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    // ============ Operation Errors ============
    /// Airdrop was already claimed by this account
    #[error("airdrop already claimed")]
    AlreadyClaimed,

    /// Withdrawal attempted with no stake on record
    #[error("nothing staked")]
    NothingStaked,

    /// Interest claim attempted with no rewards on record
    #[error("no rewards to claim")]
    NoRewards,

    // ============ Capability Errors ============
    /// Encrypted input proof did not verify
    #[error("invalid input proof")]
    InvalidProof,

    /// Requester holds no grant on the handle
    #[error("access denied for requester")]
    AccessDenied,

    /// Handle is not known to the capability
    #[error("unknown ciphertext handle")]
    UnknownHandle,

    // ============ Token Errors ============
    /// Token refused a mint or transfer
    #[error("token rejected {operation}")]
    TokenRejected { operation: &'static str },

    /// Caller is not the authorized minter
    #[error("mint not authorized")]
    MintUnauthorized { caller: [u8; 32] },

    // ============ Configuration Errors ============
    /// Configuration parameter out of range
    #[error("invalid config {param}: {reason}")]
    InvalidConfig {
        param: &'static str,
        reason: &'static str,
    },
}

impl StakingError {
    /// Returns a stable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyClaimed => "E001_ALREADY_CLAIMED",
            Self::NothingStaked => "E002_NOTHING_STAKED",
            Self::NoRewards => "E003_NO_REWARDS",
            Self::InvalidProof => "E010_INVALID_PROOF",
            Self::AccessDenied => "E011_ACCESS_DENIED",
            Self::UnknownHandle => "E012_UNKNOWN_HANDLE",
            Self::TokenRejected { .. } => "E020_TOKEN_REJECTED",
            Self::MintUnauthorized { .. } => "E021_MINT_UNAUTH",
            Self::InvalidConfig { .. } => "E030_INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_error_codes_unique() {
        let errors = [
            StakingError::AlreadyClaimed,
            StakingError::NothingStaked,
            StakingError::NoRewards,
            StakingError::InvalidProof,
            StakingError::AccessDenied,
            StakingError::UnknownHandle,
            StakingError::TokenRejected { operation: "mint" },
            StakingError::MintUnauthorized { caller: [0u8; 32] },
            StakingError::InvalidConfig {
                param: "rate_bps",
                reason: "zero",
            },
        ];

        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        let unique: BTreeSet<_> = codes.iter().collect();
        assert_eq!(codes.len(), unique.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(StakingError::NoRewards.to_string(), "no rewards to claim");
        assert_eq!(
            StakingError::TokenRejected { operation: "transfer" }.to_string(),
            "token rejected transfer"
        );
    }
}
