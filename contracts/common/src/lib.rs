//! Confidential Staking Common Library
//!
//! Shared types, constants, and interfaces for the confidential staking
//! ledger and its collaborators.
//!
//! ## Confidentiality model
//!
//! Amounts exist only as opaque [`EncryptedU64`] handles. The ledger
//! computes on them through the [`EncryptedOps`] capability and decides, via
//! the [`acl`] module, who may ever decrypt each result. Timestamps and
//! rates are the only cleartext the ledger sees.
//!
//! ## Modules
//!
//! - **constants**: rate, year length, airdrop amount, scalar clamp
//! - **errors**: `StakingError` with stable codes
//! - **types**: addresses, handles, encrypted inputs, call context
//! - **math**: cleartext scalar preparation for accrual
//! - **fhe**: encrypted-arithmetic and confidential-token traits
//! - **acl**: staged permission grants
//! - **events**: borsh-serializable event log
//! - **mock** (feature `mock`): cleartext reference coprocessor

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod fhe;
pub mod acl;
pub mod events;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use math::*;
pub use fhe::*;
pub use acl::*;
pub use events::*;
