//! Ledger Events
//!
//! Events are emitted when an operation commits and can be indexed
//! off-chain. Amounts are opaque handles: an indexer learns that an
//! account acted, never how much moved.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::types::{Address, EncryptedU64, Timestamp};

/// Event types for indexing and filtering
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Airdrop Events (0x01 - 0x0F)
    AirdropClaimed = 0x01,

    // Stake Events (0x10 - 0x1F)
    Staked = 0x10,
    StakeWithdrawn = 0x11,

    // Reward Events (0x20 - 0x2F)
    InterestClaimed = 0x20,
    RewardsAccrued = 0x21,
}

/// Main event enum containing all ledger events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum StakingEvent {
    /// Emitted when an account claims its one-time airdrop
    AirdropClaimed {
        account: Address,
        amount: EncryptedU64,
        timestamp: Timestamp,
    },

    /// Emitted when tokens are staked
    Staked {
        account: Address,
        amount: EncryptedU64,
        timestamp: Timestamp,
    },

    /// Emitted when principal leaves the ledger
    StakeWithdrawn {
        account: Address,
        amount: EncryptedU64,
        /// True for withdraw-all
        full: bool,
        timestamp: Timestamp,
    },

    /// Emitted when accrued interest is minted to its owner
    InterestClaimed {
        account: Address,
        amount: EncryptedU64,
        timestamp: Timestamp,
    },

    /// Emitted by an explicit accrual checkpoint
    RewardsAccrued {
        account: Address,
        timestamp: Timestamp,
    },
}

impl StakingEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::AirdropClaimed { .. } => EventType::AirdropClaimed,
            Self::Staked { .. } => EventType::Staked,
            Self::StakeWithdrawn { .. } => EventType::StakeWithdrawn,
            Self::InterestClaimed { .. } => EventType::InterestClaimed,
            Self::RewardsAccrued { .. } => EventType::RewardsAccrued,
        }
    }

    /// Account the event concerns
    pub fn account(&self) -> &Address {
        match self {
            Self::AirdropClaimed { account, .. }
            | Self::Staked { account, .. }
            | Self::StakeWithdrawn { account, .. }
            | Self::InterestClaimed { account, .. }
            | Self::RewardsAccrued { account, .. } => account,
        }
    }

    /// Get the timestamp when the event occurred
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::AirdropClaimed { timestamp, .. }
            | Self::Staked { timestamp, .. }
            | Self::StakeWithdrawn { timestamp, .. }
            | Self::InterestClaimed { timestamp, .. }
            | Self::RewardsAccrued { timestamp, .. } => *timestamp,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting committed events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<StakingEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: StakingEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&StakingEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
