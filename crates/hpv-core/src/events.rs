//! Registry notifications
//!
//! Every committed state change produces one `RegistryEvent`, wrapped in an
//! `EventEnvelope` carrying a global sequence number. Sequence numbers start
//! at 1, have no gaps, and follow commit order, so consumers can replay the
//! log and detect stale deliveries per entity.

use crate::crypto::Hash32;
use crate::types::{Address, Amount, ChipId, PostId, TokenId};
use serde::{Deserialize, Serialize};

/// Structured notification emitted by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryEvent {
    /// Owner authorized a clinic
    ClinicRegistered {
        /// Clinic address
        clinic: Address,
        /// Registration time
        timestamp: u64,
    },

    /// A clinic verified a chip
    ChipVerified {
        /// Chip identifier
        chip_id: ChipId,
        /// Verifying clinic
        clinic: Address,
        /// Verification time
        timestamp: u64,
    },

    /// A guardian credential was minted
    GuardianNFTMinted {
        /// Wallet receiving the credential
        guardian: Address,
        /// Chip backing the credential
        chip_id: ChipId,
        /// Minted token
        token_id: TokenId,
        /// Digest of the accepted eligibility proof
        proof_digest: Hash32,
        /// Mint time
        timestamp: u64,
    },

    /// Owner allocated a reward
    RewardAllocated {
        /// Monotonic allocation counter, from 1
        allocation_id: u64,
        /// Reward recipient
        recipient: Address,
        /// Allocated amount
        amount: Amount,
        /// Allocation time
        timestamp: u64,
    },

    /// A recipient claimed their balance
    RewardClaimed {
        /// Claiming address
        recipient: Address,
        /// Amount transferred
        amount: Amount,
        /// Claim time
        timestamp: u64,
    },

    /// A forum post was created
    PostCreated {
        /// Post identifier
        post_id: PostId,
        /// Author wallet
        author: Address,
        /// Content pointer
        cid: String,
        /// Creation time
        timestamp: u64,
    },

    /// A forum post was upvoted
    PostUpvoted {
        /// Post identifier
        post_id: PostId,
        /// Voting wallet
        voter: Address,
        /// Upvote count after this vote
        new_upvote_count: u64,
        /// Vote time
        timestamp: u64,
    },
}

impl RegistryEvent {
    /// Short event name, matching the on-chain event names
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClinicRegistered { .. } => "ClinicRegistered",
            Self::ChipVerified { .. } => "ChipVerified",
            Self::GuardianNFTMinted { .. } => "GuardianNFTMinted",
            Self::RewardAllocated { .. } => "RewardAllocated",
            Self::RewardClaimed { .. } => "RewardClaimed",
            Self::PostCreated { .. } => "PostCreated",
            Self::PostUpvoted { .. } => "PostUpvoted",
        }
    }

    /// Timestamp carried by the event
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::ClinicRegistered { timestamp, .. }
            | Self::ChipVerified { timestamp, .. }
            | Self::GuardianNFTMinted { timestamp, .. }
            | Self::RewardAllocated { timestamp, .. }
            | Self::RewardClaimed { timestamp, .. }
            | Self::PostCreated { timestamp, .. }
            | Self::PostUpvoted { timestamp, .. } => *timestamp,
        }
    }
}

/// Sequenced event as stored in the log and delivered to sinks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Global sequence number, from 1
    pub sequence: u64,
    /// Caller of the operation that emitted the event
    pub origin: Address,
    /// The event itself
    pub event: RegistryEvent,
}
