//! Indexed entities
//!
//! Ids are lowercase `0x` hex strings: a wallet or clinic address, a post id,
//! `<chip>-<clinic>` for verifications and `<post>-<voter>` for upvotes.
//! Rewards are keyed by allocation id and claims by event sequence. Field
//! names serialize in camelCase to match the GraphQL schema consumers query.

// Entity fields mirror the schema and are not documented one by one.
#![allow(missing_docs)]

use hpv_core::{Address, Amount, ChipId, PostId, TokenId};
use serde::{Deserialize, Serialize};

/// Id of the singleton [`GlobalStats`] record
pub const GLOBAL_STATS_ID: &str = "global";

/// Entity id for a wallet or clinic
pub fn address_id(address: &Address) -> String {
    address.to_hex()
}

/// Entity id for a chip verification
pub fn chip_verification_id(chip_id: &ChipId, clinic: &Address) -> String {
    format!("{}-{}", chip_id.to_hex(), clinic.to_hex())
}

/// Entity id for an upvote
pub fn upvote_id(post_id: &PostId, voter: &Address) -> String {
    format!("{}-{}", post_id.to_hex(), voter.to_hex())
}

/// Wallet holding a guardian credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianEntity {
    pub id: String,
    pub wallet: Address,
    pub chip_id: ChipId,
    pub token_id: TokenId,
    pub timestamp: u64,
}

/// Authorized clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicEntity {
    pub id: String,
    pub address: Address,
    /// None until the registration event itself has been indexed
    pub registered_at: Option<u64>,
    pub chips_verified: u64,
}

/// One clinic's verification of one chip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipVerificationEntity {
    pub id: String,
    pub chip_id: ChipId,
    /// Clinic entity id
    pub clinic: String,
    pub timestamp: u64,
    /// Guardian entity ids minted against this chip
    pub guardians: Vec<String>,
}

/// Forum post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostEntity {
    pub id: String,
    pub author_address: Address,
    /// Guardian entity id, when the author is a guardian
    pub author: Option<String>,
    pub cid: String,
    pub created_at: u64,
    pub upvote_count: u64,
    /// Highest event sequence applied to this post
    pub last_sequence: u64,
}

/// A single upvote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteEntity {
    pub id: String,
    /// Post entity id
    pub post: String,
    pub voter_address: Address,
    pub voter: Option<String>,
    pub timestamp: u64,
}

/// Reward allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEntity {
    pub id: String,
    pub allocation_id: u64,
    pub recipient_address: Address,
    pub recipient: Option<String>,
    pub amount: Amount,
    pub timestamp: u64,
}

/// Reward payout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEntity {
    pub id: String,
    pub recipient_address: Address,
    pub recipient: Option<String>,
    pub amount: Amount,
    pub timestamp: u64,
}

/// Running totals across every indexed entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_guardians: u64,
    pub total_clinics: u64,
    pub total_verified_chips: u64,
    pub total_posts: u64,
    pub total_upvotes: u64,
    pub total_rewards: Amount,
    pub total_claimed: Amount,
    /// Timestamp of the latest event that changed a total
    pub last_updated: u64,
}
