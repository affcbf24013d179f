//! Ledger records
//!
//! These are the values the registry persists through `LedgerStore`. Absence
//! of a record is meaningful: an unknown chip is unverified, an unknown clinic
//! is unauthorized, and a wallet without a credential is not a guardian.

use super::identifiers::{Address, ChipId, PostId, TokenId};
use crate::crypto::Hash32;
use serde::{Deserialize, Serialize};

/// Authorized clinic. Only the registry owner creates these and none are
/// ever revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicRecord {
    /// Clinic signing address
    pub address: Address,
    /// Always true for stored records
    pub authorized: bool,
    /// Registration time (seconds since epoch)
    pub registered_at: u64,
}

/// A chip that an authorized clinic has vouched for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipVerification {
    /// Chip identifier
    pub chip_id: ChipId,
    /// Clinic whose signature verified the chip
    pub clinic: Address,
    /// Verification time (seconds since epoch)
    pub verified_at: u64,
}

/// Non-fungible guardian credential bound to a single wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianCredential {
    /// Wallet holding the credential
    pub owner: Address,
    /// Verified chip that justified issuance
    pub chip_id: ChipId,
    /// Token identifier
    pub token_id: TokenId,
    /// Digest of the eligibility proof that was accepted
    pub proof_digest: Hash32,
    /// Issue time (seconds since epoch)
    pub issued_at: u64,
}

/// Forum post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post identifier
    pub post_id: PostId,
    /// Author wallet
    pub author: Address,
    /// Content pointer (IPFS CID)
    pub cid: String,
    /// Creation time (seconds since epoch)
    pub created_at: u64,
    /// Number of distinct upvoters
    pub upvotes: u64,
}
