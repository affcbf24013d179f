//! Eligibility proof effect
//!
//! The guardian issuance engine treats proofs as opaque bytes and asks a
//! `ProofVerifier` for a verdict. The demo handler accepts any non-empty
//! proof; a real zero-knowledge verifier plugs in behind the same trait.

use crate::crypto::{hash, Hash32};
use crate::errors::HpvResult;
use crate::types::{Address, ChipId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque eligibility proof artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityProof(pub Vec<u8>);

impl EligibilityProof {
    /// Wrap raw proof bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw proof bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True when no bytes were supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Digest recorded on the credential in place of the proof itself
    pub fn digest(&self) -> Hash32 {
        Hash32(hash(&self.0))
    }
}

/// Public inputs the proof is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofContext {
    /// Wallet asking to become a guardian
    pub holder: Address,
    /// Verified chip the holder presents
    pub chip_id: ChipId,
}

/// Outcome of proof verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofVerdict {
    /// Proof accepted
    Accepted,
    /// Proof rejected with a reason
    Rejected {
        /// Why the proof was rejected
        reason: String,
    },
}

impl ProofVerdict {
    /// True for `Accepted`
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Eligibility proof oracle.
///
/// `Err` is reserved for verifier faults; an invalid proof is `Ok(Rejected)`.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// Check a proof for the given holder and chip
    async fn verify(&self, context: &ProofContext, proof: &EligibilityProof)
        -> HpvResult<ProofVerdict>;
}
