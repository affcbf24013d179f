//! Clinic signature envelope
//!
//! Ed25519 has no public-key recovery, so the envelope carries the signer's
//! verifying key next to the signature. "Recovering" the signer means
//! checking the signature under that key and deriving the address from it;
//! a signature that does not verify recovers nothing.

use super::hash::hash;
use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Ed25519 verifying key length in bytes
pub const PUBLIC_KEY_LEN: usize = 32;

/// Ed25519 signature length in bytes
pub const SIGNATURE_LEN: usize = 64;

/// Signature over a chip-verification message plus the signer's public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicSignature {
    /// Signer's verifying key
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// Raw signature bytes; length is checked at recovery time
    pub signature: Vec<u8>,
}

impl ClinicSignature {
    /// Build an envelope from its parts
    pub fn new(public_key: [u8; PUBLIC_KEY_LEN], signature: Vec<u8>) -> Self {
        Self {
            public_key,
            signature,
        }
    }

    /// Address the embedded key claims to belong to
    pub fn claimed_signer(&self) -> Address {
        address_from_verifying_key(&self.public_key)
    }
}

/// Derive an account address from a verifying key: the last 20 bytes of its
/// SHA-256 digest.
pub fn address_from_verifying_key(public_key: &[u8; PUBLIC_KEY_LEN]) -> Address {
    let digest = hash(public_key);
    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(&digest[32 - Address::LEN..]);
    Address(bytes)
}
