//! Hashing and canonical message construction
//!
//! SHA-256 is the single hash used for identifiers, proof digests, clinic
//! addresses, and the chip-verification message. Changing the algorithm here
//! changes it everywhere.

use crate::types::{Address, ChipId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Domain tag prefixed to every chip-verification message
pub const CHIP_VERIFICATION_DOMAIN: &[u8] = b"hpv.chip-verification.v1";

/// 32-byte digest
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({self})")
    }
}

/// Hash arbitrary bytes to a 32-byte digest
pub fn hash(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Canonical message a clinic signs to vouch for a chip.
///
/// Packed encoding: `domain || chip_id (32) || clinic (20)`. Binding the
/// clinic address into the message stops one clinic's signature from being
/// replayed under another clinic's identity.
pub fn chip_verification_message(chip_id: &ChipId, clinic: &Address) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(CHIP_VERIFICATION_DOMAIN);
    hasher.update(chip_id.as_bytes());
    hasher.update(clinic.as_bytes());
    Hash32(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_binds_clinic() {
        let chip = ChipId::repeat(0xaa);
        let a = chip_verification_message(&chip, &Address::repeat(1));
        let b = chip_verification_message(&chip, &Address::repeat(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_message_binds_chip() {
        let clinic = Address::repeat(1);
        let a = chip_verification_message(&ChipId::repeat(0xaa), &clinic);
        let b = chip_verification_message(&ChipId::repeat(0xbb), &clinic);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_known_vector() {
        // SHA-256("abc")
        assert_eq!(
            hex::encode(hash(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
