//! Ed25519 clinic signatures
//!
//! `Ed25519ClinicSigner` is the clinic-side half: it holds a signing key and
//! produces `ClinicSignature` envelopes over the canonical chip-verification
//! message. `Ed25519SignerRecovery` is the registry-side half behind the
//! `SignerRecovery` effect.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use hpv_core::crypto::{
    address_from_verifying_key, chip_verification_message, ClinicSignature, Hash32,
    PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
use hpv_core::effects::SignerRecovery;
use hpv_core::{Address, ChipId, HpvError, HpvResult};
use std::fmt;

/// Recovers clinic addresses from ed25519 signature envelopes.
///
/// Uses strict verification, which rejects small-order keys and
/// non-canonical signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519SignerRecovery;

impl Ed25519SignerRecovery {
    /// Create the handler
    pub fn new() -> Self {
        Self
    }
}

impl SignerRecovery for Ed25519SignerRecovery {
    fn recover_signer(&self, message: &Hash32, signature: &ClinicSignature) -> HpvResult<Address> {
        let key = VerifyingKey::from_bytes(&signature.public_key)
            .map_err(|e| HpvError::invalid_signature(format!("malformed public key: {e}")))?;

        let raw: [u8; SIGNATURE_LEN] =
            signature.signature.as_slice().try_into().map_err(|_| {
                HpvError::invalid_signature(format!(
                    "expected {SIGNATURE_LEN} signature bytes, got {}",
                    signature.signature.len()
                ))
            })?;

        key.verify_strict(message.as_bytes(), &Signature::from_bytes(&raw))
            .map_err(|_| HpvError::invalid_signature("signature does not verify"))?;

        Ok(address_from_verifying_key(&signature.public_key))
    }
}

/// Clinic-side signing key
#[derive(Clone)]
pub struct Ed25519ClinicSigner {
    signing_key: SigningKey,
}

impl Ed25519ClinicSigner {
    /// Build a signer from a 32-byte secret seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Verifying key bytes
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Account address of this clinic
    pub fn address(&self) -> Address {
        address_from_verifying_key(&self.public_key())
    }

    /// Sign an arbitrary message hash
    pub fn sign_message(&self, message: &Hash32) -> ClinicSignature {
        let signature = self.signing_key.sign(message.as_bytes());
        ClinicSignature::new(self.public_key(), signature.to_bytes().to_vec())
    }

    /// Sign the canonical verification message for `chip_id` bound to this
    /// clinic's own address
    pub fn sign_chip(&self, chip_id: &ChipId) -> ClinicSignature {
        self.sign_message(&chip_verification_message(chip_id, &self.address()))
    }
}

impl fmt::Debug for Ed25519ClinicSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519ClinicSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_signing_clinic() {
        let signer = Ed25519ClinicSigner::from_seed([11u8; 32]);
        let chip = ChipId::repeat(0xaa);
        let sig = signer.sign_chip(&chip);

        let message = chip_verification_message(&chip, &signer.address());
        let recovered = Ed25519SignerRecovery.recover_signer(&message, &sig).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn test_rejects_signature_over_other_message() {
        let signer = Ed25519ClinicSigner::from_seed([11u8; 32]);
        let sig = signer.sign_chip(&ChipId::repeat(0xaa));

        let other = chip_verification_message(&ChipId::repeat(0xbb), &signer.address());
        let err = Ed25519SignerRecovery.recover_signer(&other, &sig).unwrap_err();
        assert!(matches!(err, HpvError::InvalidSignature { .. }));
    }

    #[test]
    fn test_rejects_truncated_signature() {
        let signer = Ed25519ClinicSigner::from_seed([11u8; 32]);
        let chip = ChipId::repeat(0xaa);
        let mut sig = signer.sign_chip(&chip);
        sig.signature.truncate(10);

        let message = chip_verification_message(&chip, &signer.address());
        let err = Ed25519SignerRecovery.recover_signer(&message, &sig).unwrap_err();
        assert!(matches!(err, HpvError::InvalidSignature { .. }));
    }

    #[test]
    fn test_rejects_swapped_public_key() {
        let signer = Ed25519ClinicSigner::from_seed([11u8; 32]);
        let impostor = Ed25519ClinicSigner::from_seed([12u8; 32]);
        let chip = ChipId::repeat(0xaa);
        let mut sig = signer.sign_chip(&chip);
        sig.public_key = impostor.public_key();

        let message = chip_verification_message(&chip, &impostor.address());
        assert!(Ed25519SignerRecovery.recover_signer(&message, &sig).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = Ed25519ClinicSigner::from_seed([11u8; 32]);
        let rendered = format!("{signer:?}");
        assert!(rendered.contains("address"));
        assert!(!rendered.contains("signing_key"));
    }
}
