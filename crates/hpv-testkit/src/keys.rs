//! Deterministic test identities

use hpv_core::effects::EligibilityProof;
use hpv_core::{hash, Address};
use hpv_effects::Ed25519ClinicSigner;

/// Clinic signer whose key is derived from `label`
pub fn clinic_signer(label: &str) -> Ed25519ClinicSigner {
    Ed25519ClinicSigner::from_seed(hash(format!("hpv-testkit/clinic/{label}").as_bytes()))
}

/// Registry owner used by the harness
pub fn owner() -> Address {
    Address::repeat(0x01)
}

/// Plain wallet address. Never collides with `owner()`.
pub fn wallet(n: u8) -> Address {
    let mut bytes = [0xee; Address::LEN];
    bytes[Address::LEN - 1] = n;
    Address(bytes)
}

/// Proof the demo verifier accepts
pub fn valid_proof() -> EligibilityProof {
    EligibilityProof::new(b"zk-eligibility-proof".to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinic_signers_are_deterministic() {
        assert_eq!(clinic_signer("a").address(), clinic_signer("a").address());
        assert_ne!(clinic_signer("a").address(), clinic_signer("b").address());
    }

    #[test]
    fn test_wallets_are_distinct() {
        assert_ne!(wallet(1), wallet(2));
        assert_ne!(wallet(1), owner());
    }
}
