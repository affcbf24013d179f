//! Signer recovery effect
//!
//! Hashing a message is pure and lives in `crate::crypto`; recovering who
//! signed it is delegated to this trait so the signature scheme can be
//! swapped without touching the chip ledger.

use crate::crypto::{ClinicSignature, Hash32};
use crate::errors::HpvResult;
use crate::types::Address;

/// Recovers the account that produced a signature over a message hash.
///
/// Implementations return `HpvError::InvalidSignature` when the signature is
/// malformed or does not verify. They never consult authorization state.
pub trait SignerRecovery: Send + Sync {
    /// Recover the signing address
    fn recover_signer(&self, message: &Hash32, signature: &ClinicSignature) -> HpvResult<Address>;
}
