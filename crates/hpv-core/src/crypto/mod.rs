//! Cryptographic domain types and utilities

mod hash;
mod signature;

pub use hash::{chip_verification_message, hash, Hash32, CHIP_VERIFICATION_DOMAIN};
pub use signature::{
    address_from_verifying_key, ClinicSignature, PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
