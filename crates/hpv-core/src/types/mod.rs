//! Identifiers and persisted records

mod identifiers;
mod records;

pub use identifiers::{Address, Amount, ChipId, PostId, TokenId};
pub use records::{ChipVerification, ClinicRecord, GuardianCredential, Post};
