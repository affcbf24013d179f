//! HPV Registry - guardian verification ledgers
//!
//! Clinics vouch for vaccination chips by signing them, wallets present a
//! verified chip plus an eligibility proof to receive a one-per-wallet
//! guardian credential, and the owner allocates rewards that holders claim.
//! A small forum ledger rides along.
//!
//! # Ordering
//!
//! [`Registry`] serializes every mutating operation behind one sequencer.
//! Each operation validates all of its preconditions, then commits a single
//! atomic batch holding both the state change and its sequenced events. A
//! failed operation commits nothing. When two operations race for the same
//! wallet or chip, the first one sequenced wins and the second observes its
//! result.
//!
//! # Example
//!
//! ```rust,ignore
//! let treasury = MemoryTreasury::with_reserve(1_000_000);
//! let effects = RegistryEffects::builder()
//!     .with_transfer(Arc::new(treasury))
//!     .build();
//! let registry = Registry::new(RegistryConfig::new(owner), effects)?;
//! registry.register_clinic(owner, clinic.address()).await?;
//! let signature = clinic.sign_chip(&chip_id);
//! registry.register_vaccination(clinic.address(), chip_id, &signature).await?;
//! registry.become_guardian(wallet, chip_id, &EligibilityProof::new(b"proof".to_vec())).await?;
//! registry.allocate_reward(owner, wallet, 100).await?;
//! registry.claim_rewards(wallet).await?;
//! ```

#![forbid(unsafe_code)]

mod chips;
mod clinics;
mod forum;
mod guardian;
mod ledger;
mod rewards;
mod verifier;

/// Effect handler bundle
pub mod effects;

/// Sequenced registry facade
pub mod registry;

pub use effects::{RegistryEffects, RegistryEffectsBuilder};
pub use registry::Registry;
