//! HPV Core - Guardian Registry Foundation
//!
//! This crate provides the types and effect interfaces shared by every layer of
//! the guardian registry. It contains no ledger logic of its own.
//!
//! # Layers
//!
//! - **hpv-core** (this crate): identifiers, records, events, errors, config,
//!   and the effect traits the registry consumes
//! - **hpv-effects**: concrete handlers for those traits (memory store,
//!   ed25519 signer recovery, mock proof verifier, treasury, clocks)
//! - **hpv-registry**: clinic store, chip ledger, guardian issuance, rewards,
//!   and the forum ledger behind a single sequencer
//! - **hpv-indexer**: materializes emitted events into queryable entities
//!
//! # Effect Interfaces
//!
//! - `LedgerStore`: durable key-value state with atomic batch commits
//! - `SignerRecovery`: message + signature → signer address
//! - `ProofVerifier`: opaque eligibility proof → pass/fail
//! - `EventSink` / `EventSource`: notification channel and replayable log
//! - `ValueTransfer`: native currency payout for reward claims
//! - `TimeEffects`: timestamps for events and records

#![forbid(unsafe_code)]

/// Registry configuration
pub mod config;

/// Message hashing and signature envelopes
pub mod crypto;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Registry notifications
pub mod events;

/// Identifiers and ledger records
pub mod types;

pub use config::{RegistryConfig, SubmissionPolicy};
pub use crypto::{chip_verification_message, hash, ClinicSignature, Hash32};
pub use errors::{HpvError, HpvResult};
pub use events::{EventEnvelope, RegistryEvent};
pub use types::{
    Address, Amount, ChipId, ChipVerification, ClinicRecord, GuardianCredential, Post, PostId,
    TokenId,
};
