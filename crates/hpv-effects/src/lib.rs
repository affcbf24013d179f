//! HPV Effects - handler implementations
//!
//! Concrete handlers for the effect traits declared in `hpv_core::effects`.
//! Everything here is either a production primitive (ed25519 recovery, the
//! system clock) or a memory-backed stand-in used by tests and demos.

#![forbid(unsafe_code)]

/// Ed25519 clinic signing and signer recovery
pub mod crypto;

/// Event sinks
pub mod events;

/// Eligibility proof verifiers
pub mod proof;

/// Ledger storage handlers
pub mod storage;

/// Clock handlers
pub mod time;

/// Native value transfer handlers
pub mod transfer;

pub use crypto::{Ed25519ClinicSigner, Ed25519SignerRecovery};
pub use events::{NoopEventSink, RecordingEventSink};
pub use proof::AcceptNonEmptyProofs;
pub use storage::MemoryLedgerStore;
pub use time::{FixedClock, SystemClock};
pub use transfer::MemoryTreasury;
