//! Effect interfaces consumed by the registry
//!
//! Handlers live in `hpv-effects`. Every trait is object safe so the
//! registry can hold them as `Arc<dyn ...>`.

mod events;
mod proof;
mod signature;
mod storage;
mod time;
mod transfer;

pub use events::{EventSink, EventSource};
pub use proof::{EligibilityProof, ProofContext, ProofVerdict, ProofVerifier};
pub use signature::SignerRecovery;
pub use storage::{LedgerKey, LedgerStore, LedgerStoreExt, WriteBatch, WriteOp};
pub use time::TimeEffects;
pub use transfer::ValueTransfer;
