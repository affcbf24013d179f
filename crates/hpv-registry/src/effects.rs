//! Effect handlers the registry runs against
//!
//! `RegistryEffects` bundles one handler per effect trait. The builder fills
//! anything left unset with the memory-backed or production default from
//! `hpv-effects`.

use hpv_core::effects::{
    EventSink, LedgerStore, ProofVerifier, SignerRecovery, TimeEffects, ValueTransfer,
};
use hpv_effects::{
    AcceptNonEmptyProofs, Ed25519SignerRecovery, MemoryLedgerStore, MemoryTreasury, SystemClock,
};
use std::sync::Arc;

/// Handlers for every effect the registry consumes
#[derive(Clone)]
pub struct RegistryEffects {
    pub(crate) store: Arc<dyn LedgerStore>,
    pub(crate) signer_recovery: Arc<dyn SignerRecovery>,
    pub(crate) proof_verifier: Arc<dyn ProofVerifier>,
    pub(crate) transfer: Arc<dyn ValueTransfer>,
    pub(crate) clock: Arc<dyn TimeEffects>,
    pub(crate) sinks: Vec<Arc<dyn EventSink>>,
}

impl RegistryEffects {
    /// Start a builder with every handler unset
    pub fn builder() -> RegistryEffectsBuilder {
        RegistryEffectsBuilder::default()
    }

    /// Ledger store the registry commits to
    pub fn store(&self) -> Arc<dyn LedgerStore> {
        Arc::clone(&self.store)
    }

    /// Number of subscribed event sinks
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

/// Memory defaults for every handler.
///
/// The default treasury holds no reserve, so every claim fails with
/// `TransferFailed` until a funded `ValueTransfer` is supplied through
/// [`RegistryEffectsBuilder::with_transfer`].
impl Default for RegistryEffects {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for RegistryEffects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEffects")
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`RegistryEffects`]
#[derive(Default)]
pub struct RegistryEffectsBuilder {
    store: Option<Arc<dyn LedgerStore>>,
    signer_recovery: Option<Arc<dyn SignerRecovery>>,
    proof_verifier: Option<Arc<dyn ProofVerifier>>,
    transfer: Option<Arc<dyn ValueTransfer>>,
    clock: Option<Arc<dyn TimeEffects>>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl RegistryEffectsBuilder {
    /// Use `store` for ledger state
    pub fn with_store(mut self, store: Arc<dyn LedgerStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use `recovery` to recover clinic signers
    pub fn with_signer_recovery(mut self, recovery: Arc<dyn SignerRecovery>) -> Self {
        self.signer_recovery = Some(recovery);
        self
    }

    /// Use `verifier` for eligibility proofs
    pub fn with_proof_verifier(mut self, verifier: Arc<dyn ProofVerifier>) -> Self {
        self.proof_verifier = Some(verifier);
        self
    }

    /// Use `transfer` to pay out claims
    pub fn with_transfer(mut self, transfer: Arc<dyn ValueTransfer>) -> Self {
        self.transfer = Some(transfer);
        self
    }

    /// Use `clock` for timestamps
    pub fn with_clock(mut self, clock: Arc<dyn TimeEffects>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Subscribe a sink; sinks receive events in subscription order
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Fill unset handlers with defaults. An unset transfer handler becomes
    /// an empty `MemoryTreasury`.
    pub fn build(self) -> RegistryEffects {
        RegistryEffects {
            store: self
                .store
                .unwrap_or_else(|| Arc::new(MemoryLedgerStore::new())),
            signer_recovery: self
                .signer_recovery
                .unwrap_or_else(|| Arc::new(Ed25519SignerRecovery::new())),
            proof_verifier: self
                .proof_verifier
                .unwrap_or_else(|| Arc::new(AcceptNonEmptyProofs)),
            transfer: self
                .transfer
                .unwrap_or_else(|| Arc::new(MemoryTreasury::default())),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            sinks: self.sinks,
        }
    }
}
