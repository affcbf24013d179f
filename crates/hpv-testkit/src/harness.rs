//! Registry test harness

use crate::faults::FaultyLedgerStore;
use crate::keys::{clinic_signer, owner};
use hpv_core::effects::{EventSink, ProofVerifier, ValueTransfer};
use hpv_core::{Amount, ChipId, ChipVerification, RegistryConfig, SubmissionPolicy};
use hpv_effects::{Ed25519ClinicSigner, FixedClock, MemoryTreasury, RecordingEventSink};
use hpv_registry::{Registry, RegistryEffects};
use std::sync::Arc;

/// Treasury reserve the harness starts with
pub const DEFAULT_RESERVE: Amount = 1_000_000;

/// Clock value the harness starts at
pub const GENESIS_TIME: u64 = 1_700_000_000;

/// A registry plus handles on every memory handler behind it
pub struct TestRegistry {
    /// Registry under test
    pub registry: Arc<Registry>,
    /// Backing store; commits can be made to fail
    pub store: FaultyLedgerStore,
    /// Treasury paying claims, unless the builder replaced it
    pub treasury: MemoryTreasury,
    /// Records every published event
    pub sink: RecordingEventSink,
    /// Clock driving timestamps
    pub clock: FixedClock,
    /// Clinic signer registered by `verify_chip`
    pub clinic: Ed25519ClinicSigner,
}

impl TestRegistry {
    /// Start configuring a harness
    pub fn builder() -> TestRegistryBuilder {
        TestRegistryBuilder::default()
    }

    /// Harness with every default
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Authorize the harness clinic and have it verify `ChipId::repeat(byte)`
    pub async fn verify_chip(&self, byte: u8) -> ChipId {
        let chip_id = ChipId::repeat(byte);
        let clinic = self.clinic.address();
        self.registry
            .register_clinic(owner(), clinic)
            .await
            .expect("owner registers clinic");
        self.registry
            .register_vaccination(clinic, chip_id, &self.clinic.sign_chip(&chip_id))
            .await
            .expect("clinic verifies chip");
        chip_id
    }

    /// Stored verification for `chip_id`, panicking if absent
    pub async fn chip_record(&self, chip_id: &ChipId) -> ChipVerification {
        self.registry
            .chip_verification(chip_id)
            .await
            .expect("read chip")
            .expect("chip is verified")
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`TestRegistry`]
pub struct TestRegistryBuilder {
    policy: SubmissionPolicy,
    reserve: Amount,
    start: u64,
    event_page_size: Option<usize>,
    transfer: Option<Arc<dyn ValueTransfer>>,
    proof_verifier: Option<Arc<dyn ProofVerifier>>,
    store: Option<FaultyLedgerStore>,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl Default for TestRegistryBuilder {
    fn default() -> Self {
        Self {
            policy: SubmissionPolicy::ClinicOnly,
            reserve: DEFAULT_RESERVE,
            start: GENESIS_TIME,
            event_page_size: None,
            transfer: None,
            proof_verifier: None,
            store: None,
            sinks: Vec::new(),
        }
    }
}

impl TestRegistryBuilder {
    /// Chip submission policy
    pub fn policy(mut self, policy: SubmissionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Starting treasury reserve
    pub fn reserve(mut self, reserve: Amount) -> Self {
        self.reserve = reserve;
        self
    }

    /// Starting clock value
    pub fn starting_at(mut self, timestamp: u64) -> Self {
        self.start = timestamp;
        self
    }

    /// Cap on events returned per `events_since` call
    pub fn event_page_size(mut self, size: usize) -> Self {
        self.event_page_size = Some(size);
        self
    }

    /// Share an existing store, e.g. to rebuild a registry over old state
    pub fn store(mut self, store: FaultyLedgerStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the treasury with another transfer handler
    pub fn transfer(mut self, transfer: Arc<dyn ValueTransfer>) -> Self {
        self.transfer = Some(transfer);
        self
    }

    /// Replace the demo proof verifier
    pub fn proof_verifier(mut self, verifier: Arc<dyn ProofVerifier>) -> Self {
        self.proof_verifier = Some(verifier);
        self
    }

    /// Subscribe an extra sink after the recording sink
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Wire everything up
    pub fn build(self) -> TestRegistry {
        let store = self.store.unwrap_or_default();
        let treasury = MemoryTreasury::with_reserve(self.reserve);
        let sink = RecordingEventSink::new();
        let clock = FixedClock::at(self.start);

        let transfer = self
            .transfer
            .unwrap_or_else(|| Arc::new(treasury.clone()));
        let mut effects = RegistryEffects::builder()
            .with_store(Arc::new(store.clone()))
            .with_transfer(transfer)
            .with_clock(Arc::new(clock.clone()))
            .with_sink(Arc::new(sink.clone()));
        if let Some(verifier) = self.proof_verifier {
            effects = effects.with_proof_verifier(verifier);
        }
        for extra in self.sinks {
            effects = effects.with_sink(extra);
        }

        let mut config = RegistryConfig::new(owner()).with_submission_policy(self.policy);
        if let Some(size) = self.event_page_size {
            config.event_page_size = size;
        }
        let registry = Registry::new(config, effects.build()).expect("valid test config");

        TestRegistry {
            registry: Arc::new(registry),
            store,
            treasury,
            sink,
            clock,
            clinic: clinic_signer("harness"),
        }
    }
}
