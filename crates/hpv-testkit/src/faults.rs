//! Fault-injecting effect handlers

use async_trait::async_trait;
use hpv_core::effects::{
    EligibilityProof, EventSink, LedgerKey, LedgerStore, ProofContext, ProofVerdict,
    ProofVerifier, WriteBatch,
};
use hpv_core::{EventEnvelope, HpvError, HpvResult};
use hpv_effects::MemoryLedgerStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Memory store whose commits can be made to fail on demand.
///
/// A failed commit applies nothing, so tests can check that an operation
/// interrupted at commit time leaves no trace.
#[derive(Debug, Clone, Default)]
pub struct FaultyLedgerStore {
    inner: MemoryLedgerStore,
    fail_commits: Arc<AtomicBool>,
}

impl FaultyLedgerStore {
    /// Store that behaves normally until told otherwise
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following commit fail (or succeed again)
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Underlying memory store
    pub fn memory(&self) -> &MemoryLedgerStore {
        &self.inner
    }
}

#[async_trait]
impl LedgerStore for FaultyLedgerStore {
    async fn get(&self, key: &LedgerKey) -> HpvResult<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn commit(&self, batch: WriteBatch) -> HpvResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(HpvError::storage("injected commit failure"));
        }
        self.inner.commit(batch).await
    }
}

/// Sink that refuses every event
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEventSink;

#[async_trait]
impl EventSink for FailingEventSink {
    async fn publish(&self, envelope: &EventEnvelope) -> HpvResult<()> {
        Err(HpvError::storage(format!(
            "sink unavailable for event {}",
            envelope.sequence
        )))
    }
}

/// Verifier that rejects every proof
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllProofs;

#[async_trait]
impl ProofVerifier for RejectAllProofs {
    async fn verify(
        &self,
        _context: &ProofContext,
        _proof: &EligibilityProof,
    ) -> HpvResult<ProofVerdict> {
        Ok(ProofVerdict::Rejected {
            reason: "holder is not eligible".to_string(),
        })
    }
}
