//! Eligibility proof verifiers

use async_trait::async_trait;
use hpv_core::effects::{EligibilityProof, ProofContext, ProofVerdict, ProofVerifier};
use hpv_core::HpvResult;

/// Demo verifier: accepts any non-empty proof without checking it.
///
/// Stands in for a zero-knowledge verifier until one exists. Never deploy
/// this where eligibility actually matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptNonEmptyProofs;

#[async_trait]
impl ProofVerifier for AcceptNonEmptyProofs {
    async fn verify(
        &self,
        context: &ProofContext,
        proof: &EligibilityProof,
    ) -> HpvResult<ProofVerdict> {
        if proof.is_empty() {
            tracing::debug!(holder = %context.holder, "Rejecting empty eligibility proof");
            return Ok(ProofVerdict::Rejected {
                reason: "proof is empty".to_string(),
            });
        }
        Ok(ProofVerdict::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpv_core::{Address, ChipId};

    fn context() -> ProofContext {
        ProofContext {
            holder: Address::repeat(5),
            chip_id: ChipId::repeat(0xaa),
        }
    }

    #[tokio::test]
    async fn test_accepts_any_bytes() {
        let verdict = AcceptNonEmptyProofs
            .verify(&context(), &EligibilityProof::new(b"mock-zk-proof".to_vec()))
            .await
            .unwrap();
        assert!(verdict.is_accepted());
    }

    #[tokio::test]
    async fn test_rejects_empty() {
        let verdict = AcceptNonEmptyProofs
            .verify(&context(), &EligibilityProof::new(Vec::new()))
            .await
            .unwrap();
        assert!(!verdict.is_accepted());
    }
}
