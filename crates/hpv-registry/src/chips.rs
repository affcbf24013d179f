//! Chip verification ledger
//!
//! A chip moves from unverified to verified exactly once. Re-submitting a
//! valid signature for an already verified chip succeeds without changing
//! anything, so clinics can retry safely.

use crate::ledger::LedgerTxn;
use crate::verifier;
use hpv_core::effects::{LedgerKey, SignerRecovery};
use hpv_core::{
    Address, ChipId, ChipVerification, ClinicSignature, HpvResult, RegistryEvent,
    SubmissionPolicy,
};

pub(crate) async fn chip_verification(
    txn: &LedgerTxn<'_>,
    chip_id: &ChipId,
) -> HpvResult<Option<ChipVerification>> {
    txn.read(&LedgerKey::chip(chip_id)).await
}

pub(crate) async fn is_verified(txn: &LedgerTxn<'_>, chip_id: &ChipId) -> HpvResult<bool> {
    Ok(chip_verification(txn, chip_id).await?.is_some())
}

/// Clinic whose signature is being presented, per submission policy
pub(crate) fn presenting_clinic(
    policy: SubmissionPolicy,
    caller: Address,
    signature: &ClinicSignature,
) -> Address {
    match policy {
        SubmissionPolicy::ClinicOnly => caller,
        SubmissionPolicy::AnySubmitter => signature.claimed_signer(),
    }
}

pub(crate) async fn register_vaccination(
    txn: &mut LedgerTxn<'_>,
    recovery: &dyn SignerRecovery,
    policy: SubmissionPolicy,
    caller: Address,
    chip_id: ChipId,
    signature: &ClinicSignature,
    now: u64,
) -> HpvResult<ChipVerification> {
    let clinic = presenting_clinic(policy, caller, signature);
    verifier::verify_clinic_signature(txn, recovery, &chip_id, &clinic, signature).await?;

    if let Some(existing) = chip_verification(txn, &chip_id).await? {
        tracing::debug!(%chip_id, clinic = %existing.clinic, "Chip already verified");
        return Ok(existing);
    }

    let record = ChipVerification {
        chip_id,
        clinic,
        verified_at: now,
    };
    txn.write(LedgerKey::chip(&chip_id), &record)?;
    txn.emit(RegistryEvent::ChipVerified {
        chip_id,
        clinic,
        timestamp: now,
    });
    Ok(record)
}
