//! Clinic signature verification
//!
//! Reconstructs the canonical message for `(chip_id, clinic)`, recovers the
//! signer through the `SignerRecovery` effect, and checks the signer against
//! the clinic authorization store. Read-only.

use crate::clinics;
use crate::ledger::LedgerTxn;
use hpv_core::effects::SignerRecovery;
use hpv_core::{chip_verification_message, Address, ChipId, ClinicSignature, HpvError, HpvResult};

pub(crate) async fn verify_clinic_signature(
    txn: &LedgerTxn<'_>,
    recovery: &dyn SignerRecovery,
    chip_id: &ChipId,
    clinic: &Address,
    signature: &ClinicSignature,
) -> HpvResult<()> {
    let message = chip_verification_message(chip_id, clinic);
    let recovered = recovery.recover_signer(&message, signature)?;

    if recovered != *clinic {
        return Err(HpvError::invalid_signature(format!(
            "recovered signer {recovered} does not match clinic {clinic}"
        )));
    }

    if !clinics::is_authorized(txn, clinic).await? {
        return Err(HpvError::UnauthorizedClinic {
            clinic: clinic.to_string(),
        });
    }

    Ok(())
}
