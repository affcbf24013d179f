//! Clinic authorization store
//!
//! Owner-controlled set of addresses allowed to vouch for chips. There is no
//! revocation: once authorized, a clinic stays authorized.

use crate::ledger::LedgerTxn;
use hpv_core::effects::LedgerKey;
use hpv_core::{Address, ClinicRecord, HpvError, HpvResult, RegistryEvent};

pub(crate) async fn clinic_record(
    txn: &LedgerTxn<'_>,
    clinic: &Address,
) -> HpvResult<Option<ClinicRecord>> {
    txn.read(&LedgerKey::clinic(clinic)).await
}

pub(crate) async fn is_authorized(txn: &LedgerTxn<'_>, clinic: &Address) -> HpvResult<bool> {
    Ok(clinic_record(txn, clinic)
        .await?
        .map(|record| record.authorized)
        .unwrap_or(false))
}

/// Authorize `clinic`. Returns false when it already was.
pub(crate) async fn register_clinic(
    txn: &mut LedgerTxn<'_>,
    owner: &Address,
    caller: Address,
    clinic: Address,
    now: u64,
) -> HpvResult<bool> {
    if caller != *owner {
        tracing::debug!(%caller, %clinic, "Non-owner attempted clinic registration");
        return Err(HpvError::unauthorized(caller, "register clinics"));
    }

    if is_authorized(txn, &clinic).await? {
        tracing::debug!(%clinic, "Clinic already authorized");
        return Ok(false);
    }

    let record = ClinicRecord {
        address: clinic,
        authorized: true,
        registered_at: now,
    };
    txn.write(LedgerKey::clinic(&clinic), &record)?;
    txn.emit(RegistryEvent::ClinicRegistered {
        clinic,
        timestamp: now,
    });
    Ok(true)
}
