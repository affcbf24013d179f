//! Reward ledger
//!
//! Balances only grow through owner allocations and only shrink, to zero,
//! through a claim. A claim is split in two around the value transfer: the
//! balance is zeroed and committed first, then the transfer runs, then either
//! the claim is confirmed or the amount is credited back. A second claim that
//! races the transfer sees a zero balance.

use crate::ledger::LedgerTxn;
use hpv_core::effects::LedgerKey;
use hpv_core::{Address, Amount, HpvError, HpvResult, RegistryEvent};

pub(crate) async fn unclaimed(txn: &LedgerTxn<'_>, recipient: &Address) -> HpvResult<Amount> {
    Ok(txn.read(&LedgerKey::unclaimed(recipient)).await?.unwrap_or(0))
}

fn require_owner(owner: &Address, caller: Address) -> HpvResult<()> {
    if caller != *owner {
        return Err(HpvError::unauthorized(caller, "allocate rewards"));
    }
    Ok(())
}

fn require_positive(amount: Amount) -> HpvResult<()> {
    if amount == 0 {
        return Err(HpvError::invalid_amount("reward amount must be positive"));
    }
    Ok(())
}

async fn credit(
    txn: &mut LedgerTxn<'_>,
    recipient: Address,
    amount: Amount,
    now: u64,
) -> HpvResult<u64> {
    let balance = unclaimed(txn, &recipient)
        .await?
        .checked_add(amount)
        .ok_or_else(|| HpvError::overflow(format!("unclaimed balance of {recipient}")))?;

    let last: u64 = txn.read(&LedgerKey::allocation_counter()).await?.unwrap_or(0);
    let allocation_id = last
        .checked_add(1)
        .ok_or_else(|| HpvError::overflow("allocation counter"))?;

    txn.write(LedgerKey::unclaimed(&recipient), &balance)?;
    txn.write(LedgerKey::allocation_counter(), &allocation_id)?;
    txn.emit(RegistryEvent::RewardAllocated {
        allocation_id,
        recipient,
        amount,
        timestamp: now,
    });
    Ok(allocation_id)
}

pub(crate) async fn allocate_reward(
    txn: &mut LedgerTxn<'_>,
    owner: &Address,
    caller: Address,
    recipient: Address,
    amount: Amount,
    now: u64,
) -> HpvResult<u64> {
    require_owner(owner, caller)?;
    require_positive(amount)?;
    credit(txn, recipient, amount, now).await
}

/// Allocate to several recipients at once. Every input is validated before
/// anything is credited; duplicate recipients accumulate.
pub(crate) async fn allocate_rewards(
    txn: &mut LedgerTxn<'_>,
    owner: &Address,
    caller: Address,
    recipients: &[Address],
    amounts: &[Amount],
    now: u64,
) -> HpvResult<Vec<u64>> {
    require_owner(owner, caller)?;
    if recipients.len() != amounts.len() {
        return Err(HpvError::LengthMismatch {
            left: recipients.len(),
            right: amounts.len(),
        });
    }
    for amount in amounts {
        require_positive(*amount)?;
    }

    let mut allocation_ids = Vec::with_capacity(recipients.len());
    for (recipient, amount) in recipients.iter().zip(amounts) {
        allocation_ids.push(credit(txn, *recipient, *amount, now).await?);
    }
    Ok(allocation_ids)
}

/// Zero the caller's balance and return what it held
pub(crate) async fn begin_claim(txn: &mut LedgerTxn<'_>, caller: Address) -> HpvResult<Amount> {
    let amount = unclaimed(txn, &caller).await?;
    if amount == 0 {
        return Err(HpvError::NothingToClaim {
            recipient: caller.to_string(),
        });
    }
    txn.write(LedgerKey::unclaimed(&caller), &0u128)?;
    Ok(amount)
}

/// Record a claim whose transfer went through
pub(crate) fn confirm_claim(txn: &mut LedgerTxn<'_>, caller: Address, amount: Amount, now: u64) {
    txn.emit(RegistryEvent::RewardClaimed {
        recipient: caller,
        amount,
        timestamp: now,
    });
}

/// Credit back a claim whose transfer failed. Adds rather than overwrites, so
/// allocations made while the transfer was in flight are kept.
pub(crate) async fn restore_claim(
    txn: &mut LedgerTxn<'_>,
    caller: Address,
    amount: Amount,
) -> HpvResult<()> {
    let balance = unclaimed(txn, &caller)
        .await?
        .checked_add(amount)
        .ok_or_else(|| HpvError::overflow(format!("unclaimed balance of {caller}")))?;
    txn.write(LedgerKey::unclaimed(&caller), &balance)
}
