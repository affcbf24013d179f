//! Guardian issuance engine
//!
//! Mints at most one credential per wallet, and only against a verified chip
//! plus an eligibility proof the `ProofVerifier` accepts. Per wallet the state
//! machine is `NoChip -> ChipVerified -> GuardianIssued`, and `GuardianIssued`
//! is terminal.
//!
//! A verified chip is not consumed by issuance: several wallets may present
//! the same chip. Uniqueness is enforced per wallet only.

use crate::chips;
use crate::ledger::LedgerTxn;
use hpv_core::effects::{EligibilityProof, LedgerKey, ProofContext, ProofVerdict, ProofVerifier};
use hpv_core::{Address, ChipId, GuardianCredential, HpvError, HpvResult, RegistryEvent, TokenId};

pub(crate) async fn token_of(txn: &LedgerTxn<'_>, wallet: &Address) -> HpvResult<Option<TokenId>> {
    txn.read(&LedgerKey::guardian_token(wallet)).await
}

pub(crate) async fn balance_of(txn: &LedgerTxn<'_>, wallet: &Address) -> HpvResult<u64> {
    Ok(u64::from(token_of(txn, wallet).await?.is_some()))
}

pub(crate) async fn credential(
    txn: &LedgerTxn<'_>,
    token_id: TokenId,
) -> HpvResult<Option<GuardianCredential>> {
    txn.read(&LedgerKey::credential(token_id)).await
}

pub(crate) async fn issued_count(txn: &LedgerTxn<'_>) -> HpvResult<u64> {
    Ok(txn.read(&LedgerKey::token_counter()).await?.unwrap_or(0))
}

pub(crate) async fn become_guardian(
    txn: &mut LedgerTxn<'_>,
    proof_verifier: &dyn ProofVerifier,
    caller: Address,
    chip_id: ChipId,
    proof: &EligibilityProof,
    now: u64,
) -> HpvResult<GuardianCredential> {
    if !chips::is_verified(txn, &chip_id).await? {
        return Err(HpvError::ChipNotVerified {
            chip_id: chip_id.to_string(),
        });
    }

    if token_of(txn, &caller).await?.is_some() {
        return Err(HpvError::AlreadyGuardian {
            wallet: caller.to_string(),
        });
    }

    let context = ProofContext {
        holder: caller,
        chip_id,
    };
    if let ProofVerdict::Rejected { reason } = proof_verifier.verify(&context, proof).await? {
        return Err(HpvError::ProofRejected { message: reason });
    }

    let token_id = TokenId(
        issued_count(txn)
            .await?
            .checked_add(1)
            .ok_or_else(|| HpvError::overflow("guardian token counter"))?,
    );
    let credential = GuardianCredential {
        owner: caller,
        chip_id,
        token_id,
        proof_digest: proof.digest(),
        issued_at: now,
    };

    txn.write(LedgerKey::credential(token_id), &credential)?;
    txn.write(LedgerKey::guardian_token(&caller), &token_id)?;
    txn.write(LedgerKey::token_counter(), &token_id.0)?;
    txn.emit(RegistryEvent::GuardianNFTMinted {
        guardian: caller,
        chip_id,
        token_id,
        proof_digest: credential.proof_digest,
        timestamp: now,
    });
    Ok(credential)
}
