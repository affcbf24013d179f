//! Sequenced registry facade
//!
//! Every mutating operation takes the sequencer, opens a `LedgerTxn`, runs the
//! ledger logic, and commits one batch. Events are published to sinks while
//! the sequencer is still held so sinks observe the global commit order. Reads
//! go straight to the store; a batch is applied atomically, so a read never
//! sees half of an operation.

use crate::effects::RegistryEffects;
use crate::ledger::LedgerTxn;
use crate::{chips, clinics, forum, guardian, rewards, verifier};
use async_trait::async_trait;
use hpv_core::effects::{EligibilityProof, EventSource, LedgerKey, LedgerStoreExt};
use hpv_core::{
    Address, Amount, ChipId, ChipVerification, ClinicSignature, EventEnvelope,
    GuardianCredential, HpvError, HpvResult, Post, PostId, RegistryConfig, TokenId,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Guardian verification registry
pub struct Registry {
    config: RegistryConfig,
    effects: RegistryEffects,
    sequencer: Mutex<()>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Create a registry over `effects`. Fails if the config is invalid.
    pub fn new(config: RegistryConfig, effects: RegistryEffects) -> HpvResult<Self> {
        config.validate()?;
        info!(
            owner = %config.owner,
            policy = %config.submission_policy,
            sinks = effects.sink_count(),
            "Registry initialized"
        );
        Ok(Self {
            config,
            effects,
            sequencer: Mutex::new(()),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Account allowed to register clinics and allocate rewards
    pub fn owner(&self) -> Address {
        self.config.owner
    }

    fn txn(&self) -> LedgerTxn<'_> {
        LedgerTxn::begin(self.effects.store.as_ref())
    }

    async fn now(&self) -> u64 {
        self.effects.clock.current_timestamp().await
    }

    /// Commit `txn` and publish its events. Callers hold the sequencer.
    async fn commit(&self, txn: LedgerTxn<'_>, origin: Address) -> HpvResult<()> {
        let envelopes = txn.commit(origin).await?;
        for envelope in &envelopes {
            info!(
                sequence = envelope.sequence,
                event = envelope.event.name(),
                origin = %origin,
                "Committed registry event"
            );
            for sink in &self.effects.sinks {
                if let Err(err) = sink.publish(envelope).await {
                    warn!(
                        sequence = envelope.sequence,
                        error = %err,
                        "Event sink rejected event; log remains authoritative"
                    );
                }
            }
        }
        Ok(())
    }

    // ---- clinic authorization ----

    /// Authorize `clinic`. Owner only. Returns false when it was already
    /// authorized, in which case nothing is emitted.
    pub async fn register_clinic(&self, caller: Address, clinic: Address) -> HpvResult<bool> {
        let _guard = self.sequencer.lock().await;
        let now = self.now().await;
        let mut txn = self.txn();
        let added = clinics::register_clinic(&mut txn, &self.config.owner, caller, clinic, now)
            .await?;
        self.commit(txn, caller).await?;
        Ok(added)
    }

    /// Whether `clinic` may vouch for chips
    pub async fn is_authorized_clinic(&self, clinic: &Address) -> HpvResult<bool> {
        clinics::is_authorized(&self.txn(), clinic).await
    }

    // ---- chip verification ----

    /// Check a clinic signature over `(chip_id, clinic)` without changing
    /// anything
    pub async fn verify_chip_signature(
        &self,
        chip_id: &ChipId,
        clinic: &Address,
        signature: &ClinicSignature,
    ) -> HpvResult<()> {
        verifier::verify_clinic_signature(
            &self.txn(),
            self.effects.signer_recovery.as_ref(),
            chip_id,
            clinic,
            signature,
        )
        .await
    }

    /// Mark `chip_id` verified on the strength of a clinic signature.
    ///
    /// Retrying with a valid signature for an already verified chip returns
    /// the original record.
    pub async fn register_vaccination(
        &self,
        caller: Address,
        chip_id: ChipId,
        signature: &ClinicSignature,
    ) -> HpvResult<ChipVerification> {
        let _guard = self.sequencer.lock().await;
        let now = self.now().await;
        let mut txn = self.txn();
        let record = chips::register_vaccination(
            &mut txn,
            self.effects.signer_recovery.as_ref(),
            self.config.submission_policy,
            caller,
            chip_id,
            signature,
            now,
        )
        .await
        .map_err(|err| {
            debug!(%caller, %chip_id, error = %err, "Vaccination registration rejected");
            err
        })?;
        self.commit(txn, caller).await?;
        Ok(record)
    }

    /// Whether `chip_id` has been verified
    pub async fn is_chip_verified(&self, chip_id: &ChipId) -> HpvResult<bool> {
        chips::is_verified(&self.txn(), chip_id).await
    }

    /// Verification record for `chip_id`
    pub async fn chip_verification(&self, chip_id: &ChipId) -> HpvResult<Option<ChipVerification>> {
        chips::chip_verification(&self.txn(), chip_id).await
    }

    // ---- guardian issuance ----

    /// Mint the caller's guardian credential against a verified chip
    pub async fn become_guardian(
        &self,
        caller: Address,
        chip_id: ChipId,
        proof: &EligibilityProof,
    ) -> HpvResult<GuardianCredential> {
        let _guard = self.sequencer.lock().await;
        let now = self.now().await;
        let mut txn = self.txn();
        let credential = guardian::become_guardian(
            &mut txn,
            self.effects.proof_verifier.as_ref(),
            caller,
            chip_id,
            proof,
            now,
        )
        .await
        .map_err(|err| {
            debug!(%caller, %chip_id, error = %err, "Guardian issuance rejected");
            err
        })?;
        self.commit(txn, caller).await?;
        Ok(credential)
    }

    /// Credentials held by `wallet` (0 or 1)
    pub async fn balance_of(&self, wallet: &Address) -> HpvResult<u64> {
        guardian::balance_of(&self.txn(), wallet).await
    }

    /// Whether `wallet` holds a credential
    pub async fn is_guardian(&self, wallet: &Address) -> HpvResult<bool> {
        Ok(guardian::token_of(&self.txn(), wallet).await?.is_some())
    }

    /// Token id held by `wallet`
    pub async fn token_of(&self, wallet: &Address) -> HpvResult<Option<TokenId>> {
        guardian::token_of(&self.txn(), wallet).await
    }

    /// Holder of `token_id`
    pub async fn owner_of(&self, token_id: TokenId) -> HpvResult<Option<Address>> {
        Ok(guardian::credential(&self.txn(), token_id)
            .await?
            .map(|credential| credential.owner))
    }

    /// Credential minted under `token_id`
    pub async fn credential(&self, token_id: TokenId) -> HpvResult<Option<GuardianCredential>> {
        guardian::credential(&self.txn(), token_id).await
    }

    /// Number of credentials minted so far
    pub async fn total_guardians(&self) -> HpvResult<u64> {
        guardian::issued_count(&self.txn()).await
    }

    // ---- rewards ----

    /// Credit `amount` to `recipient`. Owner only. Returns the allocation id.
    pub async fn allocate_reward(
        &self,
        caller: Address,
        recipient: Address,
        amount: Amount,
    ) -> HpvResult<u64> {
        let _guard = self.sequencer.lock().await;
        let now = self.now().await;
        let mut txn = self.txn();
        let allocation_id =
            rewards::allocate_reward(&mut txn, &self.config.owner, caller, recipient, amount, now)
                .await?;
        self.commit(txn, caller).await?;
        Ok(allocation_id)
    }

    /// Credit several recipients in one atomic commit. Owner only.
    pub async fn allocate_rewards(
        &self,
        caller: Address,
        recipients: &[Address],
        amounts: &[Amount],
    ) -> HpvResult<Vec<u64>> {
        let _guard = self.sequencer.lock().await;
        let now = self.now().await;
        let mut txn = self.txn();
        let allocation_ids = rewards::allocate_rewards(
            &mut txn,
            &self.config.owner,
            caller,
            recipients,
            amounts,
            now,
        )
        .await?;
        self.commit(txn, caller).await?;
        Ok(allocation_ids)
    }

    /// Pay out the caller's unclaimed balance.
    ///
    /// The balance is zeroed and committed before the transfer runs, and the
    /// transfer runs outside the sequencer. If the transfer fails the amount
    /// is credited back and the transfer error is returned. When that credit
    /// cannot be committed either, `ClaimRestoreFailed` is returned instead.
    pub async fn claim_rewards(&self, caller: Address) -> HpvResult<Amount> {
        let amount = {
            let _guard = self.sequencer.lock().await;
            let mut txn = self.txn();
            let amount = rewards::begin_claim(&mut txn, caller).await?;
            self.commit(txn, caller).await?;
            amount
        };

        match self.effects.transfer.transfer(caller, amount).await {
            Ok(()) => {
                let _guard = self.sequencer.lock().await;
                let now = self.now().await;
                let mut txn = self.txn();
                rewards::confirm_claim(&mut txn, caller, amount, now);
                if let Err(err) = self.commit(txn, caller).await {
                    // Funds already moved; the claim stands without its event.
                    error!(recipient = %caller, amount, error = %err, "Failed to record reward claim");
                }
                Ok(amount)
            }
            Err(transfer_err) => {
                warn!(recipient = %caller, amount, error = %transfer_err, "Reward transfer failed; restoring balance");
                let _guard = self.sequencer.lock().await;
                let mut txn = self.txn();
                let restored = match rewards::restore_claim(&mut txn, caller, amount).await {
                    Ok(()) => self.commit(txn, caller).await,
                    Err(err) => Err(err),
                };
                match restored {
                    Ok(()) => Err(transfer_err),
                    Err(restore_err) => {
                        error!(recipient = %caller, amount, error = %restore_err, "Failed to restore unclaimed balance");
                        Err(HpvError::ClaimRestoreFailed {
                            recipient: caller.to_string(),
                            amount,
                            transfer: transfer_err.to_string(),
                            restore: restore_err.to_string(),
                        })
                    }
                }
            }
        }
    }

    /// Balance `recipient` could claim now
    pub async fn get_unclaimed_amount(&self, recipient: &Address) -> HpvResult<Amount> {
        rewards::unclaimed(&self.txn(), recipient).await
    }

    // ---- forum ----

    /// Publish a post under `post_id`
    pub async fn create_post(&self, caller: Address, post_id: PostId, cid: &str) -> HpvResult<Post> {
        let _guard = self.sequencer.lock().await;
        let now = self.now().await;
        let mut txn = self.txn();
        let post = forum::create_post(&mut txn, caller, post_id, cid, now).await?;
        self.commit(txn, caller).await?;
        Ok(post)
    }

    /// Upvote a post once. Returns the new upvote count.
    pub async fn upvote(&self, caller: Address, post_id: PostId) -> HpvResult<u64> {
        let _guard = self.sequencer.lock().await;
        let now = self.now().await;
        let mut txn = self.txn();
        let count = forum::upvote(&mut txn, caller, post_id, now).await?;
        self.commit(txn, caller).await?;
        Ok(count)
    }

    /// Post stored under `post_id`
    pub async fn get_post(&self, post_id: &PostId) -> HpvResult<Option<Post>> {
        forum::post(&self.txn(), post_id).await
    }

    /// Whether `voter` has upvoted `post_id`
    pub async fn has_upvoted(&self, post_id: &PostId, voter: &Address) -> HpvResult<bool> {
        forum::has_upvoted(&self.txn(), post_id, voter).await
    }
}

#[async_trait]
impl EventSource for Registry {
    async fn events_since(&self, after: u64, limit: usize) -> HpvResult<Vec<EventEnvelope>> {
        let limit = limit.min(self.config.event_page_size);
        let latest = self.latest_sequence().await?;
        let mut events = Vec::new();
        let mut sequence = after;
        while events.len() < limit && sequence < latest {
            sequence += 1;
            if let Some(envelope) = self
                .effects
                .store
                .get_typed::<EventEnvelope>(&LedgerKey::event(sequence))
                .await?
            {
                events.push(envelope);
            }
        }
        Ok(events)
    }

    async fn latest_sequence(&self) -> HpvResult<u64> {
        Ok(self
            .effects
            .store
            .get_typed::<u64>(&LedgerKey::event_counter())
            .await?
            .unwrap_or(0))
    }
}
