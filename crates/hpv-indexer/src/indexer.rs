//! Event handlers and queries
//!
//! Every handler is load-or-create: applying an event whose entity already
//! exists changes nothing, so the same log can be replayed any number of
//! times. Global totals only move when an entity is first created. Events for
//! unrelated entities may arrive in any order; links to guardians are filled
//! in whichever side arrives second.

use crate::entities::{
    address_id, chip_verification_id, upvote_id, ChipVerificationEntity, ClaimEntity,
    ClinicEntity, GlobalStats, GuardianEntity, PostEntity, RewardEntity, UpvoteEntity,
};
use async_trait::async_trait;
use hpv_core::effects::{EventSink, EventSource};
use hpv_core::{
    Address, Amount, ChipId, EventEnvelope, HpvResult, PostId, RegistryEvent, TokenId,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Events requested per `events_since` call during catch-up
pub const CATCH_UP_PAGE_SIZE: usize = 256;

/// Every indexed entity, keyed by entity id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedEntities {
    /// Guardians by wallet id
    pub guardians: BTreeMap<String, GuardianEntity>,
    /// Clinics by address id
    pub clinics: BTreeMap<String, ClinicEntity>,
    /// Verifications by `<chip>-<clinic>`
    pub chip_verifications: BTreeMap<String, ChipVerificationEntity>,
    /// Posts by post id
    pub posts: BTreeMap<String, PostEntity>,
    /// Upvotes by `<post>-<voter>`
    pub upvotes: BTreeMap<String, UpvoteEntity>,
    /// Rewards by allocation id
    pub rewards: BTreeMap<String, RewardEntity>,
    /// Claims by event sequence
    pub claims: BTreeMap<String, ClaimEntity>,
    /// Running totals
    pub stats: GlobalStats,
}

impl IndexedEntities {
    fn guardian_link(&self, address: &Address) -> Option<String> {
        let id = address_id(address);
        self.guardians.contains_key(&id).then_some(id)
    }

    fn touch(&mut self, timestamp: u64) {
        self.stats.last_updated = self.stats.last_updated.max(timestamp);
    }

    fn ensure_clinic(&mut self, clinic: &Address) -> &mut ClinicEntity {
        let id = address_id(clinic);
        if !self.clinics.contains_key(&id) {
            self.stats.total_clinics += 1;
        }
        self.clinics
            .entry(id.clone())
            .or_insert_with(|| ClinicEntity {
                id,
                address: *clinic,
                registered_at: None,
                chips_verified: 0,
            })
    }

    fn apply(&mut self, envelope: &EventEnvelope) {
        let sequence = envelope.sequence;
        match &envelope.event {
            RegistryEvent::ClinicRegistered { clinic, timestamp } => {
                self.on_clinic_registered(clinic, *timestamp);
            }
            RegistryEvent::ChipVerified {
                chip_id,
                clinic,
                timestamp,
            } => self.on_chip_verified(chip_id, clinic, *timestamp),
            RegistryEvent::GuardianNFTMinted {
                guardian,
                chip_id,
                token_id,
                timestamp,
                ..
            } => self.on_guardian_minted(guardian, chip_id, *token_id, *timestamp),
            RegistryEvent::RewardAllocated {
                allocation_id,
                recipient,
                amount,
                timestamp,
            } => self.on_reward_allocated(*allocation_id, recipient, *amount, *timestamp),
            RegistryEvent::RewardClaimed {
                recipient,
                amount,
                timestamp,
            } => self.on_reward_claimed(sequence, recipient, *amount, *timestamp),
            RegistryEvent::PostCreated {
                post_id,
                author,
                cid,
                timestamp,
            } => self.on_post_created(sequence, post_id, author, cid, *timestamp),
            RegistryEvent::PostUpvoted {
                post_id,
                voter,
                new_upvote_count,
                timestamp,
            } => self.on_post_upvoted(sequence, post_id, voter, *new_upvote_count, *timestamp),
        }
    }

    fn on_clinic_registered(&mut self, clinic: &Address, timestamp: u64) {
        let entity = self.ensure_clinic(clinic);
        if entity.registered_at.is_none() {
            entity.registered_at = Some(timestamp);
            self.touch(timestamp);
        }
    }

    fn on_chip_verified(&mut self, chip_id: &ChipId, clinic: &Address, timestamp: u64) {
        let id = chip_verification_id(chip_id, clinic);
        if self.chip_verifications.contains_key(&id) {
            return;
        }

        let clinic_entity = self.ensure_clinic(clinic);
        clinic_entity.chips_verified += 1;
        let clinic_id = clinic_entity.id.clone();

        let guardians = self
            .guardians
            .values()
            .filter(|g| g.chip_id == *chip_id)
            .map(|g| g.id.clone())
            .collect();
        self.chip_verifications.insert(
            id.clone(),
            ChipVerificationEntity {
                id,
                chip_id: *chip_id,
                clinic: clinic_id,
                timestamp,
                guardians,
            },
        );
        self.stats.total_verified_chips += 1;
        self.touch(timestamp);
    }

    fn on_guardian_minted(
        &mut self,
        wallet: &Address,
        chip_id: &ChipId,
        token_id: TokenId,
        timestamp: u64,
    ) {
        let id = address_id(wallet);
        if self.guardians.contains_key(&id) {
            return;
        }

        self.guardians.insert(
            id.clone(),
            GuardianEntity {
                id: id.clone(),
                wallet: *wallet,
                chip_id: *chip_id,
                token_id,
                timestamp,
            },
        );
        self.stats.total_guardians += 1;
        self.touch(timestamp);

        for verification in self
            .chip_verifications
            .values_mut()
            .filter(|v| v.chip_id == *chip_id)
        {
            if !verification.guardians.contains(&id) {
                verification.guardians.push(id.clone());
            }
        }
        for post in self.posts.values_mut().filter(|p| p.author_address == *wallet) {
            post.author = Some(id.clone());
        }
        for upvote in self.upvotes.values_mut().filter(|u| u.voter_address == *wallet) {
            upvote.voter = Some(id.clone());
        }
        for reward in self
            .rewards
            .values_mut()
            .filter(|r| r.recipient_address == *wallet)
        {
            reward.recipient = Some(id.clone());
        }
        for claim in self.claims.values_mut().filter(|c| c.recipient_address == *wallet) {
            claim.recipient = Some(id.clone());
        }
    }

    fn on_reward_allocated(
        &mut self,
        allocation_id: u64,
        recipient: &Address,
        amount: Amount,
        timestamp: u64,
    ) {
        let id = allocation_id.to_string();
        if self.rewards.contains_key(&id) {
            return;
        }
        let link = self.guardian_link(recipient);
        self.rewards.insert(
            id.clone(),
            RewardEntity {
                id,
                allocation_id,
                recipient_address: *recipient,
                recipient: link,
                amount,
                timestamp,
            },
        );
        self.stats.total_rewards = self.stats.total_rewards.saturating_add(amount);
        self.touch(timestamp);
    }

    fn on_reward_claimed(
        &mut self,
        sequence: u64,
        recipient: &Address,
        amount: Amount,
        timestamp: u64,
    ) {
        let id = sequence.to_string();
        if self.claims.contains_key(&id) {
            return;
        }
        let link = self.guardian_link(recipient);
        self.claims.insert(
            id.clone(),
            ClaimEntity {
                id,
                recipient_address: *recipient,
                recipient: link,
                amount,
                timestamp,
            },
        );
        self.stats.total_claimed = self.stats.total_claimed.saturating_add(amount);
        self.touch(timestamp);
    }

    fn on_post_created(
        &mut self,
        sequence: u64,
        post_id: &PostId,
        author: &Address,
        cid: &str,
        timestamp: u64,
    ) {
        let id = post_id.to_hex();
        if self.posts.contains_key(&id) {
            return;
        }
        // Upvotes replayed ahead of their post
        let prior_upvotes = self.upvotes.values().filter(|u| u.post == id).count() as u64;
        let link = self.guardian_link(author);
        self.posts.insert(
            id.clone(),
            PostEntity {
                id,
                author_address: *author,
                author: link,
                cid: cid.to_string(),
                created_at: timestamp,
                upvote_count: prior_upvotes,
                last_sequence: sequence,
            },
        );
        self.stats.total_posts += 1;
        self.touch(timestamp);
    }

    fn on_post_upvoted(
        &mut self,
        sequence: u64,
        post_id: &PostId,
        voter: &Address,
        new_upvote_count: u64,
        timestamp: u64,
    ) {
        let id = upvote_id(post_id, voter);
        let post_key = post_id.to_hex();

        if !self.upvotes.contains_key(&id) {
            let link = self.guardian_link(voter);
            self.upvotes.insert(
                id.clone(),
                UpvoteEntity {
                    id,
                    post: post_key.clone(),
                    voter_address: *voter,
                    voter: link,
                    timestamp,
                },
            );
            self.stats.total_upvotes += 1;
            self.touch(timestamp);
        }

        // One row per voter, so indexed rows bound the count from below
        let indexed = self.upvotes.values().filter(|u| u.post == post_key).count() as u64;
        if let Some(post) = self.posts.get_mut(&post_key) {
            if sequence <= post.last_sequence {
                trace!(sequence, post = %post_key, "Upvote replayed behind post's latest sequence");
            }
            post.upvote_count = post.upvote_count.max(new_upvote_count).max(indexed);
            post.last_sequence = post.last_sequence.max(sequence);
        }
    }
}

#[derive(Debug, Default)]
struct IndexState {
    entities: IndexedEntities,
    /// Every sequence up to and including this one has been applied
    cursor: u64,
    /// Applied sequences beyond a gap
    ahead: BTreeSet<u64>,
}

impl IndexState {
    fn mark_applied(&mut self, sequence: u64) {
        if sequence <= self.cursor {
            return;
        }
        self.ahead.insert(sequence);
        while let Some(next) = self.cursor.checked_add(1) {
            if !self.ahead.remove(&next) {
                break;
            }
            self.cursor = next;
        }
    }
}

/// Materializes registry events into queryable entities.
///
/// Works as a live [`EventSink`] and can [`catch_up`](Self::catch_up) from
/// any [`EventSource`]; both paths may deliver the same event.
#[derive(Debug, Clone, Default)]
pub struct EventIndexer {
    state: Arc<RwLock<IndexState>>,
}

impl EventIndexer {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Re-applying an event is a no-op.
    pub async fn apply(&self, envelope: &EventEnvelope) {
        let mut state = self.state.write().await;
        state.entities.apply(envelope);
        state.mark_applied(envelope.sequence);
        trace!(
            sequence = envelope.sequence,
            event = envelope.event.name(),
            cursor = state.cursor,
            "Indexed event"
        );
    }

    /// Pull everything `source` has beyond the cursor. Returns the number of
    /// events applied.
    pub async fn catch_up(&self, source: &dyn EventSource) -> HpvResult<usize> {
        let mut after = self.cursor().await;
        let mut applied = 0;
        loop {
            let page = source.events_since(after, CATCH_UP_PAGE_SIZE).await?;
            let Some(last) = page.last().map(|e| e.sequence) else {
                break;
            };
            if last <= after {
                break;
            }
            for envelope in &page {
                self.apply(envelope).await;
            }
            applied += page.len();
            after = last;
        }
        debug!(applied, cursor = self.cursor().await, "Indexer caught up");
        Ok(applied)
    }

    /// Highest sequence below which nothing is missing
    pub async fn cursor(&self) -> u64 {
        self.state.read().await.cursor
    }

    /// Copy of every entity
    pub async fn snapshot(&self) -> IndexedEntities {
        self.state.read().await.entities.clone()
    }

    /// Running totals
    pub async fn stats(&self) -> GlobalStats {
        self.state.read().await.entities.stats.clone()
    }

    /// Guardian entity for `wallet`
    pub async fn guardian(&self, wallet: &Address) -> Option<GuardianEntity> {
        self.state
            .read()
            .await
            .entities
            .guardians
            .get(&address_id(wallet))
            .cloned()
    }

    /// Clinic entity for `clinic`
    pub async fn clinic(&self, clinic: &Address) -> Option<ClinicEntity> {
        self.state
            .read()
            .await
            .entities
            .clinics
            .get(&address_id(clinic))
            .cloned()
    }

    /// Verifications recorded for `chip_id`
    pub async fn chip_verifications(&self, chip_id: &ChipId) -> Vec<ChipVerificationEntity> {
        self.state
            .read()
            .await
            .entities
            .chip_verifications
            .values()
            .filter(|v| v.chip_id == *chip_id)
            .cloned()
            .collect()
    }

    /// Post entity for `post_id`
    pub async fn post(&self, post_id: &PostId) -> Option<PostEntity> {
        self.state
            .read()
            .await
            .entities
            .posts
            .get(&post_id.to_hex())
            .cloned()
    }

    /// Posts written by `author`, by post id
    pub async fn posts_by(&self, author: &Address) -> Vec<PostEntity> {
        self.state
            .read()
            .await
            .entities
            .posts
            .values()
            .filter(|p| p.author_address == *author)
            .cloned()
            .collect()
    }

    /// Upvotes cast on `post_id`
    pub async fn upvotes_for(&self, post_id: &PostId) -> Vec<UpvoteEntity> {
        let post = post_id.to_hex();
        self.state
            .read()
            .await
            .entities
            .upvotes
            .values()
            .filter(|u| u.post == post)
            .cloned()
            .collect()
    }

    /// Allocations made to `recipient`, oldest first
    pub async fn rewards_for(&self, recipient: &Address) -> Vec<RewardEntity> {
        let mut rewards: Vec<_> = self
            .state
            .read()
            .await
            .entities
            .rewards
            .values()
            .filter(|r| r.recipient_address == *recipient)
            .cloned()
            .collect();
        rewards.sort_by_key(|r| r.allocation_id);
        rewards
    }
}

#[async_trait]
impl EventSink for EventIndexer {
    async fn publish(&self, envelope: &EventEnvelope) -> HpvResult<()> {
        self.apply(envelope).await;
        Ok(())
    }
}
