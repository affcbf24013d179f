//! Ledger storage effect
//!
//! The registry keeps all of its state behind this trait. Reads are single
//! keys; writes are grouped into a `WriteBatch` that the handler must apply
//! atomically, which is how an operation with several state changes (mint a
//! credential, bump the counter, append an event) stays all-or-nothing.

use crate::errors::HpvResult;
use crate::types::{Address, ChipId, PostId, TokenId};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Key into the ledger store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey(String);

impl LedgerKey {
    /// Raw key, for handlers that need a custom layout
    pub fn raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Clinic authorization record
    pub fn clinic(clinic: &Address) -> Self {
        Self(format!("clinic/{clinic}"))
    }

    /// Chip verification record
    pub fn chip(chip_id: &ChipId) -> Self {
        Self(format!("chip/{chip_id}"))
    }

    /// Token held by a wallet
    pub fn guardian_token(wallet: &Address) -> Self {
        Self(format!("guardian/wallet/{wallet}"))
    }

    /// Credential stored under a token id
    pub fn credential(token_id: TokenId) -> Self {
        Self(format!("guardian/token/{:020}", token_id.0))
    }

    /// Last issued token id
    pub fn token_counter() -> Self {
        Self("guardian/counter".to_string())
    }

    /// Unclaimed reward balance
    pub fn unclaimed(recipient: &Address) -> Self {
        Self(format!("reward/unclaimed/{recipient}"))
    }

    /// Last allocation id
    pub fn allocation_counter() -> Self {
        Self("reward/counter".to_string())
    }

    /// Forum post
    pub fn post(post_id: &PostId) -> Self {
        Self(format!("forum/post/{post_id}"))
    }

    /// Upvote marker for a (post, voter) pair
    pub fn upvote(post_id: &PostId, voter: &Address) -> Self {
        Self(format!("forum/upvote/{post_id}/{voter}"))
    }

    /// Last event sequence number
    pub fn event_counter() -> Self {
        Self("event/counter".to_string())
    }

    /// Logged event at a sequence number
    pub fn event(sequence: u64) -> Self {
        Self(format!("event/log/{sequence:020}"))
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single write inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or overwrite a value
    Put {
        /// Target key
        key: LedgerKey,
        /// Encoded value
        value: Vec<u8>,
    },
    /// Remove a value if present
    Delete {
        /// Target key
        key: LedgerKey,
    },
}

/// Ordered set of writes applied atomically by `LedgerStore::commit`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw put
    pub fn put(&mut self, key: LedgerKey, value: Vec<u8>) {
        self.ops.push(WriteOp::Put { key, value });
    }

    /// Queue a put of a bincode-encoded value
    pub fn put_typed<T: Serialize>(&mut self, key: LedgerKey, value: &T) -> HpvResult<()> {
        let encoded = bincode::serialize(value)?;
        self.put(key, encoded);
        Ok(())
    }

    /// Queue a delete
    pub fn delete(&mut self, key: LedgerKey) {
        self.ops.push(WriteOp::Delete { key });
    }

    /// Queued operations in order
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Consume the batch
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Durable key-value state for the registry.
///
/// `commit` must apply every operation of the batch or none of them.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read the raw value at a key
    async fn get(&self, key: &LedgerKey) -> HpvResult<Option<Vec<u8>>>;

    /// Apply a batch atomically
    async fn commit(&self, batch: WriteBatch) -> HpvResult<()>;
}

/// Typed reads over any `LedgerStore`
#[async_trait]
pub trait LedgerStoreExt: LedgerStore {
    /// Read and decode a bincode value
    async fn get_typed<T: DeserializeOwned + Send>(&self, key: &LedgerKey) -> HpvResult<Option<T>> {
        match self.get(key).await? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// True when a value exists at the key
    async fn contains(&self, key: &LedgerKey) -> HpvResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

impl<T: LedgerStore + ?Sized> LedgerStoreExt for T {}
