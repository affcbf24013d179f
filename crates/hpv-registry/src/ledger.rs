//! Transactional view over the ledger store
//!
//! A `LedgerTxn` buffers writes and events for one operation. Reads see the
//! transaction's own pending writes first, then committed state, so a batch
//! allocation that credits the same recipient twice accumulates correctly.
//! Nothing reaches the store until `commit`, which appends the buffered events
//! to the durable log and applies everything as one `WriteBatch`.

use hpv_core::effects::{LedgerKey, LedgerStore, WriteBatch};
use hpv_core::{Address, EventEnvelope, HpvError, HpvResult, RegistryEvent};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

pub(crate) struct LedgerTxn<'a> {
    store: &'a dyn LedgerStore,
    overlay: BTreeMap<LedgerKey, Vec<u8>>,
    batch: WriteBatch,
    events: Vec<RegistryEvent>,
}

impl<'a> LedgerTxn<'a> {
    pub(crate) fn begin(store: &'a dyn LedgerStore) -> Self {
        Self {
            store,
            overlay: BTreeMap::new(),
            batch: WriteBatch::new(),
            events: Vec::new(),
        }
    }

    pub(crate) async fn read<T: DeserializeOwned>(&self, key: &LedgerKey) -> HpvResult<Option<T>> {
        let raw = match self.overlay.get(key) {
            Some(bytes) => Some(bytes.clone()),
            None => self.store.get(key).await?,
        };
        match raw {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn write<T: Serialize>(&mut self, key: LedgerKey, value: &T) -> HpvResult<()> {
        let bytes = bincode::serialize(value)?;
        self.overlay.insert(key.clone(), bytes.clone());
        self.batch.put(key, bytes);
        Ok(())
    }

    pub(crate) fn emit(&mut self, event: RegistryEvent) {
        self.events.push(event);
    }

    /// Apply buffered writes and events atomically.
    ///
    /// Returns the sequenced envelopes for publication. A transaction with no
    /// writes and no events commits nothing.
    pub(crate) async fn commit(mut self, origin: Address) -> HpvResult<Vec<EventEnvelope>> {
        if self.batch.is_empty() && self.events.is_empty() {
            return Ok(Vec::new());
        }

        let mut sequence: u64 = self.read(&LedgerKey::event_counter()).await?.unwrap_or(0);
        let mut envelopes = Vec::with_capacity(self.events.len());
        for event in std::mem::take(&mut self.events) {
            sequence = sequence
                .checked_add(1)
                .ok_or_else(|| HpvError::overflow("event sequence"))?;
            let envelope = EventEnvelope {
                sequence,
                origin,
                event,
            };
            self.batch.put_typed(LedgerKey::event(sequence), &envelope)?;
            envelopes.push(envelope);
        }
        if !envelopes.is_empty() {
            self.batch.put_typed(LedgerKey::event_counter(), &sequence)?;
        }

        self.store.commit(self.batch).await?;
        Ok(envelopes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpv_core::effects::LedgerStoreExt;
    use hpv_effects::MemoryLedgerStore;

    #[tokio::test]
    async fn test_reads_see_pending_writes() {
        let store = MemoryLedgerStore::new();
        let mut txn = LedgerTxn::begin(&store);
        txn.write(LedgerKey::token_counter(), &4u64).unwrap();

        assert_eq!(txn.read::<u64>(&LedgerKey::token_counter()).await.unwrap(), Some(4));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_dropped_transaction_leaves_store_untouched() {
        let store = MemoryLedgerStore::new();
        {
            let mut txn = LedgerTxn::begin(&store);
            txn.write(LedgerKey::token_counter(), &4u64).unwrap();
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_commit_sequences_events() {
        let store = MemoryLedgerStore::new();
        let origin = Address::repeat(1);

        let mut txn = LedgerTxn::begin(&store);
        txn.emit(RegistryEvent::ClinicRegistered {
            clinic: Address::repeat(2),
            timestamp: 10,
        });
        txn.emit(RegistryEvent::ClinicRegistered {
            clinic: Address::repeat(3),
            timestamp: 10,
        });
        let first = txn.commit(origin).await.unwrap();
        assert_eq!(first.iter().map(|e| e.sequence).collect::<Vec<_>>(), vec![1, 2]);

        let mut txn = LedgerTxn::begin(&store);
        txn.emit(RegistryEvent::ClinicRegistered {
            clinic: Address::repeat(4),
            timestamp: 11,
        });
        let second = txn.commit(origin).await.unwrap();
        assert_eq!(second[0].sequence, 3);

        let logged: Option<EventEnvelope> = store.get_typed(&LedgerKey::event(3)).await.unwrap();
        assert_eq!(logged, Some(second[0].clone()));
    }

    #[tokio::test]
    async fn test_empty_commit_is_noop() {
        let store = MemoryLedgerStore::new();
        let envelopes = LedgerTxn::begin(&store).commit(Address::repeat(1)).await.unwrap();
        assert!(envelopes.is_empty());
        assert!(store.is_empty().await);
    }
}
