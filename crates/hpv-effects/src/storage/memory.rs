//! In-memory ledger store

use async_trait::async_trait;
use hpv_core::effects::{LedgerKey, LedgerStore, WriteBatch, WriteOp};
use hpv_core::HpvResult;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Memory-backed `LedgerStore`.
///
/// A batch is applied under a single write lock, so readers see either none
/// or all of it. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    data: Arc<RwLock<BTreeMap<LedgerKey, Vec<u8>>>>,
}

impl MemoryLedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Keys starting with `prefix`, in order
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<LedgerKey> {
        let data = self.data.read().await;
        data.keys()
            .filter(|k| k.as_str().starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Copy of the full contents
    pub async fn snapshot(&self) -> BTreeMap<LedgerKey, Vec<u8>> {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get(&self, key: &LedgerKey) -> HpvResult<Option<Vec<u8>>> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> HpvResult<()> {
        let mut data = self.data.write().await;
        let count = batch.len();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => {
                    data.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        tracing::trace!(ops = count, "Committed ledger batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpv_core::effects::LedgerStoreExt;

    #[tokio::test]
    async fn test_commit_and_read_back() {
        let store = MemoryLedgerStore::new();
        let mut batch = WriteBatch::new();
        batch.put_typed(LedgerKey::token_counter(), &3u64).unwrap();
        batch.put(LedgerKey::raw("a"), vec![1, 2]);
        store.commit(batch).await.unwrap();

        assert_eq!(
            store.get_typed::<u64>(&LedgerKey::token_counter()).await.unwrap(),
            Some(3)
        );
        assert_eq!(store.get(&LedgerKey::raw("a")).await.unwrap(), Some(vec![1, 2]));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_and_prefix_scan() {
        let store = MemoryLedgerStore::new();
        let mut batch = WriteBatch::new();
        batch.put(LedgerKey::event(1), vec![1]);
        batch.put(LedgerKey::event(2), vec![2]);
        batch.put(LedgerKey::token_counter(), vec![0]);
        store.commit(batch).await.unwrap();

        let mut batch = WriteBatch::new();
        batch.delete(LedgerKey::event(1));
        store.commit(batch).await.unwrap();

        let keys = store.keys_with_prefix("event/log/").await;
        assert_eq!(keys, vec![LedgerKey::event(2)]);
        assert!(!store.contains(&LedgerKey::event(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryLedgerStore::new();
        let view = store.clone();
        let mut batch = WriteBatch::new();
        batch.put(LedgerKey::raw("shared"), vec![9]);
        store.commit(batch).await.unwrap();
        assert_eq!(view.get(&LedgerKey::raw("shared")).await.unwrap(), Some(vec![9]));
    }
}
