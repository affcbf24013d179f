//! Clock handlers

use async_trait::async_trait;
use hpv_core::effects::TimeEffects;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl TimeEffects for SystemClock {
    async fn current_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug, Clone, Default)]
pub struct FixedClock {
    now: Arc<AtomicU64>,
}

impl FixedClock {
    /// Clock frozen at `timestamp`
    pub fn at(timestamp: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(timestamp)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: u64) {
        self.now.store(timestamp, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeEffects for FixedClock {
    async fn current_timestamp(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
