//! Time effect

use async_trait::async_trait;

/// Wall-clock source for record and event timestamps
#[async_trait]
pub trait TimeEffects: Send + Sync {
    /// Seconds since the Unix epoch
    async fn current_timestamp(&self) -> u64;
}
