//! Event channel effects

use crate::errors::HpvResult;
use crate::events::EventEnvelope;
use async_trait::async_trait;

/// Receives events after the state change that produced them is committed.
///
/// Delivery is best effort; the durable log behind `EventSource` is the
/// record consumers replay from.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event
    async fn publish(&self, envelope: &EventEnvelope) -> HpvResult<()>;
}

/// Replayable, ordered event log
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Events with `sequence > after`, oldest first, at most `limit`
    async fn events_since(&self, after: u64, limit: usize) -> HpvResult<Vec<EventEnvelope>>;

    /// Highest sequence number committed so far (0 when empty)
    async fn latest_sequence(&self) -> HpvResult<u64>;
}
