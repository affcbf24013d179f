//! Event sinks

use async_trait::async_trait;
use hpv_core::effects::EventSink;
use hpv_core::{EventEnvelope, HpvResult};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn publish(&self, _envelope: &EventEnvelope) -> HpvResult<()> {
        Ok(())
    }
}

/// Keeps every published event in memory, in delivery order
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl RecordingEventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far
    pub async fn events(&self) -> Vec<EventEnvelope> {
        self.events.read().await.clone()
    }

    /// Names of published events, in order
    pub async fn event_names(&self) -> Vec<&'static str> {
        self.events
            .read()
            .await
            .iter()
            .map(|e| e.event.name())
            .collect()
    }

    /// Forget recorded events
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, envelope: &EventEnvelope) -> HpvResult<()> {
        self.events.write().await.push(envelope.clone());
        Ok(())
    }
}
