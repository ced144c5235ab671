use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventEnvelope, EventStoreError, Result, Version,
    store::{AppendOptions, EventStore, validate_events_for_append},
};

/// In-memory event store.
///
/// Events are kept per aggregate; the write lock over the map makes the
/// version check and the insert a single atomic unit, which is what gives
/// concurrent requests on the same row their one-winner semantics.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    events: Arc<RwLock<HashMap<AggregateId, Vec<EventEnvelope>>>>,
}

impl InMemoryEventStore {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.values().map(Vec::len).sum()
    }

    /// Clears all events.
    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version> {
        validate_events_for_append(&events)?;

        let aggregate_id = events[0].aggregate_id;

        let mut store = self.events.write().await;
        let stream = store.entry(aggregate_id).or_default();

        let current_version = stream
            .last()
            .map(|e| e.version)
            .unwrap_or(Version::initial());

        // Check expected version if specified
        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Unique-version constraint even without an explicit expectation
        let first_new_version = events[0].version;
        if first_new_version != current_version.next() {
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let last_version = events
            .last()
            .map(|e| e.version)
            .unwrap_or(Version::initial());
        stream.extend(events);

        Ok(last_version)
    }

    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>> {
        let store = self.events.read().await;
        Ok(store.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let store = self.events.read().await;
        Ok(store
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map(|e| e.version))
    }
}
