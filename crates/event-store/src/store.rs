use async_trait::async_trait;

use crate::{AggregateId, EventEnvelope, EventStoreError, Result, Version};

/// Options for appending events to the store.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected version of the aggregate for optimistic concurrency control.
    /// If None, no version check is performed (use with caution).
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the aggregate to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the aggregate to not exist (new aggregate).
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for event store implementations.
///
/// All implementations must be thread-safe (Send + Sync), and `append` must
/// serialize version checks so that concurrent appends at the same expected
/// version admit exactly one winner.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends events to the store.
    ///
    /// Events are appended atomically - either all succeed or none do.
    /// If `options.expected_version` is set, the operation fails with
    /// `ConcurrencyConflict` when the current version doesn't match.
    ///
    /// Returns the new version of the aggregate after appending.
    async fn append(&self, events: Vec<EventEnvelope>, options: AppendOptions) -> Result<Version>;

    /// Retrieves all events for a specific aggregate.
    ///
    /// Events are returned in version order (oldest first).
    async fn get_events_for_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<Vec<EventEnvelope>>;

    /// Gets the current version of an aggregate.
    ///
    /// Returns None if the aggregate doesn't exist.
    async fn get_aggregate_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;
}

/// Validates an event batch before appending.
///
/// All events must target the same aggregate and carry sequential versions.
pub fn validate_events_for_append(events: &[EventEnvelope]) -> Result<()> {
    if events.is_empty() {
        return Err(EventStoreError::InvalidAppend(
            "cannot append empty event list".to_string(),
        ));
    }

    let first = &events[0];
    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventStoreError::InvalidAppend(
                "all events must be for the same aggregate".to_string(),
            ));
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventStoreError::InvalidAppend(
                "all events must have the same aggregate type".to_string(),
            ));
        }
    }

    let mut expected_version = first.version;
    for event in events.iter().skip(1) {
        expected_version = expected_version.next();
        if event.version != expected_version {
            return Err(EventStoreError::InvalidAppend(format!(
                "event versions must be sequential: expected {}, got {}",
                expected_version, event.version
            )));
        }
    }

    Ok(())
}
