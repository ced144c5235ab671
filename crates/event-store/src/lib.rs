//! Versioned event log backing the fulfillment state machines.
//!
//! Every status transition in the core is persisted as an event appended at
//! an expected aggregate version. Two requests racing on the same listing,
//! order, claim, or delivery therefore resolve to exactly one winner; the
//! loser observes a [`EventStoreError::ConcurrencyConflict`] and is expected
//! to refetch and retry at most once.

pub mod error;
pub mod event;
pub mod memory;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, EventEnvelopeBuilder, EventId, Version};
pub use memory::InMemoryEventStore;
pub use store::{AppendOptions, EventStore};
