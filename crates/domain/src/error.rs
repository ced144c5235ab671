//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::claim::ClaimError;
use crate::delivery::DeliveryError;
use crate::listing::ListingError;
use crate::order::OrderError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event store.
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    /// An error occurred in the listing aggregate.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// An error occurred in the order aggregate.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// An error occurred in the donation claim aggregate.
    #[error("Claim error: {0}")]
    Claim(#[from] ClaimError),

    /// An error occurred in the delivery aggregate.
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Aggregate not found.
    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
