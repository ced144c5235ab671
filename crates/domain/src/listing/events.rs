//! Listing domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{Money, TransactionRef, UserId};

use super::ListingOutcome;

/// Events that can occur on a listing aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ListingEvent {
    /// Listing was posted by its owner.
    ListingPosted(ListingPostedData),

    /// Listing was reserved by a new order or claim.
    ListingReserved(ListingReservedData),

    /// Reservation was released; listing is available again.
    ListingReleased(ListingReleasedData),

    /// Listing reached its terminal success status.
    ListingFinalized(ListingFinalizedData),

    /// Listing was removed by platform administration.
    ListingRemoved(ListingRemovedData),
}

impl DomainEvent for ListingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ListingEvent::ListingPosted(_) => "ListingPosted",
            ListingEvent::ListingReserved(_) => "ListingReserved",
            ListingEvent::ListingReleased(_) => "ListingReleased",
            ListingEvent::ListingFinalized(_) => "ListingFinalized",
            ListingEvent::ListingRemoved(_) => "ListingRemoved",
        }
    }
}

/// Data for ListingPosted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPostedData {
    /// The unique listing ID.
    pub listing_id: AggregateId,

    /// The seller or donor who owns the listing.
    pub owner_id: UserId,

    /// Short description of the food item.
    pub title: String,

    /// Whether the item is offered for free.
    pub is_donation: bool,

    /// Asking price. Always zero for donations.
    pub price: Money,

    /// When the listing was posted.
    pub posted_at: DateTime<Utc>,
}

/// Data for ListingReserved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingReservedData {
    /// The transaction holding the reservation.
    pub reserved_for: TransactionRef,

    /// When the reservation was taken.
    pub reserved_at: DateTime<Utc>,
}

/// Data for ListingReleased event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingReleasedData {
    /// The transaction whose reservation was released.
    pub released_from: TransactionRef,

    /// When the reservation was released.
    pub released_at: DateTime<Utc>,
}

/// Data for ListingFinalized event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingFinalizedData {
    /// Whether the listing ended SOLD or COMPLETED.
    pub outcome: ListingOutcome,

    /// The transaction that concluded the listing.
    pub finalized_by: TransactionRef,

    /// When the listing was finalized.
    pub finalized_at: DateTime<Utc>,
}

/// Data for ListingRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRemovedData {
    /// The administrator who removed the listing.
    pub removed_by: UserId,

    /// Reason for removal.
    pub reason: String,

    /// When the listing was removed.
    pub removed_at: DateTime<Utc>,
}

// Convenience constructors for events
impl ListingEvent {
    /// Creates a ListingPosted event.
    pub fn listing_posted(
        listing_id: AggregateId,
        owner_id: UserId,
        title: impl Into<String>,
        is_donation: bool,
        price: Money,
    ) -> Self {
        ListingEvent::ListingPosted(ListingPostedData {
            listing_id,
            owner_id,
            title: title.into(),
            is_donation,
            price,
            posted_at: Utc::now(),
        })
    }

    /// Creates a ListingReserved event.
    pub fn listing_reserved(reserved_for: TransactionRef) -> Self {
        ListingEvent::ListingReserved(ListingReservedData {
            reserved_for,
            reserved_at: Utc::now(),
        })
    }

    /// Creates a ListingReleased event.
    pub fn listing_released(released_from: TransactionRef) -> Self {
        ListingEvent::ListingReleased(ListingReleasedData {
            released_from,
            released_at: Utc::now(),
        })
    }

    /// Creates a ListingFinalized event.
    pub fn listing_finalized(outcome: ListingOutcome, finalized_by: TransactionRef) -> Self {
        ListingEvent::ListingFinalized(ListingFinalizedData {
            outcome,
            finalized_by,
            finalized_at: Utc::now(),
        })
    }

    /// Creates a ListingRemoved event.
    pub fn listing_removed(removed_by: UserId, reason: impl Into<String>) -> Self {
        ListingEvent::ListingRemoved(ListingRemovedData {
            removed_by,
            reason: reason.into(),
            removed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let listing_id = AggregateId::new();
        let owner = UserId::new();

        let event =
            ListingEvent::listing_posted(listing_id, owner, "Bread", false, Money::from_cents(500));
        assert_eq!(event.event_type(), "ListingPosted");

        let event = ListingEvent::listing_reserved(TransactionRef::Order(AggregateId::new()));
        assert_eq!(event.event_type(), "ListingReserved");

        let event = ListingEvent::listing_released(TransactionRef::Claim(AggregateId::new()));
        assert_eq!(event.event_type(), "ListingReleased");

        let event = ListingEvent::listing_finalized(
            ListingOutcome::Sold,
            TransactionRef::Order(AggregateId::new()),
        );
        assert_eq!(event.event_type(), "ListingFinalized");

        let event = ListingEvent::listing_removed(owner, "Policy violation");
        assert_eq!(event.event_type(), "ListingRemoved");
    }

    #[test]
    fn test_event_serialization() {
        let listing_id = AggregateId::new();
        let owner = UserId::new();
        let event =
            ListingEvent::listing_posted(listing_id, owner, "Apples", true, Money::zero());

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ListingPosted"));

        let deserialized: ListingEvent = serde_json::from_str(&json).unwrap();
        if let ListingEvent::ListingPosted(data) = deserialized {
            assert_eq!(data.listing_id, listing_id);
            assert_eq!(data.owner_id, owner);
            assert!(data.is_donation);
            assert!(data.price.is_zero());
        } else {
            panic!("Expected ListingPosted event");
        }
    }

    #[test]
    fn test_reserved_serialization_carries_transaction_ref() {
        let order_id = AggregateId::new();
        let event = ListingEvent::listing_reserved(TransactionRef::Order(order_id));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: ListingEvent = serde_json::from_str(&json).unwrap();

        if let ListingEvent::ListingReserved(data) = deserialized {
            assert_eq!(data.reserved_for, TransactionRef::Order(order_id));
        } else {
            panic!("Expected ListingReserved event");
        }
    }
}
