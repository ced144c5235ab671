//! Order domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::pickup::PickupCode;
use crate::value_objects::{DeliveryType, Money, UserId};

use super::PaymentStatus;

/// Events that can occur on an order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was placed against an active listing.
    OrderPlaced(OrderPlacedData),

    /// Seller confirmed the order.
    OrderConfirmed(OrderConfirmedData),

    /// Seller verified the pickup code and released the item.
    PickupAuthorized(PickupAuthorizedData),

    /// Payment status changed.
    PaymentRecorded(PaymentRecordedData),

    /// Order reached its terminal success status.
    OrderCompleted(OrderCompletedData),

    /// Order was cancelled.
    OrderCancelled(OrderCancelledData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
            OrderEvent::OrderConfirmed(_) => "OrderConfirmed",
            OrderEvent::PickupAuthorized(_) => "PickupAuthorized",
            OrderEvent::PaymentRecorded(_) => "PaymentRecorded",
            OrderEvent::OrderCompleted(_) => "OrderCompleted",
            OrderEvent::OrderCancelled(_) => "OrderCancelled",
        }
    }
}

/// Data for OrderPlaced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    /// The unique order ID.
    pub order_id: AggregateId,

    /// The listing the order was placed against.
    pub listing_id: AggregateId,

    /// The buyer who placed the order.
    pub buyer_id: UserId,

    /// The seller who owns the listing.
    pub seller_id: UserId,

    /// How the buyer receives the item.
    pub delivery_type: DeliveryType,

    /// Destination address. Required for HOME_DELIVERY.
    pub delivery_address: Option<String>,

    /// Agreed price, fixed at placement.
    pub final_price: Money,

    /// The secret pickup code minted for this order.
    pub pickup_code: PickupCode,

    /// Free-form buyer notes.
    pub order_notes: Option<String>,

    /// The paired delivery record for HOME_DELIVERY orders.
    pub delivery_id: Option<AggregateId>,

    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// Data for OrderConfirmed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmedData {
    /// True when the confirmation rode along with a pickup authorization
    /// rather than an explicit seller action.
    pub implicit: bool,

    /// When the order was confirmed.
    pub confirmed_at: DateTime<Utc>,
}

/// Data for PickupAuthorized event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupAuthorizedData {
    /// The seller who verified the code.
    pub authorized_by: UserId,

    /// When pickup was authorized.
    pub authorized_at: DateTime<Utc>,
}

/// Data for PaymentRecorded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecordedData {
    /// The new payment status.
    pub new_status: PaymentStatus,

    /// External payment reference, if one exists.
    pub payment_ref: Option<String>,

    /// When the payment outcome was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Data for OrderCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCompletedData {
    /// When the order was completed.
    pub completed_at: DateTime<Utc>,
}

/// Data for OrderCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    /// Who cancelled the order.
    pub cancelled_by: UserId,

    /// Reason for cancellation.
    pub reason: String,

    /// When the order was cancelled.
    pub cancelled_at: DateTime<Utc>,
}

// Convenience constructors for events
impl OrderEvent {
    /// Creates an OrderPlaced event.
    #[allow(clippy::too_many_arguments)]
    pub fn order_placed(
        order_id: AggregateId,
        listing_id: AggregateId,
        buyer_id: UserId,
        seller_id: UserId,
        delivery_type: DeliveryType,
        delivery_address: Option<String>,
        final_price: Money,
        pickup_code: PickupCode,
        order_notes: Option<String>,
        delivery_id: Option<AggregateId>,
    ) -> Self {
        OrderEvent::OrderPlaced(OrderPlacedData {
            order_id,
            listing_id,
            buyer_id,
            seller_id,
            delivery_type,
            delivery_address,
            final_price,
            pickup_code,
            order_notes,
            delivery_id,
            placed_at: Utc::now(),
        })
    }

    /// Creates an OrderConfirmed event.
    pub fn order_confirmed(implicit: bool) -> Self {
        OrderEvent::OrderConfirmed(OrderConfirmedData {
            implicit,
            confirmed_at: Utc::now(),
        })
    }

    /// Creates a PickupAuthorized event.
    pub fn pickup_authorized(authorized_by: UserId) -> Self {
        OrderEvent::PickupAuthorized(PickupAuthorizedData {
            authorized_by,
            authorized_at: Utc::now(),
        })
    }

    /// Creates a PaymentRecorded event.
    pub fn payment_recorded(new_status: PaymentStatus, payment_ref: Option<String>) -> Self {
        OrderEvent::PaymentRecorded(PaymentRecordedData {
            new_status,
            payment_ref,
            recorded_at: Utc::now(),
        })
    }

    /// Creates an OrderCompleted event.
    pub fn order_completed() -> Self {
        OrderEvent::OrderCompleted(OrderCompletedData {
            completed_at: Utc::now(),
        })
    }

    /// Creates an OrderCancelled event.
    pub fn order_cancelled(cancelled_by: UserId, reason: impl Into<String>) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            cancelled_by,
            reason: reason.into(),
            cancelled_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed_event() -> OrderEvent {
        OrderEvent::order_placed(
            AggregateId::new(),
            AggregateId::new(),
            UserId::new(),
            UserId::new(),
            DeliveryType::SelfPickup,
            None,
            Money::from_cents(500),
            PickupCode::generate(),
            None,
            None,
        )
    }

    #[test]
    fn test_event_type() {
        assert_eq!(placed_event().event_type(), "OrderPlaced");
        assert_eq!(
            OrderEvent::order_confirmed(false).event_type(),
            "OrderConfirmed"
        );
        assert_eq!(
            OrderEvent::pickup_authorized(UserId::new()).event_type(),
            "PickupAuthorized"
        );
        assert_eq!(
            OrderEvent::payment_recorded(PaymentStatus::Paid, None).event_type(),
            "PaymentRecorded"
        );
        assert_eq!(OrderEvent::order_completed().event_type(), "OrderCompleted");
        assert_eq!(
            OrderEvent::order_cancelled(UserId::new(), "Changed my mind").event_type(),
            "OrderCancelled"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = placed_event();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("OrderPlaced"));

        let deserialized: OrderEvent = serde_json::from_str(&json).unwrap();
        if let (OrderEvent::OrderPlaced(original), OrderEvent::OrderPlaced(data)) =
            (event, deserialized)
        {
            assert_eq!(data.order_id, original.order_id);
            assert_eq!(data.delivery_type, DeliveryType::SelfPickup);
            assert!(data.pickup_code.matches(&original.pickup_code));
        } else {
            panic!("Expected OrderPlaced event");
        }
    }

    #[test]
    fn test_payment_recorded_serialization() {
        let event = OrderEvent::payment_recorded(PaymentStatus::Paid, Some("PAY-42".to_string()));

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: OrderEvent = serde_json::from_str(&json).unwrap();

        if let OrderEvent::PaymentRecorded(data) = deserialized {
            assert_eq!(data.new_status, PaymentStatus::Paid);
            assert_eq!(data.payment_ref, Some("PAY-42".to_string()));
        } else {
            panic!("Expected PaymentRecorded event");
        }
    }
}
