//! Order aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::Order;
pub use events::{
    OrderCancelledData, OrderCompletedData, OrderConfirmedData, OrderEvent, OrderPlacedData,
    PaymentRecordedData, PickupAuthorizedData,
};
pub use state::{OrderStatus, PaymentStatus};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order is already placed.
    #[error("Order already placed")]
    AlreadyPlaced,

    /// Order does not exist yet.
    #[error("Order has not been placed")]
    NotPlaced,

    /// A user cannot buy their own listing.
    #[error("Buyer and seller cannot be the same user")]
    BuyerIsSeller,

    /// Order price must be positive.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// HOME_DELIVERY orders require a destination address.
    #[error("Delivery address is required for HOME_DELIVERY")]
    AddressRequired,

    /// HOME_DELIVERY orders require a paired delivery record.
    #[error("HOME_DELIVERY orders require a paired delivery")]
    DeliveryRequired,

    /// SELF_PICKUP orders cannot carry a delivery record.
    #[error("SELF_PICKUP orders cannot have a paired delivery")]
    UnexpectedDelivery,

    /// Order is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: OrderStatus,
        action: &'static str,
    },

    /// Order already reached COMPLETED.
    #[error("Order is already completed")]
    AlreadyCompleted,

    /// Only the listing's seller may perform this action.
    #[error("Actor is not the seller of this order's listing")]
    NotSeller,

    /// Only the buyer or seller may perform this action.
    #[error("Actor is not a participant in this order")]
    NotParticipant,

    /// The submitted pickup code does not match.
    #[error("Pickup code does not match")]
    CodeMismatch,

    /// Pickup was already authorized.
    #[error("Pickup has already been authorized")]
    PickupAlreadyAuthorized,

    /// Completion requires a prior pickup authorization.
    #[error("Pickup has not been authorized")]
    PickupNotAuthorized,

    /// Payment status transition is not legal.
    #[error("Invalid payment transition: {from} -> {to}")]
    InvalidPaymentTransition { from: PaymentStatus, to: PaymentStatus },
}
