//! Order and payment state machines.

use serde::{Deserialize, Serialize};

/// The status of a paid order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Confirmed ──► Completed
///    │            │
///    └────────────┴──► Cancelled
/// ```
///
/// Confirmation is implicit on the first authorized pickup attempt:
/// sellers have no separate confirm step in the external API, so a
/// correct pickup code on a Pending order confirms it transparently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order created, awaiting seller confirmation or pickup.
    #[default]
    Pending,

    /// Seller has confirmed; item is being handed off.
    Confirmed,

    /// Order was cancelled before completion (terminal).
    Cancelled,

    /// Item reached the buyer (terminal).
    Completed,
}

impl OrderStatus {
    /// Returns true if the seller can authorize pickup in this status.
    pub fn can_authorize_pickup(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Returns true if the order can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns true if the order can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Completed)
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status tracked alongside the order.
///
/// No gateway integration; transitions are recorded from external payment
/// outcomes. Legal transitions: Pending to Paid or Failed, Paid to
/// Refunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment not yet settled.
    #[default]
    Pending,

    /// Payment settled successfully.
    Paid,

    /// Payment attempt failed.
    Failed,

    /// A settled payment was refunded.
    Refunded,
}

impl PaymentStatus {
    /// Returns true if payment can move from this status to `next`.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_pickup_authorization_statuses() {
        assert!(OrderStatus::Pending.can_authorize_pickup());
        assert!(OrderStatus::Confirmed.can_authorize_pickup());
        assert!(!OrderStatus::Cancelled.can_authorize_pickup());
        assert!(!OrderStatus::Completed.can_authorize_pickup());
    }

    #[test]
    fn test_only_confirmed_can_complete() {
        assert!(!OrderStatus::Pending.can_complete());
        assert!(OrderStatus::Confirmed.can_complete());
        assert!(!OrderStatus::Cancelled.can_complete());
        assert!(!OrderStatus::Completed.can_complete());
    }

    #[test]
    fn test_can_cancel_from_non_terminal_statuses() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Confirmed.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
        assert!(!OrderStatus::Completed.can_cancel());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
    }

    #[test]
    fn test_payment_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Refunded));

        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Paid));
        assert!(!PaymentStatus::Refunded.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn test_wire_serialization() {
        let json = serde_json::to_string(&OrderStatus::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");

        let json = serde_json::to_string(&PaymentStatus::Refunded).unwrap();
        assert_eq!(json, "\"REFUNDED\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderStatus::Pending.to_string(), "PENDING");
        assert_eq!(PaymentStatus::Paid.to_string(), "PAID");
    }
}
