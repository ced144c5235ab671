//! Value objects shared across the fulfillment aggregates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a platform user (seller, buyer, donor, charity
/// organization, or delivery personnel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// How the buyer or charity receives the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryType {
    /// The receiving party picks the item up themselves.
    SelfPickup,

    /// Delivery personnel bring the item to the receiving party.
    HomeDelivery,
}

impl DeliveryType {
    /// Returns true if this transaction needs a paired delivery record.
    pub fn needs_delivery(&self) -> bool {
        matches!(self, DeliveryType::HomeDelivery)
    }

    /// Returns the wire name of the delivery type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::SelfPickup => "SELF_PICKUP",
            DeliveryType::HomeDelivery => "HOME_DELIVERY",
        }
    }
}

impl std::fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to the transaction owning a reservation or delivery.
///
/// Exactly one of the two variants applies; a delivery or listing
/// reservation is never shared between an order and a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionRef {
    /// A paid order.
    Order(common::AggregateId),

    /// A donation claim.
    Claim(common::AggregateId),
}

impl TransactionRef {
    /// Returns the referenced transaction's aggregate id.
    pub fn id(&self) -> common::AggregateId {
        match self {
            TransactionRef::Order(id) | TransactionRef::Claim(id) => *id,
        }
    }

    /// Returns the wire name of the transaction kind.
    pub fn kind(&self) -> &'static str {
        match self {
            TransactionRef::Order(_) => "ORDER",
            TransactionRef::Claim(_) => "CLAIM",
        }
    }
}

impl std::fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money. Donation listings always carry this price.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", (self.cents / 100).abs(), self.cents.abs() % 100)
        } else {
            write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
        }
    }
}
