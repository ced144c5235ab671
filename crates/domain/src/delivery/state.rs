//! Delivery state machine.

use serde::{Deserialize, Serialize};

/// The status of a delivery record.
///
/// Status transitions:
/// ```text
/// Scheduled ──► InTransit ──► Delivered
///     │             │
///     └─────────────┴──► Failed
/// ```
///
/// A delivery leaves Scheduled when the seller/donor authorizes pickup;
/// the assigned personnel then marks it Delivered or Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Delivery created, item not yet picked up.
    #[default]
    Scheduled,

    /// Item picked up, en route to the recipient.
    InTransit,

    /// Item handed to the recipient (terminal).
    Delivered,

    /// Delivery could not be completed (terminal).
    Failed,
}

impl DeliveryStatus {
    /// Returns true if the delivery can depart from this status.
    pub fn can_depart(&self) -> bool {
        matches!(self, DeliveryStatus::Scheduled)
    }

    /// Returns true if the delivery can be marked delivered.
    pub fn can_deliver(&self) -> bool {
        matches!(self, DeliveryStatus::InTransit)
    }

    /// Returns true if the delivery can be marked failed.
    pub fn can_fail(&self) -> bool {
        matches!(self, DeliveryStatus::Scheduled | DeliveryStatus::InTransit)
    }

    /// Returns true if personnel can be (re)assigned in this status.
    pub fn can_assign(&self) -> bool {
        matches!(self, DeliveryStatus::Scheduled)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered | DeliveryStatus::Failed)
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Scheduled => "SCHEDULED",
            DeliveryStatus::InTransit => "IN_TRANSIT",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of personnel carries out a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonnelType {
    /// Independent delivery personnel handling orders.
    Independent,

    /// Volunteer from the receiving charity organization.
    OrgVolunteer,
}

impl PersonnelType {
    /// Returns the wire name of the personnel type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonnelType::Independent => "INDEPENDENT",
            PersonnelType::OrgVolunteer => "ORG_VOLUNTEER",
        }
    }
}

impl std::fmt::Display for PersonnelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
