//! Delivery domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{TransactionRef, UserId};

use super::{DeliveryStatus, PersonnelType};

/// Events that can occur on a delivery aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DeliveryEvent {
    /// Delivery record was created for a HOME_DELIVERY transaction.
    DeliveryScheduled(DeliveryScheduledData),

    /// Delivery personnel was assigned.
    PersonnelAssigned(PersonnelAssignedData),

    /// Delivery moved forward in its lifecycle.
    DeliveryAdvanced(DeliveryAdvancedData),

    /// Delivery could not be completed.
    DeliveryFailed(DeliveryFailedData),
}

impl DomainEvent for DeliveryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DeliveryEvent::DeliveryScheduled(_) => "DeliveryScheduled",
            DeliveryEvent::PersonnelAssigned(_) => "PersonnelAssigned",
            DeliveryEvent::DeliveryAdvanced(_) => "DeliveryAdvanced",
            DeliveryEvent::DeliveryFailed(_) => "DeliveryFailed",
        }
    }
}

/// Data for DeliveryScheduled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryScheduledData {
    /// The unique delivery ID.
    pub delivery_id: AggregateId,

    /// The order or claim this delivery belongs to.
    pub transaction: TransactionRef,

    /// Destination address.
    pub delivery_address: String,

    /// When the delivery was scheduled.
    pub scheduled_at: DateTime<Utc>,
}

/// Data for PersonnelAssigned event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonnelAssignedData {
    /// The assigned personnel's user ID.
    pub personnel_id: UserId,

    /// Whether the personnel is independent or an org volunteer.
    pub personnel_type: PersonnelType,

    /// When the assignment was made.
    pub assigned_at: DateTime<Utc>,
}

/// Data for DeliveryAdvanced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAdvancedData {
    /// Status before the transition.
    pub from: DeliveryStatus,

    /// Status after the transition.
    pub to: DeliveryStatus,

    /// When the transition happened.
    pub advanced_at: DateTime<Utc>,
}

/// Data for DeliveryFailed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryFailedData {
    /// Who reported the failure.
    pub reported_by: UserId,

    /// Reason for failure.
    pub reason: String,

    /// When the failure was recorded.
    pub failed_at: DateTime<Utc>,
}

// Convenience constructors for events
impl DeliveryEvent {
    /// Creates a DeliveryScheduled event.
    pub fn delivery_scheduled(
        delivery_id: AggregateId,
        transaction: TransactionRef,
        delivery_address: impl Into<String>,
    ) -> Self {
        DeliveryEvent::DeliveryScheduled(DeliveryScheduledData {
            delivery_id,
            transaction,
            delivery_address: delivery_address.into(),
            scheduled_at: Utc::now(),
        })
    }

    /// Creates a PersonnelAssigned event.
    pub fn personnel_assigned(personnel_id: UserId, personnel_type: PersonnelType) -> Self {
        DeliveryEvent::PersonnelAssigned(PersonnelAssignedData {
            personnel_id,
            personnel_type,
            assigned_at: Utc::now(),
        })
    }

    /// Creates a DeliveryAdvanced event.
    pub fn delivery_advanced(from: DeliveryStatus, to: DeliveryStatus) -> Self {
        DeliveryEvent::DeliveryAdvanced(DeliveryAdvancedData {
            from,
            to,
            advanced_at: Utc::now(),
        })
    }

    /// Creates a DeliveryFailed event.
    pub fn delivery_failed(reported_by: UserId, reason: impl Into<String>) -> Self {
        DeliveryEvent::DeliveryFailed(DeliveryFailedData {
            reported_by,
            reason: reason.into(),
            failed_at: Utc::now(),
        })
    }
}
