//! Delivery aggregate implementation.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::value_objects::{TransactionRef, UserId};

use super::{
    DeliveryError, DeliveryEvent, DeliveryStatus, PersonnelType,
    events::{DeliveryScheduledData, PersonnelAssignedData},
};

/// Delivery aggregate root.
///
/// Tracks the physical handoff of a HOME_DELIVERY transaction. Belongs
/// to exactly one order or claim; advanced only by the coordinator
/// (departure, on pickup authorization) and the assigned personnel
/// (delivered/failed).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delivery {
    /// Unique delivery identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// The order or claim this delivery belongs to.
    transaction: Option<TransactionRef>,

    /// Destination address.
    delivery_address: String,

    /// The assigned personnel, if any.
    personnel_id: Option<UserId>,

    /// Whether the personnel is independent or an org volunteer.
    personnel_type: Option<PersonnelType>,

    /// Current delivery status.
    status: DeliveryStatus,

    /// Failure reason, set when the delivery fails.
    failure_reason: Option<String>,
}

impl Aggregate for Delivery {
    type Event = DeliveryEvent;
    type Error = DeliveryError;

    fn aggregate_type() -> &'static str {
        "Delivery"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            DeliveryEvent::DeliveryScheduled(data) => self.apply_scheduled(data),
            DeliveryEvent::PersonnelAssigned(data) => self.apply_assigned(data),
            DeliveryEvent::DeliveryAdvanced(data) => {
                self.status = data.to;
            }
            DeliveryEvent::DeliveryFailed(data) => {
                self.status = DeliveryStatus::Failed;
                self.failure_reason = Some(data.reason);
            }
        }
    }
}

// Query methods
impl Delivery {
    /// Returns the owning transaction reference.
    pub fn transaction(&self) -> Option<TransactionRef> {
        self.transaction
    }

    /// Returns the destination address.
    pub fn delivery_address(&self) -> &str {
        &self.delivery_address
    }

    /// Returns the assigned personnel's user ID, if any.
    pub fn personnel_id(&self) -> Option<UserId> {
        self.personnel_id
    }

    /// Returns the assigned personnel's type, if any.
    pub fn personnel_type(&self) -> Option<PersonnelType> {
        self.personnel_type
    }

    /// Returns the current delivery status.
    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    /// Returns the failure reason, if the delivery failed.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns true if the delivery is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return events)
impl Delivery {
    /// Schedules a new delivery for a HOME_DELIVERY transaction.
    pub fn schedule(
        &self,
        delivery_id: AggregateId,
        transaction: TransactionRef,
        delivery_address: impl Into<String>,
    ) -> Result<Vec<DeliveryEvent>, DeliveryError> {
        if self.id.is_some() {
            return Err(DeliveryError::AlreadyScheduled);
        }

        let delivery_address = delivery_address.into();
        if delivery_address.trim().is_empty() {
            return Err(DeliveryError::AddressRequired);
        }

        Ok(vec![DeliveryEvent::delivery_scheduled(
            delivery_id,
            transaction,
            delivery_address,
        )])
    }

    /// Assigns delivery personnel.
    ///
    /// Allowed only while the delivery is Scheduled; reassignment before
    /// departure replaces the previous candidate.
    pub fn assign_personnel(
        &self,
        personnel_id: UserId,
        personnel_type: PersonnelType,
    ) -> Result<Vec<DeliveryEvent>, DeliveryError> {
        if self.id.is_none() {
            return Err(DeliveryError::NotScheduled);
        }

        if !self.status.can_assign() {
            return Err(DeliveryError::InvalidStateTransition {
                current_status: self.status,
                action: "assign personnel",
            });
        }

        Ok(vec![DeliveryEvent::personnel_assigned(
            personnel_id,
            personnel_type,
        )])
    }

    /// Moves the delivery from Scheduled to InTransit.
    ///
    /// Triggered by the coordinator when the seller/donor authorizes
    /// pickup, not by the personnel.
    pub fn depart(&self) -> Result<Vec<DeliveryEvent>, DeliveryError> {
        if self.id.is_none() {
            return Err(DeliveryError::NotScheduled);
        }

        if !self.status.can_depart() {
            return Err(DeliveryError::InvalidStateTransition {
                current_status: self.status,
                action: "depart",
            });
        }

        Ok(vec![DeliveryEvent::delivery_advanced(
            DeliveryStatus::Scheduled,
            DeliveryStatus::InTransit,
        )])
    }

    /// Marks the delivery as Delivered.
    ///
    /// Only the assigned personnel may call, and only while InTransit.
    pub fn mark_delivered(&self, actor: UserId) -> Result<Vec<DeliveryEvent>, DeliveryError> {
        self.require_assigned(actor)?;

        if !self.status.can_deliver() {
            return Err(DeliveryError::InvalidStateTransition {
                current_status: self.status,
                action: "mark delivered",
            });
        }

        Ok(vec![DeliveryEvent::delivery_advanced(
            DeliveryStatus::InTransit,
            DeliveryStatus::Delivered,
        )])
    }

    /// Marks the delivery as Failed.
    pub fn mark_failed(
        &self,
        actor: UserId,
        reason: impl Into<String>,
    ) -> Result<Vec<DeliveryEvent>, DeliveryError> {
        self.require_assigned(actor)?;

        if !self.status.can_fail() {
            return Err(DeliveryError::InvalidStateTransition {
                current_status: self.status,
                action: "mark failed",
            });
        }

        Ok(vec![DeliveryEvent::delivery_failed(actor, reason)])
    }

    fn require_assigned(&self, actor: UserId) -> Result<(), DeliveryError> {
        if self.id.is_none() {
            return Err(DeliveryError::NotScheduled);
        }
        if self.personnel_id != Some(actor) {
            return Err(DeliveryError::NotAssignedPersonnel);
        }
        Ok(())
    }
}

// Apply event helpers
impl Delivery {
    fn apply_scheduled(&mut self, data: DeliveryScheduledData) {
        self.id = Some(data.delivery_id);
        self.transaction = Some(data.transaction);
        self.delivery_address = data.delivery_address;
        self.status = DeliveryStatus::Scheduled;
    }

    fn apply_assigned(&mut self, data: PersonnelAssignedData) {
        self.personnel_id = Some(data.personnel_id);
        self.personnel_type = Some(data.personnel_type);
    }
}
