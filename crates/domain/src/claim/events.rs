//! Donation claim domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::pickup::PickupCode;
use crate::value_objects::{DeliveryType, UserId};

/// Events that can occur on a donation claim aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClaimEvent {
    /// Charity filed a claim against a donation listing.
    ClaimFiled(ClaimFiledData),

    /// Donor approved the claim.
    ClaimApproved(ClaimApprovedData),

    /// Donor rejected the claim.
    ClaimRejected(ClaimRejectedData),

    /// A delivery record was paired with the approved claim.
    DeliveryAttached(DeliveryAttachedData),

    /// Donor verified the pickup code and released the item.
    PickupAuthorized(PickupAuthorizedData),

    /// Claim reached its terminal success status.
    ClaimCompleted(ClaimCompletedData),

    /// Claim was cancelled.
    ClaimCancelled(ClaimCancelledData),
}

impl DomainEvent for ClaimEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::ClaimFiled(_) => "ClaimFiled",
            ClaimEvent::ClaimApproved(_) => "ClaimApproved",
            ClaimEvent::ClaimRejected(_) => "ClaimRejected",
            ClaimEvent::DeliveryAttached(_) => "DeliveryAttached",
            ClaimEvent::PickupAuthorized(_) => "PickupAuthorized",
            ClaimEvent::ClaimCompleted(_) => "ClaimCompleted",
            ClaimEvent::ClaimCancelled(_) => "ClaimCancelled",
        }
    }
}

/// Data for ClaimFiled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimFiledData {
    /// The unique claim ID.
    pub claim_id: AggregateId,

    /// The donation listing the claim was filed against.
    pub listing_id: AggregateId,

    /// The charity organization filing the claim.
    pub charity_id: UserId,

    /// The donor who owns the listing.
    pub donor_id: UserId,

    /// How the charity receives the item.
    pub delivery_type: DeliveryType,

    /// Destination address. Required for HOME_DELIVERY.
    pub delivery_address: Option<String>,

    /// The secret pickup code minted for this claim.
    pub pickup_code: PickupCode,

    /// Free-form charity notes.
    pub claim_notes: Option<String>,

    /// When the claim was filed.
    pub filed_at: DateTime<Utc>,
}

/// Data for ClaimApproved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimApprovedData {
    /// The donor who approved.
    pub approved_by: UserId,

    /// When the claim was approved.
    pub approved_at: DateTime<Utc>,
}

/// Data for ClaimRejected event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRejectedData {
    /// The donor who rejected.
    pub rejected_by: UserId,

    /// Reason for rejection.
    pub reason: String,

    /// When the claim was rejected.
    pub rejected_at: DateTime<Utc>,
}

/// Data for DeliveryAttached event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAttachedData {
    /// The paired delivery record.
    pub delivery_id: AggregateId,

    /// When the delivery was attached.
    pub attached_at: DateTime<Utc>,
}

/// Data for PickupAuthorized event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupAuthorizedData {
    /// The donor who verified the code.
    pub authorized_by: UserId,

    /// When pickup was authorized.
    pub authorized_at: DateTime<Utc>,
}

/// Data for ClaimCompleted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimCompletedData {
    /// When the claim was completed.
    pub completed_at: DateTime<Utc>,
}

/// Data for ClaimCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimCancelledData {
    /// Who cancelled the claim.
    pub cancelled_by: UserId,

    /// Reason for cancellation.
    pub reason: String,

    /// When the claim was cancelled.
    pub cancelled_at: DateTime<Utc>,
}

// Convenience constructors for events
impl ClaimEvent {
    /// Creates a ClaimFiled event.
    #[allow(clippy::too_many_arguments)]
    pub fn claim_filed(
        claim_id: AggregateId,
        listing_id: AggregateId,
        charity_id: UserId,
        donor_id: UserId,
        delivery_type: DeliveryType,
        delivery_address: Option<String>,
        pickup_code: PickupCode,
        claim_notes: Option<String>,
    ) -> Self {
        ClaimEvent::ClaimFiled(ClaimFiledData {
            claim_id,
            listing_id,
            charity_id,
            donor_id,
            delivery_type,
            delivery_address,
            pickup_code,
            claim_notes,
            filed_at: Utc::now(),
        })
    }

    /// Creates a ClaimApproved event.
    pub fn claim_approved(approved_by: UserId) -> Self {
        ClaimEvent::ClaimApproved(ClaimApprovedData {
            approved_by,
            approved_at: Utc::now(),
        })
    }

    /// Creates a ClaimRejected event.
    pub fn claim_rejected(rejected_by: UserId, reason: impl Into<String>) -> Self {
        ClaimEvent::ClaimRejected(ClaimRejectedData {
            rejected_by,
            reason: reason.into(),
            rejected_at: Utc::now(),
        })
    }

    /// Creates a DeliveryAttached event.
    pub fn delivery_attached(delivery_id: AggregateId) -> Self {
        ClaimEvent::DeliveryAttached(DeliveryAttachedData {
            delivery_id,
            attached_at: Utc::now(),
        })
    }

    /// Creates a PickupAuthorized event.
    pub fn pickup_authorized(authorized_by: UserId) -> Self {
        ClaimEvent::PickupAuthorized(PickupAuthorizedData {
            authorized_by,
            authorized_at: Utc::now(),
        })
    }

    /// Creates a ClaimCompleted event.
    pub fn claim_completed() -> Self {
        ClaimEvent::ClaimCompleted(ClaimCompletedData {
            completed_at: Utc::now(),
        })
    }

    /// Creates a ClaimCancelled event.
    pub fn claim_cancelled(cancelled_by: UserId, reason: impl Into<String>) -> Self {
        ClaimEvent::ClaimCancelled(ClaimCancelledData {
            cancelled_by,
            reason: reason.into(),
            cancelled_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filed_event() -> ClaimEvent {
        ClaimEvent::claim_filed(
            AggregateId::new(),
            AggregateId::new(),
            UserId::new(),
            UserId::new(),
            DeliveryType::HomeDelivery,
            Some("7 Charity Way".to_string()),
            PickupCode::generate(),
            Some("Refrigerated van available".to_string()),
        )
    }

    #[test]
    fn test_event_type() {
        assert_eq!(filed_event().event_type(), "ClaimFiled");
        assert_eq!(
            ClaimEvent::claim_approved(UserId::new()).event_type(),
            "ClaimApproved"
        );
        assert_eq!(
            ClaimEvent::claim_rejected(UserId::new(), "No capacity").event_type(),
            "ClaimRejected"
        );
        assert_eq!(
            ClaimEvent::delivery_attached(AggregateId::new()).event_type(),
            "DeliveryAttached"
        );
        assert_eq!(
            ClaimEvent::pickup_authorized(UserId::new()).event_type(),
            "PickupAuthorized"
        );
        assert_eq!(ClaimEvent::claim_completed().event_type(), "ClaimCompleted");
        assert_eq!(
            ClaimEvent::claim_cancelled(UserId::new(), "Van broke down").event_type(),
            "ClaimCancelled"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = filed_event();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ClaimFiled"));

        let deserialized: ClaimEvent = serde_json::from_str(&json).unwrap();
        if let (ClaimEvent::ClaimFiled(original), ClaimEvent::ClaimFiled(data)) =
            (event, deserialized)
        {
            assert_eq!(data.claim_id, original.claim_id);
            assert_eq!(data.delivery_type, DeliveryType::HomeDelivery);
            assert!(data.pickup_code.matches(&original.pickup_code));
        } else {
            panic!("Expected ClaimFiled event");
        }
    }

    #[test]
    fn test_rejected_serialization_carries_reason() {
        let donor = UserId::new();
        let event = ClaimEvent::claim_rejected(donor, "Listing withdrawn");

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: ClaimEvent = serde_json::from_str(&json).unwrap();

        if let ClaimEvent::ClaimRejected(data) = deserialized {
            assert_eq!(data.rejected_by, donor);
            assert_eq!(data.reason, "Listing withdrawn");
        } else {
            panic!("Expected ClaimRejected event");
        }
    }
}
