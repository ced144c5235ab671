//! Donation claim aggregate implementation.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::pickup::PickupCode;
use crate::value_objects::{DeliveryType, UserId};

use super::{
    ClaimError, ClaimEvent, ClaimStatus,
    events::{ClaimFiledData, DeliveryAttachedData},
};

/// Donation claim aggregate root.
///
/// A no-payment transaction against a donation listing. Structurally
/// parallel to an order, with an explicit donor approval step in place
/// of payment: the paired delivery is created at approval, not filing,
/// so a rejected claim never produces a delivery record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DonationClaim {
    /// Unique claim identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// The donation listing the claim was filed against.
    listing_id: Option<AggregateId>,

    /// The charity organization filing the claim.
    charity_id: Option<UserId>,

    /// The donor who owns the listing.
    donor_id: Option<UserId>,

    /// How the charity receives the item.
    delivery_type: Option<DeliveryType>,

    /// Destination address for HOME_DELIVERY.
    delivery_address: Option<String>,

    /// The secret pickup code minted at filing.
    pickup_code: Option<PickupCode>,

    /// Free-form charity notes.
    claim_notes: Option<String>,

    /// The paired delivery record, attached at approval.
    delivery_id: Option<AggregateId>,

    /// Current claim status.
    status: ClaimStatus,

    /// True once the donor has verified the pickup code.
    pickup_authorized: bool,
}

impl Aggregate for DonationClaim {
    type Event = ClaimEvent;
    type Error = ClaimError;

    fn aggregate_type() -> &'static str {
        "DonationClaim"
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
            ClaimEvent::ClaimFiled(data) => self.apply_filed(data),
            ClaimEvent::ClaimApproved(_) => {
                self.status = ClaimStatus::Approved;
            }
            ClaimEvent::ClaimRejected(_) => {
                self.status = ClaimStatus::Rejected;
            }
            ClaimEvent::DeliveryAttached(data) => self.apply_delivery_attached(data),
            ClaimEvent::PickupAuthorized(_) => {
                self.pickup_authorized = true;
            }
            ClaimEvent::ClaimCompleted(_) => {
                self.status = ClaimStatus::Completed;
            }
            ClaimEvent::ClaimCancelled(_) => {
                self.status = ClaimStatus::Cancelled;
            }
        }
    }
}

// Query methods
impl DonationClaim {
    /// Returns the listing ID.
    pub fn listing_id(&self) -> Option<AggregateId> {
        self.listing_id
    }

    /// Returns the charity's user ID.
    pub fn charity_id(&self) -> Option<UserId> {
        self.charity_id
    }

    /// Returns the donor's user ID.
    pub fn donor_id(&self) -> Option<UserId> {
        self.donor_id
    }

    /// Returns the delivery type.
    pub fn delivery_type(&self) -> Option<DeliveryType> {
        self.delivery_type
    }

    /// Returns the delivery address, if one was supplied.
    pub fn delivery_address(&self) -> Option<&str> {
        self.delivery_address.as_deref()
    }

    /// Returns the pickup code minted for this claim.
    pub fn pickup_code(&self) -> Option<&PickupCode> {
        self.pickup_code.as_ref()
    }

    /// Returns the charity's notes, if any.
    pub fn claim_notes(&self) -> Option<&str> {
        self.claim_notes.as_deref()
    }

    /// Returns the paired delivery ID, attached at approval.
    pub fn delivery_id(&self) -> Option<AggregateId> {
        self.delivery_id
    }

    /// Returns the current claim status.
    pub fn status(&self) -> ClaimStatus {
        self.status
    }

    /// Returns true once the donor has verified the pickup code.
    pub fn pickup_authorized(&self) -> bool {
        self.pickup_authorized
    }

    /// Returns true if the claim is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return events)
impl DonationClaim {
    /// Files a new claim against a donation listing.
    #[allow(clippy::too_many_arguments)]
    pub fn file(
        &self,
        claim_id: AggregateId,
        listing_id: AggregateId,
        charity_id: UserId,
        donor_id: UserId,
        delivery_type: DeliveryType,
        delivery_address: Option<String>,
        pickup_code: PickupCode,
        claim_notes: Option<String>,
    ) -> Result<Vec<ClaimEvent>, ClaimError> {
        if self.id.is_some() {
            return Err(ClaimError::AlreadyFiled);
        }

        if charity_id == donor_id {
            return Err(ClaimError::CharityIsDonor);
        }

        if delivery_type.needs_delivery()
            && delivery_address.as_deref().is_none_or(|a| a.trim().is_empty())
        {
            return Err(ClaimError::AddressRequired);
        }

        Ok(vec![ClaimEvent::claim_filed(
            claim_id,
            listing_id,
            charity_id,
            donor_id,
            delivery_type,
            delivery_address,
            pickup_code,
            claim_notes,
        )])
    }

    /// Approves the claim.
    ///
    /// Only the donor may call, and only while the claim is Pending. A
    /// HOME_DELIVERY claim gets its delivery record attached here.
    pub fn approve(
        &self,
        actor: UserId,
        delivery_id: Option<AggregateId>,
    ) -> Result<Vec<ClaimEvent>, ClaimError> {
        self.require_donor(actor)?;

        if !self.status.can_decide() {
            return Err(self.transition_error("approve"));
        }

        let needs_delivery = self
            .delivery_type
            .is_some_and(|delivery_type| delivery_type.needs_delivery());
        if needs_delivery && delivery_id.is_none() {
            return Err(ClaimError::DeliveryRequired);
        }
        if !needs_delivery && delivery_id.is_some() {
            return Err(ClaimError::UnexpectedDelivery);
        }

        let mut events = vec![ClaimEvent::claim_approved(actor)];
        if let Some(delivery_id) = delivery_id {
            events.push(ClaimEvent::delivery_attached(delivery_id));
        }

        Ok(events)
    }

    /// Rejects the claim, terminalizing it.
    pub fn reject(
        &self,
        actor: UserId,
        reason: impl Into<String>,
    ) -> Result<Vec<ClaimEvent>, ClaimError> {
        self.require_donor(actor)?;

        if !self.status.can_decide() {
            return Err(self.transition_error("reject"));
        }

        Ok(vec![ClaimEvent::claim_rejected(actor, reason)])
    }

    /// Authorizes pickup after verifying the submitted code.
    ///
    /// Requires an Approved claim; a Pending claim must be approved first.
    /// A wrong code fails with CodeMismatch and leaves the claim
    /// unchanged.
    pub fn authorize_pickup(
        &self,
        actor: UserId,
        submitted: &PickupCode,
    ) -> Result<Vec<ClaimEvent>, ClaimError> {
        self.require_donor(actor)?;

        if !self.status.can_authorize_pickup() {
            return Err(self.transition_error("authorize pickup"));
        }

        if self.pickup_authorized {
            return Err(ClaimError::PickupAlreadyAuthorized);
        }

        let code = self.pickup_code.as_ref().ok_or(ClaimError::NotFiled)?;
        if !code.matches(submitted) {
            return Err(ClaimError::CodeMismatch);
        }

        let mut events = vec![ClaimEvent::pickup_authorized(actor)];
        if self.delivery_type == Some(DeliveryType::SelfPickup) {
            events.push(ClaimEvent::claim_completed());
        }

        Ok(events)
    }

    /// Completes the claim after its delivery is marked DELIVERED.
    pub fn complete(&self) -> Result<Vec<ClaimEvent>, ClaimError> {
        if !self.status.can_complete() {
            return Err(self.transition_error("complete"));
        }

        if !self.pickup_authorized {
            return Err(ClaimError::PickupNotAuthorized);
        }

        Ok(vec![ClaimEvent::claim_completed()])
    }

    /// Cancels the claim.
    ///
    /// Permitted to the charity or donor while the claim is Pending or
    /// Approved. Once pickup is authorized the item has left the donor's
    /// hands and cancellation is blocked, unless the paired delivery has
    /// since failed and the claim can go nowhere.
    pub fn cancel(
        &self,
        cancelled_by: UserId,
        reason: impl Into<String>,
        delivery_failed: bool,
    ) -> Result<Vec<ClaimEvent>, ClaimError> {
        if self.charity_id != Some(cancelled_by) && self.donor_id != Some(cancelled_by) {
            return Err(ClaimError::NotParticipant);
        }

        if !self.status.can_cancel() {
            return Err(self.transition_error("cancel"));
        }

        if self.pickup_authorized && !delivery_failed {
            return Err(ClaimError::PickupAlreadyAuthorized);
        }

        Ok(vec![ClaimEvent::claim_cancelled(cancelled_by, reason)])
    }

    fn require_donor(&self, actor: UserId) -> Result<(), ClaimError> {
        if self.id.is_none() {
            return Err(ClaimError::NotFiled);
        }
        if self.donor_id != Some(actor) {
            return Err(ClaimError::NotDonor);
        }
        Ok(())
    }

    fn transition_error(&self, action: &'static str) -> ClaimError {
        if self.status == ClaimStatus::Completed {
            ClaimError::AlreadyCompleted
        } else {
            ClaimError::InvalidStateTransition {
                current_status: self.status,
                action,
            }
        }
    }
}

// Apply event helpers
impl DonationClaim {
    fn apply_filed(&mut self, data: ClaimFiledData) {
        self.id = Some(data.claim_id);
        self.listing_id = Some(data.listing_id);
        self.charity_id = Some(data.charity_id);
        self.donor_id = Some(data.donor_id);
        self.delivery_type = Some(data.delivery_type);
        self.delivery_address = data.delivery_address;
        self.pickup_code = Some(data.pickup_code);
        self.claim_notes = data.claim_notes;
        self.status = ClaimStatus::Pending;
    }

    fn apply_delivery_attached(&mut self, data: DeliveryAttachedData) {
        self.delivery_id = Some(data.delivery_id);
    }
}
