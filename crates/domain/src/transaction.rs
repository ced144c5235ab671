//! Generic fulfillment transaction abstraction.
//!
//! Orders and donation claims share most of their lifecycle: reserve a
//! listing, mint a pickup code, authorize pickup against it, complete or
//! cancel, and settle the listing. This trait captures that shared shape
//! so the coordinator is written once, while the two aggregates keep
//! distinct status enums for exhaustive-match safety.

use common::AggregateId;

use crate::aggregate::Aggregate;
use crate::claim::{ClaimError, ClaimEvent, DonationClaim};
use crate::listing::ListingOutcome;
use crate::order::{Order, OrderError, OrderEvent};
use crate::pickup::PickupCode;
use crate::value_objects::{DeliveryType, TransactionRef, UserId};

/// An order or donation claim, viewed through its shared lifecycle.
pub trait FulfillmentTransaction: Aggregate {
    /// Wire name of the transaction kind.
    const KIND: &'static str;

    /// True when the proprietor must approve the transaction before
    /// pickup can be authorized (claims), false when confirmation is
    /// implicit on the first correct code (orders).
    const REQUIRES_EXPLICIT_APPROVAL: bool;

    /// Returns the reference other aggregates use to point at this
    /// transaction.
    fn transaction_ref(&self) -> Option<TransactionRef>;

    /// Returns the listing the transaction was opened against.
    fn listing_id(&self) -> Option<AggregateId>;

    /// Returns the party giving the item away (seller or donor).
    fn proprietor(&self) -> Option<UserId>;

    /// Returns the party receiving the item (buyer or charity).
    fn counterparty(&self) -> Option<UserId>;

    /// Returns how the item changes hands.
    fn delivery_type(&self) -> Option<DeliveryType>;

    /// Returns the paired delivery record, if one exists.
    fn delivery_id(&self) -> Option<AggregateId>;

    /// Returns the pickup code minted for this transaction.
    fn pickup_code(&self) -> Option<&PickupCode>;

    /// Returns true once the proprietor has verified the pickup code.
    fn pickup_authorized(&self) -> bool;

    /// Returns true if the transaction is in a terminal status.
    fn is_terminal(&self) -> bool;

    /// The listing outcome a completed transaction of this kind maps to.
    fn success_outcome() -> ListingOutcome;

    /// Authorizes pickup after verifying the submitted code.
    fn authorize_pickup(
        &self,
        actor: UserId,
        submitted: &PickupCode,
    ) -> Result<Vec<Self::Event>, Self::Error>;

    /// Completes the transaction after its delivery is marked DELIVERED.
    fn complete(&self) -> Result<Vec<Self::Event>, Self::Error>;

    /// Cancels the transaction. `delivery_failed` unlocks cancellation
    /// after pickup authorization when the paired delivery has failed.
    fn cancel(
        &self,
        actor: UserId,
        reason: String,
        delivery_failed: bool,
    ) -> Result<Vec<Self::Event>, Self::Error>;
}

impl FulfillmentTransaction for Order {
    const KIND: &'static str = "ORDER";
    const REQUIRES_EXPLICIT_APPROVAL: bool = false;

    fn transaction_ref(&self) -> Option<TransactionRef> {
        self.id().map(TransactionRef::Order)
    }

    fn listing_id(&self) -> Option<AggregateId> {
        Order::listing_id(self)
    }

    fn proprietor(&self) -> Option<UserId> {
        self.seller_id()
    }

    fn counterparty(&self) -> Option<UserId> {
        self.buyer_id()
    }

    fn delivery_type(&self) -> Option<DeliveryType> {
        Order::delivery_type(self)
    }

    fn delivery_id(&self) -> Option<AggregateId> {
        Order::delivery_id(self)
    }

    fn pickup_code(&self) -> Option<&PickupCode> {
        Order::pickup_code(self)
    }

    fn pickup_authorized(&self) -> bool {
        Order::pickup_authorized(self)
    }

    fn is_terminal(&self) -> bool {
        Order::is_terminal(self)
    }

    fn success_outcome() -> ListingOutcome {
        ListingOutcome::Sold
    }

    fn authorize_pickup(
        &self,
        actor: UserId,
        submitted: &PickupCode,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        Order::authorize_pickup(self, actor, submitted)
    }

    fn complete(&self) -> Result<Vec<OrderEvent>, OrderError> {
        Order::complete(self)
    }

    fn cancel(
        &self,
        actor: UserId,
        reason: String,
        delivery_failed: bool,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        Order::cancel(self, actor, reason, delivery_failed)
    }
}

impl FulfillmentTransaction for DonationClaim {
    const KIND: &'static str = "CLAIM";
    const REQUIRES_EXPLICIT_APPROVAL: bool = true;

    fn transaction_ref(&self) -> Option<TransactionRef> {
        self.id().map(TransactionRef::Claim)
    }

    fn listing_id(&self) -> Option<AggregateId> {
        DonationClaim::listing_id(self)
    }

    fn proprietor(&self) -> Option<UserId> {
        self.donor_id()
    }

    fn counterparty(&self) -> Option<UserId> {
        self.charity_id()
    }

    fn delivery_type(&self) -> Option<DeliveryType> {
        DonationClaim::delivery_type(self)
    }

    fn delivery_id(&self) -> Option<AggregateId> {
        DonationClaim::delivery_id(self)
    }

    fn pickup_code(&self) -> Option<&PickupCode> {
        DonationClaim::pickup_code(self)
    }

    fn pickup_authorized(&self) -> bool {
        DonationClaim::pickup_authorized(self)
    }

    fn is_terminal(&self) -> bool {
        DonationClaim::is_terminal(self)
    }

    fn success_outcome() -> ListingOutcome {
        ListingOutcome::Completed
    }

    fn authorize_pickup(
        &self,
        actor: UserId,
        submitted: &PickupCode,
    ) -> Result<Vec<ClaimEvent>, ClaimError> {
        DonationClaim::authorize_pickup(self, actor, submitted)
    }

    fn complete(&self) -> Result<Vec<ClaimEvent>, ClaimError> {
        DonationClaim::complete(self)
    }

    fn cancel(
        &self,
        actor: UserId,
        reason: String,
        delivery_failed: bool,
    ) -> Result<Vec<ClaimEvent>, ClaimError> {
        DonationClaim::cancel(self, actor, reason, delivery_failed)
    }
}
