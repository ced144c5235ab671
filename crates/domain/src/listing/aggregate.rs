//! Listing aggregate implementation.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::value_objects::{Money, TransactionRef, UserId};

use super::{
    ListingError, ListingEvent, ListingOutcome, ListingStatus,
    events::{ListingFinalizedData, ListingPostedData, ListingReservedData},
};

/// Listing aggregate root.
///
/// Owns the availability status of one food listing. Every order or claim
/// must reserve the listing before it exists, and exactly one non-terminal
/// transaction may hold the reservation at a time; the reservation
/// check-and-set is made atomic by the event store's version check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Unique listing identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// The seller or donor who owns the listing.
    owner_id: Option<UserId>,

    /// Short description of the food item.
    title: String,

    /// Whether the item is offered for free.
    is_donation: bool,

    /// Asking price. Always zero for donations.
    price: Money,

    /// Current availability status.
    status: ListingStatus,

    /// The transaction currently holding the reservation, if any.
    reserved_for: Option<TransactionRef>,
}

impl Aggregate for Listing {
    type Event = ListingEvent;
    type Error = ListingError;

    fn aggregate_type() -> &'static str {
        "Listing"
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
            ListingEvent::ListingPosted(data) => self.apply_posted(data),
            ListingEvent::ListingReserved(data) => self.apply_reserved(data),
            ListingEvent::ListingReleased(_) => {
                self.status = ListingStatus::Active;
                self.reserved_for = None;
            }
            ListingEvent::ListingFinalized(data) => self.apply_finalized(data),
            ListingEvent::ListingRemoved(_) => {
                self.status = ListingStatus::Removed;
                self.reserved_for = None;
            }
        }
    }
}

// Query methods
impl Listing {
    /// Returns the owner's user ID.
    pub fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }

    /// Returns the listing title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns true if the item is offered for free.
    pub fn is_donation(&self) -> bool {
        self.is_donation
    }

    /// Returns the asking price.
    pub fn price(&self) -> Money {
        self.price
    }

    /// Returns the current availability status.
    pub fn status(&self) -> ListingStatus {
        self.status
    }

    /// Returns the transaction holding the reservation, if any.
    pub fn reserved_for(&self) -> Option<TransactionRef> {
        self.reserved_for
    }

    /// Returns true if the listing is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return events)
impl Listing {
    /// Posts a new listing.
    ///
    /// Donation listings must carry a zero price; sale listings a positive
    /// one.
    pub fn post(
        &self,
        listing_id: AggregateId,
        owner_id: UserId,
        title: impl Into<String>,
        is_donation: bool,
        price: Money,
    ) -> Result<Vec<ListingEvent>, ListingError> {
        if self.id.is_some() {
            return Err(ListingError::AlreadyPosted);
        }

        let title = title.into();
        if title.trim().is_empty() {
            return Err(ListingError::TitleRequired);
        }

        if is_donation && !price.is_zero() {
            return Err(ListingError::DonationMustBeFree {
                price: price.cents(),
            });
        }

        if !is_donation && !price.is_positive() {
            return Err(ListingError::InvalidPrice {
                price: price.cents(),
            });
        }

        Ok(vec![ListingEvent::listing_posted(
            listing_id,
            owner_id,
            title,
            is_donation,
            price,
        )])
    }

    /// Reserves the listing for a new order or claim.
    ///
    /// Fails unless the listing is ACTIVE. Of two concurrent reservations
    /// one wins here or at the version check on append; never both.
    pub fn reserve(&self, reserved_for: TransactionRef) -> Result<Vec<ListingEvent>, ListingError> {
        if !self.status.can_reserve() {
            return Err(ListingError::NotAvailable {
                current_status: self.status,
            });
        }

        match (self.is_donation, reserved_for) {
            (true, TransactionRef::Order(_)) => Err(ListingError::DonationNotPurchasable),
            (false, TransactionRef::Claim(_)) => Err(ListingError::NotADonation),
            _ => Ok(vec![ListingEvent::listing_reserved(reserved_for)]),
        }
    }

    /// Releases the reservation after the owning transaction is cancelled
    /// or rejected, making the listing available again.
    pub fn release(&self) -> Result<Vec<ListingEvent>, ListingError> {
        if !self.status.can_release() {
            return Err(ListingError::InvalidStateTransition {
                current_status: self.status,
                action: "release",
            });
        }

        let released_from = self
            .reserved_for
            .ok_or(ListingError::NoActiveReservation)?;

        Ok(vec![ListingEvent::listing_released(released_from)])
    }

    /// Finalizes the listing when its owning transaction completes.
    pub fn finalize(&self, outcome: ListingOutcome) -> Result<Vec<ListingEvent>, ListingError> {
        if !self.status.can_finalize() {
            return Err(ListingError::InvalidStateTransition {
                current_status: self.status,
                action: "finalize",
            });
        }

        let finalized_by = self
            .reserved_for
            .ok_or(ListingError::NoActiveReservation)?;

        Ok(vec![ListingEvent::listing_finalized(outcome, finalized_by)])
    }

    /// Removes the listing by administrative action.
    ///
    /// Allowed from any non-terminal status; an active reservation is
    /// dropped (the owning transaction is cancelled separately).
    pub fn remove(
        &self,
        removed_by: UserId,
        reason: impl Into<String>,
    ) -> Result<Vec<ListingEvent>, ListingError> {
        if self.status.is_terminal() {
            return Err(ListingError::InvalidStateTransition {
                current_status: self.status,
                action: "remove",
            });
        }

        Ok(vec![ListingEvent::listing_removed(removed_by, reason)])
    }
}

// Apply event helpers
impl Listing {
    fn apply_posted(&mut self, data: ListingPostedData) {
        self.id = Some(data.listing_id);
        self.owner_id = Some(data.owner_id);
        self.title = data.title;
        self.is_donation = data.is_donation;
        self.price = data.price;
        self.status = ListingStatus::Active;
    }

    fn apply_reserved(&mut self, data: ListingReservedData) {
        self.status = match data.reserved_for {
            TransactionRef::Order(_) => ListingStatus::Pending,
            TransactionRef::Claim(_) => ListingStatus::Claimed,
        };
        self.reserved_for = Some(data.reserved_for);
    }

    fn apply_finalized(&mut self, data: ListingFinalizedData) {
        self.status = data.outcome.status();
        self.reserved_for = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;

    fn post_sale_listing() -> (Listing, AggregateId, UserId) {
        let mut listing = Listing::default();
        let listing_id = AggregateId::new();
        let owner = UserId::new();
        let events = listing
            .post(listing_id, owner, "Sourdough loaf", false, Money::from_cents(500))
            .unwrap();
        listing.apply_events(events);
        (listing, listing_id, owner)
    }

    fn post_donation_listing() -> (Listing, AggregateId, UserId) {
        let mut listing = Listing::default();
        let listing_id = AggregateId::new();
        let owner = UserId::new();
        let events = listing
            .post(listing_id, owner, "Surplus apples", true, Money::zero())
            .unwrap();
        listing.apply_events(events);
        (listing, listing_id, owner)
    }

    #[test]
    fn test_post_listing() {
        let (listing, listing_id, owner) = post_sale_listing();
        assert_eq!(listing.id(), Some(listing_id));
        assert_eq!(listing.owner_id(), Some(owner));
        assert_eq!(listing.status(), ListingStatus::Active);
        assert!(!listing.is_donation());
        assert_eq!(listing.price().cents(), 500);
    }

    #[test]
    fn test_post_twice_fails() {
        let (listing, _, _) = post_sale_listing();
        let result = listing.post(
            AggregateId::new(),
            UserId::new(),
            "Again",
            false,
            Money::from_cents(100),
        );
        assert!(matches!(result, Err(ListingError::AlreadyPosted)));
    }

    #[test]
    fn test_post_donation_with_price_fails() {
        let listing = Listing::default();
        let result = listing.post(
            AggregateId::new(),
            UserId::new(),
            "Apples",
            true,
            Money::from_cents(100),
        );
        assert!(matches!(
            result,
            Err(ListingError::DonationMustBeFree { price: 100 })
        ));
    }

    #[test]
    fn test_post_sale_with_zero_price_fails() {
        let listing = Listing::default();
        let result = listing.post(AggregateId::new(), UserId::new(), "Bread", false, Money::zero());
        assert!(matches!(result, Err(ListingError::InvalidPrice { .. })));
    }

    #[test]
    fn test_post_empty_title_fails() {
        let listing = Listing::default();
        let result = listing.post(
            AggregateId::new(),
            UserId::new(),
            "   ",
            false,
            Money::from_cents(100),
        );
        assert!(matches!(result, Err(ListingError::TitleRequired)));
    }

    #[test]
    fn test_reserve_for_order_moves_to_pending() {
        let (mut listing, _, _) = post_sale_listing();
        let order_ref = TransactionRef::Order(AggregateId::new());

        let events = listing.reserve(order_ref).unwrap();
        listing.apply_events(events);

        assert_eq!(listing.status(), ListingStatus::Pending);
        assert_eq!(listing.reserved_for(), Some(order_ref));
    }

    #[test]
    fn test_reserve_for_claim_moves_to_claimed() {
        let (mut listing, _, _) = post_donation_listing();
        let claim_ref = TransactionRef::Claim(AggregateId::new());

        let events = listing.reserve(claim_ref).unwrap();
        listing.apply_events(events);

        assert_eq!(listing.status(), ListingStatus::Claimed);
    }

    #[test]
    fn test_reserve_reserved_listing_fails() {
        let (mut listing, _, _) = post_sale_listing();
        listing.apply_events(
            listing
                .reserve(TransactionRef::Order(AggregateId::new()))
                .unwrap(),
        );

        let result = listing.reserve(TransactionRef::Order(AggregateId::new()));
        assert!(matches!(
            result,
            Err(ListingError::NotAvailable {
                current_status: ListingStatus::Pending,
            })
        ));
    }

    #[test]
    fn test_order_cannot_reserve_donation_listing() {
        let (listing, _, _) = post_donation_listing();
        let result = listing.reserve(TransactionRef::Order(AggregateId::new()));
        assert!(matches!(result, Err(ListingError::DonationNotPurchasable)));
    }

    #[test]
    fn test_claim_cannot_reserve_sale_listing() {
        let (listing, _, _) = post_sale_listing();
        let result = listing.reserve(TransactionRef::Claim(AggregateId::new()));
        assert!(matches!(result, Err(ListingError::NotADonation)));
    }

    #[test]
    fn test_release_reverts_to_active() {
        let (mut listing, _, _) = post_sale_listing();
        listing.apply_events(
            listing
                .reserve(TransactionRef::Order(AggregateId::new()))
                .unwrap(),
        );

        listing.apply_events(listing.release().unwrap());

        assert_eq!(listing.status(), ListingStatus::Active);
        assert!(listing.reserved_for().is_none());
    }

    #[test]
    fn test_release_unreserved_listing_fails() {
        let (listing, _, _) = post_sale_listing();
        let result = listing.release();
        assert!(matches!(
            result,
            Err(ListingError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_finalize_sale_to_sold() {
        let (mut listing, _, _) = post_sale_listing();
        listing.apply_events(
            listing
                .reserve(TransactionRef::Order(AggregateId::new()))
                .unwrap(),
        );

        listing.apply_events(listing.finalize(ListingOutcome::Sold).unwrap());

        assert_eq!(listing.status(), ListingStatus::Sold);
        assert!(listing.is_terminal());
    }

    #[test]
    fn test_finalize_donation_to_completed() {
        let (mut listing, _, _) = post_donation_listing();
        listing.apply_events(
            listing
                .reserve(TransactionRef::Claim(AggregateId::new()))
                .unwrap(),
        );

        listing.apply_events(listing.finalize(ListingOutcome::Completed).unwrap());

        assert_eq!(listing.status(), ListingStatus::Completed);
    }

    #[test]
    fn test_finalize_active_listing_fails() {
        let (listing, _, _) = post_sale_listing();
        let result = listing.finalize(ListingOutcome::Sold);
        assert!(matches!(
            result,
            Err(ListingError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_release_after_finalize_fails() {
        let (mut listing, _, _) = post_sale_listing();
        listing.apply_events(
            listing
                .reserve(TransactionRef::Order(AggregateId::new()))
                .unwrap(),
        );
        listing.apply_events(listing.finalize(ListingOutcome::Sold).unwrap());

        let result = listing.release();
        assert!(matches!(
            result,
            Err(ListingError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_admin_remove() {
        let (mut listing, _, _) = post_sale_listing();
        let admin = UserId::new();

        listing.apply_events(listing.remove(admin, "Spoiled item reported").unwrap());

        assert_eq!(listing.status(), ListingStatus::Removed);
        assert!(listing.is_terminal());
    }

    #[test]
    fn test_remove_sold_listing_fails() {
        let (mut listing, _, _) = post_sale_listing();
        listing.apply_events(
            listing
                .reserve(TransactionRef::Order(AggregateId::new()))
                .unwrap(),
        );
        listing.apply_events(listing.finalize(ListingOutcome::Sold).unwrap());

        let result = listing.remove(UserId::new(), "Too late");
        assert!(matches!(
            result,
            Err(ListingError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_serialization() {
        let (listing, listing_id, _) = post_sale_listing();

        let json = serde_json::to_string(&listing).unwrap();
        let deserialized: Listing = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), Some(listing_id));
        assert_eq!(deserialized.status(), ListingStatus::Active);
        assert_eq!(deserialized.price().cents(), 500);
    }
}
