//! Order aggregate implementation.

use common::AggregateId;
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::pickup::PickupCode;
use crate::value_objects::{DeliveryType, Money, UserId};

use super::{
    OrderError, OrderEvent, OrderStatus, PaymentStatus,
    events::{OrderPlacedData, PaymentRecordedData},
};

/// Order aggregate root.
///
/// A paid transaction against a non-donation listing, from placement
/// through pickup authorization to completion or cancellation. The order
/// is never deleted, only terminalized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    id: Option<AggregateId>,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// The listing the order was placed against.
    listing_id: Option<AggregateId>,

    /// The buyer who placed the order.
    buyer_id: Option<UserId>,

    /// The seller who owns the listing.
    seller_id: Option<UserId>,

    /// How the buyer receives the item.
    delivery_type: Option<DeliveryType>,

    /// Destination address for HOME_DELIVERY.
    delivery_address: Option<String>,

    /// Agreed price, fixed at placement.
    final_price: Money,

    /// The secret pickup code minted at placement.
    pickup_code: Option<PickupCode>,

    /// Free-form buyer notes.
    order_notes: Option<String>,

    /// The paired delivery record for HOME_DELIVERY orders.
    delivery_id: Option<AggregateId>,

    /// Current order status.
    status: OrderStatus,

    /// Current payment status.
    payment_status: PaymentStatus,

    /// True once the seller has verified the pickup code.
    pickup_authorized: bool,
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
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
            OrderEvent::OrderPlaced(data) => self.apply_placed(data),
            OrderEvent::OrderConfirmed(_) => {
                self.status = OrderStatus::Confirmed;
            }
            OrderEvent::PickupAuthorized(_) => {
                self.pickup_authorized = true;
            }
            OrderEvent::PaymentRecorded(data) => self.apply_payment_recorded(data),
            OrderEvent::OrderCompleted(_) => {
                self.status = OrderStatus::Completed;
            }
            OrderEvent::OrderCancelled(_) => {
                self.status = OrderStatus::Cancelled;
            }
        }
    }
}

// Query methods
impl Order {
    /// Returns the listing ID.
    pub fn listing_id(&self) -> Option<AggregateId> {
        self.listing_id
    }

    /// Returns the buyer's user ID.
    pub fn buyer_id(&self) -> Option<UserId> {
        self.buyer_id
    }

    /// Returns the seller's user ID.
    pub fn seller_id(&self) -> Option<UserId> {
        self.seller_id
    }

    /// Returns the delivery type.
    pub fn delivery_type(&self) -> Option<DeliveryType> {
        self.delivery_type
    }

    /// Returns the delivery address, if one was supplied.
    pub fn delivery_address(&self) -> Option<&str> {
        self.delivery_address.as_deref()
    }

    /// Returns the agreed price.
    pub fn final_price(&self) -> Money {
        self.final_price
    }

    /// Returns the pickup code minted for this order.
    pub fn pickup_code(&self) -> Option<&PickupCode> {
        self.pickup_code.as_ref()
    }

    /// Returns the buyer's notes, if any.
    pub fn order_notes(&self) -> Option<&str> {
        self.order_notes.as_deref()
    }

    /// Returns the paired delivery ID for HOME_DELIVERY orders.
    pub fn delivery_id(&self) -> Option<AggregateId> {
        self.delivery_id
    }

    /// Returns the current order status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the current payment status.
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// Returns true once the seller has verified the pickup code.
    pub fn pickup_authorized(&self) -> bool {
        self.pickup_authorized
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods (return events)
impl Order {
    /// Places a new order.
    ///
    /// The caller has already reserved the listing; this validates the
    /// order's own shape: positive price, an address when the item is
    /// delivered, and a paired delivery record exactly when one is needed.
    #[allow(clippy::too_many_arguments)]
    pub fn place(
        &self,
        order_id: AggregateId,
        listing_id: AggregateId,
        buyer_id: UserId,
        seller_id: UserId,
        delivery_type: DeliveryType,
        delivery_address: Option<String>,
        final_price: Money,
        pickup_code: PickupCode,
        order_notes: Option<String>,
        delivery_id: Option<AggregateId>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyPlaced);
        }

        if buyer_id == seller_id {
            return Err(OrderError::BuyerIsSeller);
        }

        if !final_price.is_positive() {
            return Err(OrderError::InvalidPrice {
                price: final_price.cents(),
            });
        }

        if delivery_type.needs_delivery() {
            if delivery_address.as_deref().is_none_or(|a| a.trim().is_empty()) {
                return Err(OrderError::AddressRequired);
            }
            if delivery_id.is_none() {
                return Err(OrderError::DeliveryRequired);
            }
        } else if delivery_id.is_some() {
            return Err(OrderError::UnexpectedDelivery);
        }

        Ok(vec![OrderEvent::order_placed(
            order_id,
            listing_id,
            buyer_id,
            seller_id,
            delivery_type,
            delivery_address,
            final_price,
            pickup_code,
            order_notes,
            delivery_id,
        )])
    }

    /// Explicitly confirms the order.
    ///
    /// Optional: a correct pickup code on a Pending order confirms it
    /// implicitly.
    pub fn confirm(&self, actor: UserId) -> Result<Vec<OrderEvent>, OrderError> {
        self.require_seller(actor)?;

        if self.status != OrderStatus::Pending {
            return Err(self.transition_error("confirm"));
        }

        Ok(vec![OrderEvent::order_confirmed(false)])
    }

    /// Authorizes pickup after verifying the submitted code.
    ///
    /// Only the seller may call. A wrong code fails with CodeMismatch and
    /// leaves the order unchanged. On a correct code, a Pending order is
    /// confirmed implicitly; SELF_PICKUP orders complete in the same step,
    /// HOME_DELIVERY orders stay Confirmed while the paired delivery
    /// departs.
    pub fn authorize_pickup(
        &self,
        actor: UserId,
        submitted: &PickupCode,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        self.require_seller(actor)?;

        if !self.status.can_authorize_pickup() {
            return Err(self.transition_error("authorize pickup"));
        }

        if self.pickup_authorized {
            return Err(OrderError::PickupAlreadyAuthorized);
        }

        let code = self.pickup_code.as_ref().ok_or(OrderError::NotPlaced)?;
        if !code.matches(submitted) {
            return Err(OrderError::CodeMismatch);
        }

        let mut events = Vec::with_capacity(3);
        if self.status == OrderStatus::Pending {
            events.push(OrderEvent::order_confirmed(true));
        }
        events.push(OrderEvent::pickup_authorized(actor));
        if self.delivery_type == Some(DeliveryType::SelfPickup) {
            events.push(OrderEvent::order_completed());
        }

        Ok(events)
    }

    /// Records an external payment outcome.
    pub fn record_payment(
        &self,
        new_status: PaymentStatus,
        payment_ref: Option<String>,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_none() {
            return Err(OrderError::NotPlaced);
        }

        if !self.payment_status.can_transition_to(new_status) {
            return Err(OrderError::InvalidPaymentTransition {
                from: self.payment_status,
                to: new_status,
            });
        }

        Ok(vec![OrderEvent::payment_recorded(new_status, payment_ref)])
    }

    /// Completes the order after its delivery is marked DELIVERED.
    pub fn complete(&self) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.status.can_complete() {
            return Err(self.transition_error("complete"));
        }

        if !self.pickup_authorized {
            return Err(OrderError::PickupNotAuthorized);
        }

        Ok(vec![OrderEvent::order_completed()])
    }

    /// Cancels the order.
    ///
    /// Permitted to the buyer or seller only while the order is Pending
    /// or Confirmed. Once pickup is authorized the item has left the
    /// seller's hands and cancellation is blocked, unless the paired
    /// delivery has since failed and the transaction can go nowhere.
    pub fn cancel(
        &self,
        cancelled_by: UserId,
        reason: impl Into<String>,
        delivery_failed: bool,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.buyer_id != Some(cancelled_by) && self.seller_id != Some(cancelled_by) {
            return Err(OrderError::NotParticipant);
        }

        if !self.status.can_cancel() {
            return Err(self.transition_error("cancel"));
        }

        if self.pickup_authorized && !delivery_failed {
            return Err(OrderError::PickupAlreadyAuthorized);
        }

        Ok(vec![OrderEvent::order_cancelled(cancelled_by, reason)])
    }

    fn require_seller(&self, actor: UserId) -> Result<(), OrderError> {
        if self.id.is_none() {
            return Err(OrderError::NotPlaced);
        }
        if self.seller_id != Some(actor) {
            return Err(OrderError::NotSeller);
        }
        Ok(())
    }

    fn transition_error(&self, action: &'static str) -> OrderError {
        if self.status == OrderStatus::Completed {
            OrderError::AlreadyCompleted
        } else {
            OrderError::InvalidStateTransition {
                current_status: self.status,
                action,
            }
        }
    }
}

// Apply event helpers
impl Order {
    fn apply_placed(&mut self, data: OrderPlacedData) {
        self.id = Some(data.order_id);
        self.listing_id = Some(data.listing_id);
        self.buyer_id = Some(data.buyer_id);
        self.seller_id = Some(data.seller_id);
        self.delivery_type = Some(data.delivery_type);
        self.delivery_address = data.delivery_address;
        self.final_price = data.final_price;
        self.pickup_code = Some(data.pickup_code);
        self.order_notes = data.order_notes;
        self.delivery_id = data.delivery_id;
        self.status = OrderStatus::Pending;
        self.payment_status = PaymentStatus::Pending;
    }

    fn apply_payment_recorded(&mut self, data: PaymentRecordedData) {
        self.payment_status = data.new_status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregate;

    struct OrderSetup {
        order: Order,
        seller: UserId,
        buyer: UserId,
        code: PickupCode,
    }

    fn place_order(delivery_type: DeliveryType) -> OrderSetup {
        let mut order = Order::default();
        let seller = UserId::new();
        let buyer = UserId::new();
        let code = PickupCode::generate();

        let (address, delivery_id) = if delivery_type.needs_delivery() {
            (Some("12 Baker St".to_string()), Some(AggregateId::new()))
        } else {
            (None, None)
        };

        let events = order
            .place(
                AggregateId::new(),
                AggregateId::new(),
                buyer,
                seller,
                delivery_type,
                address,
                Money::from_cents(500),
                code.clone(),
                None,
                delivery_id,
            )
            .unwrap();
        order.apply_events(events);

        OrderSetup {
            order,
            seller,
            buyer,
            code,
        }
    }

    #[test]
    fn test_place_order() {
        let setup = place_order(DeliveryType::SelfPickup);
        assert!(setup.order.id().is_some());
        assert_eq!(setup.order.status(), OrderStatus::Pending);
        assert_eq!(setup.order.payment_status(), PaymentStatus::Pending);
        assert_eq!(setup.order.final_price().cents(), 500);
        assert!(setup.order.pickup_code().is_some());
        assert!(setup.order.delivery_id().is_none());
    }

    #[test]
    fn test_place_twice_fails() {
        let setup = place_order(DeliveryType::SelfPickup);
        let result = setup.order.place(
            AggregateId::new(),
            AggregateId::new(),
            UserId::new(),
            UserId::new(),
            DeliveryType::SelfPickup,
            None,
            Money::from_cents(100),
            PickupCode::generate(),
            None,
            None,
        );
        assert!(matches!(result, Err(OrderError::AlreadyPlaced)));
    }

    #[test]
    fn test_place_zero_price_fails() {
        let order = Order::default();
        let result = order.place(
            AggregateId::new(),
            AggregateId::new(),
            UserId::new(),
            UserId::new(),
            DeliveryType::SelfPickup,
            None,
            Money::zero(),
            PickupCode::generate(),
            None,
            None,
        );
        assert!(matches!(result, Err(OrderError::InvalidPrice { price: 0 })));
    }

    #[test]
    fn test_place_home_delivery_without_address_fails() {
        let order = Order::default();
        let result = order.place(
            AggregateId::new(),
            AggregateId::new(),
            UserId::new(),
            UserId::new(),
            DeliveryType::HomeDelivery,
            None,
            Money::from_cents(500),
            PickupCode::generate(),
            None,
            Some(AggregateId::new()),
        );
        assert!(matches!(result, Err(OrderError::AddressRequired)));
    }

    #[test]
    fn test_place_home_delivery_without_delivery_fails() {
        let order = Order::default();
        let result = order.place(
            AggregateId::new(),
            AggregateId::new(),
            UserId::new(),
            UserId::new(),
            DeliveryType::HomeDelivery,
            Some("12 Baker St".to_string()),
            Money::from_cents(500),
            PickupCode::generate(),
            None,
            None,
        );
        assert!(matches!(result, Err(OrderError::DeliveryRequired)));
    }

    #[test]
    fn test_place_self_pickup_with_delivery_fails() {
        let order = Order::default();
        let result = order.place(
            AggregateId::new(),
            AggregateId::new(),
            UserId::new(),
            UserId::new(),
            DeliveryType::SelfPickup,
            None,
            Money::from_cents(500),
            PickupCode::generate(),
            None,
            Some(AggregateId::new()),
        );
        assert!(matches!(result, Err(OrderError::UnexpectedDelivery)));
    }

    #[test]
    fn test_buyer_cannot_be_seller() {
        let order = Order::default();
        let user = UserId::new();
        let result = order.place(
            AggregateId::new(),
            AggregateId::new(),
            user,
            user,
            DeliveryType::SelfPickup,
            None,
            Money::from_cents(500),
            PickupCode::generate(),
            None,
            None,
        );
        assert!(matches!(result, Err(OrderError::BuyerIsSeller)));
    }

    #[test]
    fn test_explicit_confirm() {
        let mut setup = place_order(DeliveryType::SelfPickup);
        let events = setup.order.confirm(setup.seller).unwrap();
        setup.order.apply_events(events);
        assert_eq!(setup.order.status(), OrderStatus::Confirmed);
    }

    #[test]
    fn test_confirm_by_non_seller_fails() {
        let setup = place_order(DeliveryType::SelfPickup);
        let result = setup.order.confirm(setup.buyer);
        assert!(matches!(result, Err(OrderError::NotSeller)));
    }

    #[test]
    fn test_self_pickup_authorize_completes_directly() {
        let mut setup = place_order(DeliveryType::SelfPickup);

        let events = setup
            .order
            .authorize_pickup(setup.seller, &setup.code)
            .unwrap();
        assert_eq!(events.len(), 3); // implicit confirm + authorize + complete
        setup.order.apply_events(events);

        assert_eq!(setup.order.status(), OrderStatus::Completed);
        assert!(setup.order.pickup_authorized());
        assert!(setup.order.is_terminal());
    }

    #[test]
    fn test_home_delivery_authorize_stays_confirmed() {
        let mut setup = place_order(DeliveryType::HomeDelivery);

        let events = setup
            .order
            .authorize_pickup(setup.seller, &setup.code)
            .unwrap();
        setup.order.apply_events(events);

        assert_eq!(setup.order.status(), OrderStatus::Confirmed);
        assert!(setup.order.pickup_authorized());
        assert!(!setup.order.is_terminal());
    }

    #[test]
    fn test_wrong_code_leaves_order_unchanged() {
        let mut setup = place_order(DeliveryType::HomeDelivery);
        let wrong = PickupCode::parse("WRONGC0D").unwrap();

        for _ in 0..5 {
            let result = setup.order.authorize_pickup(setup.seller, &wrong);
            assert!(matches!(result, Err(OrderError::CodeMismatch)));
            assert_eq!(setup.order.status(), OrderStatus::Pending);
            assert!(!setup.order.pickup_authorized());
        }

        // Correct code still works afterwards
        let events = setup
            .order
            .authorize_pickup(setup.seller, &setup.code)
            .unwrap();
        setup.order.apply_events(events);
        assert!(setup.order.pickup_authorized());
    }

    #[test]
    fn test_authorize_by_non_seller_fails() {
        let setup = place_order(DeliveryType::SelfPickup);
        let result = setup.order.authorize_pickup(setup.buyer, &setup.code);
        assert!(matches!(result, Err(OrderError::NotSeller)));
    }

    #[test]
    fn test_authorize_completed_order_fails() {
        let mut setup = place_order(DeliveryType::SelfPickup);
        setup.order.apply_events(
            setup
                .order
                .authorize_pickup(setup.seller, &setup.code)
                .unwrap(),
        );

        let result = setup.order.authorize_pickup(setup.seller, &setup.code);
        assert!(matches!(result, Err(OrderError::AlreadyCompleted)));
    }

    #[test]
    fn test_authorize_twice_on_home_delivery_fails() {
        let mut setup = place_order(DeliveryType::HomeDelivery);
        setup.order.apply_events(
            setup
                .order
                .authorize_pickup(setup.seller, &setup.code)
                .unwrap(),
        );

        let result = setup.order.authorize_pickup(setup.seller, &setup.code);
        assert!(matches!(result, Err(OrderError::PickupAlreadyAuthorized)));
    }

    #[test]
    fn test_record_payment() {
        let mut setup = place_order(DeliveryType::SelfPickup);
        let events = setup
            .order
            .record_payment(PaymentStatus::Paid, Some("PAY-1".to_string()))
            .unwrap();
        setup.order.apply_events(events);
        assert_eq!(setup.order.payment_status(), PaymentStatus::Paid);

        let events = setup.order.record_payment(PaymentStatus::Refunded, None).unwrap();
        setup.order.apply_events(events);
        assert_eq!(setup.order.payment_status(), PaymentStatus::Refunded);
    }

    #[test]
    fn test_illegal_payment_transition_fails() {
        let setup = place_order(DeliveryType::SelfPickup);
        let result = setup.order.record_payment(PaymentStatus::Refunded, None);
        assert!(matches!(
            result,
            Err(OrderError::InvalidPaymentTransition {
                from: PaymentStatus::Pending,
                to: PaymentStatus::Refunded,
            })
        ));
    }

    #[test]
    fn test_complete_after_delivery() {
        let mut setup = place_order(DeliveryType::HomeDelivery);
        setup.order.apply_events(
            setup
                .order
                .authorize_pickup(setup.seller, &setup.code)
                .unwrap(),
        );

        let events = setup.order.complete().unwrap();
        setup.order.apply_events(events);
        assert_eq!(setup.order.status(), OrderStatus::Completed);
    }

    #[test]
    fn test_complete_without_pickup_fails() {
        let mut setup = place_order(DeliveryType::HomeDelivery);
        setup
            .order
            .apply_events(setup.order.confirm(setup.seller).unwrap());

        let result = setup.order.complete();
        assert!(matches!(result, Err(OrderError::PickupNotAuthorized)));
    }

    #[test]
    fn test_cancel_pending_order() {
        let mut setup = place_order(DeliveryType::SelfPickup);
        let events = setup
            .order
            .cancel(setup.buyer, "Changed my mind", false)
            .unwrap();
        setup.order.apply_events(events);
        assert_eq!(setup.order.status(), OrderStatus::Cancelled);
        assert!(setup.order.is_terminal());
    }

    #[test]
    fn test_cancel_by_stranger_fails() {
        let setup = place_order(DeliveryType::SelfPickup);
        let result = setup.order.cancel(UserId::new(), "Not mine", false);
        assert!(matches!(result, Err(OrderError::NotParticipant)));
    }

    #[test]
    fn test_cancel_after_pickup_authorized_fails() {
        let mut setup = place_order(DeliveryType::HomeDelivery);
        setup.order.apply_events(
            setup
                .order
                .authorize_pickup(setup.seller, &setup.code)
                .unwrap(),
        );

        let result = setup.order.cancel(setup.buyer, "Too late", false);
        assert!(matches!(result, Err(OrderError::PickupAlreadyAuthorized)));
    }

    #[test]
    fn test_cancel_allowed_once_delivery_failed() {
        let mut setup = place_order(DeliveryType::HomeDelivery);
        setup.order.apply_events(
            setup
                .order
                .authorize_pickup(setup.seller, &setup.code)
                .unwrap(),
        );

        let events = setup
            .order
            .cancel(setup.buyer, "Delivery failed", true)
            .unwrap();
        setup.order.apply_events(events);
        assert_eq!(setup.order.status(), OrderStatus::Cancelled);
        assert!(setup.order.is_terminal());
    }

    #[test]
    fn test_cancel_completed_order_fails() {
        let mut setup = place_order(DeliveryType::SelfPickup);
        setup.order.apply_events(
            setup
                .order
                .authorize_pickup(setup.seller, &setup.code)
                .unwrap(),
        );

        let result = setup.order.cancel(setup.buyer, "Too late", false);
        assert!(matches!(result, Err(OrderError::AlreadyCompleted)));
    }

    #[test]
    fn test_serialization() {
        let setup = place_order(DeliveryType::HomeDelivery);

        let json = serde_json::to_string(&setup.order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), setup.order.id());
        assert_eq!(deserialized.status(), OrderStatus::Pending);
        assert_eq!(deserialized.delivery_address(), Some("12 Baker St"));
    }
}
