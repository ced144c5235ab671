//! Coordinator driving the fulfillment state machines.
//!
//! Each operation loads the aggregates it touches, runs their commands,
//! and persists the resulting events with optimistic concurrency: two
//! requests racing on the same row both load version N, but only one
//! append at N+1 succeeds; the loser gets a conflict and is told to
//! refetch. Cross-aggregate side effects (listing release/finalize,
//! delivery departure, notifications) are applied after the owning
//! transaction's write lands.

use common::AggregateId;
use domain::{
    CommandHandler, Delivery, DeliveryStatus, DeliveryType, DomainError, DonationClaim,
    FulfillmentTransaction, Listing, Money, Order, PaymentStatus, PersonnelType, PickupCode,
    TransactionRef, UserId,
};
use event_store::EventStore;

use crate::error::{FulfillmentError, Result};
use crate::notify::{Notification, NotificationDispatcher, NotificationTopic};

/// Request body for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    /// How the buyer receives the item.
    pub delivery_type: DeliveryType,

    /// Destination address. Required for HOME_DELIVERY.
    pub delivery_address: Option<String>,

    /// Price the buyer expects to pay, checked against the listing.
    pub proposed_price: Option<Money>,

    /// Free-form buyer notes.
    pub order_notes: Option<String>,
}

/// Request body for creating a donation claim.
#[derive(Debug, Clone)]
pub struct CreateClaimRequest {
    /// How the charity receives the item.
    pub delivery_type: DeliveryType,

    /// Destination address. Required for HOME_DELIVERY.
    pub delivery_address: Option<String>,

    /// Free-form charity notes.
    pub claim_notes: Option<String>,
}

/// Orchestrates listings, orders, donation claims and deliveries.
pub struct FulfillmentCoordinator<S, N>
where
    S: EventStore + Clone,
    N: NotificationDispatcher,
{
    listings: CommandHandler<S, Listing>,
    orders: CommandHandler<S, Order>,
    claims: CommandHandler<S, DonationClaim>,
    deliveries: CommandHandler<S, Delivery>,
    notifier: N,
}

impl<S, N> FulfillmentCoordinator<S, N>
where
    S: EventStore + Clone,
    N: NotificationDispatcher,
{
    /// Creates a new coordinator over the given event store.
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            listings: CommandHandler::new(store.clone()),
            orders: CommandHandler::new(store.clone()),
            claims: CommandHandler::new(store.clone()),
            deliveries: CommandHandler::new(store),
            notifier,
        }
    }

    // ----- Listings -----

    /// Posts a new listing.
    #[tracing::instrument(skip(self, title))]
    pub async fn post_listing(
        &self,
        owner_id: UserId,
        title: String,
        is_donation: bool,
        price: Money,
    ) -> Result<Listing> {
        let listing_id = AggregateId::new();
        let result = self
            .listings
            .execute(listing_id, |listing| {
                listing.post(listing_id, owner_id, title, is_donation, price)
            })
            .await?;

        metrics::counter!("listings_posted_total").increment(1);
        tracing::info!(%listing_id, is_donation, "listing posted");

        Ok(result.aggregate)
    }

    /// Removes a listing by administrative action.
    #[tracing::instrument(skip(self, reason))]
    pub async fn remove_listing(
        &self,
        listing_id: AggregateId,
        removed_by: UserId,
        reason: String,
    ) -> Result<Listing> {
        self.require_listing(listing_id).await?;
        let result = self
            .listings
            .execute(listing_id, |listing| listing.remove(removed_by, reason))
            .await?;
        Ok(result.aggregate)
    }

    /// Loads a listing, if it exists.
    pub async fn get_listing(&self, listing_id: AggregateId) -> Result<Option<Listing>> {
        Ok(self.listings.load_existing(listing_id).await?)
    }

    // ----- Orders -----

    /// Creates an order against an active listing.
    ///
    /// Reserves the listing, pairs a delivery for HOME_DELIVERY, mints a
    /// pickup code and places the order. If a later step fails the
    /// listing reservation is released again.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        listing_id: AggregateId,
        buyer_id: UserId,
        request: CreateOrderRequest,
    ) -> Result<Order> {
        let listing = self.require_listing(listing_id).await?;
        let seller_id = listing
            .owner_id()
            .ok_or(FulfillmentError::ListingNotFound(listing_id))?;

        let final_price = listing.price();
        if let Some(proposed) = request.proposed_price
            && proposed != final_price
        {
            return Err(FulfillmentError::PriceMismatch {
                proposed: proposed.cents(),
                listing: final_price.cents(),
            });
        }

        let order_id = AggregateId::new();

        // Reserve the listing first; the version check makes this the
        // single winner of any concurrent reservation race.
        self.listings
            .execute(listing_id, |listing| {
                listing.reserve(TransactionRef::Order(order_id))
            })
            .await?;

        let delivery_id = match self
            .schedule_delivery_if_needed(
                TransactionRef::Order(order_id),
                request.delivery_type,
                request.delivery_address.as_deref(),
            )
            .await
        {
            Ok(delivery_id) => delivery_id,
            Err(e) => {
                self.release_listing(listing_id).await;
                return Err(e);
            }
        };

        let pickup_code = PickupCode::generate();
        let result = self
            .orders
            .execute(order_id, |order| {
                order.place(
                    order_id,
                    listing_id,
                    buyer_id,
                    seller_id,
                    request.delivery_type,
                    request.delivery_address.clone(),
                    final_price,
                    pickup_code.clone(),
                    request.order_notes.clone(),
                    delivery_id,
                )
            })
            .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.release_listing(listing_id).await;
                return Err(e.into());
            }
        };

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(%order_id, %listing_id, delivery_type = %request.delivery_type, "order created");

        self.notify(
            seller_id,
            NotificationTopic::OrderUpdate,
            "Your listing has a new order",
            Some(TransactionRef::Order(order_id)),
        )
        .await;

        Ok(result.aggregate)
    }

    /// Explicitly confirms an order.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_order(&self, order_id: AggregateId, actor: UserId) -> Result<Order> {
        let order = self.require_order(order_id).await?;
        let result = self
            .orders
            .execute(order_id, |order| order.confirm(actor))
            .await?;

        if let Some(buyer_id) = order.buyer_id() {
            self.notify(
                buyer_id,
                NotificationTopic::OrderUpdate,
                "Your order was confirmed by the seller",
                Some(TransactionRef::Order(order_id)),
            )
            .await;
        }

        Ok(result.aggregate)
    }

    /// Records an external payment outcome on an order.
    #[tracing::instrument(skip(self))]
    pub async fn record_payment(
        &self,
        order_id: AggregateId,
        new_status: PaymentStatus,
        payment_ref: Option<String>,
    ) -> Result<Order> {
        self.require_order(order_id).await?;
        let result = self
            .orders
            .execute(order_id, |order| {
                order.record_payment(new_status, payment_ref.clone())
            })
            .await?;
        Ok(result.aggregate)
    }

    /// Authorizes pickup on an order.
    ///
    /// SELF_PICKUP orders complete immediately and the listing is sold;
    /// HOME_DELIVERY orders send their paired delivery in transit.
    #[tracing::instrument(skip(self, submitted_code))]
    pub async fn authorize_order_pickup(
        &self,
        order_id: AggregateId,
        actor: UserId,
        submitted_code: &str,
    ) -> Result<Order> {
        self.require_order(order_id).await?;
        let order = self
            .authorize_pickup_generic(&self.orders, order_id, actor, submitted_code)
            .await?;

        if let Some(buyer_id) = order.buyer_id() {
            self.notify(
                buyer_id,
                NotificationTopic::OrderUpdate,
                "Pickup authorized for your order",
                Some(TransactionRef::Order(order_id)),
            )
            .await;
        }

        Ok(order)
    }

    /// Completes a HOME_DELIVERY order when its delivery is handed over.
    #[tracing::instrument(skip(self))]
    pub async fn complete_order_delivery(
        &self,
        order_id: AggregateId,
        personnel_id: UserId,
    ) -> Result<Order> {
        self.require_order(order_id).await?;
        let order = self
            .complete_delivery_generic(&self.orders, order_id, personnel_id)
            .await?;

        for recipient in [order.buyer_id(), order.seller_id()].into_iter().flatten() {
            self.notify(
                recipient,
                NotificationTopic::OrderUpdate,
                "Order delivered and completed",
                Some(TransactionRef::Order(order_id)),
            )
            .await;
        }

        Ok(order)
    }

    /// Cancels an order and releases its listing.
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel_order(
        &self,
        order_id: AggregateId,
        actor: UserId,
        reason: String,
    ) -> Result<Order> {
        self.require_order(order_id).await?;
        let order = self
            .cancel_generic(&self.orders, order_id, actor, reason)
            .await?;

        for recipient in [order.buyer_id(), order.seller_id()].into_iter().flatten() {
            if recipient != actor {
                self.notify(
                    recipient,
                    NotificationTopic::OrderUpdate,
                    "Order was cancelled",
                    Some(TransactionRef::Order(order_id)),
                )
                .await;
            }
        }

        Ok(order)
    }

    /// Loads an order, if it exists.
    pub async fn get_order(&self, order_id: AggregateId) -> Result<Option<Order>> {
        Ok(self.orders.load_existing(order_id).await?)
    }

    // ----- Donation claims -----

    /// Files a claim against an active donation listing.
    ///
    /// No delivery is paired yet; that happens at donor approval, so a
    /// rejected claim never produces a delivery record.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_claim(
        &self,
        listing_id: AggregateId,
        charity_id: UserId,
        request: CreateClaimRequest,
    ) -> Result<DonationClaim> {
        let listing = self.require_listing(listing_id).await?;
        let donor_id = listing
            .owner_id()
            .ok_or(FulfillmentError::ListingNotFound(listing_id))?;

        let claim_id = AggregateId::new();

        self.listings
            .execute(listing_id, |listing| {
                listing.reserve(TransactionRef::Claim(claim_id))
            })
            .await?;

        let pickup_code = PickupCode::generate();
        let result = self
            .claims
            .execute(claim_id, |claim| {
                claim.file(
                    claim_id,
                    listing_id,
                    charity_id,
                    donor_id,
                    request.delivery_type,
                    request.delivery_address.clone(),
                    pickup_code.clone(),
                    request.claim_notes.clone(),
                )
            })
            .await;

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                self.release_listing(listing_id).await;
                return Err(e.into());
            }
        };

        metrics::counter!("claims_created_total").increment(1);
        tracing::info!(%claim_id, %listing_id, "claim filed");

        self.notify(
            donor_id,
            NotificationTopic::ClaimUpdate,
            "Your donation listing has a new claim",
            Some(TransactionRef::Claim(claim_id)),
        )
        .await;

        Ok(result.aggregate)
    }

    /// Approves a claim, pairing a delivery for HOME_DELIVERY claims.
    #[tracing::instrument(skip(self))]
    pub async fn approve_claim(&self, claim_id: AggregateId, actor: UserId) -> Result<DonationClaim> {
        let claim = self.require_claim(claim_id).await?;

        // Validate against the loaded snapshot before creating the
        // delivery record, so a doomed approval leaves nothing behind.
        claim
            .approve(actor, claim.delivery_type().and_then(|delivery_type| {
                delivery_type.needs_delivery().then(AggregateId::new)
            }))
            .map_err(DomainError::from)?;

        let delivery_id = match claim.delivery_type() {
            Some(delivery_type) if delivery_type.needs_delivery() => {
                self.schedule_delivery_if_needed(
                    TransactionRef::Claim(claim_id),
                    delivery_type,
                    claim.delivery_address(),
                )
                .await?
            }
            _ => None,
        };

        let result = self
            .claims
            .execute(claim_id, |claim| claim.approve(actor, delivery_id))
            .await?;

        if let Some(charity_id) = result.aggregate.charity_id() {
            self.notify(
                charity_id,
                NotificationTopic::ClaimUpdate,
                "Your claim was approved by the donor",
                Some(TransactionRef::Claim(claim_id)),
            )
            .await;
        }

        Ok(result.aggregate)
    }

    /// Rejects a claim and releases its listing.
    #[tracing::instrument(skip(self, reason))]
    pub async fn reject_claim(
        &self,
        claim_id: AggregateId,
        actor: UserId,
        reason: String,
    ) -> Result<DonationClaim> {
        let claim = self.require_claim(claim_id).await?;
        let result = self
            .claims
            .execute(claim_id, |claim| claim.reject(actor, reason))
            .await?;

        if let Some(listing_id) = claim.listing_id() {
            self.release_listing(listing_id).await;
        }

        if let Some(charity_id) = claim.charity_id() {
            self.notify(
                charity_id,
                NotificationTopic::ClaimUpdate,
                "Your claim was rejected by the donor",
                Some(TransactionRef::Claim(claim_id)),
            )
            .await;
        }

        Ok(result.aggregate)
    }

    /// Authorizes pickup on an approved claim.
    #[tracing::instrument(skip(self, submitted_code))]
    pub async fn authorize_claim_pickup(
        &self,
        claim_id: AggregateId,
        actor: UserId,
        submitted_code: &str,
    ) -> Result<DonationClaim> {
        self.require_claim(claim_id).await?;
        let claim = self
            .authorize_pickup_generic(&self.claims, claim_id, actor, submitted_code)
            .await?;

        if let Some(charity_id) = claim.charity_id() {
            self.notify(
                charity_id,
                NotificationTopic::ClaimUpdate,
                "Pickup authorized for your claim",
                Some(TransactionRef::Claim(claim_id)),
            )
            .await;
        }

        Ok(claim)
    }

    /// Completes a HOME_DELIVERY claim when its delivery is handed over.
    #[tracing::instrument(skip(self))]
    pub async fn complete_claim_delivery(
        &self,
        claim_id: AggregateId,
        personnel_id: UserId,
    ) -> Result<DonationClaim> {
        self.require_claim(claim_id).await?;
        let claim = self
            .complete_delivery_generic(&self.claims, claim_id, personnel_id)
            .await?;

        for recipient in [claim.charity_id(), claim.donor_id()].into_iter().flatten() {
            self.notify(
                recipient,
                NotificationTopic::ClaimUpdate,
                "Donation delivered and completed",
                Some(TransactionRef::Claim(claim_id)),
            )
            .await;
        }

        Ok(claim)
    }

    /// Cancels a claim and releases its listing.
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel_claim(
        &self,
        claim_id: AggregateId,
        actor: UserId,
        reason: String,
    ) -> Result<DonationClaim> {
        self.require_claim(claim_id).await?;
        let claim = self
            .cancel_generic(&self.claims, claim_id, actor, reason)
            .await?;

        for recipient in [claim.charity_id(), claim.donor_id()].into_iter().flatten() {
            if recipient != actor {
                self.notify(
                    recipient,
                    NotificationTopic::ClaimUpdate,
                    "Claim was cancelled",
                    Some(TransactionRef::Claim(claim_id)),
                )
                .await;
            }
        }

        Ok(claim)
    }

    /// Loads a claim, if it exists.
    pub async fn get_claim(&self, claim_id: AggregateId) -> Result<Option<DonationClaim>> {
        Ok(self.claims.load_existing(claim_id).await?)
    }

    // ----- Deliveries -----

    /// Assigns personnel to a scheduled delivery.
    #[tracing::instrument(skip(self))]
    pub async fn assign_personnel(
        &self,
        delivery_id: AggregateId,
        personnel_id: UserId,
        personnel_type: PersonnelType,
    ) -> Result<Delivery> {
        self.require_delivery(delivery_id).await?;
        let result = self
            .deliveries
            .execute(delivery_id, |delivery| {
                delivery.assign_personnel(personnel_id, personnel_type)
            })
            .await?;
        Ok(result.aggregate)
    }

    /// Marks a delivery as failed.
    ///
    /// The owning transaction is left as it stands; the parties decide
    /// whether to cancel or retry with another delivery.
    #[tracing::instrument(skip(self, reason))]
    pub async fn fail_delivery(
        &self,
        delivery_id: AggregateId,
        actor: UserId,
        reason: String,
    ) -> Result<Delivery> {
        let delivery = self.require_delivery(delivery_id).await?;
        let result = self
            .deliveries
            .execute(delivery_id, |delivery| {
                delivery.mark_failed(actor, reason)
            })
            .await?;

        metrics::counter!("deliveries_failed_total").increment(1);

        for recipient in self.transaction_parties(delivery.transaction()).await {
            self.notify(
                recipient,
                NotificationTopic::DeliveryUpdate,
                "Delivery failed",
                delivery.transaction(),
            )
            .await;
        }

        Ok(result.aggregate)
    }

    /// Loads a delivery, if it exists.
    pub async fn get_delivery(&self, delivery_id: AggregateId) -> Result<Option<Delivery>> {
        Ok(self.deliveries.load_existing(delivery_id).await?)
    }

    // ----- Shared transaction plumbing -----

    async fn authorize_pickup_generic<A>(
        &self,
        handler: &CommandHandler<S, A>,
        transaction_id: AggregateId,
        actor: UserId,
        submitted_code: &str,
    ) -> Result<A>
    where
        A: FulfillmentTransaction + Clone,
        DomainError: From<A::Error>,
    {
        let code = PickupCode::parse(submitted_code)?;

        let result = handler
            .execute(transaction_id, |transaction| {
                transaction.authorize_pickup(actor, &code)
            })
            .await?;
        let transaction = result.aggregate;

        metrics::counter!("pickups_authorized_total", "kind" => A::KIND).increment(1);
        tracing::info!(%transaction_id, kind = A::KIND, "pickup authorized");

        if transaction.is_terminal() {
            // Self-pickup: the transaction completed in the same step.
            if let Some(listing_id) = transaction.listing_id() {
                self.finalize_listing::<A>(listing_id).await;
            }
        } else if let Some(delivery_id) = transaction.delivery_id() {
            self.deliveries
                .execute(delivery_id, |delivery| delivery.depart())
                .await?;
        }

        Ok(transaction)
    }

    async fn complete_delivery_generic<A>(
        &self,
        handler: &CommandHandler<S, A>,
        transaction_id: AggregateId,
        personnel_id: UserId,
    ) -> Result<A>
    where
        A: FulfillmentTransaction + Clone,
        DomainError: From<A::Error>,
    {
        let transaction = handler.load(transaction_id).await?;
        let delivery_id = transaction.delivery_id().ok_or(FulfillmentError::NoDelivery)?;

        // The personnel and state checks live in the delivery aggregate.
        self.deliveries
            .execute(delivery_id, |delivery| delivery.mark_delivered(personnel_id))
            .await?;

        let result = handler
            .execute(transaction_id, |transaction| transaction.complete())
            .await?;
        let transaction = result.aggregate;

        metrics::counter!("deliveries_completed_total", "kind" => A::KIND).increment(1);
        tracing::info!(%transaction_id, %delivery_id, kind = A::KIND, "delivery completed");

        if let Some(listing_id) = transaction.listing_id() {
            self.finalize_listing::<A>(listing_id).await;
        }

        Ok(transaction)
    }

    async fn cancel_generic<A>(
        &self,
        handler: &CommandHandler<S, A>,
        transaction_id: AggregateId,
        actor: UserId,
        reason: String,
    ) -> Result<A>
    where
        A: FulfillmentTransaction + Clone,
        DomainError: From<A::Error>,
    {
        // A failed delivery unlocks cancellation even after pickup was
        // authorized; otherwise the transaction and its listing would be
        // stuck with no party able to resolve them.
        let snapshot = handler.load(transaction_id).await?;
        let delivery_failed = match snapshot.delivery_id() {
            Some(delivery_id) => self
                .deliveries
                .load_existing(delivery_id)
                .await?
                .is_some_and(|delivery| delivery.status() == DeliveryStatus::Failed),
            None => false,
        };

        let result = handler
            .execute(transaction_id, |transaction| {
                transaction.cancel(actor, reason, delivery_failed)
            })
            .await?;
        let transaction = result.aggregate;

        metrics::counter!("transactions_cancelled_total", "kind" => A::KIND).increment(1);
        tracing::info!(%transaction_id, kind = A::KIND, "transaction cancelled");

        if let Some(listing_id) = transaction.listing_id() {
            self.release_listing(listing_id).await;
        }

        Ok(transaction)
    }

    async fn schedule_delivery_if_needed(
        &self,
        transaction: TransactionRef,
        delivery_type: DeliveryType,
        address: Option<&str>,
    ) -> Result<Option<AggregateId>> {
        if !delivery_type.needs_delivery() {
            return Ok(None);
        }

        let address = address.unwrap_or_default().to_string();
        let delivery_id = AggregateId::new();
        self.deliveries
            .execute(delivery_id, |delivery| {
                delivery.schedule(delivery_id, transaction, address)
            })
            .await?;

        Ok(Some(delivery_id))
    }

    /// Finalizes the listing of a completed transaction. Best effort: the
    /// transaction is already terminal, so a failure here is logged and
    /// left for reconciliation rather than reported to the caller.
    async fn finalize_listing<A: FulfillmentTransaction>(&self, listing_id: AggregateId) {
        let outcome = A::success_outcome();
        if let Err(e) = self
            .listings
            .execute(listing_id, |listing| listing.finalize(outcome))
            .await
        {
            tracing::warn!(%listing_id, error = %e, "failed to finalize listing");
        }
    }

    /// Releases a listing reservation. Best effort, same as finalize.
    async fn release_listing(&self, listing_id: AggregateId) {
        if let Err(e) = self
            .listings
            .execute(listing_id, |listing| listing.release())
            .await
        {
            tracing::warn!(%listing_id, error = %e, "failed to release listing reservation");
        }
    }

    async fn transaction_parties(&self, transaction: Option<TransactionRef>) -> Vec<UserId> {
        match transaction {
            Some(TransactionRef::Order(order_id)) => match self.orders.load_existing(order_id).await
            {
                Ok(Some(order)) => [order.buyer_id(), order.seller_id()]
                    .into_iter()
                    .flatten()
                    .collect(),
                _ => vec![],
            },
            Some(TransactionRef::Claim(claim_id)) => match self.claims.load_existing(claim_id).await
            {
                Ok(Some(claim)) => [claim.charity_id(), claim.donor_id()]
                    .into_iter()
                    .flatten()
                    .collect(),
                _ => vec![],
            },
            None => vec![],
        }
    }

    /// Emits a notification; failures are logged, never surfaced.
    async fn notify(
        &self,
        recipient: UserId,
        topic: NotificationTopic,
        message: &str,
        transaction: Option<TransactionRef>,
    ) {
        let notification = Notification::new(recipient, topic, message, transaction);
        if let Err(e) = self.notifier.dispatch(notification).await {
            metrics::counter!("notifications_dropped_total").increment(1);
            tracing::warn!(%recipient, %topic, error = %e, "notification dispatch failed");
        }
    }

    async fn require_listing(&self, listing_id: AggregateId) -> Result<Listing> {
        self.listings
            .load_existing(listing_id)
            .await?
            .ok_or(FulfillmentError::ListingNotFound(listing_id))
    }

    async fn require_order(&self, order_id: AggregateId) -> Result<Order> {
        self.orders
            .load_existing(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))
    }

    async fn require_claim(&self, claim_id: AggregateId) -> Result<DonationClaim> {
        self.claims
            .load_existing(claim_id)
            .await?
            .ok_or(FulfillmentError::ClaimNotFound(claim_id))
    }

    async fn require_delivery(&self, delivery_id: AggregateId) -> Result<Delivery> {
        self.deliveries
            .load_existing(delivery_id)
            .await?
            .ok_or(FulfillmentError::DeliveryNotFound(delivery_id))
    }
}
