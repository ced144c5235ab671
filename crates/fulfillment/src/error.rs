//! Fulfillment error types and the caller-facing error taxonomy.

use common::AggregateId;
use domain::{
    ClaimError, DeliveryError, DomainError, ListingError, OrderError, PickupCodeError,
};
use event_store::EventStoreError;
use thiserror::Error;

/// Caller-facing classification of a fulfillment failure.
///
/// Every failure is recoverable by the caller; none is fatal to the
/// process. The API layer maps each kind to an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong current state for the requested transition. The response
    /// includes the current state so the client can resync.
    Precondition,

    /// Actor is not entitled to act on this transaction.
    Authorization,

    /// A concurrent mutation won the race; refetch and retry once.
    Conflict,

    /// Malformed input; includes pickup code mismatches, which mutate
    /// nothing and leak nothing about near-misses.
    Validation,

    /// The referenced entity does not exist.
    NotFound,

    /// Unexpected internal failure.
    Internal,
}

/// Errors that can occur during fulfillment operations.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// The referenced listing does not exist.
    #[error("Listing not found: {0}")]
    ListingNotFound(AggregateId),

    /// The referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(AggregateId),

    /// The referenced donation claim does not exist.
    #[error("Claim not found: {0}")]
    ClaimNotFound(AggregateId),

    /// The referenced delivery does not exist.
    #[error("Delivery not found: {0}")]
    DeliveryNotFound(AggregateId),

    /// The transaction has no paired delivery to act on.
    #[error("Transaction has no paired delivery")]
    NoDelivery,

    /// Proposed price does not match the listing price.
    #[error("Proposed price {proposed} does not match listing price {listing}")]
    PriceMismatch { proposed: i64, listing: i64 },

    /// Submitted pickup code is malformed.
    #[error(transparent)]
    PickupCode(#[from] PickupCodeError),

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl FulfillmentError {
    /// Classifies the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FulfillmentError::ListingNotFound(_)
            | FulfillmentError::OrderNotFound(_)
            | FulfillmentError::ClaimNotFound(_)
            | FulfillmentError::DeliveryNotFound(_) => ErrorKind::NotFound,
            FulfillmentError::NoDelivery => ErrorKind::Precondition,
            FulfillmentError::PriceMismatch { .. } => ErrorKind::Validation,
            FulfillmentError::PickupCode(_) => ErrorKind::Validation,
            FulfillmentError::Domain(domain) => classify_domain(domain),
        }
    }
}

fn classify_domain(error: &DomainError) -> ErrorKind {
    match error {
        DomainError::EventStore(EventStoreError::ConcurrencyConflict { .. }) => ErrorKind::Conflict,
        DomainError::EventStore(EventStoreError::AggregateNotFound(_)) => ErrorKind::NotFound,
        DomainError::EventStore(_) => ErrorKind::Internal,
        DomainError::AggregateNotFound { .. } => ErrorKind::NotFound,
        DomainError::Serialization(_) => ErrorKind::Internal,
        DomainError::Listing(listing) => classify_listing(listing),
        DomainError::Order(order) => classify_order(order),
        DomainError::Claim(claim) => classify_claim(claim),
        DomainError::Delivery(delivery) => classify_delivery(delivery),
    }
}

fn classify_listing(error: &ListingError) -> ErrorKind {
    match error {
        ListingError::TitleRequired
        | ListingError::DonationMustBeFree { .. }
        | ListingError::InvalidPrice { .. } => ErrorKind::Validation,
        ListingError::DonationNotPurchasable | ListingError::NotADonation => ErrorKind::Validation,
        ListingError::AlreadyPosted
        | ListingError::NotAvailable { .. }
        | ListingError::InvalidStateTransition { .. }
        | ListingError::NoActiveReservation => ErrorKind::Precondition,
    }
}

fn classify_order(error: &OrderError) -> ErrorKind {
    match error {
        OrderError::NotSeller | OrderError::NotParticipant => ErrorKind::Authorization,
        OrderError::CodeMismatch
        | OrderError::InvalidPrice { .. }
        | OrderError::AddressRequired
        | OrderError::BuyerIsSeller => ErrorKind::Validation,
        OrderError::AlreadyPlaced
        | OrderError::NotPlaced
        | OrderError::DeliveryRequired
        | OrderError::UnexpectedDelivery
        | OrderError::InvalidStateTransition { .. }
        | OrderError::AlreadyCompleted
        | OrderError::PickupAlreadyAuthorized
        | OrderError::PickupNotAuthorized
        | OrderError::InvalidPaymentTransition { .. } => ErrorKind::Precondition,
    }
}

fn classify_claim(error: &ClaimError) -> ErrorKind {
    match error {
        ClaimError::NotDonor | ClaimError::NotParticipant => ErrorKind::Authorization,
        ClaimError::CodeMismatch | ClaimError::AddressRequired | ClaimError::CharityIsDonor => {
            ErrorKind::Validation
        }
        ClaimError::AlreadyFiled
        | ClaimError::NotFiled
        | ClaimError::DeliveryRequired
        | ClaimError::UnexpectedDelivery
        | ClaimError::InvalidStateTransition { .. }
        | ClaimError::AlreadyCompleted
        | ClaimError::PickupAlreadyAuthorized
        | ClaimError::PickupNotAuthorized => ErrorKind::Precondition,
    }
}

fn classify_delivery(error: &DeliveryError) -> ErrorKind {
    match error {
        DeliveryError::NotAssignedPersonnel => ErrorKind::Authorization,
        DeliveryError::AddressRequired => ErrorKind::Validation,
        DeliveryError::AlreadyScheduled
        | DeliveryError::NotScheduled
        | DeliveryError::InvalidStateTransition { .. } => ErrorKind::Precondition,
    }
}

/// Convenience type alias for fulfillment results.
pub type Result<T> = std::result::Result<T, FulfillmentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{ListingStatus, OrderStatus};

    #[test]
    fn test_not_found_kinds() {
        let id = AggregateId::new();
        assert_eq!(
            FulfillmentError::ListingNotFound(id).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            FulfillmentError::OrderNotFound(id).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_code_mismatch_is_validation() {
        let error = FulfillmentError::Domain(DomainError::Order(OrderError::CodeMismatch));
        assert_eq!(error.kind(), ErrorKind::Validation);

        let error = FulfillmentError::Domain(DomainError::Claim(ClaimError::CodeMismatch));
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_malformed_code_is_validation() {
        let error = FulfillmentError::PickupCode(PickupCodeError::InvalidLength { len: 3 });
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_actor_checks_are_authorization() {
        let error = FulfillmentError::Domain(DomainError::Order(OrderError::NotSeller));
        assert_eq!(error.kind(), ErrorKind::Authorization);

        let error =
            FulfillmentError::Domain(DomainError::Delivery(DeliveryError::NotAssignedPersonnel));
        assert_eq!(error.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_wrong_state_is_precondition() {
        let error = FulfillmentError::Domain(DomainError::Listing(ListingError::NotAvailable {
            current_status: ListingStatus::Pending,
        }));
        assert_eq!(error.kind(), ErrorKind::Precondition);

        let error = FulfillmentError::Domain(DomainError::Order(
            OrderError::InvalidStateTransition {
                current_status: OrderStatus::Completed,
                action: "cancel",
            },
        ));
        assert_eq!(error.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn test_lost_race_is_conflict() {
        let error = FulfillmentError::Domain(DomainError::EventStore(
            EventStoreError::ConcurrencyConflict {
                aggregate_id: AggregateId::new(),
                expected: event_store::Version::new(1),
                actual: event_store::Version::new(2),
            },
        ));
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }
}
