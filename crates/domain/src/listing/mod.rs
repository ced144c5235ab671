//! Listing aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::Listing;
pub use events::{
    ListingEvent, ListingFinalizedData, ListingPostedData, ListingReleasedData,
    ListingRemovedData, ListingReservedData,
};
pub use state::{ListingOutcome, ListingStatus};

use thiserror::Error;

/// Errors that can occur during listing operations.
#[derive(Debug, Error)]
pub enum ListingError {
    /// Listing is already posted.
    #[error("Listing already posted")]
    AlreadyPosted,

    /// Listing title is required.
    #[error("Listing title is required")]
    TitleRequired,

    /// Listing is not available for reservation.
    #[error("Listing not available: current status is {current_status}")]
    NotAvailable { current_status: ListingStatus },

    /// Listing is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: ListingStatus,
        action: &'static str,
    },

    /// No transaction holds a reservation on this listing.
    #[error("Listing has no active reservation")]
    NoActiveReservation,

    /// Donation listings must carry a zero price.
    #[error("Donation listing must be free, got price {price}")]
    DonationMustBeFree { price: i64 },

    /// Sale listings must carry a positive price.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// Orders cannot be placed against donation listings.
    #[error("Donation listings can only be claimed, not purchased")]
    DonationNotPurchasable,

    /// Claims can only be filed against donation listings.
    #[error("Listing is not a donation")]
    NotADonation,
}
