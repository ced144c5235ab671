//! Donation claim aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::DonationClaim;
pub use events::{
    ClaimApprovedData, ClaimCancelledData, ClaimCompletedData, ClaimEvent, ClaimFiledData,
    ClaimRejectedData, DeliveryAttachedData, PickupAuthorizedData,
};
pub use state::ClaimStatus;

use thiserror::Error;

/// Errors that can occur during donation claim operations.
#[derive(Debug, Error)]
pub enum ClaimError {
    /// Claim is already filed.
    #[error("Claim already filed")]
    AlreadyFiled,

    /// Claim does not exist yet.
    #[error("Claim has not been filed")]
    NotFiled,

    /// A donor cannot claim their own listing.
    #[error("Charity and donor cannot be the same user")]
    CharityIsDonor,

    /// HOME_DELIVERY claims require a destination address.
    #[error("Delivery address is required for HOME_DELIVERY")]
    AddressRequired,

    /// HOME_DELIVERY claims require a paired delivery at approval.
    #[error("HOME_DELIVERY claims require a paired delivery")]
    DeliveryRequired,

    /// SELF_PICKUP claims cannot carry a delivery record.
    #[error("SELF_PICKUP claims cannot have a paired delivery")]
    UnexpectedDelivery,

    /// Claim is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: ClaimStatus,
        action: &'static str,
    },

    /// Claim already reached COMPLETED.
    #[error("Claim is already completed")]
    AlreadyCompleted,

    /// Only the listing's donor may perform this action.
    #[error("Actor is not the donor of this claim's listing")]
    NotDonor,

    /// Only the charity or donor may perform this action.
    #[error("Actor is not a participant in this claim")]
    NotParticipant,

    /// The submitted pickup code does not match.
    #[error("Pickup code does not match")]
    CodeMismatch,

    /// Pickup was already authorized.
    #[error("Pickup has already been authorized")]
    PickupAlreadyAuthorized,

    /// Completion requires a prior pickup authorization.
    #[error("Pickup has not been authorized")]
    PickupNotAuthorized,
}
