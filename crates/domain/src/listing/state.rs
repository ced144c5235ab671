//! Listing availability state machine.

use serde::{Deserialize, Serialize};

/// The availability status of a food listing.
///
/// Status transitions:
/// ```text
/// Active ──┬──► Pending ──► Sold          (sale listing)
///          │       │
///          ├──► Claimed ──► Completed     (donation listing)
///          │       │
///          │◄──────┘  (release on cancel/reject)
///          │
///          ├──► Expired
///          └──► Removed
/// ```
///
/// A reserved listing (Pending or Claimed) returns to Active when its
/// owning transaction is cancelled or rejected before completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    /// Listing is available; a transaction can be opened against it.
    #[default]
    Active,

    /// Reserved by a donation claim awaiting approval/pickup.
    Claimed,

    /// Reserved by an order awaiting pickup authorization.
    Pending,

    /// Sale concluded (terminal).
    Sold,

    /// Donation concluded (terminal).
    Completed,

    /// Listing lapsed without a transaction (terminal).
    Expired,

    /// Removed by platform administration (terminal).
    Removed,

    /// Withdrawn by its owner before any transaction (terminal).
    Cancelled,
}

impl ListingStatus {
    /// Returns true if a new transaction can reserve the listing.
    pub fn can_reserve(&self) -> bool {
        matches!(self, ListingStatus::Active)
    }

    /// Returns true if the listing holds a releasable reservation.
    pub fn can_release(&self) -> bool {
        matches!(self, ListingStatus::Claimed | ListingStatus::Pending)
    }

    /// Returns true if the listing can be finalized from this status.
    pub fn can_finalize(&self) -> bool {
        matches!(self, ListingStatus::Claimed | ListingStatus::Pending)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ListingStatus::Sold
                | ListingStatus::Completed
                | ListingStatus::Expired
                | ListingStatus::Removed
                | ListingStatus::Cancelled
        )
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Claimed => "CLAIMED",
            ListingStatus::Pending => "PENDING",
            ListingStatus::Sold => "SOLD",
            ListingStatus::Completed => "COMPLETED",
            ListingStatus::Expired => "EXPIRED",
            ListingStatus::Removed => "REMOVED",
            ListingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The terminal success status a finalized listing lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingOutcome {
    /// The owning order completed; listing becomes SOLD.
    Sold,

    /// The owning donation claim completed; listing becomes COMPLETED.
    Completed,
}

impl ListingOutcome {
    /// Returns the listing status this outcome maps to.
    pub fn status(&self) -> ListingStatus {
        match self {
            ListingOutcome::Sold => ListingStatus::Sold,
            ListingOutcome::Completed => ListingStatus::Completed,
        }
    }
}
