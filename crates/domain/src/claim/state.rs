//! Donation claim state machine.

use serde::{Deserialize, Serialize};

/// The status of a donation claim in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Approved ──► Completed
///           │        │
///           │        └──► Cancelled
///           └──► Rejected
/// ```
///
/// Unlike orders, approval is an explicit donor action distinct from
/// pickup authorization: charities are screened before a donor commits
/// a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Claim filed, awaiting donor approval.
    #[default]
    Pending,

    /// Donor approved the claim; item is being handed off.
    Approved,

    /// Donor rejected the claim (terminal).
    Rejected,

    /// Claim was cancelled after approval (terminal).
    Cancelled,

    /// Item reached the charity (terminal).
    Completed,
}

impl ClaimStatus {
    /// Returns true if the donor can approve or reject in this status.
    pub fn can_decide(&self) -> bool {
        matches!(self, ClaimStatus::Pending)
    }

    /// Returns true if the donor can authorize pickup in this status.
    pub fn can_authorize_pickup(&self) -> bool {
        matches!(self, ClaimStatus::Approved)
    }

    /// Returns true if the claim can be completed in this status.
    pub fn can_complete(&self) -> bool {
        matches!(self, ClaimStatus::Approved)
    }

    /// Returns true if the claim can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        matches!(self, ClaimStatus::Pending | ClaimStatus::Approved)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Rejected | ClaimStatus::Cancelled | ClaimStatus::Completed
        )
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "PENDING",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Rejected => "REJECTED",
            ClaimStatus::Cancelled => "CANCELLED",
            ClaimStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
