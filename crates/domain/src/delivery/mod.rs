//! Delivery aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::Delivery;
pub use events::{
    DeliveryAdvancedData, DeliveryEvent, DeliveryFailedData, DeliveryScheduledData,
    PersonnelAssignedData,
};
pub use state::{DeliveryStatus, PersonnelType};

use thiserror::Error;

/// Errors that can occur during delivery operations.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Delivery is already scheduled.
    #[error("Delivery already scheduled")]
    AlreadyScheduled,

    /// Delivery does not exist yet.
    #[error("Delivery has not been scheduled")]
    NotScheduled,

    /// A destination address is required.
    #[error("Delivery address is required")]
    AddressRequired,

    /// Delivery is not in the expected status.
    #[error("Invalid state transition: cannot {action} from {current_status} status")]
    InvalidStateTransition {
        current_status: DeliveryStatus,
        action: &'static str,
    },

    /// Only the assigned personnel may perform this action.
    #[error("Actor is not the assigned delivery personnel")]
    NotAssignedPersonnel,
}
