//! Domain layer for the food transaction fulfillment core.
//!
//! This crate provides the state machines governing a food transaction's
//! lifecycle:
//! - `Listing` aggregate owning a listing's availability status
//! - `Order` aggregate for paid transactions
//! - `DonationClaim` aggregate for no-payment donation transactions
//! - `Delivery` aggregate tracking the physical handoff
//! - `PickupCode` single-use secret authorizing pickup
//!
//! Aggregates are event-sourced: commands are pure functions from current
//! state to a list of events, persisted with optimistic concurrency by the
//! `CommandHandler`.

pub mod aggregate;
pub mod claim;
pub mod command;
pub mod delivery;
pub mod error;
pub mod listing;
pub mod order;
pub mod pickup;
pub mod transaction;
pub mod value_objects;

pub use aggregate::{Aggregate, DomainEvent};
pub use claim::{ClaimError, ClaimEvent, ClaimStatus, DonationClaim};
pub use command::{CommandHandler, CommandResult};
pub use delivery::{Delivery, DeliveryError, DeliveryEvent, DeliveryStatus, PersonnelType};
pub use error::DomainError;
pub use listing::{Listing, ListingError, ListingEvent, ListingOutcome, ListingStatus};
pub use order::{Order, OrderError, OrderEvent, OrderStatus, PaymentStatus};
pub use pickup::{PICKUP_CODE_LEN, PickupCode, PickupCodeError};
pub use transaction::FulfillmentTransaction;
pub use value_objects::{DeliveryType, Money, TransactionRef, UserId};
