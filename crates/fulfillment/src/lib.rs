//! Fulfillment orchestration for listings, orders, donation claims and
//! deliveries.
//!
//! The coordinator is the single entry point for the transaction
//! lifecycle:
//! 1. A listing is posted and, on the first order or claim, reserved
//! 2. A pickup code is minted for the new transaction
//! 3. The proprietor authorizes pickup by presenting the correct code
//! 4. Self-pickup completes immediately; home delivery goes in transit
//!    and completes on handover
//!
//! Failures after the listing reservation release the reservation again,
//! so a listing is never left stuck on a transaction that was never
//! created.

pub mod coordinator;
pub mod error;
pub mod notify;

pub use coordinator::{CreateClaimRequest, CreateOrderRequest, FulfillmentCoordinator};
pub use error::{ErrorKind, FulfillmentError, Result};
pub use notify::{
    DispatchError, InMemoryNotificationDispatcher, Notification, NotificationDispatcher,
    NotificationTopic,
};
