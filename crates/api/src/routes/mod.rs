//! HTTP route handlers and shared application state.

pub mod claims;
pub mod deliveries;
pub mod health;
pub mod listings;
pub mod metrics;
pub mod orders;

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::AggregateId;
use domain::UserId;
use event_store::EventStore;
use fulfillment::{FulfillmentCoordinator, InMemoryNotificationDispatcher};
use serde::Serialize;

use crate::error::ApiError;

/// Header carrying the authenticated user's id.
///
/// Authentication itself happens upstream; the value here is trusted.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// Shared application state accessible from all handlers.
pub struct AppState<S: EventStore + Clone> {
    pub coordinator: FulfillmentCoordinator<S, InMemoryNotificationDispatcher>,
    pub dispatcher: InMemoryNotificationDispatcher,
    pub event_store: S,
}

/// Extracts the acting user from the `X-Actor-Id` header.
pub fn actor_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    maybe_actor_id(headers)?
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {ACTOR_HEADER} header")))
}

/// Extracts the acting user, if the header is present.
pub fn maybe_actor_id(headers: &HeaderMap) -> Result<Option<UserId>, ApiError> {
    let Some(value) = headers.get(ACTOR_HEADER) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {ACTOR_HEADER} header")))?;
    let uuid = uuid::Uuid::parse_str(value)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {ACTOR_HEADER} header: {e}")))?;
    Ok(Some(UserId::from_uuid(uuid)))
}

pub fn parse_aggregate_id(id: &str) -> Result<AggregateId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(AggregateId::from(uuid))
}

/// Response type for event envelope data.
#[derive(Serialize)]
pub struct EventEnvelopeResponse {
    pub event_id: String,
    pub event_type: String,
    pub aggregate_id: String,
    pub version: i64,
    pub timestamp: String,
    pub payload: serde_json::Value,
}

/// GET /{resource}/:id/events — list all events for an aggregate.
#[tracing::instrument(skip(state))]
pub async fn events<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<EventEnvelopeResponse>>, ApiError> {
    let aggregate_id = parse_aggregate_id(&id)?;

    let envelopes = state
        .event_store
        .get_events_for_aggregate(aggregate_id)
        .await
        .map_err(|e| {
            ApiError::Fulfillment(fulfillment::FulfillmentError::Domain(e.into()))
        })?;

    let responses: Vec<EventEnvelopeResponse> = envelopes
        .into_iter()
        .map(|e| {
            // Pickup codes are secrets; they never leave through
            // introspection.
            let mut payload = e.payload;
            if let Some(data) = payload.get_mut("data").and_then(|d| d.as_object_mut()) {
                data.remove("pickup_code");
            }

            EventEnvelopeResponse {
                event_id: e.event_id.to_string(),
                event_type: e.event_type,
                aggregate_id: e.aggregate_id.to_string(),
                version: e.version.as_i64(),
                timestamp: e.timestamp.to_rfc3339(),
                payload,
            }
        })
        .collect();

    Ok(Json(responses))
}
