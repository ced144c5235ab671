//! Delivery endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use domain::{Aggregate, Delivery, PersonnelType, UserId};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{AppState, actor_id, parse_aggregate_id};

// -- Request types --

#[derive(Deserialize)]
pub struct AssignPersonnelRequest {
    pub personnel_id: UserId,
    pub personnel_type: PersonnelType,
}

#[derive(Deserialize)]
pub struct FailDeliveryRequest {
    pub reason: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct DeliveryResponse {
    pub id: String,
    pub transaction_kind: String,
    pub transaction_id: String,
    pub delivery_address: String,
    pub personnel_id: Option<String>,
    pub personnel_type: Option<String>,
    pub status: String,
    pub failure_reason: Option<String>,
}

pub fn delivery_to_response(delivery: &Delivery) -> DeliveryResponse {
    DeliveryResponse {
        id: delivery.id().map(|id| id.to_string()).unwrap_or_default(),
        transaction_kind: delivery
            .transaction()
            .map(|t| t.kind().to_string())
            .unwrap_or_default(),
        transaction_id: delivery
            .transaction()
            .map(|t| t.id().to_string())
            .unwrap_or_default(),
        delivery_address: delivery.delivery_address().to_string(),
        personnel_id: delivery.personnel_id().map(|id| id.to_string()),
        personnel_type: delivery
            .personnel_type()
            .map(|p| p.as_str().to_string()),
        status: delivery.status().as_str().to_string(),
        failure_reason: delivery.failure_reason().map(String::from),
    }
}

// -- Handlers --

/// GET /deliveries/:id — load a delivery by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery_id = parse_aggregate_id(&id)?;

    let delivery = state
        .coordinator
        .get_delivery(delivery_id)
        .await?
        .ok_or(ApiError::Fulfillment(
            fulfillment::FulfillmentError::DeliveryNotFound(delivery_id),
        ))?;

    Ok(Json(delivery_to_response(&delivery)))
}

/// POST /deliveries/:id/assign — assign delivery personnel.
#[tracing::instrument(skip(state, req))]
pub async fn assign<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AssignPersonnelRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery_id = parse_aggregate_id(&id)?;

    let delivery = state
        .coordinator
        .assign_personnel(delivery_id, req.personnel_id, req.personnel_type)
        .await?;
    Ok(Json(delivery_to_response(&delivery)))
}

/// POST /deliveries/:id/fail — assigned personnel reports failure.
#[tracing::instrument(skip(state, headers, req))]
pub async fn fail<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<FailDeliveryRequest>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let delivery = state
        .coordinator
        .fail_delivery(delivery_id, actor, req.reason)
        .await?;
    Ok(Json(delivery_to_response(&delivery)))
}
