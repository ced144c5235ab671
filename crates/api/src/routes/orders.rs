//! Order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use domain::{Aggregate, DeliveryType, Money, Order, PaymentStatus, UserId};
use event_store::EventStore;
use fulfillment::CreateOrderRequest;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{AppState, actor_id, maybe_actor_id, parse_aggregate_id};

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    pub proposed_price_cents: Option<i64>,
    pub order_notes: Option<String>,
}

#[derive(Deserialize)]
pub struct PickupRequest {
    pub pickup_code: String,
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    pub status: PaymentStatus,
    pub payment_ref: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub listing_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub delivery_type: String,
    pub delivery_address: Option<String>,
    pub final_price_cents: i64,
    pub status: String,
    pub payment_status: String,
    pub pickup_authorized: bool,
    pub delivery_id: Option<String>,
    pub order_notes: Option<String>,
    /// Only present for the buyer, who shows it at handover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_code: Option<String>,
}

pub fn order_to_response(order: &Order, viewer: Option<UserId>) -> OrderResponse {
    let is_buyer = viewer.is_some() && viewer == order.buyer_id();
    OrderResponse {
        id: order.id().map(|id| id.to_string()).unwrap_or_default(),
        listing_id: order
            .listing_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        buyer_id: order
            .buyer_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        seller_id: order
            .seller_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        delivery_type: order
            .delivery_type()
            .map(|d| d.as_str().to_string())
            .unwrap_or_default(),
        delivery_address: order.delivery_address().map(String::from),
        final_price_cents: order.final_price().cents(),
        status: order.status().as_str().to_string(),
        payment_status: order.payment_status().as_str().to_string(),
        pickup_authorized: order.pickup_authorized(),
        delivery_id: order.delivery_id().map(|id| id.to_string()),
        order_notes: order.order_notes().map(String::from),
        pickup_code: is_buyer
            .then(|| order.pickup_code().map(|c| c.as_str().to_string()))
            .flatten(),
    }
}

// -- Handlers --

/// POST /listings/:id/orders — place an order against a listing.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let listing_id = parse_aggregate_id(&id)?;
    let buyer = actor_id(&headers)?;

    let order = state
        .coordinator
        .create_order(
            listing_id,
            buyer,
            CreateOrderRequest {
                delivery_type: req.delivery_type,
                delivery_address: req.delivery_address,
                proposed_price: req.proposed_price_cents.map(Money::from_cents),
                order_notes: req.order_notes,
            },
        )
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(order_to_response(&order, Some(buyer))),
    ))
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_aggregate_id(&id)?;
    let viewer = maybe_actor_id(&headers)?;

    let order = state
        .coordinator
        .get_order(order_id)
        .await?
        .ok_or(ApiError::Fulfillment(
            fulfillment::FulfillmentError::OrderNotFound(order_id),
        ))?;

    Ok(Json(order_to_response(&order, viewer)))
}

/// POST /orders/:id/confirm — seller confirms the order.
#[tracing::instrument(skip(state, headers))]
pub async fn confirm<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let order = state.coordinator.confirm_order(order_id, actor).await?;
    Ok(Json(order_to_response(&order, Some(actor))))
}

/// POST /orders/:id/pickup — seller authorizes pickup with the code.
#[tracing::instrument(skip(state, headers, req))]
pub async fn pickup<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PickupRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let order = state
        .coordinator
        .authorize_order_pickup(order_id, actor, &req.pickup_code)
        .await?;
    Ok(Json(order_to_response(&order, Some(actor))))
}

/// POST /orders/:id/payment — record an external payment outcome.
#[tracing::instrument(skip(state, req))]
pub async fn payment<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_aggregate_id(&id)?;

    let order = state
        .coordinator
        .record_payment(order_id, req.status, req.payment_ref)
        .await?;
    Ok(Json(order_to_response(&order, None)))
}

/// POST /orders/:id/delivered — assigned personnel reports handover.
#[tracing::instrument(skip(state, headers))]
pub async fn delivered<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let order = state
        .coordinator
        .complete_order_delivery(order_id, actor)
        .await?;
    Ok(Json(order_to_response(&order, Some(actor))))
}

/// POST /orders/:id/cancel — buyer or seller cancels the order.
#[tracing::instrument(skip(state, headers, req))]
pub async fn cancel<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CancelRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let order = state
        .coordinator
        .cancel_order(order_id, actor, req.reason)
        .await?;
    Ok(Json(order_to_response(&order, Some(actor))))
}
