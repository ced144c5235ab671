//! Listing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use domain::{Aggregate, Listing, Money};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{AppState, actor_id, parse_aggregate_id};

// -- Request types --

#[derive(Deserialize)]
pub struct CreateListingRequest {
    pub title: String,
    pub is_donation: bool,
    #[serde(default)]
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct RemoveListingRequest {
    pub reason: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct ListingResponse {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub is_donation: bool,
    pub price_cents: i64,
    pub status: String,
    pub reserved_for: Option<ReservationResponse>,
}

#[derive(Serialize)]
pub struct ReservationResponse {
    pub kind: String,
    pub id: String,
}

pub fn listing_to_response(listing: &Listing) -> ListingResponse {
    ListingResponse {
        id: listing.id().map(|id| id.to_string()).unwrap_or_default(),
        owner_id: listing
            .owner_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        title: listing.title().to_string(),
        is_donation: listing.is_donation(),
        price_cents: listing.price().cents(),
        status: listing.status().as_str().to_string(),
        reserved_for: listing.reserved_for().map(|r| ReservationResponse {
            kind: r.kind().to_string(),
            id: r.id().to_string(),
        }),
    }
}

// -- Handlers --

/// POST /listings — post a new listing owned by the acting user.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Json(req): Json<CreateListingRequest>,
) -> Result<(axum::http::StatusCode, Json<ListingResponse>), ApiError> {
    let owner = actor_id(&headers)?;

    let listing = state
        .coordinator
        .post_listing(
            owner,
            req.title,
            req.is_donation,
            Money::from_cents(req.price_cents),
        )
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(listing_to_response(&listing)),
    ))
}

/// GET /listings/:id — load a listing by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing_id = parse_aggregate_id(&id)?;
    let listing = state
        .coordinator
        .get_listing(listing_id)
        .await?
        .ok_or(ApiError::Fulfillment(
            fulfillment::FulfillmentError::ListingNotFound(listing_id),
        ))?;

    Ok(Json(listing_to_response(&listing)))
}

/// DELETE /listings/:id — remove a listing.
#[tracing::instrument(skip(state, headers, req))]
pub async fn remove<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<RemoveListingRequest>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let listing = state
        .coordinator
        .remove_listing(listing_id, actor, req.reason)
        .await?;

    Ok(Json(listing_to_response(&listing)))
}
