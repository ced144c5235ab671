//! Donation claim endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use domain::{Aggregate, DeliveryType, DonationClaim, UserId};
use event_store::EventStore;
use fulfillment::CreateClaimRequest;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{AppState, actor_id, maybe_actor_id, parse_aggregate_id};

// -- Request types --

#[derive(Deserialize)]
pub struct FileClaimRequest {
    pub delivery_type: DeliveryType,
    pub delivery_address: Option<String>,
    pub claim_notes: Option<String>,
}

#[derive(Deserialize)]
pub struct PickupRequest {
    pub pickup_code: String,
}

#[derive(Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct ClaimResponse {
    pub id: String,
    pub listing_id: String,
    pub charity_id: String,
    pub donor_id: String,
    pub delivery_type: String,
    pub delivery_address: Option<String>,
    pub status: String,
    pub pickup_authorized: bool,
    pub delivery_id: Option<String>,
    pub claim_notes: Option<String>,
    /// Only present for the charity, who shows it at handover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_code: Option<String>,
}

pub fn claim_to_response(claim: &DonationClaim, viewer: Option<UserId>) -> ClaimResponse {
    let is_charity = viewer.is_some() && viewer == claim.charity_id();
    ClaimResponse {
        id: claim.id().map(|id| id.to_string()).unwrap_or_default(),
        listing_id: claim
            .listing_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        charity_id: claim
            .charity_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        donor_id: claim
            .donor_id()
            .map(|id| id.to_string())
            .unwrap_or_default(),
        delivery_type: claim
            .delivery_type()
            .map(|d| d.as_str().to_string())
            .unwrap_or_default(),
        delivery_address: claim.delivery_address().map(String::from),
        status: claim.status().as_str().to_string(),
        pickup_authorized: claim.pickup_authorized(),
        delivery_id: claim.delivery_id().map(|id| id.to_string()),
        claim_notes: claim.claim_notes().map(String::from),
        pickup_code: is_charity
            .then(|| claim.pickup_code().map(|c| c.as_str().to_string()))
            .flatten(),
    }
}

// -- Handlers --

/// POST /listings/:id/claims — file a claim against a donation listing.
#[tracing::instrument(skip(state, headers, req))]
pub async fn create<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<FileClaimRequest>,
) -> Result<(axum::http::StatusCode, Json<ClaimResponse>), ApiError> {
    let listing_id = parse_aggregate_id(&id)?;
    let charity = actor_id(&headers)?;

    let claim = state
        .coordinator
        .create_claim(
            listing_id,
            charity,
            CreateClaimRequest {
                delivery_type: req.delivery_type,
                delivery_address: req.delivery_address,
                claim_notes: req.claim_notes,
            },
        )
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(claim_to_response(&claim, Some(charity))),
    ))
}

/// GET /claims/:id — load a claim by ID.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_aggregate_id(&id)?;
    let viewer = maybe_actor_id(&headers)?;

    let claim = state
        .coordinator
        .get_claim(claim_id)
        .await?
        .ok_or(ApiError::Fulfillment(
            fulfillment::FulfillmentError::ClaimNotFound(claim_id),
        ))?;

    Ok(Json(claim_to_response(&claim, viewer)))
}

/// POST /claims/:id/approve — donor approves the claim.
#[tracing::instrument(skip(state, headers))]
pub async fn approve<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let claim = state.coordinator.approve_claim(claim_id, actor).await?;
    Ok(Json(claim_to_response(&claim, Some(actor))))
}

/// POST /claims/:id/reject — donor rejects the claim.
#[tracing::instrument(skip(state, headers, req))]
pub async fn reject<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<RejectRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let claim = state
        .coordinator
        .reject_claim(claim_id, actor, req.reason)
        .await?;
    Ok(Json(claim_to_response(&claim, Some(actor))))
}

/// POST /claims/:id/pickup — donor authorizes pickup with the code.
#[tracing::instrument(skip(state, headers, req))]
pub async fn pickup<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PickupRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let claim = state
        .coordinator
        .authorize_claim_pickup(claim_id, actor, &req.pickup_code)
        .await?;
    Ok(Json(claim_to_response(&claim, Some(actor))))
}

/// POST /claims/:id/delivered — assigned personnel reports handover.
#[tracing::instrument(skip(state, headers))]
pub async fn delivered<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let claim = state
        .coordinator
        .complete_claim_delivery(claim_id, actor)
        .await?;
    Ok(Json(claim_to_response(&claim, Some(actor))))
}

/// POST /claims/:id/cancel — charity or donor cancels the claim.
#[tracing::instrument(skip(state, headers, req))]
pub async fn cancel<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<CancelRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim_id = parse_aggregate_id(&id)?;
    let actor = actor_id(&headers)?;

    let claim = state
        .coordinator
        .cancel_claim(claim_id, actor, req.reason)
        .await?;
    Ok(Json(claim_to_response(&claim, Some(actor))))
}
