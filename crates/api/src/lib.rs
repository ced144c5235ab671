//! HTTP API server with observability for the fulfillment system.
//!
//! Provides REST endpoints for listings, orders, donation claims and
//! deliveries, with structured logging (tracing) and Prometheus metrics.
//! The acting user is taken from the `X-Actor-Id` header; authentication
//! happens upstream of this service.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use event_store::EventStore;
use fulfillment::{FulfillmentCoordinator, InMemoryNotificationDispatcher};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: EventStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/listings", post(routes::listings::create::<S>))
        .route("/listings/{id}", get(routes::listings::get::<S>))
        .route("/listings/{id}", delete(routes::listings::remove::<S>))
        .route("/listings/{id}/events", get(routes::events::<S>))
        .route("/listings/{id}/orders", post(routes::orders::create::<S>))
        .route("/listings/{id}/claims", post(routes::claims::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/confirm", post(routes::orders::confirm::<S>))
        .route("/orders/{id}/pickup", post(routes::orders::pickup::<S>))
        .route("/orders/{id}/payment", post(routes::orders::payment::<S>))
        .route(
            "/orders/{id}/delivered",
            post(routes::orders::delivered::<S>),
        )
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S>))
        .route("/orders/{id}/events", get(routes::events::<S>))
        .route("/claims/{id}", get(routes::claims::get::<S>))
        .route("/claims/{id}/approve", post(routes::claims::approve::<S>))
        .route("/claims/{id}/reject", post(routes::claims::reject::<S>))
        .route("/claims/{id}/pickup", post(routes::claims::pickup::<S>))
        .route(
            "/claims/{id}/delivered",
            post(routes::claims::delivered::<S>),
        )
        .route("/claims/{id}/cancel", post(routes::claims::cancel::<S>))
        .route("/claims/{id}/events", get(routes::events::<S>))
        .route("/deliveries/{id}", get(routes::deliveries::get::<S>))
        .route(
            "/deliveries/{id}/assign",
            post(routes::deliveries::assign::<S>),
        )
        .route("/deliveries/{id}/fail", post(routes::deliveries::fail::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state over the given event store.
pub fn create_default_state<S: EventStore + Clone + 'static>(event_store: S) -> Arc<AppState<S>> {
    let dispatcher = InMemoryNotificationDispatcher::new();
    let coordinator = FulfillmentCoordinator::new(event_store.clone(), dispatcher.clone());

    Arc::new(AppState {
        coordinator,
        dispatcher,
        event_store,
    })
}
