//! Route definitions for the API.

use axum::{middleware, routing::get, Json, Router};

use super::handlers;
use super::middleware::auth::{admin_middleware, optional_auth_middleware};
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    // Build OpenAPI spec once at startup
    let openapi = super::openapi::build_openapi();

    Router::new()
        // Health endpoints (no auth required)
        .route("/health", get(handlers::health::health_check))
        .route("/healthz", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // OpenAPI spec
        .route(
            "/api/v1/openapi.json",
            get(move || {
                let doc = openapi.clone();
                async move { Json(doc) }
            }),
        )
        // API v1 routes
        .nest("/api/v1", api_v1_routes(&state))
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: &SharedState) -> Router<SharedState> {
    Router::new()
        // Trip history: anonymous callers are valid, so auth is optional and
        // resolved per request
        .nest(
            "/trips",
            handlers::trips::router().layer(middleware::from_fn_with_state(
                state.identity.clone(),
                optional_auth_middleware,
            )),
        )
        // Audit trail: operators only
        .nest(
            "/audit",
            handlers::audit::router().layer(middleware::from_fn_with_state(
                state.identity.clone(),
                admin_middleware,
            )),
        )
}
