//! HTTP routes
//!
//! Everything under `/api` requires a bearer token; `/api/admin` also
//! requires the admin role.

use axum::{middleware::from_fn, middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::middleware::{admin_only_middleware, auth_middleware, cors_layer};
use crate::state::AppState;

pub mod admin_routes;
pub mod booking_routes;
pub mod vehicle_routes;

/// Room for the text fields sent alongside the proof image
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_app_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    let admin = admin_routes::create_admin_router().route_layer(from_fn(admin_only_middleware));

    let api = Router::new()
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/bookings", booking_routes::create_booking_router(body_limit))
        .nest("/api/admin", admin)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "vehicle_rental",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
