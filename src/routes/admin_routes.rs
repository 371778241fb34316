use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{AdminBookingListQuery, DecisionRequest};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleStatusRequest};
use crate::dto::ApiResponse;
use crate::models::{ActorContext, Booking, Vehicle};
use crate::services::{Decision, PendingReview};
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult, BookingError};

const APPROVAL_CONFLICT: &str = "Cannot approve: conflicting booking";
const DECISION_FAILED: &str = "The decision could not be recorded, refresh the booking and try again";

/// Admin routes, mounted under `/api/admin` behind the admin guard
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/pending", get(list_pending))
        .route("/bookings/:id/decision", post(decide_booking))
        .route("/vehicles", post(create_vehicle))
        .route("/vehicles/:id", put(update_vehicle).delete(delete_vehicle))
        .route("/vehicles/:id/status", put(set_vehicle_status))
}

async fn list_pending(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
) -> AppResult<Json<Vec<PendingReview>>> {
    let reviews = state.approvals.list_pending(&actor).await?;
    Ok(Json(reviews))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(query): Query<AdminBookingListQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state.bookings.list_by_status(&actor, query.status()).await?;
    Ok(Json(bookings))
}

/// Admin-facing wording for a failed decision. Conflicts name the blocking
/// bookings; anything else keeps its status code but gets a message that
/// is safe to act on, with the full error in the log.
fn decision_error(booking_id: Uuid, err: BookingError) -> AppError {
    if let BookingError::SchedulingConflict { conflicts } = err {
        return AppError::Conflict {
            message: APPROVAL_CONFLICT.to_string(),
            conflicts,
        };
    }

    tracing::error!("❌ Decision on booking {} failed: {}", booking_id, err);
    match AppError::from(err) {
        AppError::NotFound(_) => AppError::NotFound(DECISION_FAILED.to_string()),
        AppError::Forbidden(_) => AppError::Forbidden(DECISION_FAILED.to_string()),
        AppError::BadRequest(_) => AppError::BadRequest(DECISION_FAILED.to_string()),
        AppError::Conflict { .. } => AppError::conflict(DECISION_FAILED),
        other => other,
    }
}

async fn decide_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<Uuid>,
    Json(request): Json<DecisionRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    request.validate()?;

    let booking = state
        .approvals
        .decide(&actor, id, request.decision, request.notes)
        .await
        .map_err(|e| decision_error(id, e))?;

    let message = match request.decision {
        Decision::Approve => "Booking approved",
        Decision::Reject => "Booking rejected",
    };
    Ok(Json(ApiResponse::success_with_message(booking, message)))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Vehicle>>)> {
    let response = state.vehicles.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let response = state.vehicles.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state.vehicles.delete(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Vehicle deleted successfully"
    })))
}

async fn set_vehicle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VehicleStatusRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let response = state.vehicles.set_status(id, request.status).await?;
    Ok(Json(response))
}
