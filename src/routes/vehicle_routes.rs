use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::dto::vehicle_dto::{AvailabilityQuery, AvailabilityResponse, VehicleDetails};
use crate::models::{ActorContext, Vehicle, VehicleFilters};
use crate::state::AppState;
use crate::utils::errors::AppResult;

/// Catalogue routes, mounted under `/api/vehicles`
pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
        .route("/:id/availability", get(check_availability))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    Query(filters): Query<VehicleFilters>,
) -> AppResult<Json<Vec<Vehicle>>> {
    let vehicles = state.vehicles.list(&actor, filters).await?;
    Ok(Json(vehicles))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<VehicleDetails>> {
    let vehicle = state.vehicles.get_by_id(id).await?;
    let offered = state.bookings.offered_accessories(vehicle.category);
    Ok(Json(VehicleDetails::new(vehicle, offered)))
}

async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let range = query.range()?;
    let availability = state.availability.check(id, &range, None).await?;

    Ok(Json(AvailabilityResponse {
        vehicle_id: id,
        pickup_date: range.start(),
        return_date: range.end(),
        available: availability.available,
        conflicting_bookings: availability.conflicts,
    }))
}
