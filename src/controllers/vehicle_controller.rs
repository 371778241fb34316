use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::{ActorContext, Vehicle, VehicleFilters, VehicleStatus};
use crate::repositories::{BookingStore, VehicleStore};
use crate::services::clock::Clock;
use crate::services::settlement::Settlement;
use crate::utils::errors::{not_found_error, AppError};

/// Fleet inventory: public catalogue reads and admin edits.
///
/// A vehicle left `booked` by bookings that ended without anyone reading
/// them is settled before it is shown or edited.
#[derive(Clone)]
pub struct VehicleController {
    store: Arc<dyn VehicleStore>,
    settlement: Settlement,
}

impl VehicleController {
    pub fn new(store: Arc<dyn VehicleStore>, bookings: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            settlement: Settlement::new(bookings, clock),
        }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        let vehicle = self.store.create(request.into()).await?;
        tracing::info!(
            "🚗 Vehicle {} added ({} {} {})",
            vehicle.id,
            vehicle.make,
            vehicle.model,
            vehicle.license_plate
        );

        Ok(ApiResponse::success_with_message(vehicle, "Vehicle created successfully"))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Vehicle, AppError> {
        let vehicle = self.find(id).await?;
        if vehicle.status == VehicleStatus::Booked && self.settlement.settle_vehicle(id).await? > 0 {
            return self.find(id).await;
        }
        Ok(vehicle)
    }

    /// Admins see the whole fleet; customers only vehicles they can book
    pub async fn list(&self, actor: &ActorContext, filters: VehicleFilters) -> Result<Vec<Vehicle>, AppError> {
        let booked = VehicleFilters {
            category: filters.category,
            status: Some(VehicleStatus::Booked),
        };
        for vehicle in self.store.list(&booked).await? {
            self.settlement.settle_vehicle(vehicle.id).await?;
        }

        let vehicles = self.store.list(&filters).await?;
        if actor.is_admin() {
            return Ok(vehicles);
        }

        Ok(vehicles.into_iter().filter(|v| v.status.is_rentable()).collect())
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        let vehicle = self.store.update(id, request.into()).await?;
        tracing::info!("✏️ Vehicle {} updated", vehicle.id);

        Ok(ApiResponse::success_with_message(vehicle, "Vehicle updated successfully"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.settlement.settle_vehicle(id).await?;
        self.store.delete(id).await?;
        tracing::info!("🗑️ Vehicle {} deleted", id);
        Ok(())
    }

    pub async fn set_status(&self, id: Uuid, status: VehicleStatus) -> Result<ApiResponse<Vehicle>, AppError> {
        self.settlement.settle_vehicle(id).await?;
        let vehicle = self.store.set_status(id, status, self.settlement.today()).await?;
        tracing::info!("🔧 Vehicle {} is now {}", vehicle.id, vehicle.status.as_str());

        Ok(ApiResponse::success_with_message(vehicle, "Vehicle status updated"))
    }

    async fn find(&self, id: Uuid) -> Result<Vehicle, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }
}
