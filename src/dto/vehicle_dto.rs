use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Accessory, DateRange, NewVehicle, Vehicle, VehicleCategory, VehicleChanges, VehicleStatus};
use crate::utils::errors::BookingError;
use crate::utils::validation::{validate_license_plate, validate_not_blank, validate_positive_rate};

// Request to add a vehicle to the fleet
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    pub category: VehicleCategory,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub make: String,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub model: String,
    #[validate(range(min = 1950, max = 2100))]
    pub year: i32,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: String,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(custom = "validate_positive_rate")]
    pub daily_rate: Decimal,
    #[validate(custom = "validate_positive_rate")]
    pub hourly_rate: Option<Decimal>,
    #[validate(custom = "validate_positive_rate")]
    pub weekly_rate: Option<Decimal>,
    #[validate(range(min = 1, max = 100))]
    pub seating_capacity: Option<i32>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub image_path: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl From<CreateVehicleRequest> for NewVehicle {
    fn from(request: CreateVehicleRequest) -> Self {
        Self {
            category: request.category,
            make: request.make.trim().to_string(),
            model: request.model.trim().to_string(),
            year: request.year,
            license_plate: normalize_plate(&request.license_plate),
            color: request.color,
            daily_rate: request.daily_rate,
            hourly_rate: request.hourly_rate,
            weekly_rate: request.weekly_rate,
            seating_capacity: request.seating_capacity,
            transmission: request.transmission,
            fuel_type: request.fuel_type,
            image_path: request.image_path,
            description: request.description,
        }
    }
}

// Request to edit a vehicle; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    pub category: Option<VehicleCategory>,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub make: Option<String>,
    #[validate(length(min = 1, max = 100), custom = "validate_not_blank")]
    pub model: Option<String>,
    #[validate(range(min = 1950, max = 2100))]
    pub year: Option<i32>,
    #[validate(custom = "validate_license_plate")]
    pub license_plate: Option<String>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[validate(custom = "validate_positive_rate")]
    pub daily_rate: Option<Decimal>,
    #[validate(custom = "validate_positive_rate")]
    pub hourly_rate: Option<Decimal>,
    #[validate(custom = "validate_positive_rate")]
    pub weekly_rate: Option<Decimal>,
    #[validate(range(min = 1, max = 100))]
    pub seating_capacity: Option<i32>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub image_path: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl From<UpdateVehicleRequest> for VehicleChanges {
    fn from(request: UpdateVehicleRequest) -> Self {
        Self {
            category: request.category,
            make: request.make.map(|m| m.trim().to_string()),
            model: request.model.map(|m| m.trim().to_string()),
            year: request.year,
            license_plate: request.license_plate.as_deref().map(normalize_plate),
            color: request.color,
            daily_rate: request.daily_rate,
            hourly_rate: request.hourly_rate,
            weekly_rate: request.weekly_rate,
            seating_capacity: request.seating_capacity,
            transmission: request.transmission,
            fuel_type: request.fuel_type,
            image_path: request.image_path,
            description: request.description,
        }
    }
}

// Accessory offered with a vehicle
#[derive(Debug, Serialize)]
pub struct AccessoryOffer {
    pub accessory: Accessory,
    pub label: &'static str,
    pub daily_rate: Decimal,
}

// Vehicle detail with the accessories customers can add
#[derive(Debug, Serialize)]
pub struct VehicleDetails {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub accessories: Vec<AccessoryOffer>,
}

impl VehicleDetails {
    pub fn new(vehicle: Vehicle, offered: Vec<(Accessory, Decimal)>) -> Self {
        let accessories = offered
            .into_iter()
            .map(|(accessory, daily_rate)| AccessoryOffer {
                accessory,
                label: accessory.label(),
                daily_rate,
            })
            .collect();
        Self { vehicle, accessories }
    }
}

// Request to change a vehicle's operational status
#[derive(Debug, Deserialize)]
pub struct VehicleStatusRequest {
    pub status: VehicleStatus,
}

// Date range query for the availability endpoint
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
}

impl AvailabilityQuery {
    pub fn range(&self) -> Result<DateRange, BookingError> {
        DateRange::new(self.pickup_date, self.return_date)
    }
}

// Availability response
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub vehicle_id: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub available: bool,
    pub conflicting_bookings: Vec<Uuid>,
}

/// Plates are stored upper-case with single spaces
fn normalize_plate(plate: &str) -> String {
    plate.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}
