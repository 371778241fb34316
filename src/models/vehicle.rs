//! Vehicle model
//!
//! Maps the `vehicles` table. The `status` column is owned by the booking
//! lifecycle; inventory edits go through [`VehicleChanges`] which never
//! touches it.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use chrono::{DateTime, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;

/// Vehicle category - maps to the ENUM vehicle_category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[sqlx(type_name = "vehicle_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleCategory {
    TwoWheeler,
    FourWheeler,
    Heavy,
}

impl VehicleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::TwoWheeler => "two_wheeler",
            VehicleCategory::FourWheeler => "four_wheeler",
            VehicleCategory::Heavy => "heavy",
        }
    }
}

/// Operational status - maps to the ENUM vehicle_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    Booked,
    Maintenance,
    OutOfService,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Booked => "booked",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::OutOfService => "out_of_service",
        }
    }

    /// Whether new bookings may be taken against the vehicle.
    pub fn is_rentable(&self) -> bool {
        matches!(self, VehicleStatus::Available | VehicleStatus::Booked)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub category: VehicleCategory,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: Option<String>,
    pub daily_rate: Decimal,
    pub hourly_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub status: VehicleStatus,
    pub seating_capacity: Option<i32>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub image_path: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inventory entry for a new vehicle. Vehicles always start `available`.
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub category: VehicleCategory,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: Option<String>,
    pub daily_rate: Decimal,
    pub hourly_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub seating_capacity: Option<i32>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub image_path: Option<String>,
    pub description: Option<String>,
}

/// Partial update of descriptive fields and rates
#[derive(Debug, Clone, Default)]
pub struct VehicleChanges {
    pub category: Option<VehicleCategory>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
    pub daily_rate: Option<Decimal>,
    pub hourly_rate: Option<Decimal>,
    pub weekly_rate: Option<Decimal>,
    pub seating_capacity: Option<i32>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub image_path: Option<String>,
    pub description: Option<String>,
}

impl VehicleChanges {
    /// Apply the changes on top of an existing row, keeping unset fields.
    pub fn apply_to(self, current: &Vehicle) -> Vehicle {
        Vehicle {
            id: current.id,
            category: self.category.unwrap_or(current.category),
            make: self.make.unwrap_or_else(|| current.make.clone()),
            model: self.model.unwrap_or_else(|| current.model.clone()),
            year: self.year.unwrap_or(current.year),
            license_plate: self.license_plate.unwrap_or_else(|| current.license_plate.clone()),
            color: self.color.or_else(|| current.color.clone()),
            daily_rate: self.daily_rate.unwrap_or(current.daily_rate),
            hourly_rate: self.hourly_rate.or(current.hourly_rate),
            weekly_rate: self.weekly_rate.or(current.weekly_rate),
            status: current.status,
            seating_capacity: self.seating_capacity.or(current.seating_capacity),
            transmission: self.transmission.or_else(|| current.transmission.clone()),
            fuel_type: self.fuel_type.or_else(|| current.fuel_type.clone()),
            image_path: self.image_path.or_else(|| current.image_path.clone()),
            description: self.description.or_else(|| current.description.clone()),
            created_at: current.created_at,
        }
    }
}

/// Filters for vehicle listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleFilters {
    pub category: Option<VehicleCategory>,
    pub status: Option<VehicleStatus>,
}

impl VehicleFilters {
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        self.category.map_or(true, |c| c == vehicle.category)
            && self.status.map_or(true, |s| s == vehicle.status)
    }
}
