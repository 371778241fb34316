//! In-process store
//!
//! Implements both store traits over a single `tokio::sync::Mutex`, which
//! plays the role of the vehicle row lock: every read-check-write sequence
//! runs with the lock held, so the same lifecycle rules apply atomically.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Booking, BookingDraft, BookingStatus, Customer, NewVehicle, Vehicle, VehicleChanges,
    VehicleFilters, VehicleStatus,
};
use crate::repositories::{BookingStore, VehicleStore};
use crate::services::lifecycle::{self, TransitionRequest};
use crate::services::pricing::PricingCalculator;
use crate::utils::errors::BookingError;

#[derive(Default)]
struct State {
    vehicles: HashMap<Uuid, Vehicle>,
    /// Insertion order doubles as submission order
    bookings: Vec<Booking>,
    customers: HashMap<Uuid, Customer>,
}

impl State {
    fn vehicle(&self, id: Uuid) -> Result<&Vehicle, BookingError> {
        self.vehicles.get(&id).ok_or(BookingError::VehicleNotFound(id))
    }

    fn holds(&self, vehicle_id: Uuid) -> Vec<Booking> {
        let mut holds: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.vehicle_id == vehicle_id && b.status.holds_vehicle())
            .cloned()
            .collect();
        holds.sort_by_key(|b| b.pickup_date);
        holds
    }

    fn plate_taken(&self, plate: &str, except: Option<Uuid>) -> bool {
        self.vehicles
            .values()
            .any(|v| Some(v.id) != except && v.license_plate.eq_ignore_ascii_case(plate))
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the contact card of a booking owner
    pub async fn add_customer(&self, customer: Customer) {
        self.state.lock().await.customers.insert(customer.id, customer);
    }

    /// Load an existing booking row as-is, bypassing submission checks.
    /// Used to import legacy data and to build fixtures.
    pub async fn import_booking(&self, booking: Booking) {
        self.state.lock().await.bookings.push(booking);
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn create(
        &self,
        draft: BookingDraft,
        pricing: &PricingCalculator,
        today: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let mut state = self.state.lock().await;
        let vehicle = state.vehicle(draft.vehicle_id)?.clone();
        let holds = state.holds(vehicle.id);
        let booking = lifecycle::plan_submission(&vehicle, &holds, draft, pricing, today)?
            .into_booking(Utc::now());

        state.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn get(&self, id: Uuid) -> Result<Booking, BookingError> {
        let state = self.state.lock().await;
        state
            .bookings
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(BookingError::BookingNotFound(id))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id && status.map_or(true, |s| s == b.status))
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, BookingError> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .iter()
            .filter(|b| b.status == status)
            .cloned()
            .collect())
    }

    async fn list_holds(&self, vehicle_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        Ok(self.state.lock().await.holds(vehicle_id))
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        request: TransitionRequest,
    ) -> Result<Booking, BookingError> {
        let mut state = self.state.lock().await;
        let index = state
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or(BookingError::BookingNotFound(id))?;
        let booking = state.bookings[index].clone();
        let vehicle = state.vehicle(booking.vehicle_id)?.clone();
        let holds = state.holds(vehicle.id);

        let plan = lifecycle::plan_transition(&booking, &vehicle, &holds, &request)?;

        let updated = {
            let row = &mut state.bookings[index];
            row.status = plan.booking_status;
            if plan.admin_notes.is_some() {
                row.admin_notes = plan.admin_notes.clone();
            }
            row.updated_at = Utc::now();
            row.clone()
        };
        if let Some(status) = plan.vehicle_status {
            if let Some(row) = state.vehicles.get_mut(&vehicle.id) {
                row.status = status;
            }
        }

        tracing::info!(
            "📋 Booking {} {} -> {} by {}",
            id,
            booking.status,
            updated.status,
            request.actor
        );
        Ok(updated)
    }

    async fn customer(&self, user_id: Uuid) -> Result<Option<Customer>, BookingError> {
        Ok(self.state.lock().await.customers.get(&user_id).cloned())
    }
}

#[async_trait]
impl VehicleStore for InMemoryStore {
    async fn create(&self, vehicle: NewVehicle) -> Result<Vehicle, BookingError> {
        let mut state = self.state.lock().await;
        if state.plate_taken(&vehicle.license_plate, None) {
            return Err(BookingError::DuplicateLicensePlate(vehicle.license_plate));
        }

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            category: vehicle.category,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            license_plate: vehicle.license_plate,
            color: vehicle.color,
            daily_rate: vehicle.daily_rate,
            hourly_rate: vehicle.hourly_rate,
            weekly_rate: vehicle.weekly_rate,
            status: VehicleStatus::Available,
            seating_capacity: vehicle.seating_capacity,
            transmission: vehicle.transmission,
            fuel_type: vehicle.fuel_type,
            image_path: vehicle.image_path,
            description: vehicle.description,
            created_at: Utc::now(),
        };
        state.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, BookingError> {
        Ok(self.state.lock().await.vehicles.get(&id).cloned())
    }

    async fn list(&self, filters: &VehicleFilters) -> Result<Vec<Vehicle>, BookingError> {
        let state = self.state.lock().await;
        let mut vehicles: Vec<Vehicle> = state
            .vehicles
            .values()
            .filter(|v| filters.matches(v))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| {
            (a.category, &a.make, &a.model).cmp(&(b.category, &b.make, &b.model))
        });
        Ok(vehicles)
    }

    async fn update(&self, id: Uuid, changes: VehicleChanges) -> Result<Vehicle, BookingError> {
        let mut state = self.state.lock().await;
        let next = changes.apply_to(state.vehicle(id)?);
        if state.plate_taken(&next.license_plate, Some(id)) {
            return Err(BookingError::DuplicateLicensePlate(next.license_plate));
        }
        state.vehicles.insert(id, next.clone());
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<(), BookingError> {
        let mut state = self.state.lock().await;
        state.vehicle(id)?;
        if !state.holds(id).is_empty() {
            return Err(BookingError::VehicleInUse(id));
        }
        state.vehicles.remove(&id);
        state.bookings.retain(|b| b.vehicle_id != id);
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        today: NaiveDate,
    ) -> Result<Vehicle, BookingError> {
        let mut state = self.state.lock().await;
        let current = state.vehicle(id)?.clone();
        let holds = state.holds(id);
        let status = lifecycle::plan_vehicle_status(&current, &holds, status, today)?;

        let vehicle = Vehicle { status, ..current };
        state.vehicles.insert(id, vehicle.clone());
        Ok(vehicle)
    }
}
