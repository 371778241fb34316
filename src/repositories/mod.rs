//! Persistence boundary
//!
//! Services only see the [`BookingStore`] and [`VehicleStore`] traits.
//! The `Pg*` repositories are the PostgreSQL backend; [`InMemoryStore`]
//! keeps everything in process behind one lock for tests and local runs.
//!
//! Writers that depend on a vehicle's bookings (`create`,
//! `apply_transition`, `delete`, `set_status`) must hold an exclusive lock
//! on that vehicle for the whole read-check-write sequence.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    Booking, BookingDraft, BookingStatus, Customer, NewVehicle, Vehicle, VehicleChanges,
    VehicleFilters, VehicleStatus,
};
use crate::services::lifecycle::TransitionRequest;
use crate::services::pricing::PricingCalculator;
use crate::utils::errors::BookingError;

pub mod booking_repository;
pub mod memory;
pub mod vehicle_repository;

pub use booking_repository::PgBookingRepository;
pub use memory::InMemoryStore;
pub use vehicle_repository::PgVehicleRepository;

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Price and insert a `pending` booking after checking availability
    /// under the vehicle lock.
    async fn create(
        &self,
        draft: BookingDraft,
        pricing: &PricingCalculator,
        today: NaiveDate,
    ) -> Result<Booking, BookingError>;

    async fn get(&self, id: Uuid) -> Result<Booking, BookingError>;

    /// Newest first
    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError>;

    /// Oldest first, so reviewers work in submission order
    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, BookingError>;

    /// Pending and confirmed bookings of a vehicle, ordered by pickup date
    async fn list_holds(&self, vehicle_id: Uuid) -> Result<Vec<Booking>, BookingError>;

    /// The only sanctioned status mutator. Validates through the lifecycle
    /// and writes the booking and vehicle rows atomically.
    async fn apply_transition(
        &self,
        id: Uuid,
        request: TransitionRequest,
    ) -> Result<Booking, BookingError>;

    async fn customer(&self, user_id: Uuid) -> Result<Option<Customer>, BookingError>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn create(&self, vehicle: NewVehicle) -> Result<Vehicle, BookingError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, BookingError>;

    async fn list(&self, filters: &VehicleFilters) -> Result<Vec<Vehicle>, BookingError>;

    async fn update(&self, id: Uuid, changes: VehicleChanges) -> Result<Vehicle, BookingError>;

    /// Hard delete, refused while the vehicle holds pending or confirmed
    /// bookings.
    async fn delete(&self, id: Uuid) -> Result<(), BookingError>;

    /// Administrative status change, validated by the lifecycle.
    async fn set_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        today: NaiveDate,
    ) -> Result<Vehicle, BookingError>;
}
