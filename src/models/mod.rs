//! System models
//!
//! Data types mapping the PostgreSQL schema in `migrations/`.

pub mod auth;
pub mod booking;
pub mod user;
pub mod vehicle;

pub use auth::{Actor, ActorContext};
pub use booking::{Accessories, Accessory, Booking, BookingDraft, BookingStatus, DateRange, NewBooking, PaymentMethod};
pub use user::{Customer, User, UserRole};
pub use vehicle::{NewVehicle, Vehicle, VehicleCategory, VehicleChanges, VehicleFilters, VehicleStatus};
