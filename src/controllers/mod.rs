//! Controllers
//!
//! Request-level orchestration that sits between the routes and the stores.

pub mod vehicle_controller;

pub use vehicle_controller::VehicleController;
