//! Shared application state
//!
//! Everything the routers need, cloned cheaply into each handler.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::controllers::VehicleController;
use crate::repositories::{BookingStore, VehicleStore};
use crate::services::{
    ApprovalWorkflow, AvailabilityChecker, BookingService, Clock, PricingCalculator, ProofStorage,
};
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub jwt: Arc<JwtConfig>,
    pub bookings: BookingService,
    pub approvals: ApprovalWorkflow,
    pub availability: AvailabilityChecker,
    pub vehicles: VehicleController,
    pub proofs: Arc<dyn ProofStorage>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        booking_store: Arc<dyn BookingStore>,
        vehicle_store: Arc<dyn VehicleStore>,
        proofs: Arc<dyn ProofStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pricing = Arc::new(PricingCalculator::new(config.rates.clone()));

        Self {
            jwt: Arc::new(JwtConfig::from(&config)),
            bookings: BookingService::new(
                booking_store.clone(),
                vehicle_store.clone(),
                pricing,
                clock.clone(),
            ),
            approvals: ApprovalWorkflow::new(booking_store.clone(), vehicle_store.clone(), clock.clone()),
            availability: AvailabilityChecker::new(booking_store.clone(), vehicle_store.clone()),
            vehicles: VehicleController::new(vehicle_store, booking_store, clock),
            proofs,
            config: Arc::new(config),
        }
    }
}
