//! Admin approval workflow
//!
//! Pending bookings are reviewed in submission order. Each one carries a
//! conflict flag computed fresh against the vehicle's other holds; an
//! approval of a flagged booking fails before any transition is attempted,
//! and the transition itself re-checks under the vehicle lock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Actor, ActorContext, Booking, BookingStatus, Customer, Vehicle};
use crate::repositories::{BookingStore, VehicleStore};
use crate::services::availability::conflicting_bookings;
use crate::services::clock::Clock;
use crate::services::lifecycle::TransitionRequest;
use crate::services::settlement::Settlement;
use crate::utils::errors::BookingError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn target(&self) -> BookingStatus {
        match self {
            Decision::Approve => BookingStatus::Confirmed,
            Decision::Reject => BookingStatus::Rejected,
        }
    }
}

/// One row of the admin review queue
#[derive(Debug, Clone, Serialize)]
pub struct PendingReview {
    pub booking: Booking,
    pub vehicle: Vehicle,
    pub customer: Option<Customer>,
    pub conflict: bool,
    pub conflicts_with: Vec<Uuid>,
}

#[derive(Clone)]
pub struct ApprovalWorkflow {
    bookings: Arc<dyn BookingStore>,
    vehicles: Arc<dyn VehicleStore>,
    clock: Arc<dyn Clock>,
    settlement: Settlement,
}

impl ApprovalWorkflow {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        vehicles: Arc<dyn VehicleStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settlement: Settlement::new(bookings.clone(), clock.clone()),
            bookings,
            vehicles,
            clock,
        }
    }

    fn require_admin(actor: &ActorContext) -> Result<(), BookingError> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(BookingError::NotPermitted(
                "booking review is restricted to admins".to_string(),
            ))
        }
    }

    pub async fn list_pending(&self, actor: &ActorContext) -> Result<Vec<PendingReview>, BookingError> {
        Self::require_admin(actor)?;

        let pending = self.bookings.list_by_status(BookingStatus::Pending).await?;
        // Per-call lookups only; nothing outlives this request
        let mut holds_by_vehicle: HashMap<Uuid, Vec<Booking>> = HashMap::new();
        let mut vehicles: HashMap<Uuid, Vehicle> = HashMap::new();
        let mut reviews = Vec::with_capacity(pending.len());

        for booking in pending {
            if !vehicles.contains_key(&booking.vehicle_id) {
                self.settlement.settle_vehicle(booking.vehicle_id).await?;
                let vehicle = self
                    .vehicles
                    .find_by_id(booking.vehicle_id)
                    .await?
                    .ok_or(BookingError::VehicleNotFound(booking.vehicle_id))?;
                vehicles.insert(vehicle.id, vehicle);
            }
            if !holds_by_vehicle.contains_key(&booking.vehicle_id) {
                let holds = self.bookings.list_holds(booking.vehicle_id).await?;
                holds_by_vehicle.insert(booking.vehicle_id, holds);
            }

            let holds = &holds_by_vehicle[&booking.vehicle_id];
            let conflicts_with = conflicting_bookings(&booking.range(), holds, Some(booking.id));
            let customer = self.bookings.customer(booking.user_id).await?;

            reviews.push(PendingReview {
                vehicle: vehicles[&booking.vehicle_id].clone(),
                customer,
                conflict: !conflicts_with.is_empty(),
                conflicts_with,
                booking,
            });
        }

        Ok(reviews)
    }

    pub async fn decide(
        &self,
        actor: &ActorContext,
        booking_id: Uuid,
        decision: Decision,
        notes: Option<String>,
    ) -> Result<Booking, BookingError> {
        Self::require_admin(actor)?;

        if decision == Decision::Approve {
            let booking = self.bookings.get(booking_id).await?;
            if booking.status == BookingStatus::Pending {
                let holds = self.bookings.list_holds(booking.vehicle_id).await?;
                let conflicts = conflicting_bookings(&booking.range(), &holds, Some(booking.id));
                if !conflicts.is_empty() {
                    tracing::warn!(
                        "⚠️ Approval of booking {} blocked by {:?}",
                        booking_id,
                        conflicts
                    );
                    return Err(BookingError::SchedulingConflict { conflicts });
                }
            }
        }

        self.bookings
            .apply_transition(
                booking_id,
                TransitionRequest {
                    to: decision.target(),
                    actor: Actor::User(*actor),
                    notes,
                    today: self.clock.today(),
                },
            )
            .await
    }
}
