//! Booking lifecycle
//!
//! ```text
//!   (new) ──► pending ──► confirmed ──► cancelled
//!                │             └──────► completed
//!                └──► rejected
//! ```
//!
//! Stores call [`plan_submission`] and [`plan_transition`] while holding
//! the vehicle row lock and write the returned plan in the same
//! transaction. Nothing here touches persistence, so every rule is checked
//! in exactly one place regardless of the backing store.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    Actor, Booking, BookingDraft, BookingStatus, NewBooking, Vehicle, VehicleStatus,
};
use crate::services::availability::conflicting_bookings;
use crate::services::pricing::PricingCalculator;
use crate::utils::errors::BookingError;

impl BookingStatus {
    /// Edges of the lifecycle graph
    pub fn can_transition_to(&self, to: BookingStatus) -> bool {
        matches!(
            (*self, to),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Rejected)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

/// A requested status change, evaluated against `today`
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub to: BookingStatus,
    pub actor: Actor,
    pub notes: Option<String>,
    pub today: NaiveDate,
}

/// What a store must write for an accepted transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub booking_status: BookingStatus,
    pub admin_notes: Option<String>,
    /// New vehicle status, `None` when the vehicle row stays untouched
    pub vehicle_status: Option<VehicleStatus>,
}

/// Validate and price a submission against the vehicle's current holds.
///
/// `holds` are the vehicle's pending and confirmed bookings, read under the
/// vehicle lock.
pub fn plan_submission(
    vehicle: &Vehicle,
    holds: &[Booking],
    draft: BookingDraft,
    pricing: &PricingCalculator,
    today: NaiveDate,
) -> Result<NewBooking, BookingError> {
    if draft.range.start() < today {
        return Err(BookingError::InvalidDateRange(format!(
            "pickup date {} is in the past",
            draft.range.start()
        )));
    }
    if draft.payment_method.requires_proof() && draft.payment_proof.is_none() {
        return Err(BookingError::MissingPaymentProof);
    }
    if !vehicle.status.is_rentable() {
        return Err(BookingError::VehicleNotRentable {
            id: vehicle.id,
            status: vehicle.status,
        });
    }

    let conflicts = conflicting_bookings(&draft.range, holds, None);
    if !conflicts.is_empty() {
        return Err(BookingError::SchedulingConflict { conflicts });
    }

    let quote = pricing.quote(vehicle.category, vehicle.daily_rate, &draft.range, &draft.accessories)?;
    let duration_days = i32::try_from(quote.duration_days)
        .map_err(|_| BookingError::InvalidDateRange("rental period is too long".to_string()))?;

    Ok(NewBooking {
        id: Uuid::new_v4(),
        vehicle_id: vehicle.id,
        user_id: draft.user_id,
        range: draft.range,
        duration_days,
        total_price: quote.total,
        payment_method: draft.payment_method,
        accessories: draft.accessories,
        payment_proof: draft.payment_proof,
    })
}

/// Decide whether `booking` may move to `request.to` and what that implies
/// for the vehicle. Rejections leave nothing to write.
pub fn plan_transition(
    booking: &Booking,
    vehicle: &Vehicle,
    holds: &[Booking],
    request: &TransitionRequest,
) -> Result<TransitionPlan, BookingError> {
    let from = booking.status;
    let to = request.to;
    let invalid = || BookingError::InvalidTransition { from, to };

    if !from.can_transition_to(to) {
        return Err(invalid());
    }
    authorize(booking, &request.actor, to)?;

    let admin_notes = request.notes.clone().filter(|n| !n.trim().is_empty());

    match to {
        BookingStatus::Confirmed => {
            if booking.return_date < request.today {
                return Err(invalid());
            }
            if !vehicle.status.is_rentable() {
                return Err(BookingError::VehicleNotRentable {
                    id: vehicle.id,
                    status: vehicle.status,
                });
            }
            let conflicts = conflicting_bookings(&booking.range(), holds, Some(booking.id));
            if !conflicts.is_empty() {
                return Err(BookingError::SchedulingConflict { conflicts });
            }
            Ok(TransitionPlan {
                booking_status: to,
                admin_notes,
                vehicle_status: Some(VehicleStatus::Booked),
            })
        }
        BookingStatus::Rejected => Ok(TransitionPlan {
            booking_status: to,
            admin_notes,
            vehicle_status: None,
        }),
        BookingStatus::Cancelled => {
            if request.today >= booking.pickup_date {
                return Err(invalid());
            }
            Ok(TransitionPlan {
                booking_status: to,
                admin_notes,
                vehicle_status: release_vehicle(booking, vehicle, holds, request.today),
            })
        }
        BookingStatus::Completed => {
            if !booking.is_due_for_completion(request.today) {
                return Err(invalid());
            }
            Ok(TransitionPlan {
                booking_status: to,
                admin_notes: None,
                vehicle_status: release_vehicle(booking, vehicle, holds, request.today),
            })
        }
        BookingStatus::Pending => Err(invalid()),
    }
}

/// Admin change of a vehicle's operational status. `booked` belongs to the
/// lifecycle, and a vehicle with an active confirmed booking cannot be
/// declared available.
pub fn plan_vehicle_status(
    vehicle: &Vehicle,
    holds: &[Booking],
    status: VehicleStatus,
    today: NaiveDate,
) -> Result<VehicleStatus, BookingError> {
    match status {
        VehicleStatus::Booked => Err(BookingError::NotPermitted(
            "vehicles are marked booked only by confirming a booking".to_string(),
        )),
        VehicleStatus::Available if holds.iter().any(|b| b.is_active_on(today)) => {
            Err(BookingError::VehicleInUse(vehicle.id))
        }
        other => Ok(other),
    }
}

/// Who may request which transition
fn authorize(booking: &Booking, actor: &Actor, to: BookingStatus) -> Result<(), BookingError> {
    let allowed = match to {
        BookingStatus::Confirmed | BookingStatus::Rejected => actor.is_admin(),
        BookingStatus::Cancelled => actor.is_admin() || actor.is_owner_of(booking.user_id),
        BookingStatus::Completed => matches!(actor, Actor::System),
        BookingStatus::Pending => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(BookingError::NotPermitted(format!(
            "{} may not move booking {} to {}",
            actor, booking.id, to
        )))
    }
}

/// The vehicle returns to `available` once no other confirmed booking is
/// still running or upcoming. Maintenance and out-of-service are kept.
/// Upcoming bookings count so `booked` always means a confirmed rental is
/// ahead (see "Vehicle revert" in DESIGN.md).
fn release_vehicle(
    booking: &Booking,
    vehicle: &Vehicle,
    holds: &[Booking],
    today: NaiveDate,
) -> Option<VehicleStatus> {
    if vehicle.status != VehicleStatus::Booked {
        return None;
    }
    let still_held = holds
        .iter()
        .any(|other| other.id != booking.id && other.is_active_on(today));
    if still_held {
        None
    } else {
        Some(VehicleStatus::Available)
    }
}
