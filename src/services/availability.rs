//! Availability checker
//!
//! A vehicle is unavailable for a range when any of its pending or
//! confirmed bookings overlaps it under the inclusive rule of
//! [`DateRange::overlaps`]. Pending requests block as well, so two
//! customers can never hold competing requests an admin might both
//! approve. Results are always read fresh from the store.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Booking, DateRange};
use crate::repositories::{BookingStore, VehicleStore};
use crate::utils::errors::BookingError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Availability {
    pub available: bool,
    pub conflicts: Vec<Uuid>,
}

impl Availability {
    fn from_conflicts(conflicts: Vec<Uuid>) -> Self {
        Self {
            available: conflicts.is_empty(),
            conflicts,
        }
    }
}

/// Ids of the holds in `bookings` overlapping `range`, skipping `excluding`.
pub fn conflicting_bookings(range: &DateRange, bookings: &[Booking], excluding: Option<Uuid>) -> Vec<Uuid> {
    bookings
        .iter()
        .filter(|b| Some(b.id) != excluding)
        .filter(|b| b.status.holds_vehicle())
        .filter(|b| range.overlaps(&b.range()))
        .map(|b| b.id)
        .collect()
}

#[derive(Clone)]
pub struct AvailabilityChecker {
    bookings: Arc<dyn BookingStore>,
    vehicles: Arc<dyn VehicleStore>,
}

impl AvailabilityChecker {
    pub fn new(bookings: Arc<dyn BookingStore>, vehicles: Arc<dyn VehicleStore>) -> Self {
        Self { bookings, vehicles }
    }

    pub async fn check(
        &self,
        vehicle_id: Uuid,
        range: &DateRange,
        excluding: Option<Uuid>,
    ) -> Result<Availability, BookingError> {
        if self.vehicles.find_by_id(vehicle_id).await?.is_none() {
            return Err(BookingError::VehicleNotFound(vehicle_id));
        }
        let holds = self.bookings.list_holds(vehicle_id).await?;
        let availability = Availability::from_conflicts(conflicting_bookings(range, &holds, excluding));

        tracing::debug!(
            "🔍 Availability for vehicle {} {}..{}: {:?}",
            vehicle_id,
            range.start(),
            range.end(),
            availability
        );
        Ok(availability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Accessories, BookingStatus, NewBooking, PaymentMethod};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(day(start), day(end)).unwrap()
    }

    fn hold(status: BookingStatus, start: &str, end: &str) -> Booking {
        let mut booking = NewBooking {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            range: range(start, end),
            duration_days: 1,
            total_price: dec!(100),
            payment_method: PaymentMethod::Cash,
            accessories: Accessories::default(),
            payment_proof: None,
        }
        .into_booking(Utc::now());
        booking.status = status;
        booking
    }

    #[test]
    fn test_boundary_day_is_a_conflict() {
        let a = hold(BookingStatus::Pending, "2024-07-01", "2024-07-05");
        let conflicts = conflicting_bookings(&range("2024-07-05", "2024-07-08"), &[a.clone()], None);
        assert_eq!(conflicts, vec![a.id]);
    }

    #[test]
    fn test_adjacent_days_do_not_conflict() {
        let a = hold(BookingStatus::Confirmed, "2024-07-01", "2024-07-05");
        assert!(conflicting_bookings(&range("2024-07-06", "2024-07-08"), &[a], None).is_empty());
    }

    #[test]
    fn test_terminal_bookings_do_not_block() {
        let bookings = vec![
            hold(BookingStatus::Rejected, "2024-07-01", "2024-07-05"),
            hold(BookingStatus::Cancelled, "2024-07-01", "2024-07-05"),
            hold(BookingStatus::Completed, "2024-07-01", "2024-07-05"),
        ];
        assert!(conflicting_bookings(&range("2024-07-02", "2024-07-03"), &bookings, None).is_empty());
    }

    #[test]
    fn test_excluding_self() {
        let a = hold(BookingStatus::Pending, "2024-07-01", "2024-07-05");
        let b = hold(BookingStatus::Confirmed, "2024-07-04", "2024-07-06");
        let conflicts = conflicting_bookings(&a.range(), &[a.clone(), b.clone()], Some(a.id));
        assert_eq!(conflicts, vec![b.id]);
    }

    #[test]
    fn test_enclosing_range_conflicts() {
        let inner = hold(BookingStatus::Confirmed, "2024-07-03", "2024-07-04");
        let conflicts = conflicting_bookings(&range("2024-07-01", "2024-07-10"), &[inner.clone()], None);
        assert_eq!(conflicts, vec![inner.id]);
    }
}
