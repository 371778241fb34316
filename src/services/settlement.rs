//! Lazy completion
//!
//! Confirmed bookings whose return date has passed move to `completed`
//! the next time they, or the vehicle they hold, are read. The move goes
//! through the store's atomic transition as the system actor, so the
//! vehicle is released in the same write.

use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{Actor, Booking, BookingStatus};
use crate::repositories::BookingStore;
use crate::services::clock::Clock;
use crate::services::lifecycle::TransitionRequest;
use crate::utils::errors::BookingError;

#[derive(Clone)]
pub struct Settlement {
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
}

impl Settlement {
    pub fn new(bookings: Arc<dyn BookingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { bookings, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Complete `booking` if it is overdue, returning its current state
    pub async fn settle(&self, booking: Booking) -> Result<Booking, BookingError> {
        let today = self.today();
        if !booking.is_due_for_completion(today) {
            return Ok(booking);
        }
        self.complete(booking.id, today).await
    }

    /// Complete every overdue confirmed booking on a vehicle. Returns how
    /// many were completed by this call.
    pub async fn settle_vehicle(&self, vehicle_id: Uuid) -> Result<usize, BookingError> {
        let today = self.today();
        let overdue: Vec<Uuid> = self
            .bookings
            .list_holds(vehicle_id)
            .await?
            .into_iter()
            .filter(|b| b.is_due_for_completion(today))
            .map(|b| b.id)
            .collect();

        let mut completed = 0;
        for id in overdue {
            if self.complete(id, today).await?.status == BookingStatus::Completed {
                completed += 1;
            }
        }
        if completed > 0 {
            tracing::info!("🏁 Vehicle {}: {} overdue booking(s) completed", vehicle_id, completed);
        }
        Ok(completed)
    }

    async fn complete(&self, id: Uuid, today: NaiveDate) -> Result<Booking, BookingError> {
        let request = TransitionRequest {
            to: BookingStatus::Completed,
            actor: Actor::System,
            notes: None,
            today,
        };
        match self.bookings.apply_transition(id, request).await {
            Ok(completed) => Ok(completed),
            // Someone else moved it first; report the stored state
            Err(BookingError::InvalidTransition { .. }) => self.bookings.get(id).await,
            Err(e) => Err(e),
        }
    }
}
