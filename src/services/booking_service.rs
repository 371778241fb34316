//! Customer-facing booking operations
//!
//! Submission, lookups, cancellation and price previews. Reads settle
//! overdue confirmed bookings to `completed` on the way out, so nothing
//! needs a scheduler to keep the lifecycle current.

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{
    Accessories, Accessory, Actor, ActorContext, Booking, BookingDraft, BookingStatus, DateRange,
    PaymentMethod, VehicleCategory,
};
use crate::repositories::{BookingStore, VehicleStore};
use crate::services::clock::Clock;
use crate::services::lifecycle::TransitionRequest;
use crate::services::pricing::{PriceQuote, PricingCalculator};
use crate::services::settlement::Settlement;
use crate::utils::errors::BookingError;

#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    vehicles: Arc<dyn VehicleStore>,
    pricing: Arc<PricingCalculator>,
    clock: Arc<dyn Clock>,
    settlement: Settlement,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        vehicles: Arc<dyn VehicleStore>,
        pricing: Arc<PricingCalculator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settlement: Settlement::new(bookings.clone(), clock.clone()),
            bookings,
            vehicles,
            pricing,
            clock,
        }
    }

    /// Price a prospective rental without reserving anything
    pub async fn quote(
        &self,
        vehicle_id: Uuid,
        range: &DateRange,
        accessories: &Accessories,
    ) -> Result<PriceQuote, BookingError> {
        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or(BookingError::VehicleNotFound(vehicle_id))?;
        self.pricing
            .quote(vehicle.category, vehicle.daily_rate, range, accessories)
    }

    /// Accessories a category offers, with their daily rates
    pub fn offered_accessories(&self, category: VehicleCategory) -> Vec<(Accessory, Decimal)> {
        self.pricing.rates().offered(category)
    }

    /// Submit a booking request on behalf of `actor`. The booking starts
    /// `pending` and blocks the range until an admin decides.
    pub async fn submit(
        &self,
        actor: &ActorContext,
        vehicle_id: Uuid,
        range: DateRange,
        accessories: Accessories,
        payment_method: PaymentMethod,
        payment_proof: Option<String>,
    ) -> Result<Booking, BookingError> {
        let draft = BookingDraft {
            vehicle_id,
            user_id: actor.user_id,
            range,
            accessories,
            payment_method,
            payment_proof,
        };

        match self.bookings.create(draft, &self.pricing, self.clock.today()).await {
            Ok(booking) => {
                tracing::info!(
                    "🆕 Booking {} submitted by {} for vehicle {} ({}..{}, total {})",
                    booking.id,
                    actor.user_id,
                    vehicle_id,
                    booking.pickup_date,
                    booking.return_date,
                    booking.total_price
                );
                Ok(booking)
            }
            Err(e @ BookingError::SchedulingConflict { .. }) => {
                tracing::warn!("⚠️ Submission for vehicle {} rejected: {}", vehicle_id, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// A booking visible to its owner and to admins
    pub async fn get(&self, actor: &ActorContext, id: Uuid) -> Result<Booking, BookingError> {
        let booking = self.bookings.get(id).await?;
        if !actor.is_admin() && booking.user_id != actor.user_id {
            return Err(BookingError::NotPermitted(format!(
                "booking {} belongs to another customer",
                id
            )));
        }
        self.settlement.settle(booking).await
    }

    /// The actor's own bookings, newest first
    pub async fn list_mine(
        &self,
        actor: &ActorContext,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = self.bookings.list_by_user(actor.user_id, status).await?;
        self.settle_all(bookings, status).await
    }

    /// All bookings in a status, admin only
    pub async fn list_by_status(
        &self,
        actor: &ActorContext,
        status: BookingStatus,
    ) -> Result<Vec<Booking>, BookingError> {
        if !actor.is_admin() {
            return Err(BookingError::NotPermitted(
                "only admins can list all bookings".to_string(),
            ));
        }
        let bookings = self.bookings.list_by_status(status).await?;
        self.settle_all(bookings, Some(status)).await
    }

    /// Cancel a confirmed booking before its pickup day
    pub async fn cancel(
        &self,
        actor: &ActorContext,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<Booking, BookingError> {
        self.bookings
            .apply_transition(
                id,
                TransitionRequest {
                    to: BookingStatus::Cancelled,
                    actor: Actor::User(*actor),
                    notes: reason,
                    today: self.clock.today(),
                },
            )
            .await
    }

    async fn settle_all(
        &self,
        bookings: Vec<Booking>,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        let mut settled = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let booking = self.settlement.settle(booking).await?;
            if status.map_or(true, |s| s == booking.status) {
                settled.push(booking);
            }
        }
        Ok(settled)
    }
}
