use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Booking, BookingDraft, BookingStatus, Customer, User};
use crate::repositories::vehicle_repository::{holds_for_vehicle, lock_vehicle, HOLDS_FOR_VEHICLE};
use crate::repositories::BookingStore;
use crate::services::lifecycle::{self, TransitionRequest};
use crate::services::pricing::PricingCalculator;
use crate::utils::errors::BookingError;

/// PostgreSQL booking repository.
///
/// Lock order is always vehicle row first, then booking row, so that
/// submissions and transitions on the same vehicle serialize without
/// deadlocking each other.
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingRepository {
    async fn create(
        &self,
        draft: BookingDraft,
        pricing: &PricingCalculator,
        today: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let mut tx = self.pool.begin().await?;
        let vehicle = lock_vehicle(&mut tx, draft.vehicle_id).await?;
        let holds = holds_for_vehicle(&mut tx, vehicle.id).await?;
        let new = lifecycle::plan_submission(&vehicle, &holds, draft, pricing, today)?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, vehicle_id, user_id, pickup_date, return_date, duration_days, status,
                total_price, payment_method, helmet, riding_gear, child_seat, gps, payment_proof
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(new.id)
        .bind(new.vehicle_id)
        .bind(new.user_id)
        .bind(new.range.start())
        .bind(new.range.end())
        .bind(new.duration_days)
        .bind(new.total_price)
        .bind(new.payment_method)
        .bind(new.accessories.helmet)
        .bind(new.accessories.riding_gear)
        .bind(new.accessories.child_seat)
        .bind(new.accessories.gps)
        .bind(&new.payment_proof)
        .fetch_one(&mut *tx)
        .await
        .map_err(BookingError::from_booking_write)?;

        tx.commit().await?;
        Ok(booking)
    }

    async fn get(&self, id: Uuid) -> Result<Booking, BookingError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(BookingError::BookingNotFound(id))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE user_id = $1 AND ($2::booking_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn list_by_status(&self, status: BookingStatus) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = $1 ORDER BY created_at",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn list_holds(&self, vehicle_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(HOLDS_FOR_VEHICLE)
            .bind(vehicle_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    async fn apply_transition(
        &self,
        id: Uuid,
        request: TransitionRequest,
    ) -> Result<Booking, BookingError> {
        let vehicle_id: Uuid = sqlx::query_scalar("SELECT vehicle_id FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(BookingError::BookingNotFound(id))?;

        let mut tx = self.pool.begin().await?;
        let vehicle = lock_vehicle(&mut tx, vehicle_id).await?;
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(BookingError::BookingNotFound(id))?;
        let holds = holds_for_vehicle(&mut tx, vehicle.id).await?;

        let plan = lifecycle::plan_transition(&booking, &vehicle, &holds, &request)?;

        let updated = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2, admin_notes = COALESCE($3, admin_notes), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(plan.booking_status)
        .bind(&plan.admin_notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(BookingError::from_booking_write)?;

        if let Some(status) = plan.vehicle_status {
            sqlx::query("UPDATE vehicles SET status = $2 WHERE id = $1")
                .bind(vehicle.id)
                .bind(status)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            "📋 Booking {} {} -> {} by {}{}",
            id,
            booking.status,
            updated.status,
            request.actor,
            plan.vehicle_status
                .map(|s| format!(" (vehicle {} -> {})", vehicle.id, s.as_str()))
                .unwrap_or_default()
        );
        Ok(updated)
    }

    async fn customer(&self, user_id: Uuid) -> Result<Option<Customer>, BookingError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user.map(Customer::from))
    }
}
