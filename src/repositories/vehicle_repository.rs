use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{Booking, NewVehicle, Vehicle, VehicleChanges, VehicleFilters, VehicleStatus};
use crate::repositories::VehicleStore;
use crate::services::lifecycle;
use crate::utils::errors::BookingError;

pub(crate) const HOLDS_FOR_VEHICLE: &str = r#"
    SELECT * FROM bookings
    WHERE vehicle_id = $1 AND status IN ('pending', 'confirmed')
    ORDER BY pickup_date
"#;

/// Lock the vehicle row for the rest of the transaction
pub(crate) async fn lock_vehicle(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Vehicle, BookingError> {
    sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(BookingError::VehicleNotFound(id))
}

pub(crate) async fn holds_for_vehicle(
    tx: &mut Transaction<'_, Postgres>,
    vehicle_id: Uuid,
) -> Result<Vec<Booking>, BookingError> {
    Ok(sqlx::query_as::<_, Booking>(HOLDS_FOR_VEHICLE)
        .bind(vehicle_id)
        .fetch_all(&mut **tx)
        .await?)
}

#[derive(Clone)]
pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleRepository {
    async fn create(&self, vehicle: NewVehicle) -> Result<Vehicle, BookingError> {
        let plate = vehicle.license_plate.clone();
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (
                id, category, make, model, year, license_plate, color, daily_rate,
                hourly_rate, weekly_rate, status, seating_capacity, transmission,
                fuel_type, image_path, description, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'available', $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle.category)
        .bind(vehicle.make)
        .bind(vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.license_plate)
        .bind(vehicle.color)
        .bind(vehicle.daily_rate)
        .bind(vehicle.hourly_rate)
        .bind(vehicle.weekly_rate)
        .bind(vehicle.seating_capacity)
        .bind(vehicle.transmission)
        .bind(vehicle.fuel_type)
        .bind(vehicle.image_path)
        .bind(vehicle.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BookingError::from_vehicle_write(e, &plate))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, BookingError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn list(&self, filters: &VehicleFilters) -> Result<Vec<Vehicle>, BookingError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE ($1::vehicle_category IS NULL OR category = $1)
              AND ($2::vehicle_status IS NULL OR status = $2)
            ORDER BY category, make, model
            "#,
        )
        .bind(filters.category)
        .bind(filters.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn update(&self, id: Uuid, changes: VehicleChanges) -> Result<Vehicle, BookingError> {
        let mut tx = self.pool.begin().await?;
        let current = lock_vehicle(&mut tx, id).await?;
        let next = changes.apply_to(&current);

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET category = $2, make = $3, model = $4, year = $5, license_plate = $6,
                color = $7, daily_rate = $8, hourly_rate = $9, weekly_rate = $10,
                seating_capacity = $11, transmission = $12, fuel_type = $13,
                image_path = $14, description = $15
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next.category)
        .bind(&next.make)
        .bind(&next.model)
        .bind(next.year)
        .bind(&next.license_plate)
        .bind(&next.color)
        .bind(next.daily_rate)
        .bind(next.hourly_rate)
        .bind(next.weekly_rate)
        .bind(next.seating_capacity)
        .bind(&next.transmission)
        .bind(&next.fuel_type)
        .bind(&next.image_path)
        .bind(&next.description)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| BookingError::from_vehicle_write(e, &next.license_plate))?;

        tx.commit().await?;
        Ok(vehicle)
    }

    async fn delete(&self, id: Uuid) -> Result<(), BookingError> {
        let mut tx = self.pool.begin().await?;
        lock_vehicle(&mut tx, id).await?;
        if !holds_for_vehicle(&mut tx, id).await?.is_empty() {
            return Err(BookingError::VehicleInUse(id));
        }

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        today: NaiveDate,
    ) -> Result<Vehicle, BookingError> {
        let mut tx = self.pool.begin().await?;
        let current = lock_vehicle(&mut tx, id).await?;
        let holds = holds_for_vehicle(&mut tx, id).await?;
        let status = lifecycle::plan_vehicle_status(&current, &holds, status, today)?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            "UPDATE vehicles SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(vehicle)
    }
}
