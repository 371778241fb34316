//! Booking model
//!
//! Maps the `bookings` table plus the value types shared by pricing,
//! availability and the lifecycle: [`DateRange`], [`Accessories`] and
//! [`BookingStatus`].

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use rust_decimal::Decimal;
use std::fmt;

use crate::utils::errors::BookingError;

/// Booking status - maps to the ENUM booking_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Pending and confirmed bookings both hold the vehicle for their range.
    pub fn holds_vehicle(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method - maps to the ENUM payment_method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Upi,
    Cash,
    Card,
}

impl PaymentMethod {
    /// UPI payments are verified manually against an uploaded screenshot.
    pub fn requires_proof(&self) -> bool {
        matches!(self, PaymentMethod::Upi)
    }
}

/// Optional add-ons, each billed per rental day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Accessory {
    Helmet,
    RidingGear,
    ChildSeat,
    Gps,
}

impl Accessory {
    pub const ALL: [Accessory; 4] = [
        Accessory::Helmet,
        Accessory::RidingGear,
        Accessory::ChildSeat,
        Accessory::Gps,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Accessory::Helmet => "Helmet",
            Accessory::RidingGear => "Riding gear",
            Accessory::ChildSeat => "Child seat",
            Accessory::Gps => "GPS",
        }
    }
}

impl fmt::Display for Accessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accessory flags as stored on the booking row
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Accessories {
    #[serde(default)]
    pub helmet: bool,
    #[serde(default)]
    pub riding_gear: bool,
    #[serde(default)]
    pub child_seat: bool,
    #[serde(default)]
    pub gps: bool,
}

impl Accessories {
    pub fn is_selected(&self, accessory: Accessory) -> bool {
        match accessory {
            Accessory::Helmet => self.helmet,
            Accessory::RidingGear => self.riding_gear,
            Accessory::ChildSeat => self.child_seat,
            Accessory::Gps => self.gps,
        }
    }

    /// Selected accessories in display order
    pub fn selected(&self) -> Vec<Accessory> {
        Accessory::ALL
            .into_iter()
            .filter(|a| self.is_selected(*a))
            .collect()
    }
}

/// Inclusive calendar-day range `[start, end]`.
///
/// Both the pickup and the return day count as rental days, and two ranges
/// sharing a boundary day overlap: a vehicle returned on the 5th cannot be
/// picked up by someone else on the 5th.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BookingError> {
        if end < start {
            return Err(BookingError::InvalidDateRange(format!(
                "return date {} is before pickup date {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Billable days, counting both ends
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub duration_days: i32,
    pub status: BookingStatus,
    pub total_price: Decimal,
    pub payment_method: PaymentMethod,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub accessories: Accessories,
    pub payment_proof: Option<String>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Rows are written through [`DateRange::new`] and guarded by a CHECK
    /// constraint, so the stored range is always ordered.
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.pickup_date,
            end: self.return_date,
        }
    }

    /// Confirmed and not yet past its return date
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.status == BookingStatus::Confirmed && self.return_date >= today
    }

    /// Confirmed bookings whose return date has passed are due to complete.
    pub fn is_due_for_completion(&self, today: NaiveDate) -> bool {
        self.status == BookingStatus::Confirmed && self.return_date < today
    }
}

/// Customer submission before pricing and persistence
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub range: DateRange,
    pub accessories: Accessories,
    pub payment_method: PaymentMethod,
    pub payment_proof: Option<String>,
}

/// Fully priced booking ready to be inserted as `pending`
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub range: DateRange,
    pub duration_days: i32,
    pub total_price: Decimal,
    pub payment_method: PaymentMethod,
    pub accessories: Accessories,
    pub payment_proof: Option<String>,
}

impl NewBooking {
    pub fn into_booking(self, now: DateTime<Utc>) -> Booking {
        Booking {
            id: self.id,
            vehicle_id: self.vehicle_id,
            user_id: self.user_id,
            pickup_date: self.range.start(),
            return_date: self.range.end(),
            duration_days: self.duration_days,
            status: BookingStatus::Pending,
            total_price: self.total_price,
            payment_method: self.payment_method,
            accessories: self.accessories,
            payment_proof: self.payment_proof,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_range_counts_both_ends() {
        let range = DateRange::new(day("2024-06-01"), day("2024-06-03")).unwrap();
        assert_eq!(range.days(), 3);

        let same_day = DateRange::new(day("2024-06-01"), day("2024-06-01")).unwrap();
        assert_eq!(same_day.days(), 1);
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        let err = DateRange::new(day("2024-06-03"), day("2024-06-01")).unwrap_err();
        assert!(matches!(err, BookingError::InvalidDateRange(_)));
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        let a = DateRange::new(day("2024-07-01"), day("2024-07-05")).unwrap();
        let b = DateRange::new(day("2024-07-05"), day("2024-07-08")).unwrap();
        let c = DateRange::new(day("2024-07-06"), day("2024-07-08")).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_selected_accessories_keep_display_order() {
        let accessories = Accessories {
            gps: true,
            helmet: true,
            ..Default::default()
        };
        assert_eq!(accessories.selected(), vec![Accessory::Helmet, Accessory::Gps]);
    }
}
