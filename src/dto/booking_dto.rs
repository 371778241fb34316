use axum::body::Bytes;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Accessories, BookingStatus, DateRange, PaymentMethod};
use crate::services::approval_service::Decision;
use crate::utils::errors::{bad_request_error, AppError, BookingError};
use crate::utils::validation::{parse_flag, validate_date, validate_uuid};

// Price preview request
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub vehicle_id: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    #[serde(default)]
    pub accessories: Accessories,
}

impl QuoteRequest {
    pub fn range(&self) -> Result<DateRange, BookingError> {
        DateRange::new(self.pickup_date, self.return_date)
    }
}

// Filter for a customer's own bookings
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<BookingStatus>,
}

// Filter for the admin listing; defaults to the pending queue
#[derive(Debug, Default, Deserialize)]
pub struct AdminBookingListQuery {
    pub status: Option<BookingStatus>,
}

impl AdminBookingListQuery {
    pub fn status(&self) -> BookingStatus {
        self.status.unwrap_or(BookingStatus::Pending)
    }
}

// Admin decision on a pending booking
#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub decision: Decision,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

// Optional body of a cancellation
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Uploaded payment screenshot
#[derive(Debug)]
pub struct ProofUpload {
    pub content_type: String,
    pub bytes: Bytes,
}

/// Booking submission assembled from multipart form fields
#[derive(Debug, Default)]
pub struct SubmissionForm {
    vehicle_id: Option<Uuid>,
    pickup_date: Option<NaiveDate>,
    return_date: Option<NaiveDate>,
    payment_method: Option<PaymentMethod>,
    accessories: Accessories,
    proof: Option<ProofUpload>,
}

/// Validated submission ready for the booking service
#[derive(Debug)]
pub struct Submission {
    pub vehicle_id: Uuid,
    pub range: DateRange,
    pub payment_method: PaymentMethod,
    pub accessories: Accessories,
    pub proof: Option<ProofUpload>,
}

impl SubmissionForm {
    /// Record one text field. Unknown fields are ignored.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<(), AppError> {
        match name {
            "vehicle_id" => {
                self.vehicle_id = Some(validate_uuid(value).map_err(|_| bad_request_error("vehicle_id must be a UUID"))?)
            }
            "pickup_date" => {
                self.pickup_date =
                    Some(validate_date(value).map_err(|_| bad_request_error("pickup_date must be YYYY-MM-DD"))?)
            }
            "return_date" => {
                self.return_date =
                    Some(validate_date(value).map_err(|_| bad_request_error("return_date must be YYYY-MM-DD"))?)
            }
            "payment_method" => {
                self.payment_method = Some(parse_payment_method(value)?);
            }
            "helmet" => self.accessories.helmet = parse_flag(value),
            "riding_gear" => self.accessories.riding_gear = parse_flag(value),
            "child_seat" => self.accessories.child_seat = parse_flag(value),
            "gps" => self.accessories.gps = parse_flag(value),
            _ => {}
        }
        Ok(())
    }

    pub fn set_proof(&mut self, content_type: String, bytes: Bytes) {
        // An empty file input is sent as a zero-length part
        if !bytes.is_empty() {
            self.proof = Some(ProofUpload { content_type, bytes });
        }
    }

    pub fn finish(self) -> Result<Submission, AppError> {
        let vehicle_id = self.vehicle_id.ok_or_else(|| bad_request_error("vehicle_id is required"))?;
        let pickup_date = self.pickup_date.ok_or_else(|| bad_request_error("pickup_date is required"))?;
        let return_date = self.return_date.ok_or_else(|| bad_request_error("return_date is required"))?;
        let payment_method = self
            .payment_method
            .ok_or_else(|| bad_request_error("payment_method is required"))?;

        Ok(Submission {
            vehicle_id,
            range: DateRange::new(pickup_date, return_date)?,
            payment_method,
            accessories: self.accessories,
            proof: self.proof,
        })
    }
}

fn parse_payment_method(value: &str) -> Result<PaymentMethod, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "upi" => Ok(PaymentMethod::Upi),
        "cash" => Ok(PaymentMethod::Cash),
        "card" => Ok(PaymentMethod::Card),
        other => Err(AppError::BadRequest(format!("Unknown payment method '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> SubmissionForm {
        let mut form = SubmissionForm::default();
        form.set_field("vehicle_id", "550e8400-e29b-41d4-a716-446655440000").unwrap();
        form.set_field("pickup_date", "2024-06-01").unwrap();
        form.set_field("return_date", "2024-06-03").unwrap();
        form.set_field("payment_method", "UPI").unwrap();
        form.set_field("helmet", "on").unwrap();
        form
    }

    #[test]
    fn test_form_builds_submission() {
        let mut form = filled_form();
        form.set_proof("image/png".to_string(), Bytes::from_static(b"\x89PNG"));

        let submission = form.finish().unwrap();
        assert_eq!(submission.payment_method, PaymentMethod::Upi);
        assert_eq!(submission.range.days(), 3);
        assert!(submission.accessories.helmet);
        assert!(!submission.accessories.gps);
        assert!(submission.proof.is_some());
    }

    #[test]
    fn test_empty_file_part_is_no_proof() {
        let mut form = filled_form();
        form.set_proof("application/octet-stream".to_string(), Bytes::new());

        assert!(form.finish().unwrap().proof.is_none());
    }

    #[test]
    fn test_missing_field_is_bad_request() {
        let mut form = SubmissionForm::default();
        form.set_field("vehicle_id", "550e8400-e29b-41d4-a716-446655440000").unwrap();

        assert!(matches!(form.finish(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_reversed_dates_are_bad_request() {
        let mut form = filled_form();
        form.set_field("return_date", "2024-05-30").unwrap();

        assert!(matches!(form.finish(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_unknown_payment_method() {
        let mut form = SubmissionForm::default();
        assert!(form.set_field("payment_method", "cheque").is_err());
    }

    #[test]
    fn test_admin_listing_defaults_to_pending() {
        assert_eq!(AdminBookingListQuery::default().status(), BookingStatus::Pending);
    }
}
