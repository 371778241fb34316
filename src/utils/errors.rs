//! Error handling
//!
//! [`BookingError`] is the taxonomy raised by the booking engine and the
//! stores behind it. [`AppError`] is the HTTP boundary: every domain error
//! converts into it and renders as a JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Accessory, BookingStatus, VehicleCategory, VehicleStatus};
use crate::services::payment_proof::StorageError;

/// Errors raised by pricing, availability, lifecycle and persistence
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Vehicle {0} not found")]
    VehicleNotFound(Uuid),

    #[error("Booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("Scheduling conflict with bookings {conflicts:?}")]
    SchedulingConflict { conflicts: Vec<Uuid> },

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("{accessory} is not offered for {} vehicles", .category.as_str())]
    UnsupportedAccessory {
        accessory: Accessory,
        category: VehicleCategory,
    },

    #[error("A payment proof is required for UPI payments")]
    MissingPaymentProof,

    #[error("Vehicle {id} is {} and cannot be rented", .status.as_str())]
    VehicleNotRentable { id: Uuid, status: VehicleStatus },

    #[error("Vehicle {0} has pending or confirmed bookings")]
    VehicleInUse(Uuid),

    #[error("License plate '{0}' is already registered")]
    DuplicateLicensePlate(String),

    #[error("Not permitted: {0}")]
    NotPermitted(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(#[from] sqlx::Error),
}

impl BookingError {
    /// SQLSTATE for exclusion constraint violations
    const EXCLUSION_VIOLATION: &'static str = "23P01";
    /// SQLSTATE for unique constraint violations
    const UNIQUE_VIOLATION: &'static str = "23505";

    fn sqlstate(err: &sqlx::Error) -> Option<String> {
        err.as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned())
    }

    /// Translate a write failure on `bookings`, turning the database-level
    /// double-booking guard into a scheduling conflict.
    pub fn from_booking_write(err: sqlx::Error) -> Self {
        match Self::sqlstate(&err).as_deref() {
            Some(Self::EXCLUSION_VIOLATION) => BookingError::SchedulingConflict { conflicts: Vec::new() },
            _ => BookingError::PersistenceFailure(err),
        }
    }

    /// Translate a write failure on `vehicles`
    pub fn from_vehicle_write(err: sqlx::Error, license_plate: &str) -> Self {
        match Self::sqlstate(&err).as_deref() {
            Some(Self::UNIQUE_VIOLATION) => BookingError::DuplicateLicensePlate(license_plate.to_string()),
            _ => BookingError::PersistenceFailure(err),
        }
    }
}

/// Main application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        conflicts: Vec<Uuid>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(String),
}

impl AppError {
    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict {
            message: message.into(),
            conflicts: Vec::new(),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidDateRange(_)
            | BookingError::UnsupportedAccessory { .. }
            | BookingError::MissingPaymentProof => AppError::BadRequest(err.to_string()),
            BookingError::VehicleNotFound(_) | BookingError::BookingNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            BookingError::SchedulingConflict { conflicts } => AppError::Conflict {
                message: "The vehicle is already reserved for the selected dates".to_string(),
                conflicts,
            },
            BookingError::InvalidTransition { .. }
            | BookingError::VehicleNotRentable { .. }
            | BookingError::VehicleInUse(_)
            | BookingError::DuplicateLicensePlate(_) => AppError::conflict(err.to_string()),
            BookingError::NotPermitted(msg) => AppError::Forbidden(msg),
            BookingError::PersistenceFailure(e) => {
                tracing::error!("💥 Persistence failure: {:?}", e);
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            StorageError::UnsupportedType(_) | StorageError::Empty => AppError::BadRequest(err.to_string()),
            StorageError::Io(e) => {
                tracing::error!("💥 Payment proof storage failure: {:?}", e);
                AppError::Internal(e.to_string())
            }
        }
    }
}

/// API error body
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Validation(e) => {
                tracing::debug!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse {
                        error: "Unauthorized".to_string(),
                        message: msg,
                        details: None,
                        code: Some("UNAUTHORIZED".to_string()),
                    },
                )
            }

            AppError::Forbidden(msg) => {
                tracing::warn!("Forbidden access: {}", msg);
                (
                    StatusCode::FORBIDDEN,
                    ErrorResponse {
                        error: "Forbidden".to_string(),
                        message: msg,
                        details: None,
                        code: Some("FORBIDDEN".to_string()),
                    },
                )
            }

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: msg,
                    details: None,
                    code: Some("NOT_FOUND".to_string()),
                },
            ),

            AppError::Conflict { message, conflicts } => {
                tracing::warn!("Conflict: {} {:?}", message, conflicts);
                let details = if conflicts.is_empty() {
                    None
                } else {
                    Some(json!({ "conflicting_bookings": conflicts }))
                };
                (
                    StatusCode::CONFLICT,
                    ErrorResponse {
                        error: "Conflict".to_string(),
                        message,
                        details,
                        code: Some("CONFLICT".to_string()),
                    },
                )
            }

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: msg,
                    details: None,
                    code: Some("BAD_REQUEST".to_string()),
                },
            ),

            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse {
                    error: "Payload Too Large".to_string(),
                    message: msg,
                    details: None,
                    code: Some("PAYLOAD_TOO_LARGE".to_string()),
                },
            ),

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred, please try again".to_string(),
                        details: None,
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }

            AppError::Jwt(msg) => {
                tracing::warn!("JWT error: {}", msg);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse {
                        error: "JWT Error".to_string(),
                        message: msg,
                        details: None,
                        code: Some("JWT_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Typed result for handlers
pub type AppResult<T> = Result<T, AppError>;

/// Helper for not-found errors
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Helper for bad request errors
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduling_conflict_maps_to_409_with_ids() {
        let id = Uuid::new_v4();
        let app: AppError = BookingError::SchedulingConflict { conflicts: vec![id] }.into();
        match &app {
            AppError::Conflict { conflicts, .. } => assert_eq!(conflicts, &vec![id]),
            other => panic!("unexpected mapping: {:?}", other),
        }
        assert_eq!(app.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_domain_errors_map_to_client_statuses() {
        let cases = [
            (BookingError::InvalidDateRange("x".into()), StatusCode::BAD_REQUEST),
            (BookingError::VehicleNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (
                BookingError::InvalidTransition {
                    from: BookingStatus::Rejected,
                    to: BookingStatus::Confirmed,
                },
                StatusCode::CONFLICT,
            ),
            (BookingError::NotPermitted("admins only".into()), StatusCode::FORBIDDEN),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_unsupported_accessory_message() {
        let err = BookingError::UnsupportedAccessory {
            accessory: Accessory::ChildSeat,
            category: VehicleCategory::TwoWheeler,
        };
        assert_eq!(err.to_string(), "Child seat is not offered for two_wheeler vehicles");
    }
}
