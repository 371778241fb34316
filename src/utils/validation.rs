//! Validation helpers
//!
//! Custom `validator` rules used by the request DTOs, plus the parsers for
//! multipart text fields that cannot go through serde.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::ValidationError;

/// Parse a UUID field
pub fn validate_uuid(value: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        let mut error = ValidationError::new("uuid");
        error.add_param("value".into(), &value.to_string());
        error
    })
}

/// Parse a calendar date in `YYYY-MM-DD` form
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Checkbox-style flag: `true`, `on`, `1` and `yes` are set
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

/// Rates must be strictly positive
pub fn validate_positive_rate(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut error = ValidationError::new("positive");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Plates are letters, digits, spaces and dashes, 4 to 15 significant chars
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    let clean_plate: String = value.chars().filter(|c| !matches!(c, ' ' | '-')).collect();
    let valid_chars = clean_plate.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid_chars || clean_plate.len() < 4 || clean_plate.len() > 15 {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Reject strings made only of whitespace
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("invalid-uuid").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert_eq!(
            validate_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(validate_date("15/01/2024").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("on"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_validate_positive_rate() {
        assert!(validate_positive_rate(&dec!(400)).is_ok());
        assert!(validate_positive_rate(&dec!(0)).is_err());
        assert!(validate_positive_rate(&dec!(-1.50)).is_err());
    }

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("MH 12 AB 1234").is_ok());
        assert!(validate_license_plate("KA-01-HH-9999").is_ok());
        assert!(validate_license_plate("AB1").is_err());
        assert!(validate_license_plate("MH12#1234").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Bajaj").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }
}
