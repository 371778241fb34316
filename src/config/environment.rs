//! Environment configuration
//!
//! Reads the process environment (optionally seeded from `.env` by
//! `dotenvy` in `main`) into [`EnvironmentConfig`].

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use super::pricing::RateTable;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Environment configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub log_level: tracing::Level,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub rates: RateTable,
}

const DEV_JWT_SECRET: &str = "development-only-secret";

impl EnvironmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if environment == "development" => DEV_JWT_SECRET.to_string(),
            Err(_) => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        Ok(Self {
            port: parse_var("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            log_level: parse_var("LOG_LEVEL", tracing::Level::INFO)?,
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", 86_400)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads/payment_proofs")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
            rates: RateTable::from_env()?,
            environment,
        })
    }

    /// Configuration for tests and local runs without any environment
    pub fn for_development(jwt_secret: &str) -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "127.0.0.1".to_string(),
            log_level: tracing::Level::DEBUG,
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration: 3600,
            cors_origins: Vec::new(),
            upload_dir: std::env::temp_dir().join("vehicle_rental_uploads"),
            max_upload_bytes: 5 * 1024 * 1024,
            rates: RateTable::default(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse an optional variable, falling back to `default` when unset.
pub(crate) fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_uses_default_when_unset() {
        let port: u16 = parse_var("VEHICLE_RENTAL_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("VEHICLE_RENTAL_TEST_BAD_PORT", "eighty");
        let err = parse_var::<u16>("VEHICLE_RENTAL_TEST_BAD_PORT", 8080).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "VEHICLE_RENTAL_TEST_BAD_PORT", .. }));
    }

    #[test]
    fn test_development_config() {
        let config = EnvironmentConfig::for_development("secret");
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "127.0.0.1:3000");
    }
}
