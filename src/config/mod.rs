//! Project configuration
//!
//! Database, environment and pricing configuration.

pub mod database;
pub mod environment;
pub mod pricing;

pub use database::DatabaseConfig;
pub use environment::{ConfigError, EnvironmentConfig};
pub use pricing::RateTable;
