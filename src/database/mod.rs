//! Database module
//!
//! PostgreSQL pool and schema migrations

pub mod connection;

pub use connection::DatabaseConnection;
