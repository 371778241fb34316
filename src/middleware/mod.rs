//! HTTP middleware
//!
//! Authentication, the admin guard and CORS.

pub mod auth;
pub mod cors;

pub use auth::{admin_only_middleware, auth_middleware};
pub use cors::cors_layer;
