//! Shared utilities
//!
//! Error types, JWT verification and request validation helpers.

pub mod errors;
pub mod jwt;
pub mod validation;
