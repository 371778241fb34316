//! Vehicle rental booking engine
//!
//! Booking lifecycle, availability and pricing for a vehicle rental site,
//! served over axum on top of PostgreSQL.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
