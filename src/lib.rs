//! Itinera - Backend Library
//!
//! Trip plan history service: ownership-scoped storage, soft deletion, and an
//! append-only audit trail.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
