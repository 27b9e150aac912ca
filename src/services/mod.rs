//! Business logic services.

pub mod access_policy;
pub mod audit_service;
pub mod identity;
pub mod image_enricher;
pub mod plan_generator;
pub mod trip_service;
pub mod trip_store;
