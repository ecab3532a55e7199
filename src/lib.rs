//! flightdesk - airport, aircraft and flight management
//!
//! Flights store a great-circle distance, fuel requirement and flight time
//! derived from their airports and aircraft. Services enforce uniqueness,
//! field and delete-guard rules over pluggable storage (Postgres via diesel,
//! or an in-memory store).

pub mod actions;
pub mod aircraft;
pub mod aircraft_repo;
pub mod aircraft_service;
pub mod airport_service;
pub mod airports;
pub mod airports_repo;
pub mod config;
pub mod db;
pub mod errors;
pub mod flight_metrics;
pub mod flight_service;
pub mod flights;
pub mod flights_repo;
pub mod logging;
pub mod memory_store;
pub mod metrics;
pub mod schema;
pub mod validation;
pub mod web;

pub use errors::{EntityKind, ServiceError, ServiceResult};
pub use flight_metrics::FlightMetrics;
