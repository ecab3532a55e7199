use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aircraft::Aircraft;
use crate::airports::Airport;
use crate::flight_metrics::FlightMetrics;

/// Operational status of a scheduled flight
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, DbEnum,
)]
#[db_enum(existing_type_path = "crate::schema::sql_types::FlightStatus")]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    #[default]
    #[db_enum(rename = "scheduled")]
    Scheduled,
    #[db_enum(rename = "boarding")]
    Boarding,
    #[db_enum(rename = "departed")]
    Departed,
    #[db_enum(rename = "in_flight")]
    InFlight,
    #[db_enum(rename = "landed")]
    Landed,
    #[db_enum(rename = "cancelled")]
    Cancelled,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Scheduled,
        FlightStatus::Boarding,
        FlightStatus::Departed,
        FlightStatus::InFlight,
        FlightStatus::Landed,
        FlightStatus::Cancelled,
    ];
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightStatus::Scheduled => write!(f, "Scheduled"),
            FlightStatus::Boarding => write!(f, "Boarding"),
            FlightStatus::Departed => write!(f, "Departed"),
            FlightStatus::InFlight => write!(f, "In Flight"),
            FlightStatus::Landed => write!(f, "Landed"),
            FlightStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A scheduled flight between two airports.
///
/// `distance_km`, `fuel_required_liters` and `estimated_flight_time_hours` are
/// derived from the referenced airports and aircraft and are never taken from
/// user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i32,
    pub flight_number: String,
    pub departure_airport_id: i32,
    pub destination_airport_id: i32,
    pub aircraft_id: i32,
    pub scheduled_departure: DateTime<Utc>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub distance_km: f64,
    pub fuel_required_liters: f64,
    pub estimated_flight_time_hours: f64,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Flight {
    /// Overwrite scheduling fields and derived metrics, keeping identity and creation time
    pub fn apply(&mut self, input: &FlightInput, metrics: FlightMetrics) {
        self.flight_number = input.flight_number.clone();
        self.departure_airport_id = input.departure_airport_id;
        self.destination_airport_id = input.destination_airport_id;
        self.aircraft_id = input.aircraft_id;
        self.scheduled_departure = input.scheduled_departure;
        self.actual_departure = input.actual_departure;
        self.actual_arrival = input.actual_arrival;
        self.status = input.status;
        self.set_metrics(metrics);
    }

    pub fn set_metrics(&mut self, metrics: FlightMetrics) {
        self.distance_km = metrics.distance_km;
        self.fuel_required_liters = metrics.fuel_required_liters;
        self.estimated_flight_time_hours = metrics.estimated_flight_time_hours;
    }

    pub fn metrics(&self) -> FlightMetrics {
        FlightMetrics {
            distance_km: self.distance_km,
            fuel_required_liters: self.fuel_required_liters,
            estimated_flight_time_hours: self.estimated_flight_time_hours,
        }
    }

    /// True when the given airport is either end of this flight
    pub fn references_airport(&self, airport_id: i32) -> bool {
        self.departure_airport_id == airport_id || self.destination_airport_id == airport_id
    }
}

/// User-supplied flight fields; derived metrics are not accepted from callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightInput {
    pub flight_number: String,
    pub departure_airport_id: i32,
    pub destination_airport_id: i32,
    pub aircraft_id: i32,
    pub scheduled_departure: DateTime<Utc>,
    #[serde(default)]
    pub actual_departure: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: FlightStatus,
}

/// A flight ready to be persisted: scheduling fields plus freshly computed metrics
#[derive(Debug, Clone, PartialEq)]
pub struct NewFlight {
    pub flight_number: String,
    pub departure_airport_id: i32,
    pub destination_airport_id: i32,
    pub aircraft_id: i32,
    pub scheduled_departure: DateTime<Utc>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub metrics: FlightMetrics,
    pub status: FlightStatus,
}

impl NewFlight {
    pub fn new(input: &FlightInput, metrics: FlightMetrics) -> Self {
        Self {
            flight_number: input.flight_number.clone(),
            departure_airport_id: input.departure_airport_id,
            destination_airport_id: input.destination_airport_id,
            aircraft_id: input.aircraft_id,
            scheduled_departure: input.scheduled_departure,
            actual_departure: input.actual_departure,
            actual_arrival: input.actual_arrival,
            metrics,
            status: input.status,
        }
    }
}

/// A flight with its airports and aircraft loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightWithDetails {
    pub flight: Flight,
    pub departure_airport: Airport,
    pub destination_airport: Airport,
    pub aircraft: Aircraft,
}

/// Diesel model for the flights table
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::flights)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FlightModel {
    pub id: i32,
    pub flight_number: String,
    pub departure_airport_id: i32,
    pub destination_airport_id: i32,
    pub aircraft_id: i32,
    pub scheduled_departure: DateTime<Utc>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub distance_km: f64,
    pub fuel_required_liters: f64,
    pub estimated_flight_time_hours: f64,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert model for new flights
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::flights)]
pub struct NewFlightModel {
    pub flight_number: String,
    pub departure_airport_id: i32,
    pub destination_airport_id: i32,
    pub aircraft_id: i32,
    pub scheduled_departure: DateTime<Utc>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub distance_km: f64,
    pub fuel_required_liters: f64,
    pub estimated_flight_time_hours: f64,
    pub status: FlightStatus,
    pub created_at: DateTime<Utc>,
}

/// Full-row changeset; `None` clears actual departure/arrival
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::flights)]
#[diesel(treat_none_as_null = true)]
pub struct FlightChangeset {
    pub flight_number: String,
    pub departure_airport_id: i32,
    pub destination_airport_id: i32,
    pub aircraft_id: i32,
    pub scheduled_departure: DateTime<Utc>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub distance_km: f64,
    pub fuel_required_liters: f64,
    pub estimated_flight_time_hours: f64,
    pub status: FlightStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<FlightModel> for Flight {
    fn from(model: FlightModel) -> Self {
        Self {
            id: model.id,
            flight_number: model.flight_number,
            departure_airport_id: model.departure_airport_id,
            destination_airport_id: model.destination_airport_id,
            aircraft_id: model.aircraft_id,
            scheduled_departure: model.scheduled_departure,
            actual_departure: model.actual_departure,
            actual_arrival: model.actual_arrival,
            distance_km: model.distance_km,
            fuel_required_liters: model.fuel_required_liters,
            estimated_flight_time_hours: model.estimated_flight_time_hours,
            status: model.status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<NewFlight> for NewFlightModel {
    fn from(flight: NewFlight) -> Self {
        Self {
            flight_number: flight.flight_number,
            departure_airport_id: flight.departure_airport_id,
            destination_airport_id: flight.destination_airport_id,
            aircraft_id: flight.aircraft_id,
            scheduled_departure: flight.scheduled_departure,
            actual_departure: flight.actual_departure,
            actual_arrival: flight.actual_arrival,
            distance_km: flight.metrics.distance_km,
            fuel_required_liters: flight.metrics.fuel_required_liters,
            estimated_flight_time_hours: flight.metrics.estimated_flight_time_hours,
            status: flight.status,
            created_at: Utc::now(),
        }
    }
}

impl From<&Flight> for FlightChangeset {
    fn from(flight: &Flight) -> Self {
        Self {
            flight_number: flight.flight_number.clone(),
            departure_airport_id: flight.departure_airport_id,
            destination_airport_id: flight.destination_airport_id,
            aircraft_id: flight.aircraft_id,
            scheduled_departure: flight.scheduled_departure,
            actual_departure: flight.actual_departure,
            actual_arrival: flight.actual_arrival,
            distance_km: flight.distance_km,
            fuel_required_liters: flight.fuel_required_liters,
            estimated_flight_time_hours: flight.estimated_flight_time_hours,
            status: flight.status,
            updated_at: flight.updated_at,
        }
    }
}
