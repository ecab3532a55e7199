use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flights::{FlightInput, FlightStatus, FlightWithDetails};

use super::{AircraftSummary, AirportSummary};

/// Flight as returned by the API, with its route and aircraft inlined
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightView {
    pub id: i32,
    pub flight_number: String,
    pub departure_airport: AirportSummary,
    pub destination_airport: AirportSummary,
    pub aircraft: AircraftSummary,
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

impl From<FlightWithDetails> for FlightView {
    fn from(details: FlightWithDetails) -> Self {
        let flight = details.flight;
        Self {
            id: flight.id,
            flight_number: flight.flight_number,
            departure_airport: AirportSummary::from(&details.departure_airport),
            destination_airport: AirportSummary::from(&details.destination_airport),
            aircraft: AircraftSummary::from(&details.aircraft),
            scheduled_departure: flight.scheduled_departure,
            actual_departure: flight.actual_departure,
            actual_arrival: flight.actual_arrival,
            distance_km: flight.distance_km,
            fuel_required_liters: flight.fuel_required_liters,
            estimated_flight_time_hours: flight.estimated_flight_time_hours,
            status: flight.status,
            created_at: flight.created_at,
            updated_at: flight.updated_at,
        }
    }
}

/// Body of flight create and update requests.
///
/// Distance, fuel and time are not accepted; they are always recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightRequest {
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

impl From<FlightRequest> for FlightInput {
    fn from(request: FlightRequest) -> Self {
        Self {
            flight_number: request.flight_number.trim().to_string(),
            departure_airport_id: request.departure_airport_id,
            destination_airport_id: request.destination_airport_id,
            aircraft_id: request.aircraft_id,
            scheduled_departure: request.scheduled_departure,
            actual_departure: request.actual_departure,
            actual_arrival: request.actual_arrival,
            status: request.status,
        }
    }
}
