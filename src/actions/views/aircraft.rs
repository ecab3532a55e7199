use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aircraft::{Aircraft, AircraftInput};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftView {
    pub id: i32,
    pub model: String,
    pub manufacturer: String,
    pub registration_number: String,
    pub fuel_consumption_per_km: f64,
    pub takeoff_fuel_effort: f64,
    pub max_range_km: f64,
    pub cruise_speed_kmh: f64,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Aircraft> for AircraftView {
    fn from(aircraft: Aircraft) -> Self {
        Self {
            label: aircraft.display_label(),
            id: aircraft.id,
            model: aircraft.model,
            manufacturer: aircraft.manufacturer,
            registration_number: aircraft.registration_number,
            fuel_consumption_per_km: aircraft.fuel_consumption_per_km,
            takeoff_fuel_effort: aircraft.takeoff_fuel_effort,
            max_range_km: aircraft.max_range_km,
            cruise_speed_kmh: aircraft.cruise_speed_kmh,
            created_at: aircraft.created_at,
            updated_at: aircraft.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftSummary {
    pub id: i32,
    pub model: String,
    pub registration_number: String,
}

impl From<&Aircraft> for AircraftSummary {
    fn from(aircraft: &Aircraft) -> Self {
        Self {
            id: aircraft.id,
            model: aircraft.model.clone(),
            registration_number: aircraft.registration_number.clone(),
        }
    }
}

/// Body of aircraft create and update requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AircraftRequest {
    pub model: String,
    pub manufacturer: String,
    pub registration_number: String,
    pub fuel_consumption_per_km: f64,
    pub takeoff_fuel_effort: f64,
    pub max_range_km: f64,
    pub cruise_speed_kmh: f64,
}

impl From<AircraftRequest> for AircraftInput {
    fn from(request: AircraftRequest) -> Self {
        Self {
            model: request.model,
            manufacturer: request.manufacturer,
            registration_number: request.registration_number,
            fuel_consumption_per_km: request.fuel_consumption_per_km,
            takeoff_fuel_effort: request.takeoff_fuel_effort,
            max_range_km: request.max_range_km,
            cruise_speed_kmh: request.cruise_speed_kmh,
        }
    }
}
