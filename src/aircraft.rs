use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// An aircraft together with the performance figures used for flight planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: i32,
    pub model: String,
    pub manufacturer: String,
    /// Tail number, unique across the fleet
    pub registration_number: String,
    /// Cruise burn in liters per kilometer
    pub fuel_consumption_per_km: f64,
    /// Fixed fuel cost of a takeoff and climb, in liters
    pub takeoff_fuel_effort: f64,
    pub max_range_km: f64,
    pub cruise_speed_kmh: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Aircraft {
    /// Label used in selection lists, e.g. "A320neo - CS-TVA"
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.model, self.registration_number)
    }

    pub fn apply(&mut self, input: &AircraftInput) {
        self.model = input.model.clone();
        self.manufacturer = input.manufacturer.clone();
        self.registration_number = input.registration_number.clone();
        self.fuel_consumption_per_km = input.fuel_consumption_per_km;
        self.takeoff_fuel_effort = input.takeoff_fuel_effort;
        self.max_range_km = input.max_range_km;
        self.cruise_speed_kmh = input.cruise_speed_kmh;
    }
}

/// User-supplied aircraft fields for create and update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftInput {
    pub model: String,
    pub manufacturer: String,
    pub registration_number: String,
    pub fuel_consumption_per_km: f64,
    pub takeoff_fuel_effort: f64,
    pub max_range_km: f64,
    pub cruise_speed_kmh: f64,
}

/// Diesel model for the aircraft table
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::aircraft)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AircraftModel {
    pub id: i32,
    pub model: String,
    pub manufacturer: String,
    pub registration_number: String,
    pub fuel_consumption_per_km: f64,
    pub takeoff_fuel_effort: f64,
    pub max_range_km: f64,
    pub cruise_speed_kmh: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert model for new aircraft
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::aircraft)]
pub struct NewAircraftModel {
    pub model: String,
    pub manufacturer: String,
    pub registration_number: String,
    pub fuel_consumption_per_km: f64,
    pub takeoff_fuel_effort: f64,
    pub max_range_km: f64,
    pub cruise_speed_kmh: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::aircraft)]
pub struct AircraftChangeset {
    pub model: String,
    pub manufacturer: String,
    pub registration_number: String,
    pub fuel_consumption_per_km: f64,
    pub takeoff_fuel_effort: f64,
    pub max_range_km: f64,
    pub cruise_speed_kmh: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AircraftModel> for Aircraft {
    fn from(model: AircraftModel) -> Self {
        Self {
            id: model.id,
            model: model.model,
            manufacturer: model.manufacturer,
            registration_number: model.registration_number,
            fuel_consumption_per_km: model.fuel_consumption_per_km,
            takeoff_fuel_effort: model.takeoff_fuel_effort,
            max_range_km: model.max_range_km,
            cruise_speed_kmh: model.cruise_speed_kmh,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<AircraftInput> for NewAircraftModel {
    fn from(input: AircraftInput) -> Self {
        Self {
            model: input.model,
            manufacturer: input.manufacturer,
            registration_number: input.registration_number,
            fuel_consumption_per_km: input.fuel_consumption_per_km,
            takeoff_fuel_effort: input.takeoff_fuel_effort,
            max_range_km: input.max_range_km,
            cruise_speed_kmh: input.cruise_speed_kmh,
            created_at: Utc::now(),
        }
    }
}

impl From<&Aircraft> for AircraftChangeset {
    fn from(aircraft: &Aircraft) -> Self {
        Self {
            model: aircraft.model.clone(),
            manufacturer: aircraft.manufacturer.clone(),
            registration_number: aircraft.registration_number.clone(),
            fuel_consumption_per_km: aircraft.fuel_consumption_per_km,
            takeoff_fuel_effort: aircraft.takeoff_fuel_effort,
            max_range_km: aircraft.max_range_km,
            cruise_speed_kmh: aircraft.cruise_speed_kmh,
            updated_at: aircraft.updated_at,
        }
    }
}
