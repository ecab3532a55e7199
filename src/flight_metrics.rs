//! Derived flight figures: great-circle distance, fuel and block time.
//!
//! These are pure functions over already-validated inputs. Coordinates are in
//! decimal degrees; aircraft performance values are assumed strictly positive
//! (enforced when the aircraft is saved), so no checks happen here.

use serde::{Deserialize, Serialize};

use crate::aircraft::Aircraft;
use crate::airports::Airport;

/// Mean Earth radius used by the Haversine formula, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (Haversine formula)
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Fuel needed for a flight: linear burn over distance plus a fixed takeoff cost
pub fn fuel_required_liters(
    distance_km: f64,
    fuel_consumption_per_km: f64,
    takeoff_fuel_effort: f64,
) -> f64 {
    distance_km * fuel_consumption_per_km + takeoff_fuel_effort
}

/// Flight time at constant cruise speed, in hours.
/// Climb and descent phases are not modelled.
pub fn flight_time_hours(distance_km: f64, cruise_speed_kmh: f64) -> f64 {
    distance_km / cruise_speed_kmh
}

/// The three derived fields stored on every flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightMetrics {
    pub distance_km: f64,
    pub fuel_required_liters: f64,
    pub estimated_flight_time_hours: f64,
}

impl FlightMetrics {
    /// Compute metrics for a route flown by the given aircraft
    pub fn compute(departure: &Airport, destination: &Airport, aircraft: &Aircraft) -> Self {
        let distance_km = haversine_distance_km(
            departure.latitude,
            departure.longitude,
            destination.latitude,
            destination.longitude,
        );

        Self {
            distance_km,
            fuel_required_liters: fuel_required_liters(
                distance_km,
                aircraft.fuel_consumption_per_km,
                aircraft.takeoff_fuel_effort,
            ),
            estimated_flight_time_hours: flight_time_hours(distance_km, aircraft.cruise_speed_kmh),
        }
    }
}
