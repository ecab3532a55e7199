//! Business rules shared by the services.
//!
//! Every rule returns `Ok(())` to let the operation proceed or a single
//! [`ServiceError`] describing the first violation found. Rules that need
//! stored data take the looked-up values as arguments so they stay independent
//! of the storage backend.

use crate::aircraft::AircraftInput;
use crate::airports::AirportInput;
use crate::errors::{EntityKind, ServiceError, ServiceResult};

/// Reject a unique key that already belongs to a different record.
///
/// `holder_id` is the id of the record currently holding `value` (if any) and
/// `own_id` the id of the record being saved (`None` when creating).
pub fn check_unique(
    entity: EntityKind,
    field: &'static str,
    value: &str,
    holder_id: Option<i32>,
    own_id: Option<i32>,
) -> ServiceResult<()> {
    match holder_id {
        Some(holder) if Some(holder) != own_id => Err(ServiceError::DuplicateKey {
            entity,
            field,
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Aircraft performance figures must all be strictly positive
pub fn check_aircraft_fields(input: &AircraftInput) -> ServiceResult<()> {
    if !is_positive(input.fuel_consumption_per_km) {
        return Err(ServiceError::invalid_field(
            "fuel_consumption_per_km",
            "Fuel consumption per km must be greater than zero.",
        ));
    }

    if !is_positive(input.max_range_km) {
        return Err(ServiceError::invalid_field(
            "max_range_km",
            "Max range must be greater than zero.",
        ));
    }

    if !is_positive(input.cruise_speed_kmh) {
        return Err(ServiceError::invalid_field(
            "cruise_speed_kmh",
            "Cruise speed must be greater than zero.",
        ));
    }

    if !is_positive(input.takeoff_fuel_effort) {
        return Err(ServiceError::invalid_field(
            "takeoff_fuel_effort",
            "Takeoff fuel effort must be greater than zero.",
        ));
    }

    Ok(())
}

/// Airport code must be three ASCII letters and coordinates must be on the globe
pub fn check_airport_fields(input: &AirportInput) -> ServiceResult<()> {
    let code = input.code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ServiceError::invalid_field(
            "code",
            "Airport code must be exactly three letters.",
        ));
    }

    if !(-90.0..=90.0).contains(&input.latitude) {
        return Err(ServiceError::invalid_field(
            "latitude",
            "Latitude must be between -90 and 90.",
        ));
    }

    if !(-180.0..=180.0).contains(&input.longitude) {
        return Err(ServiceError::invalid_field(
            "longitude",
            "Longitude must be between -180 and 180.",
        ));
    }

    Ok(())
}

/// A flight cannot depart from and arrive at the same airport
pub fn check_distinct_airports(
    departure_airport_id: i32,
    destination_airport_id: i32,
) -> ServiceResult<()> {
    if departure_airport_id == destination_airport_id {
        return Err(ServiceError::invalid_field(
            "destination_airport_id",
            "Destination airport must be different from departure airport.",
        ));
    }
    Ok(())
}

/// Refuse to delete an airport or aircraft that flights still reference
pub fn guard_delete(entity: EntityKind, id: i32, flight_count: usize) -> ServiceResult<()> {
    if flight_count > 0 {
        return Err(ServiceError::ReferentialConflict {
            entity,
            id,
            flight_count,
        });
    }
    Ok(())
}
