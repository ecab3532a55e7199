//! Process-local store implementing every storage trait.
//!
//! Used by `web --in-memory` and by the service tests. Ids are assigned from
//! per-table sequences starting at 1, the same way the database does. Unique
//! keys and flight references are checked under the write lock, matching the
//! unique indexes and `ON DELETE RESTRICT` keys of the Postgres schema.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::aircraft::{Aircraft, AircraftInput};
use crate::aircraft_repo::AircraftStore;
use crate::airports::{Airport, AirportInput};
use crate::airports_repo::AirportStore;
use crate::errors::{ConstraintViolation, EntityKind};
use crate::flights::{Flight, FlightWithDetails, NewFlight};
use crate::flights_repo::FlightStore;

#[derive(Default)]
struct Tables {
    airports: BTreeMap<i32, Airport>,
    aircraft: BTreeMap<i32, Aircraft>,
    flights: BTreeMap<i32, Flight>,
    next_airport_id: i32,
    next_aircraft_id: i32,
    next_flight_id: i32,
}

impl Tables {
    fn details(&self, flight: &Flight) -> Option<FlightWithDetails> {
        Some(FlightWithDetails {
            departure_airport: self.airports.get(&flight.departure_airport_id)?.clone(),
            destination_airport: self.airports.get(&flight.destination_airport_id)?.clone(),
            aircraft: self.aircraft.get(&flight.aircraft_id)?.clone(),
            flight: flight.clone(),
        })
    }

    fn check_airport_code(&self, code: &str, own_id: Option<i32>) -> Result<()> {
        match self.airports.values().find(|a| a.code == code) {
            Some(holder) if Some(holder.id) != own_id => Err(ConstraintViolation::UniqueKey {
                entity: EntityKind::Airport,
                field: "code",
                value: code.to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn check_registration(&self, registration: &str, own_id: Option<i32>) -> Result<()> {
        match self
            .aircraft
            .values()
            .find(|a| a.registration_number == registration)
        {
            Some(holder) if Some(holder.id) != own_id => Err(ConstraintViolation::UniqueKey {
                entity: EntityKind::Aircraft,
                field: "registration number",
                value: registration.to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn flights_at_airport(&self, airport_id: i32) -> usize {
        self.flights
            .values()
            .filter(|f| f.references_airport(airport_id))
            .count()
    }

    fn flights_with_aircraft(&self, aircraft_id: i32) -> usize {
        self.flights
            .values()
            .filter(|f| f.aircraft_id == aircraft_id)
            .count()
    }

    fn flights_sorted(&self) -> Vec<Flight> {
        let mut flights: Vec<Flight> = self.flights.values().cloned().collect();
        sort_flights(&mut flights);
        flights
    }
}

fn next_id(sequence: &mut i32) -> i32 {
    *sequence += 1;
    *sequence
}

fn sort_flights(flights: &mut [Flight]) {
    flights.sort_by(|a, b| {
        b.scheduled_departure
            .cmp(&a.scheduled_departure)
            .then(b.id.cmp(&a.id))
    });
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AirportStore for InMemoryStore {
    async fn get_by_id(&self, airport_id: i32) -> Result<Option<Airport>> {
        Ok(self.tables.read().await.airports.get(&airport_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Airport>> {
        let tables = self.tables.read().await;
        let mut airports: Vec<Airport> = tables.airports.values().cloned().collect();
        airports.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(airports)
    }

    async fn get_by_code(&self, airport_code: &str) -> Result<Option<Airport>> {
        let tables = self.tables.read().await;
        Ok(tables
            .airports
            .values()
            .find(|a| a.code == airport_code)
            .cloned())
    }

    async fn search_by_name_or_city(&self, term: &str) -> Result<Vec<Airport>> {
        let needle = term.to_lowercase();
        let tables = self.tables.read().await;
        let mut matches: Vec<Airport> = tables
            .airports
            .values()
            .filter(|a| {
                a.name.to_lowercase().contains(&needle)
                    || a.city.to_lowercase().contains(&needle)
                    || a.code.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
        Ok(matches)
    }

    async fn add(&self, input: AirportInput) -> Result<Airport> {
        let mut tables = self.tables.write().await;
        tables.check_airport_code(&input.code, None)?;
        let id = next_id(&mut tables.next_airport_id);
        let airport = Airport {
            id,
            code: input.code,
            name: input.name,
            city: input.city,
            country: input.country,
            latitude: input.latitude,
            longitude: input.longitude,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.airports.insert(id, airport.clone());
        Ok(airport)
    }

    async fn update(&self, airport: &Airport) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.airports.contains_key(&airport.id) {
            return Ok(false);
        }
        tables.check_airport_code(&airport.code, Some(airport.id))?;
        match tables.airports.get_mut(&airport.id) {
            Some(stored) => {
                *stored = Airport {
                    updated_at: Some(Utc::now()),
                    created_at: stored.created_at,
                    ..airport.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, airport_id: i32) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let flight_count = tables.flights_at_airport(airport_id);
        if flight_count > 0 {
            return Err(ConstraintViolation::StillReferenced {
                entity: EntityKind::Airport,
                id: airport_id,
                flight_count,
            }
            .into());
        }
        Ok(tables.airports.remove(&airport_id).is_some())
    }

    async fn exists(&self, airport_id: i32) -> Result<bool> {
        Ok(self.tables.read().await.airports.contains_key(&airport_id))
    }
}

#[async_trait]
impl AircraftStore for InMemoryStore {
    async fn get_by_id(&self, aircraft_id: i32) -> Result<Option<Aircraft>> {
        Ok(self.tables.read().await.aircraft.get(&aircraft_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Aircraft>> {
        let tables = self.tables.read().await;
        let mut fleet: Vec<Aircraft> = tables.aircraft.values().cloned().collect();
        fleet.sort_by(|a, b| a.registration_number.cmp(&b.registration_number));
        Ok(fleet)
    }

    async fn get_by_registration_number(&self, registration: &str) -> Result<Option<Aircraft>> {
        let tables = self.tables.read().await;
        Ok(tables
            .aircraft
            .values()
            .find(|a| a.registration_number == registration)
            .cloned())
    }

    async fn add(&self, input: AircraftInput) -> Result<Aircraft> {
        let mut tables = self.tables.write().await;
        tables.check_registration(&input.registration_number, None)?;
        let id = next_id(&mut tables.next_aircraft_id);
        let aircraft = Aircraft {
            id,
            model: input.model,
            manufacturer: input.manufacturer,
            registration_number: input.registration_number,
            fuel_consumption_per_km: input.fuel_consumption_per_km,
            takeoff_fuel_effort: input.takeoff_fuel_effort,
            max_range_km: input.max_range_km,
            cruise_speed_kmh: input.cruise_speed_kmh,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.aircraft.insert(id, aircraft.clone());
        Ok(aircraft)
    }

    async fn update(&self, aircraft: &Aircraft) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if !tables.aircraft.contains_key(&aircraft.id) {
            return Ok(false);
        }
        tables.check_registration(&aircraft.registration_number, Some(aircraft.id))?;
        match tables.aircraft.get_mut(&aircraft.id) {
            Some(stored) => {
                *stored = Aircraft {
                    updated_at: Some(Utc::now()),
                    created_at: stored.created_at,
                    ..aircraft.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, aircraft_id: i32) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let flight_count = tables.flights_with_aircraft(aircraft_id);
        if flight_count > 0 {
            return Err(ConstraintViolation::StillReferenced {
                entity: EntityKind::Aircraft,
                id: aircraft_id,
                flight_count,
            }
            .into());
        }
        Ok(tables.aircraft.remove(&aircraft_id).is_some())
    }

    async fn exists(&self, aircraft_id: i32) -> Result<bool> {
        Ok(self.tables.read().await.aircraft.contains_key(&aircraft_id))
    }
}

#[async_trait]
impl FlightStore for InMemoryStore {
    async fn get_by_id(&self, flight_id: i32) -> Result<Option<Flight>> {
        Ok(self.tables.read().await.flights.get(&flight_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Flight>> {
        Ok(self.tables.read().await.flights_sorted())
    }

    async fn get_all_with_details(&self) -> Result<Vec<FlightWithDetails>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights_sorted()
            .iter()
            .filter_map(|f| tables.details(f))
            .collect())
    }

    async fn get_by_id_with_details(&self, flight_id: i32) -> Result<Option<FlightWithDetails>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights
            .get(&flight_id)
            .and_then(|f| tables.details(f)))
    }

    async fn get_by_flight_number(&self, number: &str) -> Result<Option<Flight>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights_sorted()
            .into_iter()
            .find(|f| f.flight_number == number))
    }

    async fn get_flights_by_airport(&self, airport_id: i32) -> Result<Vec<Flight>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights_sorted()
            .into_iter()
            .filter(|f| f.references_airport(airport_id))
            .collect())
    }

    async fn get_flights_by_aircraft(&self, aircraft_id: i32) -> Result<Vec<Flight>> {
        let tables = self.tables.read().await;
        Ok(tables
            .flights_sorted()
            .into_iter()
            .filter(|f| f.aircraft_id == aircraft_id)
            .collect())
    }

    async fn count_flights_by_airport(&self, airport_id: i32) -> Result<usize> {
        Ok(self.tables.read().await.flights_at_airport(airport_id))
    }

    async fn count_flights_by_aircraft(&self, aircraft_id: i32) -> Result<usize> {
        Ok(self.tables.read().await.flights_with_aircraft(aircraft_id))
    }

    async fn add(&self, new_flight: NewFlight) -> Result<Flight> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_flight_id);
        let flight = Flight {
            id,
            flight_number: new_flight.flight_number,
            departure_airport_id: new_flight.departure_airport_id,
            destination_airport_id: new_flight.destination_airport_id,
            aircraft_id: new_flight.aircraft_id,
            scheduled_departure: new_flight.scheduled_departure,
            actual_departure: new_flight.actual_departure,
            actual_arrival: new_flight.actual_arrival,
            distance_km: new_flight.metrics.distance_km,
            fuel_required_liters: new_flight.metrics.fuel_required_liters,
            estimated_flight_time_hours: new_flight.metrics.estimated_flight_time_hours,
            status: new_flight.status,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.flights.insert(id, flight.clone());
        Ok(flight)
    }

    async fn update(&self, flight: &Flight) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.flights.get_mut(&flight.id) {
            Some(stored) => {
                *stored = Flight {
                    updated_at: Some(Utc::now()),
                    created_at: stored.created_at,
                    ..flight.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, flight_id: i32) -> Result<bool> {
        Ok(self.tables.write().await.flights.remove(&flight_id).is_some())
    }

    async fn exists(&self, flight_id: i32) -> Result<bool> {
        Ok(self.tables.read().await.flights.contains_key(&flight_id))
    }
}
