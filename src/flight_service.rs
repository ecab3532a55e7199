//! Flight scheduling workflow.
//!
//! Every create or update resolves the departure airport, destination airport
//! and aircraft, recomputes the derived figures from them and writes a single
//! flight row. Nothing is written unless all three references resolve.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aircraft::Aircraft;
use crate::aircraft_repo::AircraftStore;
use crate::airports::Airport;
use crate::airports_repo::AirportStore;
use crate::errors::{EntityKind, ServiceError, ServiceResult};
use crate::flight_metrics::FlightMetrics;
use crate::flights::{Flight, FlightInput, FlightStatus, FlightWithDetails, NewFlight};
use crate::flights_repo::FlightStore;
use crate::metrics::record_rejection;
use crate::validation::check_distinct_airports;

/// One line of the flight report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightReportItem {
    pub flight_id: i32,
    pub flight_number: String,
    pub departure_airport_code: String,
    pub departure_airport_name: String,
    pub destination_airport_code: String,
    pub destination_airport_name: String,
    pub aircraft_model: String,
    pub aircraft_registration: String,
    pub scheduled_departure: DateTime<Utc>,
    pub distance_km: f64,
    pub estimated_flight_time_hours: f64,
    pub fuel_required_liters: f64,
    pub status: FlightStatus,
}

impl From<&FlightWithDetails> for FlightReportItem {
    fn from(details: &FlightWithDetails) -> Self {
        Self {
            flight_id: details.flight.id,
            flight_number: details.flight.flight_number.clone(),
            departure_airport_code: details.departure_airport.code.clone(),
            departure_airport_name: details.departure_airport.name.clone(),
            destination_airport_code: details.destination_airport.code.clone(),
            destination_airport_name: details.destination_airport.name.clone(),
            aircraft_model: details.aircraft.model.clone(),
            aircraft_registration: details.aircraft.registration_number.clone(),
            scheduled_departure: details.flight.scheduled_departure,
            distance_km: details.flight.distance_km,
            estimated_flight_time_hours: details.flight.estimated_flight_time_hours,
            fuel_required_liters: details.flight.fuel_required_liters,
            status: details.flight.status,
        }
    }
}

/// Report over all flights with totals and averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightReport {
    pub flights: Vec<FlightReportItem>,
    pub total_flights: usize,
    pub total_distance_km: f64,
    pub total_fuel_required_liters: f64,
    pub total_flight_time_hours: f64,
    /// Zero when there are no flights
    pub average_distance_km: f64,
    /// Zero when there are no flights
    pub average_fuel_required_liters: f64,
}

impl FlightReport {
    pub fn from_items(flights: Vec<FlightReportItem>) -> Self {
        let total_flights = flights.len();
        let total_distance_km: f64 = flights.iter().map(|f| f.distance_km).sum();
        let total_fuel_required_liters: f64 = flights.iter().map(|f| f.fuel_required_liters).sum();
        let total_flight_time_hours: f64 =
            flights.iter().map(|f| f.estimated_flight_time_hours).sum();

        let (average_distance_km, average_fuel_required_liters) = if total_flights == 0 {
            (0.0, 0.0)
        } else {
            (
                total_distance_km / total_flights as f64,
                total_fuel_required_liters / total_flights as f64,
            )
        };

        Self {
            flights,
            total_flights,
            total_distance_km,
            total_fuel_required_liters,
            total_flight_time_hours,
            average_distance_km,
            average_fuel_required_liters,
        }
    }
}

/// Value/label pair for selection lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// Everything a flight form needs to offer choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightFormData {
    pub airports: Vec<SelectOption>,
    pub aircraft: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
}

/// The three records a flight points at
struct ResolvedRoute {
    departure: Airport,
    destination: Airport,
    aircraft: Aircraft,
}

impl ResolvedRoute {
    fn metrics(&self) -> FlightMetrics {
        FlightMetrics::compute(&self.departure, &self.destination, &self.aircraft)
    }
}

#[derive(Clone)]
pub struct FlightService {
    flights: Arc<dyn FlightStore>,
    airports: Arc<dyn AirportStore>,
    aircraft: Arc<dyn AircraftStore>,
}

impl FlightService {
    pub fn new(
        flights: Arc<dyn FlightStore>,
        airports: Arc<dyn AirportStore>,
        aircraft: Arc<dyn AircraftStore>,
    ) -> Self {
        Self {
            flights,
            airports,
            aircraft,
        }
    }

    /// All flights with their airports and aircraft, latest departure first
    pub async fn list(&self) -> ServiceResult<Vec<FlightWithDetails>> {
        Ok(self.flights.get_all_with_details().await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<FlightWithDetails> {
        self.flights
            .get_by_id_with_details(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: EntityKind::Flight,
                id,
            })
    }

    pub async fn get_by_flight_number(&self, number: &str) -> ServiceResult<Option<Flight>> {
        Ok(self.flights.get_by_flight_number(number.trim()).await?)
    }

    /// Soft checks on the flight input that need no stored data
    pub fn validate(&self, input: &FlightInput) -> ServiceResult<()> {
        check_distinct_airports(input.departure_airport_id, input.destination_airport_id)
    }

    pub async fn create(&self, input: FlightInput) -> ServiceResult<FlightWithDetails> {
        if let Err(e) = self.validate(&input) {
            record_rejection(EntityKind::Flight, &e);
            return Err(e);
        }

        let route = self.resolve(&input).await?;
        let metrics = route.metrics();
        let flight = self.flights.add(NewFlight::new(&input, metrics)).await?;

        metrics::counter!("flights.created_total").increment(1);
        info!(
            "Created flight {} ({}): {} -> {}, {:.1} km",
            flight.flight_number,
            flight.id,
            route.departure.code,
            route.destination.code,
            flight.distance_km
        );

        Ok(FlightWithDetails {
            flight,
            departure_airport: route.departure,
            destination_airport: route.destination,
            aircraft: route.aircraft,
        })
    }

    /// Overwrite a flight and recompute its figures, even if the route is unchanged
    pub async fn update(&self, id: i32, input: FlightInput) -> ServiceResult<FlightWithDetails> {
        let Some(mut flight) = self.flights.get_by_id(id).await? else {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Flight,
                id,
            });
        };

        if let Err(e) = self.validate(&input) {
            record_rejection(EntityKind::Flight, &e);
            return Err(e);
        }

        let route = self.resolve(&input).await?;
        flight.apply(&input, route.metrics());

        if !self.flights.update(&flight).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Flight,
                id,
            });
        }

        metrics::counter!("flights.updated_total").increment(1);
        info!("Updated flight {} ({})", flight.flight_number, flight.id);

        self.get(id).await
    }

    /// Flights have no dependents, so deletion is unconditional
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        if !self.flights.delete(id).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Flight,
                id,
            });
        }

        metrics::counter!("flights.deleted_total").increment(1);
        info!("Deleted flight {}", id);
        Ok(())
    }

    pub async fn report(&self) -> ServiceResult<FlightReport> {
        let flights = self.flights.get_all_with_details().await?;
        let items = flights.iter().map(FlightReportItem::from).collect();
        Ok(FlightReport::from_items(items))
    }

    pub async fn form_data(&self) -> ServiceResult<FlightFormData> {
        let airports = self
            .airports
            .get_all()
            .await?
            .iter()
            .map(|a| SelectOption {
                value: a.id.to_string(),
                text: a.display_label(),
            })
            .collect();

        let aircraft = self
            .aircraft
            .get_available()
            .await?
            .iter()
            .map(|a| SelectOption {
                value: a.id.to_string(),
                text: a.display_label(),
            })
            .collect();

        let statuses = FlightStatus::ALL
            .iter()
            .map(|s| SelectOption {
                value: serde_json::to_value(s)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default(),
                text: s.to_string(),
            })
            .collect();

        Ok(FlightFormData {
            airports,
            aircraft,
            statuses,
        })
    }

    async fn resolve(&self, input: &FlightInput) -> ServiceResult<ResolvedRoute> {
        let departure = self.resolve_airport(input.departure_airport_id).await?;
        let destination = self.resolve_airport(input.destination_airport_id).await?;

        let Some(aircraft) = self.aircraft.get_by_id(input.aircraft_id).await? else {
            return Err(invalid_selection(EntityKind::Aircraft, input.aircraft_id));
        };

        Ok(ResolvedRoute {
            departure,
            destination,
            aircraft,
        })
    }

    async fn resolve_airport(&self, id: i32) -> ServiceResult<Airport> {
        self.airports
            .get_by_id(id)
            .await?
            .ok_or_else(|| invalid_selection(EntityKind::Airport, id))
    }
}

fn invalid_selection(entity: EntityKind, id: i32) -> ServiceError {
    warn!("Flight references missing {} {}", entity, id);
    metrics::counter!("flights.invalid_selection_total").increment(1);
    ServiceError::ReferencedEntityNotFound { entity, id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::AircraftInput;
    use crate::airports::AirportInput;
    use crate::memory_store::InMemoryStore;
    use chrono::TimeZone;

    struct Fixture {
        service: FlightService,
        store: Arc<InMemoryStore>,
        jfk: i32,
        lhr: i32,
        cdg: i32,
        plane: i32,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let service = FlightService::new(store.clone(), store.clone(), store.clone());

        let mut ids = Vec::new();
        for (code, name, city, lat, lon) in [
            ("JFK", "John F. Kennedy", "New York", 40.7128, -74.0060),
            ("LHR", "Heathrow", "London", 51.5074, -0.1278),
            ("CDG", "Charles de Gaulle", "Paris", 49.0097, 2.5479),
        ] {
            let airport = AirportStore::add(
                store.as_ref(),
                AirportInput {
                    code: code.to_string(),
                    name: name.to_string(),
                    city: city.to_string(),
                    country: "-".to_string(),
                    latitude: lat,
                    longitude: lon,
                },
            )
            .await
            .unwrap();
            ids.push(airport.id);
        }

        let plane = AircraftStore::add(
            store.as_ref(),
            AircraftInput {
                model: "787-9".to_string(),
                manufacturer: "Boeing".to_string(),
                registration_number: "G-ZBKA".to_string(),
                fuel_consumption_per_km: 3.5,
                takeoff_fuel_effort: 500.0,
                max_range_km: 14000.0,
                cruise_speed_kmh: 900.0,
            },
        )
        .await
        .unwrap();

        Fixture {
            service,
            store,
            jfk: ids[0],
            lhr: ids[1],
            cdg: ids[2],
            plane: plane.id,
        }
    }

    fn input(number: &str, from: i32, to: i32, aircraft_id: i32) -> FlightInput {
        FlightInput {
            flight_number: number.to_string(),
            departure_airport_id: from,
            destination_airport_id: to,
            aircraft_id,
            scheduled_departure: Utc.with_ymd_and_hms(2026, 5, 4, 18, 30, 0).unwrap(),
            actual_departure: None,
            actual_arrival: None,
            status: FlightStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn test_create_computes_metrics() {
        let f = fixture().await;
        let created = f.service.create(input("BA178", f.jfk, f.lhr, f.plane)).await.unwrap();

        let flight = &created.flight;
        assert!(flight.distance_km > 5500.0 && flight.distance_km < 5600.0);
        let expected_fuel = flight.distance_km * 3.5 + 500.0;
        assert!((flight.fuel_required_liters - expected_fuel).abs() < 1e-9);
        let expected_time = flight.distance_km / 900.0;
        assert!((flight.estimated_flight_time_hours - expected_time).abs() < 1e-9);

        assert_eq!(created.departure_airport.code, "JFK");
        assert_eq!(created.aircraft.registration_number, "G-ZBKA");
    }

    #[tokio::test]
    async fn test_same_airport_rejected() {
        let f = fixture().await;
        let err = f.service.create(input("BA1", f.lhr, f.lhr, f.plane)).await.unwrap_err();
        assert!(err.is_soft());
        assert_eq!(
            err.to_string(),
            "Destination airport must be different from departure airport."
        );
    }

    #[tokio::test]
    async fn test_missing_reference_persists_nothing() {
        let f = fixture().await;

        for bad in [
            input("X1", 99, f.lhr, f.plane),
            input("X2", f.jfk, 99, f.plane),
            input("X3", f.jfk, f.lhr, 99),
        ] {
            let err = f.service.create(bad).await.unwrap_err();
            assert!(matches!(err, ServiceError::ReferencedEntityNotFound { id: 99, .. }));
            assert!(!err.is_soft());
        }

        assert!(FlightStore::get_all(f.store.as_ref()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_recomputes_for_new_route() {
        let f = fixture().await;
        let created = f.service.create(input("AF1", f.jfk, f.lhr, f.plane)).await.unwrap();
        let original_distance = created.flight.distance_km;

        let mut changed = input("AF1", f.lhr, f.cdg, f.plane);
        changed.status = FlightStatus::Boarding;
        let updated = f.service.update(created.flight.id, changed).await.unwrap();

        assert!(updated.flight.distance_km < original_distance);
        assert!(updated.flight.distance_km > 300.0 && updated.flight.distance_km < 400.0);
        assert_eq!(updated.flight.status, FlightStatus::Boarding);
        assert_eq!(updated.destination_airport.code, "CDG");
    }

    #[tokio::test]
    async fn test_update_restores_tampered_metrics() {
        let f = fixture().await;
        let created = f.service.create(input("BA2", f.jfk, f.lhr, f.plane)).await.unwrap();

        let mut tampered = created.flight.clone();
        tampered.distance_km = 1.0;
        tampered.fuel_required_liters = 1.0;
        FlightStore::update(f.store.as_ref(), &tampered).await.unwrap();

        let updated = f
            .service
            .update(created.flight.id, input("BA2", f.jfk, f.lhr, f.plane))
            .await
            .unwrap();
        assert_eq!(updated.flight.metrics(), created.flight.metrics());
    }

    #[tokio::test]
    async fn test_update_missing_flight_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .update(77, input("BA3", f.jfk, f.lhr, f.plane))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Flight with ID 77 not found");
    }

    #[tokio::test]
    async fn test_delete_is_unconditional() {
        let f = fixture().await;
        let created = f.service.create(input("BA4", f.jfk, f.lhr, f.plane)).await.unwrap();

        f.service.delete(created.flight.id).await.unwrap();
        assert!(matches!(
            f.service.delete(created.flight.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_report_totals_and_averages() {
        let f = fixture().await;
        let empty = f.service.report().await.unwrap();
        assert_eq!(empty.total_flights, 0);
        assert_eq!(empty.average_distance_km, 0.0);
        assert_eq!(empty.average_fuel_required_liters, 0.0);

        let a = f.service.create(input("BA5", f.jfk, f.lhr, f.plane)).await.unwrap();
        let b = f.service.create(input("BA6", f.lhr, f.cdg, f.plane)).await.unwrap();

        let report = f.service.report().await.unwrap();
        assert_eq!(report.total_flights, 2);
        let total = a.flight.distance_km + b.flight.distance_km;
        assert!((report.total_distance_km - total).abs() < 1e-9);
        assert!((report.average_distance_km - total / 2.0).abs() < 1e-9);
        assert_eq!(report.flights[0].departure_airport_code.len(), 3);
    }

    #[tokio::test]
    async fn test_form_data_labels() {
        let f = fixture().await;
        let form = f.service.form_data().await.unwrap();

        assert!(form.airports.iter().any(|o| o.text == "LHR - Heathrow (London)"));
        assert_eq!(form.aircraft[0].text, "787-9 - G-ZBKA");
        assert_eq!(form.statuses.len(), 6);
        assert_eq!(form.statuses[3].value, "in_flight");
        assert_eq!(form.statuses[3].text, "In Flight");
    }
}
