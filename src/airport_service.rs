use std::sync::Arc;

use tracing::{info, warn};

use crate::airports::{Airport, AirportInput};
use crate::airports_repo::AirportStore;
use crate::errors::{EntityKind, ServiceError, ServiceResult};
use crate::flights_repo::FlightStore;
use crate::metrics::record_rejection;
use crate::validation::{check_airport_fields, check_unique, guard_delete};

/// Airport use cases: lookups, validated writes and the delete guard
#[derive(Clone)]
pub struct AirportService {
    airports: Arc<dyn AirportStore>,
    flights: Arc<dyn FlightStore>,
}

impl AirportService {
    pub fn new(airports: Arc<dyn AirportStore>, flights: Arc<dyn FlightStore>) -> Self {
        Self { airports, flights }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Airport>> {
        Ok(self.airports.get_all().await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Airport> {
        self.airports
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: EntityKind::Airport,
                id,
            })
    }

    pub async fn get_by_code(&self, code: &str) -> ServiceResult<Option<Airport>> {
        Ok(self.airports.get_by_code(&normalize_code(code)).await?)
    }

    /// Search by name, city or code. A blank term lists every airport.
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Airport>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list().await;
        }
        Ok(self.airports.search_by_name_or_city(term).await?)
    }

    /// Check the input against the business rules without writing anything.
    ///
    /// `own_id` is the airport being edited, or `None` for a new one.
    pub async fn validate(&self, input: &AirportInput, own_id: Option<i32>) -> ServiceResult<()> {
        let code = normalize_code(&input.code);
        let holder = self.airports.get_by_code(&code).await?;
        check_unique(
            EntityKind::Airport,
            "code",
            &code,
            holder.map(|a| a.id),
            own_id,
        )?;
        check_airport_fields(input)
    }

    pub async fn create(&self, input: AirportInput) -> ServiceResult<Airport> {
        let input = normalized(input);
        if let Err(e) = self.validate(&input, None).await {
            record_rejection(EntityKind::Airport, &e);
            return Err(e);
        }

        let airport = self.airports.add(input).await?;
        metrics::counter!("airports.created_total").increment(1);
        info!("Created airport {} ({})", airport.code, airport.id);
        Ok(airport)
    }

    pub async fn update(&self, id: i32, input: AirportInput) -> ServiceResult<Airport> {
        let mut airport = self.get(id).await?;

        let input = normalized(input);
        if let Err(e) = self.validate(&input, Some(id)).await {
            record_rejection(EntityKind::Airport, &e);
            return Err(e);
        }

        airport.apply(&input);
        if !self.airports.update(&airport).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Airport,
                id,
            });
        }

        metrics::counter!("airports.updated_total").increment(1);
        info!("Updated airport {} ({})", airport.code, airport.id);
        self.get(id).await
    }

    /// Delete an airport unless flights still depart from or arrive at it
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        if !self.airports.exists(id).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Airport,
                id,
            });
        }

        let flight_count = self.flights.count_flights_by_airport(id).await?;
        if let Err(e) = guard_delete(EntityKind::Airport, id, flight_count) {
            warn!("Refusing to delete airport {}: {} flight(s) reference it", id, flight_count);
            record_rejection(EntityKind::Airport, &e);
            return Err(e);
        }

        if !self.airports.delete(id).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Airport,
                id,
            });
        }

        metrics::counter!("airports.deleted_total").increment(1);
        info!("Deleted airport {}", id);
        Ok(())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn normalized(mut input: AirportInput) -> AirportInput {
    input.code = normalize_code(&input.code);
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::AircraftInput;
    use crate::aircraft_repo::AircraftStore;
    use crate::flight_metrics::FlightMetrics;
    use crate::flights::{FlightStatus, NewFlight};
    use crate::memory_store::InMemoryStore;
    use chrono::Utc;

    fn service() -> (AirportService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (AirportService::new(store.clone(), store.clone()), store)
    }

    fn input(code: &str, city: &str) -> AirportInput {
        AirportInput {
            code: code.to_string(),
            name: format!("{city} International"),
            city: city.to_string(),
            country: "Spain".to_string(),
            latitude: 40.4719,
            longitude: -3.5626,
        }
    }

    async fn add_flight(store: &InMemoryStore, from: i32, to: i32) {
        let aircraft = match store.get_by_registration_number("EC-MXV").await.unwrap() {
            Some(a) => a,
            None => AircraftStore::add(
                store,
                AircraftInput {
                    model: "A321".to_string(),
                    manufacturer: "Airbus".to_string(),
                    registration_number: "EC-MXV".to_string(),
                    fuel_consumption_per_km: 4.0,
                    takeoff_fuel_effort: 600.0,
                    max_range_km: 5900.0,
                    cruise_speed_kmh: 840.0,
                },
            )
            .await
            .unwrap(),
        };
        FlightStore::add(
            store,
            NewFlight {
                flight_number: "IB100".to_string(),
                departure_airport_id: from,
                destination_airport_id: to,
                aircraft_id: aircraft.id,
                scheduled_departure: Utc::now(),
                actual_departure: None,
                actual_arrival: None,
                metrics: FlightMetrics {
                    distance_km: 500.0,
                    fuel_required_liters: 2600.0,
                    estimated_flight_time_hours: 0.6,
                },
                status: FlightStatus::Scheduled,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_normalizes_code() {
        let (service, _) = service();
        let airport = service.create(input(" mad ", "Madrid")).await.unwrap();
        assert_eq!(airport.code, "MAD");
        assert!(service.get_by_code("mad").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected_for_other_airport() {
        let (service, _) = service();
        service.create(input("MAD", "Madrid")).await.unwrap();

        let err = service.create(input("MAD", "Madrid")).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateKey { .. }));
        assert_eq!(err.to_string(), "An airport with code 'MAD' already exists.");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeping_own_code_is_allowed() {
        let (service, _) = service();
        let airport = service.create(input("BCN", "Barcelona")).await.unwrap();

        let mut changed = input("BCN", "Barcelona");
        changed.name = "Josep Tarradellas".to_string();
        let updated = service.update(airport.id, changed).await.unwrap();

        assert_eq!(updated.name, "Josep Tarradellas");
        assert_eq!(updated.created_at, airport.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_airport_is_not_found() {
        let (service, _) = service();
        let err = service.update(42, input("BCN", "Barcelona")).await.unwrap_err();
        assert_eq!(err.to_string(), "Airport with ID 42 not found");
    }

    #[tokio::test]
    async fn test_invalid_coordinates_rejected_before_write() {
        let (service, _) = service();
        let mut bad = input("AGP", "Malaga");
        bad.latitude = 123.0;

        let err = service.create(bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidField { field: "latitude", .. }));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_guard_reports_flight_count() {
        let (service, store) = service();
        let mad = service.create(input("MAD", "Madrid")).await.unwrap();
        let bcn = service.create(input("BCN", "Barcelona")).await.unwrap();
        add_flight(&store, mad.id, bcn.id).await;
        add_flight(&store, bcn.id, mad.id).await;

        let err = service.delete(mad.id).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Cannot delete airport with ID {}: it has 2 associated flight(s).", mad.id)
        );
        assert!(service.get(mad.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unreferenced_airport() {
        let (service, _) = service();
        let airport = service.create(input("VLC", "Valencia")).await.unwrap();

        service.delete(airport.id).await.unwrap();
        assert!(matches!(
            service.get(airport.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(airport.id).await,
            Err(ServiceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_search_lists_everything() {
        let (service, _) = service();
        service.create(input("MAD", "Madrid")).await.unwrap();
        service.create(input("BCN", "Barcelona")).await.unwrap();

        assert_eq!(service.search("  ").await.unwrap().len(), 2);
        assert_eq!(service.search("barce").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_code_unique() {
        let (service, _) = service();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.create(input("SVQ", "Seville")).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert!(matches!(e, ServiceError::DuplicateKey { .. }), "{e:?}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_rejection_surfaces_as_conflict() {
        let (service, store) = service();
        let mad = service.create(input("MAD", "Madrid")).await.unwrap();
        let bcn = service.create(input("BCN", "Barcelona")).await.unwrap();
        add_flight(&store, mad.id, bcn.id).await;

        // Bypass the service guard and delete straight through the store
        let err: ServiceError = AirportStore::delete(store.as_ref(), mad.id)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            ServiceError::ReferentialConflict { flight_count: 1, .. }
        ));
    }
}
