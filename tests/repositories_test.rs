mod common;

use chrono::{TimeZone, Utc};
use common::TestDatabase;
use serial_test::serial;
use std::sync::Arc;

use flightdesk::aircraft::AircraftInput;
use flightdesk::aircraft_repo::{AircraftRepository, AircraftStore};
use flightdesk::airport_service::AirportService;
use flightdesk::airports::AirportInput;
use flightdesk::airports_repo::{AirportStore, AirportsRepository};
use flightdesk::errors::ServiceError;
use flightdesk::flight_service::FlightService;
use flightdesk::flights::{FlightInput, FlightStatus};
use flightdesk::flights_repo::{FlightStore, FlightsRepository};

fn airport(code: &str, name: &str, city: &str, lat: f64, lon: f64) -> AirportInput {
    AirportInput {
        code: code.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        country: "Portugal".to_string(),
        latitude: lat,
        longitude: lon,
    }
}

fn aircraft(registration: &str) -> AircraftInput {
    AircraftInput {
        model: "A321neo".to_string(),
        manufacturer: "Airbus".to_string(),
        registration_number: registration.to_string(),
        fuel_consumption_per_km: 3.1,
        takeoff_fuel_effort: 520.0,
        max_range_km: 7400.0,
        cruise_speed_kmh: 833.0,
    }
}

#[tokio::test]
#[serial]
async fn test_airport_crud_and_search() {
    let Some(test_db) = TestDatabase::try_new().await else {
        return;
    };
    let repo = AirportsRepository::new(test_db.pool());

    let lis = repo
        .add(airport("LIS", "Humberto Delgado", "Lisbon", 38.7742, -9.1342))
        .await
        .unwrap();
    repo.add(airport("OPO", "Francisco Sa Carneiro", "Porto", 41.2481, -8.6814))
        .await
        .unwrap();

    assert!(repo.exists(lis.id).await.unwrap());
    assert_eq!(repo.get_all().await.unwrap().len(), 2);
    assert_eq!(repo.get_by_code("OPO").await.unwrap().unwrap().city, "Porto");
    assert!(repo.get_by_code("FAO").await.unwrap().is_none());

    let found = repo.search_by_name_or_city("lisb").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, lis.id);

    // LIKE wildcards in the term match only themselves
    assert!(repo.search_by_name_or_city("_").await.unwrap().is_empty());
    assert!(repo.search_by_name_or_city("%").await.unwrap().is_empty());

    let mut renamed = lis.clone();
    renamed.name = "Lisbon Airport".to_string();
    assert!(repo.update(&renamed).await.unwrap());
    let stored = repo.get_by_id(lis.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Lisbon Airport");
    assert!(stored.updated_at.is_some());

    assert!(repo.delete(lis.id).await.unwrap());
    assert!(!repo.delete(lis.id).await.unwrap());
    assert!(repo.get_by_id(lis.id).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
async fn test_unique_indexes_reject_duplicates() {
    let Some(test_db) = TestDatabase::try_new().await else {
        return;
    };
    let airports = AirportsRepository::new(test_db.pool());
    let fleet = AircraftRepository::new(test_db.pool());

    airports
        .add(airport("LIS", "Humberto Delgado", "Lisbon", 38.7742, -9.1342))
        .await
        .unwrap();
    let err = airports
        .add(airport("LIS", "Other", "Lisbon", 38.0, -9.0))
        .await
        .unwrap_err();
    assert!(matches!(
        ServiceError::from(err),
        ServiceError::DuplicateKey { field: "code", .. }
    ));

    let mut opo = airports
        .add(airport("OPO", "Francisco Sa Carneiro", "Porto", 41.2481, -8.6814))
        .await
        .unwrap();
    opo.code = "LIS".to_string();
    let err = airports.update(&opo).await.unwrap_err();
    assert!(matches!(ServiceError::from(err), ServiceError::DuplicateKey { .. }));

    fleet.add(aircraft("CS-TJE")).await.unwrap();
    let err = fleet.add(aircraft("CS-TJE")).await.unwrap_err();
    assert_eq!(
        ServiceError::from(err).to_string(),
        "An aircraft with registration number 'CS-TJE' already exists."
    );
    assert!(
        fleet
            .get_by_registration_number("CS-TJE")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
#[serial]
async fn test_flight_workflow_against_postgres() {
    let Some(test_db) = TestDatabase::try_new().await else {
        return;
    };
    let airports = Arc::new(AirportsRepository::new(test_db.pool()));
    let fleet = Arc::new(AircraftRepository::new(test_db.pool()));
    let flights = Arc::new(FlightsRepository::new(test_db.pool()));

    let flight_service = FlightService::new(flights.clone(), airports.clone(), fleet.clone());
    let airport_service = AirportService::new(airports.clone(), flights.clone());

    let lis = airports
        .add(airport("LIS", "Humberto Delgado", "Lisbon", 38.7742, -9.1342))
        .await
        .unwrap();
    let opo = airports
        .add(airport("OPO", "Francisco Sa Carneiro", "Porto", 41.2481, -8.6814))
        .await
        .unwrap();
    let plane = fleet.add(aircraft("CS-TJE")).await.unwrap();

    let mut input = FlightInput {
        flight_number: "TP1940".to_string(),
        departure_airport_id: lis.id,
        destination_airport_id: opo.id,
        aircraft_id: plane.id,
        scheduled_departure: Utc.with_ymd_and_hms(2026, 6, 1, 7, 0, 0).unwrap(),
        actual_departure: None,
        actual_arrival: None,
        status: FlightStatus::Scheduled,
    };
    let created = flight_service.create(input.clone()).await.unwrap();
    assert!(created.flight.distance_km > 250.0 && created.flight.distance_km < 300.0);

    let loaded = flights.get_by_flight_number("TP1940").await.unwrap().unwrap();
    assert_eq!(loaded.status, FlightStatus::Scheduled);
    assert_eq!(loaded.metrics(), created.flight.metrics());

    let details = flights.get_all_with_details().await.unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].departure_airport.code, "LIS");
    assert_eq!(details[0].aircraft.registration_number, "CS-TJE");

    input.status = FlightStatus::InFlight;
    input.actual_departure = Some(Utc.with_ymd_and_hms(2026, 6, 1, 7, 12, 0).unwrap());
    let updated = flight_service.update(created.flight.id, input).await.unwrap();
    assert_eq!(updated.flight.status, FlightStatus::InFlight);
    assert!(updated.flight.actual_departure.is_some());

    // Referenced airports cannot be deleted
    let err = airport_service.delete(opo.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::ReferentialConflict { flight_count: 1, .. }));

    assert_eq!(flights.get_flights_by_airport(lis.id).await.unwrap().len(), 1);
    assert_eq!(flights.get_flights_by_aircraft(plane.id).await.unwrap().len(), 1);
    assert_eq!(flights.count_flights_by_airport(lis.id).await.unwrap(), 1);
    assert_eq!(flights.count_flights_by_aircraft(plane.id).await.unwrap(), 1);

    // The foreign key backs the guard when the service is bypassed
    let err = AirportStore::delete(airports.as_ref(), lis.id).await.unwrap_err();
    assert!(matches!(
        ServiceError::from(err),
        ServiceError::ReferentialConflict { flight_count: 1, .. }
    ));
    let err = AircraftStore::delete(fleet.as_ref(), plane.id).await.unwrap_err();
    assert!(matches!(
        ServiceError::from(err),
        ServiceError::ReferentialConflict { flight_count: 1, .. }
    ));

    assert!(flights.delete(created.flight.id).await.unwrap());
    airport_service.delete(opo.id).await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_missing_reference_writes_no_flight() {
    let Some(test_db) = TestDatabase::try_new().await else {
        return;
    };
    let airports = Arc::new(AirportsRepository::new(test_db.pool()));
    let fleet = Arc::new(AircraftRepository::new(test_db.pool()));
    let flights = Arc::new(FlightsRepository::new(test_db.pool()));
    let service = FlightService::new(flights.clone(), airports.clone(), fleet);

    let lis = airports
        .add(airport("LIS", "Humberto Delgado", "Lisbon", 38.7742, -9.1342))
        .await
        .unwrap();

    let err = service
        .create(FlightInput {
            flight_number: "TP1".to_string(),
            departure_airport_id: lis.id,
            destination_airport_id: lis.id + 100,
            aircraft_id: 1,
            scheduled_departure: Utc::now(),
            actual_departure: None,
            actual_arrival: None,
            status: FlightStatus::Scheduled,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::ReferencedEntityNotFound { .. }));
    assert!(flights.get_all().await.unwrap().is_empty());
}
