use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::address::en::{CityName, CountryName};
use tracing::{info, warn};

use flightdesk::aircraft::{Aircraft, AircraftInput};
use flightdesk::airports::{Airport, AirportInput};
use flightdesk::config::Config;
use flightdesk::db;
use flightdesk::errors::ServiceError;
use flightdesk::flights::{FlightInput, FlightStatus};
use flightdesk::web::AppState;

/// (manufacturer, model, liters/km, takeoff liters, range km, cruise km/h)
const FLEET_TYPES: [(&str, &str, f64, f64, f64, f64); 5] = [
    ("Airbus", "A320neo", 2.9, 480.0, 6300.0, 833.0),
    ("Airbus", "A330-900", 5.8, 900.0, 13300.0, 871.0),
    ("Boeing", "737 MAX 8", 3.0, 500.0, 6570.0, 839.0),
    ("Boeing", "787-9", 5.4, 850.0, 14140.0, 903.0),
    ("Embraer", "E195-E2", 2.1, 320.0, 4800.0, 833.0),
];

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub airports: usize,
    pub aircraft: usize,
    pub flights: usize,
}

/// Seed demo airports, aircraft and flights into Postgres
pub async fn handle_seed(config: &Config, count: usize) -> Result<()> {
    let pool = db::connect(config.require_database_url()?, config.database_pool_size).await?;
    let state = AppState::with_pool(pool);

    let summary = seed_demo_data(&state, count).await?;
    info!(
        "Seed completed: {} airports, {} aircraft, {} flights",
        summary.airports, summary.aircraft, summary.flights
    );
    Ok(())
}

/// Create `count` records of each kind through the services, so every rule
/// applies and flight figures are computed the normal way. Records that
/// collide with existing unique keys are skipped.
pub async fn seed_demo_data(state: &AppState, count: usize) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let mut airports: Vec<Airport> = Vec::with_capacity(count);
    for _ in 0..count {
        match state.airports.create(fake_airport()).await {
            Ok(airport) => airports.push(airport),
            Err(e @ ServiceError::DuplicateKey { .. }) => warn!("Skipping airport: {}", e),
            Err(e) => return Err(e).context("Failed to seed airport"),
        }
    }
    summary.airports = airports.len();

    let mut fleet: Vec<Aircraft> = Vec::with_capacity(count);
    for _ in 0..count {
        match state.aircraft.create(fake_aircraft()).await {
            Ok(aircraft) => fleet.push(aircraft),
            Err(e @ ServiceError::DuplicateKey { .. }) => warn!("Skipping aircraft: {}", e),
            Err(e) => return Err(e).context("Failed to seed aircraft"),
        }
    }
    summary.aircraft = fleet.len();

    if airports.len() < 2 || fleet.is_empty() {
        warn!("Not enough airports or aircraft to seed flights");
        return Ok(summary);
    }

    for _ in 0..count {
        let input = fake_flight(&airports, &fleet);
        state
            .flights
            .create(input)
            .await
            .context("Failed to seed flight")?;
        summary.flights += 1;
    }

    Ok(summary)
}

fn random_letters(len: usize) -> String {
    (0..len)
        .map(|_| UPPERCASE[(0..UPPERCASE.len()).fake::<usize>()] as char)
        .collect()
}

fn fake_airport() -> AirportInput {
    let city: String = CityName().fake();
    AirportInput {
        code: random_letters(3),
        name: format!("{} International", city),
        city,
        country: CountryName().fake(),
        latitude: (-60.0..70.0).fake::<f64>(),
        longitude: (-180.0..180.0).fake::<f64>(),
    }
}

fn fake_aircraft() -> AircraftInput {
    let (manufacturer, model, consumption, takeoff, range, cruise) =
        FLEET_TYPES[(0..FLEET_TYPES.len()).fake::<usize>()];
    AircraftInput {
        model: model.to_string(),
        manufacturer: manufacturer.to_string(),
        registration_number: format!("N{}{}", (100..999).fake::<u32>(), random_letters(2)),
        fuel_consumption_per_km: consumption,
        takeoff_fuel_effort: takeoff,
        max_range_km: range,
        cruise_speed_kmh: cruise,
    }
}

fn fake_flight(airports: &[Airport], fleet: &[Aircraft]) -> FlightInput {
    let departure = (0..airports.len()).fake::<usize>();
    // Offset by at least one so the destination always differs
    let destination = (departure + (1..airports.len()).fake::<usize>()) % airports.len();
    let aircraft = &fleet[(0..fleet.len()).fake::<usize>()];

    FlightInput {
        flight_number: format!("{}{}", random_letters(2), (100..9999).fake::<u32>()),
        departure_airport_id: airports[departure].id,
        destination_airport_id: airports[destination].id,
        aircraft_id: aircraft.id,
        scheduled_departure: Utc::now() + Duration::hours((1..720).fake::<i64>()),
        actual_departure: None,
        actual_arrival: None,
        status: FlightStatus::ALL[(0..FlightStatus::ALL.len()).fake::<usize>()],
    }
}
