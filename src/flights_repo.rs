use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use tracing::warn;

use crate::aircraft::{Aircraft, AircraftModel};
use crate::airports::{Airport, AirportModel};
use crate::db::PgPool;
use crate::flights::{Flight, FlightChangeset, FlightModel, FlightWithDetails, NewFlight, NewFlightModel};

/// Storage for flights
#[async_trait]
pub trait FlightStore: Send + Sync {
    async fn get_by_id(&self, flight_id: i32) -> Result<Option<Flight>>;

    /// All flights, latest scheduled departure first
    async fn get_all(&self) -> Result<Vec<Flight>>;

    async fn get_all_with_details(&self) -> Result<Vec<FlightWithDetails>>;

    async fn get_by_id_with_details(&self, flight_id: i32) -> Result<Option<FlightWithDetails>>;

    async fn get_by_flight_number(&self, number: &str) -> Result<Option<Flight>>;

    /// Flights departing from or arriving at the airport
    async fn get_flights_by_airport(&self, airport_id: i32) -> Result<Vec<Flight>>;

    async fn get_flights_by_aircraft(&self, aircraft_id: i32) -> Result<Vec<Flight>>;

    /// Number of flights departing from or arriving at the airport
    async fn count_flights_by_airport(&self, airport_id: i32) -> Result<usize>;

    async fn count_flights_by_aircraft(&self, aircraft_id: i32) -> Result<usize>;

    async fn add(&self, flight: NewFlight) -> Result<Flight>;

    /// Persist all fields of an existing flight. Returns false if the row is gone.
    async fn update(&self, flight: &Flight) -> Result<bool>;

    async fn delete(&self, flight_id: i32) -> Result<bool>;

    async fn exists(&self, flight_id: i32) -> Result<bool>;
}

/// Flights referencing the airport, on an open connection
pub(crate) fn count_referencing_airport(
    conn: &mut PgConnection,
    airport_id: i32,
) -> QueryResult<i64> {
    use crate::schema::flights::dsl::*;

    flights
        .filter(
            departure_airport_id
                .eq(airport_id)
                .or(destination_airport_id.eq(airport_id)),
        )
        .count()
        .get_result(conn)
}

/// Flights assigned to the aircraft, on an open connection
pub(crate) fn count_referencing_aircraft(
    conn: &mut PgConnection,
    target_aircraft_id: i32,
) -> QueryResult<i64> {
    use crate::schema::flights::dsl::*;

    flights
        .filter(aircraft_id.eq(target_aircraft_id))
        .count()
        .get_result(conn)
}

#[derive(Clone)]
pub struct FlightsRepository {
    pool: PgPool,
}

impl FlightsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_where<F>(&self, filter: F) -> Result<Vec<Flight>>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<Vec<FlightModel>> + Send + 'static,
    {
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let models = filter(&mut conn)?;
            Ok::<Vec<FlightModel>, anyhow::Error>(models)
        })
        .await??;

        Ok(result.into_iter().map(|model| model.into()).collect())
    }

    /// Attach airports and aircraft to a batch of flights with two lookups
    async fn attach_details(&self, flights: Vec<Flight>) -> Result<Vec<FlightWithDetails>> {
        if flights.is_empty() {
            return Ok(Vec::new());
        }

        let mut airport_ids: Vec<i32> = flights
            .iter()
            .flat_map(|f| [f.departure_airport_id, f.destination_airport_id])
            .collect();
        airport_ids.sort_unstable();
        airport_ids.dedup();

        let mut aircraft_ids: Vec<i32> = flights.iter().map(|f| f.aircraft_id).collect();
        aircraft_ids.sort_unstable();
        aircraft_ids.dedup();

        let pool = self.pool.clone();
        let (airport_models, aircraft_models) = tokio::task::spawn_blocking(move || {
            use crate::schema::{aircraft, airports};

            let mut conn = pool.get()?;
            let airport_models: Vec<AirportModel> = airports::table
                .filter(airports::id.eq_any(airport_ids))
                .select(AirportModel::as_select())
                .load(&mut conn)?;
            let aircraft_models: Vec<AircraftModel> = aircraft::table
                .filter(aircraft::id.eq_any(aircraft_ids))
                .select(AircraftModel::as_select())
                .load(&mut conn)?;

            Ok::<_, anyhow::Error>((airport_models, aircraft_models))
        })
        .await??;

        let airports_by_id: HashMap<i32, Airport> = airport_models
            .into_iter()
            .map(|m| (m.id, Airport::from(m)))
            .collect();
        let aircraft_by_id: HashMap<i32, Aircraft> = aircraft_models
            .into_iter()
            .map(|m| (m.id, Aircraft::from(m)))
            .collect();

        Ok(flights
            .into_iter()
            .filter_map(|flight| {
                let departure = airports_by_id.get(&flight.departure_airport_id)?;
                let destination = airports_by_id.get(&flight.destination_airport_id)?;
                let Some(aircraft) = aircraft_by_id.get(&flight.aircraft_id) else {
                    warn!("Flight {} references missing aircraft {}", flight.id, flight.aircraft_id);
                    return None;
                };
                Some(FlightWithDetails {
                    departure_airport: departure.clone(),
                    destination_airport: destination.clone(),
                    aircraft: aircraft.clone(),
                    flight,
                })
            })
            .collect())
    }
}

#[async_trait]
impl FlightStore for FlightsRepository {
    async fn get_by_id(&self, flight_id: i32) -> Result<Option<Flight>> {
        use crate::schema::flights::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let flight_model: Option<FlightModel> = flights
                .filter(id.eq(flight_id))
                .select(FlightModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<FlightModel>, anyhow::Error>(flight_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    async fn get_all(&self) -> Result<Vec<Flight>> {
        use crate::schema::flights::dsl::*;

        self.load_where(|conn| {
            flights
                .order((scheduled_departure.desc(), id.desc()))
                .select(FlightModel::as_select())
                .load(conn)
        })
        .await
    }

    async fn get_all_with_details(&self) -> Result<Vec<FlightWithDetails>> {
        let all = self.get_all().await?;
        self.attach_details(all).await
    }

    async fn get_by_id_with_details(&self, flight_id: i32) -> Result<Option<FlightWithDetails>> {
        let Some(flight) = self.get_by_id(flight_id).await? else {
            return Ok(None);
        };
        Ok(self.attach_details(vec![flight]).await?.into_iter().next())
    }

    async fn get_by_flight_number(&self, number: &str) -> Result<Option<Flight>> {
        use crate::schema::flights::dsl::*;

        let number = number.to_string();
        let mut result = self
            .load_where(move |conn| {
                flights
                    .filter(flight_number.eq(&number))
                    .order(scheduled_departure.desc())
                    .limit(1)
                    .select(FlightModel::as_select())
                    .load(conn)
            })
            .await?;

        Ok(result.pop())
    }

    async fn get_flights_by_airport(&self, airport_id: i32) -> Result<Vec<Flight>> {
        use crate::schema::flights::dsl::*;

        self.load_where(move |conn| {
            flights
                .filter(
                    departure_airport_id
                        .eq(airport_id)
                        .or(destination_airport_id.eq(airport_id)),
                )
                .order((scheduled_departure.desc(), id.desc()))
                .select(FlightModel::as_select())
                .load(conn)
        })
        .await
    }

    async fn get_flights_by_aircraft(&self, target_aircraft_id: i32) -> Result<Vec<Flight>> {
        use crate::schema::flights::dsl::*;

        self.load_where(move |conn| {
            flights
                .filter(aircraft_id.eq(target_aircraft_id))
                .order((scheduled_departure.desc(), id.desc()))
                .select(FlightModel::as_select())
                .load(conn)
        })
        .await
    }

    async fn count_flights_by_airport(&self, airport_id: i32) -> Result<usize> {
        let pool = self.pool.clone();
        let count = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let count = count_referencing_airport(&mut conn, airport_id)?;
            Ok::<i64, anyhow::Error>(count)
        })
        .await??;

        Ok(count as usize)
    }

    async fn count_flights_by_aircraft(&self, aircraft_id: i32) -> Result<usize> {
        let pool = self.pool.clone();
        let count = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let count = count_referencing_aircraft(&mut conn, aircraft_id)?;
            Ok::<i64, anyhow::Error>(count)
        })
        .await??;

        Ok(count as usize)
    }

    async fn add(&self, flight: NewFlight) -> Result<Flight> {
        use crate::schema::flights;

        let pool = self.pool.clone();
        let new_flight: NewFlightModel = flight.into();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let model = diesel::insert_into(flights::table)
                .values(&new_flight)
                .returning(FlightModel::as_returning())
                .get_result(&mut conn)?;

            Ok::<FlightModel, anyhow::Error>(model)
        })
        .await??;

        Ok(result.into())
    }

    async fn update(&self, flight: &Flight) -> Result<bool> {
        use crate::schema::flights::dsl::*;

        let pool = self.pool.clone();
        let flight_id = flight.id;
        let mut changeset = FlightChangeset::from(flight);
        changeset.updated_at = Some(Utc::now());

        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let rows = diesel::update(flights.filter(id.eq(flight_id)))
                .set(&changeset)
                .execute(&mut conn)?;

            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }

    async fn delete(&self, flight_id: i32) -> Result<bool> {
        use crate::schema::flights::dsl::*;

        let pool = self.pool.clone();
        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let rows = diesel::delete(flights.filter(id.eq(flight_id))).execute(&mut conn)?;
            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }

    async fn exists(&self, flight_id: i32) -> Result<bool> {
        use crate::schema::flights::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let found = diesel::select(diesel::dsl::exists(flights.filter(id.eq(flight_id))))
                .get_result::<bool>(&mut conn)?;
            Ok::<bool, anyhow::Error>(found)
        })
        .await??;

        Ok(result)
    }
}
