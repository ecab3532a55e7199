use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use crate::airports::{Airport, AirportChangeset, AirportInput, AirportModel, NewAirportModel};
use crate::db::{PgPool, is_foreign_key_violation, map_unique_violation};
use crate::errors::{ConstraintViolation, EntityKind};
use crate::flights_repo::count_referencing_airport;

/// Storage for airports
#[async_trait]
pub trait AirportStore: Send + Sync {
    async fn get_by_id(&self, airport_id: i32) -> Result<Option<Airport>>;

    /// All airports ordered by code
    async fn get_all(&self) -> Result<Vec<Airport>>;

    async fn get_by_code(&self, airport_code: &str) -> Result<Option<Airport>>;

    /// Case-insensitive substring match on name, city or code
    async fn search_by_name_or_city(&self, term: &str) -> Result<Vec<Airport>>;

    async fn add(&self, airport: AirportInput) -> Result<Airport>;

    /// Persist all fields of an existing airport. Returns false if the row is gone.
    async fn update(&self, airport: &Airport) -> Result<bool>;

    async fn delete(&self, airport_id: i32) -> Result<bool>;

    async fn exists(&self, airport_id: i32) -> Result<bool>;
}

#[derive(Clone)]
pub struct AirportsRepository {
    pool: PgPool,
}

impl AirportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ILIKE` pattern matching `term` anywhere, with its wildcards taken literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl AirportStore for AirportsRepository {
    async fn get_by_id(&self, airport_id: i32) -> Result<Option<Airport>> {
        use crate::schema::airports::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let airport_model: Option<AirportModel> = airports
                .filter(id.eq(airport_id))
                .select(AirportModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<AirportModel>, anyhow::Error>(airport_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    async fn get_all(&self) -> Result<Vec<Airport>> {
        use crate::schema::airports::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let airport_models: Vec<AirportModel> = airports
                .order(code.asc())
                .select(AirportModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<AirportModel>, anyhow::Error>(airport_models)
        })
        .await??;

        Ok(result.into_iter().map(|model| model.into()).collect())
    }

    async fn get_by_code(&self, airport_code: &str) -> Result<Option<Airport>> {
        use crate::schema::airports::dsl::*;

        let airport_code = airport_code.to_string();
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let airport_model: Option<AirportModel> = airports
                .filter(code.eq(&airport_code))
                .select(AirportModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<AirportModel>, anyhow::Error>(airport_model)
        })
        .await??;

        Ok(result.map(|model| model.into()))
    }

    async fn search_by_name_or_city(&self, term: &str) -> Result<Vec<Airport>> {
        use crate::schema::airports::dsl::*;

        let search_pattern = like_pattern(term);
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let airport_models: Vec<AirportModel> = airports
                .filter(
                    name.ilike(&search_pattern)
                        .or(city.ilike(&search_pattern))
                        .or(code.ilike(&search_pattern)),
                )
                .order((name, code))
                .select(AirportModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<AirportModel>, anyhow::Error>(airport_models)
        })
        .await??;

        Ok(result.into_iter().map(|model| model.into()).collect())
    }

    async fn add(&self, airport: AirportInput) -> Result<Airport> {
        use crate::schema::airports;

        let pool = self.pool.clone();
        let new_airport: NewAirportModel = airport.into();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let model = diesel::insert_into(airports::table)
                .values(&new_airport)
                .returning(AirportModel::as_returning())
                .get_result(&mut conn)
                .map_err(|e| map_unique_violation(e, EntityKind::Airport, "code", &new_airport.code))?;

            Ok::<AirportModel, anyhow::Error>(model)
        })
        .await??;

        Ok(result.into())
    }

    async fn update(&self, airport: &Airport) -> Result<bool> {
        use crate::schema::airports::dsl::*;

        let pool = self.pool.clone();
        let airport_id = airport.id;
        let mut changeset = AirportChangeset::from(airport);
        changeset.updated_at = Some(Utc::now());

        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let rows = diesel::update(airports.filter(id.eq(airport_id)))
                .set(&changeset)
                .execute(&mut conn)
                .map_err(|e| map_unique_violation(e, EntityKind::Airport, "code", &changeset.code))?;

            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }

    async fn delete(&self, airport_id: i32) -> Result<bool> {
        use crate::schema::airports::dsl::*;

        let pool = self.pool.clone();
        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            match diesel::delete(airports.filter(id.eq(airport_id))).execute(&mut conn) {
                Ok(rows) => Ok::<usize, anyhow::Error>(rows),
                // A flight was added after the service counted references
                Err(e) if is_foreign_key_violation(&e) => {
                    let flight_count = count_referencing_airport(&mut conn, airport_id)?;
                    Err(ConstraintViolation::StillReferenced {
                        entity: EntityKind::Airport,
                        id: airport_id,
                        flight_count: flight_count as usize,
                    }
                    .into())
                }
                Err(e) => Err(e.into()),
            }
        })
        .await??;

        Ok(rows_affected > 0)
    }

    async fn exists(&self, airport_id: i32) -> Result<bool> {
        use crate::schema::airports::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let found = diesel::select(diesel::dsl::exists(airports.filter(id.eq(airport_id))))
                .get_result::<bool>(&mut conn)?;
            Ok::<bool, anyhow::Error>(found)
        })
        .await??;

        Ok(result)
    }
}
