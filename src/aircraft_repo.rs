use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use crate::aircraft::{Aircraft, AircraftChangeset, AircraftInput, AircraftModel, NewAircraftModel};
use crate::db::{PgPool, is_foreign_key_violation, map_unique_violation};
use crate::errors::{ConstraintViolation, EntityKind};
use crate::flights_repo::count_referencing_aircraft;

/// Storage for aircraft
#[async_trait]
pub trait AircraftStore: Send + Sync {
    async fn get_by_id(&self, aircraft_id: i32) -> Result<Option<Aircraft>>;

    /// All aircraft ordered by registration number
    async fn get_all(&self) -> Result<Vec<Aircraft>>;

    async fn get_by_registration_number(&self, registration: &str) -> Result<Option<Aircraft>>;

    /// Aircraft that can be assigned to new flights.
    /// No maintenance or scheduling model exists yet, so this is every aircraft.
    async fn get_available(&self) -> Result<Vec<Aircraft>> {
        self.get_all().await
    }

    async fn add(&self, aircraft: AircraftInput) -> Result<Aircraft>;

    /// Persist all fields of an existing aircraft. Returns false if the row is gone.
    async fn update(&self, aircraft: &Aircraft) -> Result<bool>;

    async fn delete(&self, aircraft_id: i32) -> Result<bool>;

    async fn exists(&self, aircraft_id: i32) -> Result<bool>;
}

#[derive(Clone)]
pub struct AircraftRepository {
    pool: PgPool,
}

impl AircraftRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AircraftStore for AircraftRepository {
    async fn get_by_id(&self, aircraft_id: i32) -> Result<Option<Aircraft>> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let aircraft_model: Option<AircraftModel> = aircraft
                .filter(id.eq(aircraft_id))
                .select(AircraftModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<AircraftModel>, anyhow::Error>(aircraft_model)
        })
        .await??;

        Ok(result.map(Aircraft::from))
    }

    async fn get_all(&self) -> Result<Vec<Aircraft>> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let models: Vec<AircraftModel> = aircraft
                .order(registration_number.asc())
                .select(AircraftModel::as_select())
                .load(&mut conn)?;

            Ok::<Vec<AircraftModel>, anyhow::Error>(models)
        })
        .await??;

        Ok(result.into_iter().map(Aircraft::from).collect())
    }

    async fn get_by_registration_number(&self, registration: &str) -> Result<Option<Aircraft>> {
        use crate::schema::aircraft::dsl::*;

        let registration = registration.to_string();
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let aircraft_model: Option<AircraftModel> = aircraft
                .filter(registration_number.eq(&registration))
                .select(AircraftModel::as_select())
                .first(&mut conn)
                .optional()?;

            Ok::<Option<AircraftModel>, anyhow::Error>(aircraft_model)
        })
        .await??;

        Ok(result.map(Aircraft::from))
    }

    async fn add(&self, new_aircraft: AircraftInput) -> Result<Aircraft> {
        let pool = self.pool.clone();
        let new_model: NewAircraftModel = new_aircraft.into();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let model = diesel::insert_into(crate::schema::aircraft::table)
                .values(&new_model)
                .returning(AircraftModel::as_returning())
                .get_result(&mut conn)
                .map_err(|e| {
                    map_unique_violation(
                        e,
                        EntityKind::Aircraft,
                        "registration number",
                        &new_model.registration_number,
                    )
                })?;

            Ok::<AircraftModel, anyhow::Error>(model)
        })
        .await??;

        Ok(result.into())
    }

    async fn update(&self, updated: &Aircraft) -> Result<bool> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();
        let aircraft_id = updated.id;
        let mut changeset = AircraftChangeset::from(updated);
        changeset.updated_at = Some(Utc::now());

        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let rows = diesel::update(aircraft.filter(id.eq(aircraft_id)))
                .set(&changeset)
                .execute(&mut conn)
                .map_err(|e| {
                    map_unique_violation(
                        e,
                        EntityKind::Aircraft,
                        "registration number",
                        &changeset.registration_number,
                    )
                })?;

            Ok::<usize, anyhow::Error>(rows)
        })
        .await??;

        Ok(rows_affected > 0)
    }

    async fn delete(&self, aircraft_id: i32) -> Result<bool> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();
        let rows_affected = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            match diesel::delete(aircraft.filter(id.eq(aircraft_id))).execute(&mut conn) {
                Ok(rows) => Ok::<usize, anyhow::Error>(rows),
                // A flight was assigned after the service counted references
                Err(e) if is_foreign_key_violation(&e) => {
                    let flight_count = count_referencing_aircraft(&mut conn, aircraft_id)?;
                    Err(ConstraintViolation::StillReferenced {
                        entity: EntityKind::Aircraft,
                        id: aircraft_id,
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

    async fn exists(&self, aircraft_id: i32) -> Result<bool> {
        use crate::schema::aircraft::dsl::*;

        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let found = diesel::select(diesel::dsl::exists(aircraft.filter(id.eq(aircraft_id))))
                .get_result::<bool>(&mut conn)?;
            Ok::<bool, anyhow::Error>(found)
        })
        .await??;

        Ok(result)
    }
}
