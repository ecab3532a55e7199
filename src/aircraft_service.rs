use std::sync::Arc;

use tracing::{info, warn};

use crate::aircraft::{Aircraft, AircraftInput};
use crate::aircraft_repo::AircraftStore;
use crate::errors::{EntityKind, ServiceError, ServiceResult};
use crate::flights_repo::FlightStore;
use crate::metrics::record_rejection;
use crate::validation::{check_aircraft_fields, check_unique, guard_delete};

/// Fleet use cases: lookups, validated writes and the delete guard
#[derive(Clone)]
pub struct AircraftService {
    aircraft: Arc<dyn AircraftStore>,
    flights: Arc<dyn FlightStore>,
}

impl AircraftService {
    pub fn new(aircraft: Arc<dyn AircraftStore>, flights: Arc<dyn FlightStore>) -> Self {
        Self { aircraft, flights }
    }

    pub async fn list(&self) -> ServiceResult<Vec<Aircraft>> {
        Ok(self.aircraft.get_all().await?)
    }

    pub async fn list_available(&self) -> ServiceResult<Vec<Aircraft>> {
        Ok(self.aircraft.get_available().await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Aircraft> {
        self.aircraft
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: EntityKind::Aircraft,
                id,
            })
    }

    pub async fn get_by_registration_number(
        &self,
        registration: &str,
    ) -> ServiceResult<Option<Aircraft>> {
        Ok(self
            .aircraft
            .get_by_registration_number(registration.trim())
            .await?)
    }

    /// Check the input against the business rules without writing anything.
    ///
    /// Uniqueness is checked first, then the performance figures in a fixed
    /// order; only the first violation is reported.
    pub async fn validate(&self, input: &AircraftInput, own_id: Option<i32>) -> ServiceResult<()> {
        let registration = input.registration_number.trim();
        let holder = self.aircraft.get_by_registration_number(registration).await?;
        check_unique(
            EntityKind::Aircraft,
            "registration number",
            registration,
            holder.map(|a| a.id),
            own_id,
        )?;
        check_aircraft_fields(input)
    }

    pub async fn create(&self, mut input: AircraftInput) -> ServiceResult<Aircraft> {
        input.registration_number = input.registration_number.trim().to_string();
        if let Err(e) = self.validate(&input, None).await {
            record_rejection(EntityKind::Aircraft, &e);
            return Err(e);
        }

        let aircraft = self.aircraft.add(input).await?;
        metrics::counter!("aircraft.created_total").increment(1);
        info!(
            "Created aircraft {} ({})",
            aircraft.registration_number, aircraft.id
        );
        Ok(aircraft)
    }

    pub async fn update(&self, id: i32, mut input: AircraftInput) -> ServiceResult<Aircraft> {
        let mut aircraft = self.get(id).await?;

        input.registration_number = input.registration_number.trim().to_string();
        if let Err(e) = self.validate(&input, Some(id)).await {
            record_rejection(EntityKind::Aircraft, &e);
            return Err(e);
        }

        aircraft.apply(&input);
        if !self.aircraft.update(&aircraft).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Aircraft,
                id,
            });
        }

        metrics::counter!("aircraft.updated_total").increment(1);
        info!(
            "Updated aircraft {} ({})",
            aircraft.registration_number, aircraft.id
        );
        self.get(id).await
    }

    /// Delete an aircraft unless flights are still assigned to it
    pub async fn delete(&self, id: i32) -> ServiceResult<()> {
        if !self.aircraft.exists(id).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Aircraft,
                id,
            });
        }

        let flight_count = self.flights.count_flights_by_aircraft(id).await?;
        if let Err(e) = guard_delete(EntityKind::Aircraft, id, flight_count) {
            warn!(
                "Refusing to delete aircraft {}: {} flight(s) reference it",
                id, flight_count
            );
            record_rejection(EntityKind::Aircraft, &e);
            return Err(e);
        }

        if !self.aircraft.delete(id).await? {
            return Err(ServiceError::NotFound {
                entity: EntityKind::Aircraft,
                id,
            });
        }

        metrics::counter!("aircraft.deleted_total").increment(1);
        info!("Deleted aircraft {}", id);
        Ok(())
    }
}
