use anyhow::{Context, Result};
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::errors::{ConstraintViolation, EntityKind};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Build an r2d2 pool for the given database URL
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .context("Failed to create database connection pool")
}

/// Apply any migrations the database has not seen yet
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    let pool = pool.clone();
    let applied = tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .context("Failed to get connection for migrations")?;
        let versions = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {e}"))?;
        Ok::<Vec<String>, anyhow::Error>(versions.iter().map(|v| v.to_string()).collect())
    })
    .await??;

    if applied.is_empty() {
        info!("Database schema is up to date");
    } else {
        for version in &applied {
            info!("Applied migration {}", version);
        }
    }

    Ok(())
}

/// Connect to Postgres and bring the schema up to date
pub async fn connect(database_url: &str, max_size: u32) -> Result<PgPool> {
    info!("Connecting to database...");
    let pool = build_pool(database_url, max_size)?;
    run_migrations(&pool).await?;
    info!("Database connection pool created (max {} connections)", max_size);
    Ok(pool)
}

/// Report a unique index violation as a taken key, pass anything else through
pub fn map_unique_violation(
    err: DieselError,
    entity: EntityKind,
    field: &'static str,
    value: &str,
) -> anyhow::Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ConstraintViolation::UniqueKey {
                entity,
                field,
                value: value.to_string(),
            }
            .into()
        }
        other => other.into(),
    }
}

pub fn is_foreign_key_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new("constraint violated".to_string()))
    }

    #[test]
    fn test_unique_violation_becomes_taken_key() {
        let err = map_unique_violation(
            database_error(DatabaseErrorKind::UniqueViolation),
            EntityKind::Aircraft,
            "registration number",
            "CS-TJE",
        );
        match err.downcast_ref::<ConstraintViolation>() {
            Some(ConstraintViolation::UniqueKey { value, .. }) => assert_eq!(value, "CS-TJE"),
            other => panic!("expected UniqueKey, got {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = map_unique_violation(DieselError::NotFound, EntityKind::Airport, "code", "LIS");
        assert!(err.downcast_ref::<ConstraintViolation>().is_none());

        assert!(is_foreign_key_violation(&database_error(
            DatabaseErrorKind::ForeignKeyViolation
        )));
        assert!(!is_foreign_key_violation(&database_error(
            DatabaseErrorKind::UniqueViolation
        )));
    }
}
