use std::fmt;

/// The aggregates a service error can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Airport,
    Aircraft,
    Flight,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Airport => write!(f, "airport"),
            EntityKind::Aircraft => write!(f, "aircraft"),
            EntityKind::Flight => write!(f, "flight"),
        }
    }
}

/// Outcome of a rejected service call.
///
/// Business-rule violations (`DuplicateKey`, `InvalidField`, `ReferentialConflict`)
/// are soft: the caller shows the message and the user corrects the input.
/// Everything else is a hard integrity or storage failure that aborts the request.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("An {entity} with {field} '{value}' already exists.")]
    DuplicateKey {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },

    #[error("{message}")]
    InvalidField { field: &'static str, message: String },

    #[error("Cannot delete {entity} with ID {id}: it has {flight_count} associated flight(s).")]
    ReferentialConflict {
        entity: EntityKind,
        id: i32,
        flight_count: usize,
    },

    #[error("{} with ID {id} not found", capitalize(.entity))]
    NotFound { entity: EntityKind, id: i32 },

    #[error("Invalid airport or aircraft selection: {entity} with ID {id} does not exist")]
    ReferencedEntityNotFound { entity: EntityKind, id: i32 },

    #[error(transparent)]
    Storage(anyhow::Error),
}

/// A write refused by the store itself.
///
/// Stores raise this inside their write so the invariant holds even when two
/// requests pass validation at the same time. It travels inside `anyhow::Error`
/// and becomes the matching soft [`ServiceError`] on conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConstraintViolation {
    #[error("{entity} {field} '{value}' is already taken")]
    UniqueKey {
        entity: EntityKind,
        field: &'static str,
        value: String,
    },

    #[error("{entity} {id} is still referenced by {flight_count} flight(s)")]
    StillReferenced {
        entity: EntityKind,
        id: i32,
        flight_count: usize,
    },
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConstraintViolation>() {
            Ok(ConstraintViolation::UniqueKey {
                entity,
                field,
                value,
            }) => ServiceError::DuplicateKey {
                entity,
                field,
                value,
            },
            Ok(ConstraintViolation::StillReferenced {
                entity,
                id,
                flight_count,
            }) => ServiceError::ReferentialConflict {
                entity,
                id,
                flight_count,
            },
            Err(err) => ServiceError::Storage(err),
        }
    }
}

impl ServiceError {
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// True for expected business-rule rejections the end user can fix
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            ServiceError::DuplicateKey { .. }
                | ServiceError::InvalidField { .. }
                | ServiceError::ReferentialConflict { .. }
        )
    }

    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::DuplicateKey { .. } => "duplicate_key",
            ServiceError::InvalidField { .. } => "invalid_field",
            ServiceError::ReferentialConflict { .. } => "referential_conflict",
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::ReferencedEntityNotFound { .. } => "referenced_entity_not_found",
            ServiceError::Storage(_) => "storage",
        }
    }
}

fn capitalize(entity: &EntityKind) -> &'static str {
    match entity {
        EntityKind::Airport => "Airport",
        EntityKind::Aircraft => "Aircraft",
        EntityKind::Flight => "Flight",
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
