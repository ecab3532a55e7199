pub mod aircraft;
pub mod airports;
pub mod flights;
pub mod views;

pub use aircraft::*;
pub use airports::*;
pub use flights::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::errors::ServiceError;

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct DataListResponse<T> {
    pub data: Vec<T>,
}

pub fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(json!({ "errors": message })))
}

/// HTTP status for a rejected service call
pub fn service_error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::DuplicateKey { .. } | ServiceError::ReferentialConflict { .. } => {
            StatusCode::CONFLICT
        }
        ServiceError::InvalidField { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::ReferencedEntityNotFound { .. } => StatusCode::BAD_REQUEST,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turn a service error into a JSON error response.
///
/// Storage failures are logged in full and answered with a generic message.
/// Rejections the user can fix are logged at info, other hard failures at warn.
pub fn service_error_response(context: &str, err: ServiceError) -> Response {
    let status = service_error_status(&err);
    if let ServiceError::Storage(e) = &err {
        error!("{}: {:#}", context, e);
        return json_error(status, &format!("{}: internal error", context)).into_response();
    }

    if err.is_soft() {
        info!("{}: {}", context, err);
    } else {
        warn!("{}: {}", context, err);
    }
    json_error(status, &err.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EntityKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::DuplicateKey {
                    entity: EntityKind::Airport,
                    field: "code",
                    value: "LIS".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::ReferentialConflict {
                    entity: EntityKind::Aircraft,
                    id: 1,
                    flight_count: 2,
                },
                StatusCode::CONFLICT,
            ),
            (
                ServiceError::invalid_field("max_range_km", "Max range must be greater than zero."),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ServiceError::NotFound {
                    entity: EntityKind::Flight,
                    id: 3,
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::ReferencedEntityNotFound {
                    entity: EntityKind::Airport,
                    id: 4,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Storage(anyhow::anyhow!("connection refused")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(service_error_status(&err), expected, "{err:?}");
        }
    }

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_bodies() {
        let conflict = service_error_response(
            "Failed to delete airport",
            ServiceError::ReferentialConflict {
                entity: EntityKind::Airport,
                id: 2,
                flight_count: 1,
            },
        );
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_of(conflict).await["errors"],
            "Cannot delete airport with ID 2: it has 1 associated flight(s)."
        );

        let missing = service_error_response(
            "Failed to get flight",
            ServiceError::NotFound {
                entity: EntityKind::Flight,
                id: 9,
            },
        );
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(missing).await["errors"], "Flight with ID 9 not found");

        let storage = service_error_response(
            "Failed to list flights",
            ServiceError::Storage(anyhow::anyhow!("password authentication failed")),
        );
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(storage).await["errors"],
            "Failed to list flights: internal error"
        );
    }
}
