use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use crate::web::AppState;

use super::{
    DataListResponse, DataResponse, ValidateParams, json_error, service_error_response,
    views::{AircraftRequest, AircraftView},
};

#[derive(Debug, Deserialize)]
pub struct AircraftListParams {
    /// Only aircraft that can be assigned to a new flight
    #[serde(default)]
    pub available: bool,
}

pub async fn list_aircraft(
    State(state): State<AppState>,
    Query(params): Query<AircraftListParams>,
) -> impl IntoResponse {
    let result = if params.available {
        state.aircraft.list_available().await
    } else {
        state.aircraft.list().await
    };

    match result {
        Ok(fleet) => Json(DataListResponse {
            data: fleet.into_iter().map(AircraftView::from).collect(),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to list aircraft", e),
    }
}

pub async fn get_aircraft_by_id(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i32>,
) -> impl IntoResponse {
    match state.aircraft.get(aircraft_id).await {
        Ok(aircraft) => Json(DataResponse {
            data: AircraftView::from(aircraft),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to get aircraft", e),
    }
}

pub async fn get_aircraft_by_registration(
    State(state): State<AppState>,
    Path(registration): Path<String>,
) -> impl IntoResponse {
    match state.aircraft.get_by_registration_number(&registration).await {
        Ok(Some(aircraft)) => Json(DataResponse {
            data: AircraftView::from(aircraft),
        })
        .into_response(),
        Ok(None) => json_error(
            StatusCode::NOT_FOUND,
            &format!("Aircraft with registration {} not found", registration),
        )
        .into_response(),
        Err(e) => service_error_response("Failed to get aircraft by registration", e),
    }
}

pub async fn validate_aircraft(
    State(state): State<AppState>,
    Query(params): Query<ValidateParams>,
    Json(request): Json<AircraftRequest>,
) -> impl IntoResponse {
    match state.aircraft.validate(&request.into(), params.id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response("Aircraft validation failed", e),
    }
}

pub async fn create_aircraft(
    State(state): State<AppState>,
    Json(request): Json<AircraftRequest>,
) -> impl IntoResponse {
    match state.aircraft.create(request.into()).await {
        Ok(aircraft) => (
            StatusCode::CREATED,
            Json(DataResponse {
                data: AircraftView::from(aircraft),
            }),
        )
            .into_response(),
        Err(e) => service_error_response("Failed to create aircraft", e),
    }
}

pub async fn update_aircraft(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i32>,
    Json(request): Json<AircraftRequest>,
) -> impl IntoResponse {
    match state.aircraft.update(aircraft_id, request.into()).await {
        Ok(aircraft) => Json(DataResponse {
            data: AircraftView::from(aircraft),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to update aircraft", e),
    }
}

pub async fn delete_aircraft(
    State(state): State<AppState>,
    Path(aircraft_id): Path<i32>,
) -> impl IntoResponse {
    match state.aircraft.delete(aircraft_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response("Failed to delete aircraft", e),
    }
}
