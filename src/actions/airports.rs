use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;

use crate::web::AppState;

use super::{
    DataListResponse, DataResponse, json_error, service_error_response,
    views::{AirportRequest, AirportView},
};

#[derive(Debug, Deserialize)]
pub struct AirportSearchParams {
    /// Matches name, city or code, case-insensitively
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateParams {
    /// Record being edited; omit when validating a new one
    pub id: Option<i32>,
}

pub async fn search_airports(
    State(state): State<AppState>,
    Query(params): Query<AirportSearchParams>,
) -> impl IntoResponse {
    let result = match params.q.as_deref() {
        Some(term) => state.airports.search(term).await,
        None => state.airports.list().await,
    };

    match result {
        Ok(airports) => Json(DataListResponse {
            data: airports.into_iter().map(AirportView::from).collect(),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to search airports", e),
    }
}

pub async fn get_airport_by_id(
    State(state): State<AppState>,
    Path(airport_id): Path<i32>,
) -> impl IntoResponse {
    match state.airports.get(airport_id).await {
        Ok(airport) => Json(DataResponse {
            data: AirportView::from(airport),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to get airport", e),
    }
}

pub async fn get_airport_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> impl IntoResponse {
    match state.airports.get_by_code(&code).await {
        Ok(Some(airport)) => Json(DataResponse {
            data: AirportView::from(airport),
        })
        .into_response(),
        Ok(None) => json_error(
            StatusCode::NOT_FOUND,
            &format!("Airport with code {} not found", code.trim().to_uppercase()),
        )
        .into_response(),
        Err(e) => service_error_response("Failed to get airport by code", e),
    }
}

pub async fn validate_airport(
    State(state): State<AppState>,
    Query(params): Query<ValidateParams>,
    Json(request): Json<AirportRequest>,
) -> impl IntoResponse {
    match state.airports.validate(&request.into(), params.id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response("Airport validation failed", e),
    }
}

pub async fn create_airport(
    State(state): State<AppState>,
    Json(request): Json<AirportRequest>,
) -> impl IntoResponse {
    match state.airports.create(request.into()).await {
        Ok(airport) => (
            StatusCode::CREATED,
            Json(DataResponse {
                data: AirportView::from(airport),
            }),
        )
            .into_response(),
        Err(e) => service_error_response("Failed to create airport", e),
    }
}

pub async fn update_airport(
    State(state): State<AppState>,
    Path(airport_id): Path<i32>,
    Json(request): Json<AirportRequest>,
) -> impl IntoResponse {
    match state.airports.update(airport_id, request.into()).await {
        Ok(airport) => Json(DataResponse {
            data: AirportView::from(airport),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to update airport", e),
    }
}

pub async fn delete_airport(
    State(state): State<AppState>,
    Path(airport_id): Path<i32>,
) -> impl IntoResponse {
    match state.airports.delete(airport_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response("Failed to delete airport", e),
    }
}
