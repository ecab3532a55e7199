use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::flights::FlightInput;
use crate::web::AppState;

use super::{
    DataListResponse, DataResponse, json_error, service_error_response,
    views::{FlightRequest, FlightView},
};

pub async fn list_flights(State(state): State<AppState>) -> impl IntoResponse {
    match state.flights.list().await {
        Ok(flights) => Json(DataListResponse {
            data: flights.into_iter().map(FlightView::from).collect(),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to list flights", e),
    }
}

pub async fn get_flight_by_id(
    State(state): State<AppState>,
    Path(flight_id): Path<i32>,
) -> impl IntoResponse {
    match state.flights.get(flight_id).await {
        Ok(details) => Json(DataResponse {
            data: FlightView::from(details),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to get flight", e),
    }
}

pub async fn get_flight_by_number(
    State(state): State<AppState>,
    Path(flight_number): Path<String>,
) -> impl IntoResponse {
    let flight = match state.flights.get_by_flight_number(&flight_number).await {
        Ok(Some(flight)) => flight,
        Ok(None) => {
            return json_error(
                StatusCode::NOT_FOUND,
                &format!("Flight {} not found", flight_number),
            )
            .into_response();
        }
        Err(e) => return service_error_response("Failed to get flight by number", e),
    };

    match state.flights.get(flight.id).await {
        Ok(details) => Json(DataResponse {
            data: FlightView::from(details),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to get flight by number", e),
    }
}

pub async fn validate_flight(
    State(state): State<AppState>,
    Json(request): Json<FlightRequest>,
) -> impl IntoResponse {
    let input = FlightInput::from(request);
    match state.flights.validate(&input) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response("Flight validation failed", e),
    }
}

pub async fn create_flight(
    State(state): State<AppState>,
    Json(request): Json<FlightRequest>,
) -> impl IntoResponse {
    match state.flights.create(request.into()).await {
        Ok(details) => (
            StatusCode::CREATED,
            Json(DataResponse {
                data: FlightView::from(details),
            }),
        )
            .into_response(),
        Err(e) => service_error_response("Failed to create flight", e),
    }
}

pub async fn update_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<i32>,
    Json(request): Json<FlightRequest>,
) -> impl IntoResponse {
    match state.flights.update(flight_id, request.into()).await {
        Ok(details) => Json(DataResponse {
            data: FlightView::from(details),
        })
        .into_response(),
        Err(e) => service_error_response("Failed to update flight", e),
    }
}

pub async fn delete_flight(
    State(state): State<AppState>,
    Path(flight_id): Path<i32>,
) -> impl IntoResponse {
    match state.flights.delete(flight_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => service_error_response("Failed to delete flight", e),
    }
}

pub async fn get_flight_report(State(state): State<AppState>) -> impl IntoResponse {
    match state.flights.report().await {
        Ok(report) => Json(DataResponse { data: report }).into_response(),
        Err(e) => service_error_response("Failed to build flight report", e),
    }
}

pub async fn get_flight_form_data(State(state): State<AppState>) -> impl IntoResponse {
    match state.flights.form_data().await {
        Ok(form) => Json(DataResponse { data: form }).into_response(),
        Err(e) => service_error_response("Failed to load flight form data", e),
    }
}
