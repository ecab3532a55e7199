use anyhow::Result;
use axum::{
    Router,
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info, info_span};

use crate::actions;
use crate::aircraft_repo::AircraftRepository;
use crate::aircraft_service::AircraftService;
use crate::airport_service::AirportService;
use crate::airports_repo::AirportsRepository;
use crate::db::PgPool;
use crate::flight_service::FlightService;
use crate::flights_repo::FlightsRepository;
use crate::memory_store::InMemoryStore;
use crate::metrics::metrics_handler;

// App state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub airports: AirportService,
    pub aircraft: AircraftService,
    pub flights: FlightService,
}

impl AppState {
    /// Services backed by Postgres repositories sharing one pool
    pub fn with_pool(pool: PgPool) -> Self {
        let airports = Arc::new(AirportsRepository::new(pool.clone()));
        let aircraft = Arc::new(AircraftRepository::new(pool.clone()));
        let flights = Arc::new(FlightsRepository::new(pool));

        Self {
            airports: AirportService::new(airports.clone(), flights.clone()),
            aircraft: AircraftService::new(aircraft.clone(), flights.clone()),
            flights: FlightService::new(flights, airports, aircraft),
        }
    }

    /// Services backed by a single process-local store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            airports: AirportService::new(store.clone(), store.clone()),
            aircraft: AircraftService::new(store.clone(), store.clone()),
            flights: FlightService::new(store.clone(), store.clone(), store),
        }
    }
}

// Middleware for request logging with correlation ID
async fn request_logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let request_id = Uuid::new_v4().simple().to_string()[..8].to_string();
    let start_time = Instant::now();

    let span = info_span!("request", id = %request_id);
    async move {
        info!("Started {} {}", method, path);

        let response = next.run(request).await;
        let duration = start_time.elapsed();
        let status = response.status();

        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => method.to_string(),
            "route" => route,
            "status" => status.as_u16().to_string()
        )
        .record(duration.as_secs_f64());

        info!(
            "Completed {} {} {} in {:.2}ms",
            method,
            path,
            status.as_u16(),
            duration.as_secs_f64() * 1000.0
        );

        response
    }
    .instrument(span)
    .await
}

// Middleware to capture HTTP errors to Sentry
async fn sentry_error_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    if response.status().is_server_error() {
        let status = response.status();
        error!("HTTP {} error on {} {}", status.as_u16(), method, uri);

        sentry::with_scope(
            |scope| {
                scope.set_tag("http.method", method.as_str());
                scope.set_tag("http.url", uri.to_string());
                scope.set_tag("http.status_code", status.as_u16().to_string());
            },
            || {
                sentry::capture_message(
                    &format!("HTTP {} error on {} {}", status.as_u16(), method, uri),
                    sentry::Level::Error,
                )
            },
        );
    }

    response
}

/// The full application: JSON API under `/data` plus `/metrics`
pub fn router(state: AppState) -> Router {
    let api_router = Router::new()
        // Airport routes
        .route(
            "/airports",
            get(actions::search_airports).post(actions::create_airport),
        )
        .route("/airports/validate", post(actions::validate_airport))
        .route("/airports/code/{code}", get(actions::get_airport_by_code))
        .route(
            "/airports/{id}",
            get(actions::get_airport_by_id)
                .put(actions::update_airport)
                .delete(actions::delete_airport),
        )
        // Aircraft routes
        .route(
            "/aircraft",
            get(actions::list_aircraft).post(actions::create_aircraft),
        )
        .route("/aircraft/validate", post(actions::validate_aircraft))
        .route(
            "/aircraft/registration/{registration}",
            get(actions::get_aircraft_by_registration),
        )
        .route(
            "/aircraft/{id}",
            get(actions::get_aircraft_by_id)
                .put(actions::update_aircraft)
                .delete(actions::delete_aircraft),
        )
        // Flight routes
        .route(
            "/flights",
            get(actions::list_flights).post(actions::create_flight),
        )
        .route("/flights/validate", post(actions::validate_flight))
        .route("/flights/report", get(actions::get_flight_report))
        .route("/flights/form-data", get(actions::get_flight_form_data))
        .route(
            "/flights/number/{flight_number}",
            get(actions::get_flight_by_number),
        )
        .route(
            "/flights/{id}",
            get(actions::get_flight_by_id)
                .put(actions::update_flight)
                .delete(actions::delete_flight),
        )
        .with_state(state);

    Router::new()
        .nest("/data", api_router)
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(middleware::from_fn(sentry_error_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn start_web_server(interface: String, port: u16, state: AppState) -> Result<()> {
    sentry::configure_scope(|scope| {
        scope.set_tag("operation", "web-server");
    });
    info!("Starting web server on {}:{}", interface, port);

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", interface, port)).await?;
    info!("Web server listening on http://{}:{}", interface, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
