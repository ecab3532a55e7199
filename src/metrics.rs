use anyhow::{Context, Result};
use axum::{http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::errors::{EntityKind, ServiceError};

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process.
///
/// HTTP request durations use buckets from 1ms to 10s.
pub fn init_metrics() -> Result<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        )
        .context("Failed to set buckets for http_request_duration_seconds")?
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // A concurrent initializer may have won the race; either handle renders the same registry
    let _ = METRICS_HANDLE.set(handle);
    initialize_flightdesk_metrics();
    Ok(())
}

/// `GET /metrics` in Prometheus text format
pub async fn metrics_handler() -> impl IntoResponse {
    match METRICS_HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Metrics recorder not installed".to_string(),
        ),
    }
}

/// Count a rejected write by entity and reason
pub fn record_rejection(entity: EntityKind, error: &ServiceError) {
    debug!("Rejected {} write: {}", entity, error.kind());
    metrics::counter!(
        "validation.rejected_total",
        "entity" => entity.to_string(),
        "reason" => error.kind()
    )
    .increment(1);
}

/// Background task reporting uptime and resident memory every 5 seconds
pub async fn process_metrics_task() {
    let start_time = Instant::now();

    loop {
        metrics::gauge!("process.uptime.seconds").set(start_time.elapsed().as_secs() as f64);
        metrics::gauge!("process.is_up").set(1.0);

        #[cfg(target_os = "linux")]
        {
            if let Ok(status) = std::fs::read_to_string("/proc/self/status")
                && let Some(line) = status.lines().find(|l| l.starts_with("VmRSS:"))
                && let Some(kb_str) = line.split_whitespace().nth(1)
                && let Ok(kb) = kb_str.parse::<f64>()
            {
                metrics::gauge!("process.memory.bytes").set(kb * 1024.0);
            }
        }

        tokio::time::sleep(Duration::from_secs(5)).await;
    }
}

/// Register counters at zero so they show up in queries before the first event
fn initialize_flightdesk_metrics() {
    for name in ["airports", "aircraft", "flights"] {
        for action in ["created_total", "updated_total", "deleted_total"] {
            metrics::counter!(format!("{name}.{action}")).absolute(0);
        }
    }
    metrics::counter!("flights.invalid_selection_total").absolute(0);
}
