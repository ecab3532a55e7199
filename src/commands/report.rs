use anyhow::{Context, Result};
use tracing::info;

use flightdesk::config::Config;
use flightdesk::db;
use flightdesk::web::AppState;

/// Print the flight report as pretty JSON on stdout
pub async fn handle_report(config: &Config) -> Result<()> {
    let pool = db::connect(config.require_database_url()?, config.database_pool_size).await?;
    let state = AppState::with_pool(pool);

    let report = state
        .flights
        .report()
        .await
        .context("Failed to build flight report")?;
    info!(
        "Report covers {} flights, {:.1} km in total",
        report.total_flights, report.total_distance_km
    );

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}
