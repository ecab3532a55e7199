use anyhow::Result;
use tracing::{info, warn};

use flightdesk::config::Config;
use flightdesk::db;
use flightdesk::metrics::{init_metrics, process_metrics_task};
use flightdesk::web::{AppState, start_web_server};

pub async fn handle_web(config: &Config, interface: String, port: u16, in_memory: bool) -> Result<()> {
    if let Err(e) = init_metrics() {
        warn!("Metrics disabled: {:#}", e);
    } else {
        tokio::spawn(process_metrics_task());
    }

    let state = if in_memory {
        info!("Using in-memory storage; data will not survive a restart");
        AppState::in_memory()
    } else {
        let pool = db::connect(config.require_database_url()?, config.database_pool_size).await?;
        AppState::with_pool(pool)
    };

    start_web_server(interface, port, state).await
}
