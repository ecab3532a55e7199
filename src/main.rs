use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use flightdesk::config::Config;
use flightdesk::logging::{init_sentry, init_tracing};

mod commands;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "flightdesk",
    version,
    about = "Manage airports, aircraft and flights with computed distance, fuel and flight time"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the JSON API
    Web {
        /// Interface to bind to
        #[arg(long, default_value = "0.0.0.0")]
        interface: String,
        /// Port to listen on
        #[arg(long, default_value_t = 1337)]
        port: u16,
        /// Keep all data in process memory instead of Postgres
        #[arg(long, default_value_t = false)]
        in_memory: bool,
    },
    /// Create demo airports, aircraft and flights
    Seed {
        /// Number of records of each kind
        #[arg(long, default_value_t = 5)]
        count: usize,
    },
    /// Print the flight report as JSON
    Report,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let sentry_guard = init_sentry(&config);
    init_tracing(sentry_guard.is_some());
    if sentry_guard.is_some() {
        info!("Sentry enabled for environment {}", config.environment);
    }

    let result = match cli.command {
        Commands::Web {
            interface,
            port,
            in_memory,
        } => commands::handle_web(&config, interface, port, in_memory).await,
        Commands::Seed { count } => commands::handle_seed(&config, count).await,
        Commands::Report => commands::handle_report(&config).await,
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}
