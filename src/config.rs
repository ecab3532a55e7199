use anyhow::{Context, Result};
use std::env;

const DEFAULT_POOL_SIZE: u32 = 10;

/// Process configuration read from the environment (and `.env`, if present)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    /// development, staging or production
    pub environment: String,
    pub sentry_dsn: Option<String>,
    pub database_pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_pool_size = match non_empty("DATABASE_POOL_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DATABASE_POOL_SIZE must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            environment: non_empty("FLIGHTDESK_ENV").unwrap_or_else(|| "development".to_string()),
            sentry_dsn: non_empty("SENTRY_DSN"),
            database_pool_size,
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set (or pass --in-memory)")
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
