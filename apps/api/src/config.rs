use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Every value has a development default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub failure_rate: f64,
    pub seed_on_startup: bool,
    pub seed_candidates: usize,
    pub seed_catalog_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://talentflow.db".to_string()),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            latency_min_ms: parse_env("LATENCY_MIN_MS", 200)?,
            latency_max_ms: parse_env("LATENCY_MAX_MS", 1200)?,
            failure_rate: parse_env("FAILURE_RATE", 0.06)?,
            seed_on_startup: parse_env("SEED_ON_STARTUP", true)?,
            seed_candidates: parse_env("SEED_CANDIDATES", 1000)?,
            seed_catalog_path: std::env::var("SEED_CATALOG_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
        };

        if config.latency_min_ms > config.latency_max_ms {
            bail!(
                "LATENCY_MIN_MS ({}) must not exceed LATENCY_MAX_MS ({})",
                config.latency_min_ms,
                config.latency_max_ms
            );
        }

        Ok(config)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        _ => Ok(default),
    }
}
