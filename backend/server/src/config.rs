use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use axum::http::HeaderValue;
use tracing::{debug, info, warn};

use crate::{error::ConfigError, store::DEFAULT_ATTEMPTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    /// Process-local, seeded with an empty counter. Development only.
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreKind::Redis),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("expected redis or memory, got {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub store: StoreKind,
    pub transaction_attempts: u32,
    /// `None` allows any origin.
    pub allowed_origin: Option<HeaderValue>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let transaction_attempts: u32 =
            try_load("TRANSACTION_ATTEMPTS", &DEFAULT_ATTEMPTS.to_string())?;
        if transaction_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "TRANSACTION_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }

        let allowed_origin = var("ALLOWED_ORIGIN")
            .ok()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    key: "ALLOWED_ORIGIN",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            redis_url: read_secret("REDIS_URL")
                .map_or_else(|| try_load("REDIS_URL", "redis://127.0.0.1:6379"), Ok)?,
            store: try_load("COUNCIL_STORE", "redis")?,
            transaction_attempts,
            allowed_origin,
        })
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

/// Docker secret, when mounted.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            debug!("No {secret_name} secret at {path}: {e}");
        })
        .ok()
}
