use chrono::FixedOffset;
use thiserror::Error;

use crate::store::{MemoryStore, PostgrestConfig, StoreBackend};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub enum StoreSettings {
    Postgrest(PostgrestConfig),
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub store: StoreSettings,
    pub jwt_secret: String,
    pub log_level: String,
    /// Offset used when bucketing by calendar day.
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn init() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let store = match var("STORE_BACKEND").as_deref().unwrap_or("postgrest") {
            "postgrest" => StoreSettings::Postgrest(PostgrestConfig {
                project_url: required("SUPABASE_PROJECT_URL")?,
                service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            }),
            "memory" => StoreSettings::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    reason: format!("expected postgrest or memory, got {other}"),
                })
            }
        };

        let offset_minutes = match var("UTC_OFFSET_MINUTES") {
            Some(raw) => raw.trim().parse::<i32>().map_err(|e| ConfigError::Invalid {
                name: "UTC_OFFSET_MINUTES",
                reason: e.to_string(),
            })?,
            None => 0,
        };
        let utc_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                name: "UTC_OFFSET_MINUTES",
                reason: format!("{offset_minutes} is out of range"),
            })?;

        Ok(Config {
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            store,
            jwt_secret: required("JWT_SECRET")?,
            log_level: var("LOG_LEVEL")
                .unwrap_or_else(|| "info".to_string())
                .to_lowercase(),
            utc_offset,
        })
    }

    pub fn store_backend(&self) -> StoreBackend {
        match &self.store {
            StoreSettings::Postgrest(config) => StoreBackend::Postgrest(config.clone()),
            StoreSettings::Memory => StoreBackend::Memory(MemoryStore::new()),
        }
    }
}
