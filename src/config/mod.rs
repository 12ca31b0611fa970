//! Start-up configuration read from the environment.
use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set when STORE=postgres")]
    MissingDatabaseUrl,
    #[error("unknown STORE {0:?}, expected \"postgres\" or \"memory\"")]
    UnknownStore(String),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
        reset_database: bool,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), || {
            DEFAULT_BIND_ADDR.parse().ok()
        })?;

        let store = match lookup("STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StoreConfig::Postgres {
                database_url: lookup("DATABASE_URL")
                    .filter(|url| !url.trim().is_empty())
                    .ok_or(ConfigError::MissingDatabaseUrl)?,
                max_connections: parse_or(
                    "DB_MAX_CONNECTIONS",
                    lookup("DB_MAX_CONNECTIONS"),
                    || Some(DEFAULT_MAX_CONNECTIONS),
                )?,
                reset_database: parse_flag("RESET_DATABASE", lookup("RESET_DATABASE"))?,
            },
            Some("memory") => StoreConfig::Memory,
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        Ok(Self { bind_addr, store })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: impl FnOnce() -> Option<T>,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => default().ok_or(ConfigError::Invalid {
            key,
            value: String::new(),
        }),
    }
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "" | "0" | "false" | "no") => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes") => Ok(true),
        Some(_) => Err(ConfigError::Invalid {
            key,
            value: raw.unwrap_or_default(),
        }),
    }
}
