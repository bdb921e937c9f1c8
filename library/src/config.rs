//! Runtime configuration, read from the environment (after `.env` is loaded).

use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "iaq.db";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_POOL_SIZE: u32 = 25;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PoolOptions {
    pub max_size: u32,
    /// How long a request waits for a pooled connection before giving up.
    pub connection_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        PoolOptions {
            max_size: DEFAULT_POOL_SIZE,
            connection_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Where the query API lives, as seen by clients. No secrets go here.
    pub api_base_url: String,
    pub pool: PoolOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_address = match var("BIND_ADDRESS") {
            Some(addr) => addr,
            None => {
                let port = match var("PORT") {
                    Some(p) => p
                        .trim()
                        .parse::<u16>()
                        .map_err(|_| format!("PORT must be a port number, got {:?}", p))?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{}", port)
            }
        };

        let api_base_url = var("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let max_size = match var("DB_POOL_SIZE") {
            Some(s) => match s.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(format!("DB_POOL_SIZE must be a positive integer, got {:?}", s)),
            },
            None => DEFAULT_POOL_SIZE,
        };

        let timeout_secs = match var("DB_CONNECT_TIMEOUT_SECS") {
            Some(s) => match s.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(format!(
                        "DB_CONNECT_TIMEOUT_SECS must be a positive integer, got {:?}",
                        s
                    ))
                }
            },
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        Ok(Config {
            database_url,
            bind_address,
            api_base_url,
            pool: PoolOptions {
                max_size,
                connection_timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

/// Full URL of a query API endpoint, e.g. `api_url(base, "sensor-data/latest")`.
pub fn api_url(base: &str, endpoint: &str) -> String {
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    format!("{}/api/{}", base.trim_end_matches('/'), endpoint)
}
