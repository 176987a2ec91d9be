//! Configuration module for the storefront service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the catalog REST backend
    pub api_url: String,
    /// Token guarding the admin routes (open when unset)
    pub admin_token: Option<String>,
    /// Path to the SQLite file holding store snapshots
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// How long fetched categories are served without refetching
    pub categories_stale_time: Duration,
    /// How long fetched products (and news) are served without refetching
    pub products_stale_time: Duration,
    /// Retries for transient upstream failures
    pub fetch_retries: u32,
    /// Per-request upstream timeout
    pub fetch_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let api_url = env::var("VETSTORE_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let admin_token = env::var("VETSTORE_ADMIN_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        let db_path = env::var("VETSTORE_DB_PATH")
            .unwrap_or_else(|_| "./data/storefront.sqlite".to_string())
            .into();

        let bind_addr = env::var("VETSTORE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| format!("Invalid VETSTORE_BIND_ADDR {:?}: {}", bind_addr, e))?;

        let log_level = env::var("VETSTORE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_url,
            admin_token,
            db_path,
            bind_addr,
            log_level,
            categories_stale_time: Duration::from_secs(env_number(
                "VETSTORE_CATEGORIES_STALE_SECS",
                300,
            )),
            products_stale_time: Duration::from_secs(env_number(
                "VETSTORE_PRODUCTS_STALE_SECS",
                60,
            )),
            fetch_retries: env_number("VETSTORE_FETCH_RETRIES", 2),
            fetch_timeout: Duration::from_secs(env_number("VETSTORE_FETCH_TIMEOUT_SECS", 30)),
        })
    }
}

/// Parse a numeric variable, falling back to `default` when unset or malformed.
fn env_number<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            // Logging is not initialized yet at this point.
            eprintln!("Ignoring malformed {}={:?}, using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
