//! Runtime configuration, read once at startup.

use std::fmt::Display;
use std::str::FromStr;

/// Everything the server needs from its environment.
///
/// Defaults target local development; deployments override through
/// environment variables (a `.env` file is honoured via dotenvy).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Postgres connection string. The only setting without a default.
    pub database_url: String,
    /// Bind address, `HOST` (default `0.0.0.0`).
    pub host: String,
    /// Bind port, `PORT` (default `8080`).
    pub port: u16,
    /// Allowed CORS origins, comma-separated in `CORS_ORIGINS`
    /// (default: the Vite dev server at `http://localhost:5173`).
    pub cors_origins: Vec<String>,
    /// Per-request timeout, `REQUEST_TIMEOUT_SECS` (default 30).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the pool to drain,
    /// `SHUTDOWN_TIMEOUT_SECS` (default 30).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Read configuration from the environment.
    ///
    /// Panics on a missing `DATABASE_URL` or an unparseable numeric value;
    /// a misconfigured server should refuse to start rather than limp along.
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();

        Self {
            database_url,
            host: env_or("HOST", "0.0.0.0"),
            port: env_parsed("PORT", 8080),
            cors_origins,
            request_timeout_secs: env_parsed("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_parsed("SHUTDOWN_TIMEOUT_SECS", 30),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parsed<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} must parse (got '{raw}'): {e}")),
        Err(_) => default,
    }
}
