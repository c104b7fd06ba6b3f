//! Server configuration.
//!
//! Every field has a hardcoded default and an overriding environment
//! variable. A present-but-unparseable env var is logged via
//! `tracing::warn` and the default is kept — startup never fails because
//! of a malformed config value.

use tracing::warn;

/// Default client-facing port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default Prometheus metrics port.
pub const DEFAULT_METRICS_PORT: u16 = 9090;
/// Default simulation tick rate, in Hz.
pub const DEFAULT_TICK_RATE: f64 = 60.0;
/// Default database connection string.
pub const DEFAULT_DATABASE_DSN: &str = "postgres://localhost/pvp_core";

/// Server-wide configuration, loaded once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub tick_rate: f64,
    pub database_dsn: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            metrics_port: DEFAULT_METRICS_PORT,
            tick_rate: DEFAULT_TICK_RATE,
            database_dsn: DEFAULT_DATABASE_DSN.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from the environment, falling back to defaults field-by-field.
    /// Reads `PORT`, `METRICS_PORT`, `TICK_RATE`, `DATABASE_DSN`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed_env("PORT", defaults.port),
            metrics_port: parsed_env("METRICS_PORT", defaults.metrics_port),
            tick_rate: parsed_env("TICK_RATE", defaults.tick_rate),
            database_dsn: std::env::var("DATABASE_DSN").unwrap_or(defaults.database_dsn),
        }
    }
}

fn parsed_env<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match std::env::var(key) {
        Err(_) => default,
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, raw, default = %default, "failed to parse env var, using default");
                default
            }
        },
    }
}
