//! Configuration management for the Breastmilk Processing Operations Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with MILKOPS_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::CROSS_CHECK_TOLERANCE_PERCENT;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token verification for tenant scoping
    pub auth: AuthConfig,

    /// Retry policy for database writes
    pub retry: RetryConfig,

    /// Calculation settings
    pub calculation: CalculationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret the identity provider signs session tokens with
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// First backoff delay in milliseconds, doubled on each retry
    pub base_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CalculationConfig {
    /// Allowed cross-check variance (±%)
    pub cross_check_tolerance_percent: f64,
}

impl CalculationConfig {
    /// Tolerance as a decimal, falling back to the standard ±5% band
    pub fn tolerance(&self) -> Decimal {
        Decimal::try_from(self.cross_check_tolerance_percent)
            .ok()
            .filter(|t| *t >= Decimal::ZERO)
            .unwrap_or(CROSS_CHECK_TOLERANCE_PERCENT)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("MILKOPS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("retry.max_retries", 3)?
            .set_default("retry.base_delay_ms", 1000)?
            .set_default("calculation.cross_check_tolerance_percent", 5.0)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (MILKOPS_ prefix)
            .add_source(
                Environment::with_prefix("MILKOPS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
