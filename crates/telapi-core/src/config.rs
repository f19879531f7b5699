//! Application configuration
//!
//! This module provides centralized configuration management using the
//! `config` crate. Configuration can be loaded from environment variables
//! and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub expiry: ExpiryConfig,
    pub scheduler: SchedulerConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Staleness thresholds for the expiry workflows
///
/// Thresholds are per-workflow rather than global so each transient state can
/// be tuned independently.
#[derive(Debug, Deserialize, Clone)]
pub struct ExpiryConfig {
    /// How long a call may sit in `initiating` before it is swept, in seconds
    #[serde(default = "default_initiating_threshold")]
    pub initiating_threshold_secs: i64,

    /// How long a call may sit in `in_progress` before it is swept, in seconds
    #[serde(default = "default_in_progress_threshold")]
    pub in_progress_threshold_secs: i64,
}

fn default_initiating_threshold() -> i64 {
    3600 // 1 hour
}

fn default_in_progress_threshold() -> i64 {
    14400 // 4 hours
}

/// Periodic scheduler configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerConfig {
    /// Cadence of the periodic trigger, in seconds
    #[serde(default = "default_scheduler_interval")]
    pub interval_secs: u64,

    /// Whether the in-process periodic trigger runs at all
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
}

fn default_scheduler_interval() -> u64 {
    3600 // hourly
}

fn default_scheduler_enabled() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("expiry.initiating_threshold_secs", 3600)?
            .set_default("expiry.in_progress_threshold_secs", 14400)?
            .set_default("scheduler.interval_secs", 3600)?
            .set_default("scheduler.enabled", true)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with TELAPI_ prefix
            .add_source(
                Environment::with_prefix("TELAPI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            initiating_threshold_secs: 3600,
            in_progress_threshold_secs: 14400,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_expiry_config() {
        let config = ExpiryConfig::default();
        assert_eq!(config.initiating_threshold_secs, 3600);
        assert_eq!(config.in_progress_threshold_secs, 14400);
    }

    #[test]
    fn test_default_scheduler_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.interval_secs, 3600);
        assert!(config.enabled);
    }
}
