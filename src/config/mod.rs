//! Configuration management for sheetpull
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use sheetpull::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Request timeout: {}", config.http.request_timeout);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `SHEETPULL__<section>__<key>`
//!
//! Examples:
//! - `SHEETPULL__HTTP__REQUEST_TIMEOUT=30s`
//! - `SHEETPULL__TRANSPORT__KIND=callback`
//! - `SHEETPULL__DEFAULTS__CHUNK_SIZE=100`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/sheetpull.toml`.
//! This can be overridden using the `SHEETPULL_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, HttpSettings, TransportSettings};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
