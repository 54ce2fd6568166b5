//! # Store Configuration
//!
//! Environment-aware configuration for the content store and its type
//! mapping resolution.
//!
//! Values come, in increasing priority, from the environment preset
//! (`production`, `development`, `test`), an optional configuration file, and
//! `CONTENT_STORE__*` environment variables (`__` separates nesting levels,
//! e.g. `CONTENT_STORE__RESOLUTION_CACHE__ENABLED=false`).

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{info, warn};

/// Root configuration for a [`ContentStore`](crate::ContentStore)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Memoization of indirect (ancestry based) resolutions
    pub resolution_cache: ResolutionCacheConfig,

    /// Emit a debug event for every indirect resolution outcome
    pub log_resolutions: bool,
}

/// Configuration of the indirect resolution cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionCacheConfig {
    pub enabled: bool,
    /// Log a warning once the cache holds this many concrete types
    pub warn_threshold: usize,
}

impl Default for ResolutionCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warn_threshold: 10_000,
        }
    }
}

impl Default for StoreConfig {
    /// Default configuration suitable for production
    fn default() -> Self {
        Self {
            resolution_cache: ResolutionCacheConfig::default(),
            log_resolutions: false,
        }
    }
}

impl StoreConfig {
    /// Test configuration: small warning threshold, verbose resolution logs
    pub fn for_test() -> Self {
        Self {
            resolution_cache: ResolutionCacheConfig {
                enabled: true,
                warn_threshold: 100,
            },
            log_resolutions: true,
        }
    }

    pub fn for_development() -> Self {
        Self {
            resolution_cache: ResolutionCacheConfig {
                enabled: true,
                warn_threshold: 1_000,
            },
            log_resolutions: true,
        }
    }

    /// Current environment name from `CONTENT_STORE_ENV` or `RUST_ENV`
    pub fn detect_environment() -> String {
        env::var("CONTENT_STORE_ENV")
            .or_else(|_| env::var("RUST_ENV"))
            .unwrap_or_else(|_| "production".to_string())
    }

    /// Preset for the detected environment with variable overrides applied
    pub fn from_environment() -> Self {
        let environment = Self::detect_environment();

        let config = match environment.as_str() {
            "test" => {
                info!("Loading test store configuration");
                Self::for_test()
            }
            "development" => {
                info!("Loading development store configuration");
                Self::for_development()
            }
            _ => {
                info!("Loading production store configuration");
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    /// Apply single-value environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(enabled) = env::var("CONTENT_STORE_RESOLUTION_CACHE_ENABLED") {
            self.resolution_cache.enabled = enabled.parse().unwrap_or(self.resolution_cache.enabled);
            info!("Resolution cache enabled override: {}", self.resolution_cache.enabled);
        }

        if let Ok(threshold) = env::var("CONTENT_STORE_RESOLUTION_CACHE_WARN_THRESHOLD") {
            if let Ok(value) = threshold.parse::<usize>() {
                self.resolution_cache.warn_threshold = value;
                info!("Resolution cache warn threshold override: {}", value);
            }
        }

        if let Ok(log) = env::var("CONTENT_STORE_LOG_RESOLUTIONS") {
            self.log_resolutions = log.parse().unwrap_or(self.log_resolutions);
            info!("Resolution logging override: {}", self.log_resolutions);
        }

        self
    }

    /// Layer an optional file and `CONTENT_STORE__*` variables over the
    /// environment preset, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::from_environment())?);

        if let Some(path) = path {
            if !path.exists() {
                return Err(StoreError::configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: StoreConfig = builder
            .add_source(
                config::Environment::with_prefix("CONTENT_STORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        config.log_configuration();
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.resolution_cache.enabled && self.resolution_cache.warn_threshold == 0 {
            return Err(StoreError::configuration(
                "resolution_cache.warn_threshold must be greater than 0",
            ));
        }

        if !self.resolution_cache.enabled {
            warn!("Resolution cache disabled - every indirect lookup walks the type hierarchy");
        }

        Ok(())
    }

    /// Log current configuration for debugging
    pub fn log_configuration(&self) {
        info!("Content Store Configuration:");
        info!(
            "  Resolution Cache: enabled={}, warn threshold={} types",
            self.resolution_cache.enabled, self.resolution_cache.warn_threshold
        );
        info!("  Log Resolutions: {}", self.log_resolutions);
    }
}
