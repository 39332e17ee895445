//! # Configuration Types
//!
//! Configuration sections shared across service-kit components.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, KitError};

/// Process-wide tracing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Configuration validation trait
pub trait ConfigValidation {
    type Error: KitError;

    /// Validate the configuration
    fn validate(&self) -> Result<(), Self::Error>;

    /// Get configuration warnings (non-fatal issues)
    fn warnings(&self) -> Vec<String> {
        Vec::new()
    }
}

impl ConfigValidation for LoggingConfig {
    type Error = ConfigurationError;

    fn validate(&self) -> Result<(), Self::Error> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        const FORMATS: [&str; 3] = ["json", "pretty", "compact"];

        if !LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigurationError::invalid_value(
                "logging.level",
                &self.level,
                "expected one of trace, debug, info, warn, error",
            ));
        }

        if !FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigurationError::invalid_value(
                "logging.format",
                &self.format,
                "expected one of json, pretty, compact",
            ));
        }

        Ok(())
    }
}
