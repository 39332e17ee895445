//! Error handling for service-kit
//!
//! This module defines the error types shared by every crate in the workspace:
//! - `KitError` marker trait for consistent error handling
//! - Specific error types for configuration, conversion and hashing
//!
//! # Design Principles
//! - All errors implement Send + Sync for async compatibility
//! - Use thiserror for library errors, anyhow for application errors
//! - Provide clear, actionable error messages

use thiserror::Error;

/// Base trait for all service-kit errors
///
/// Every library error type in the workspace implements this marker so that
/// callers can box them uniformly (`Box<dyn KitError>`).
pub trait KitError: std::error::Error + Send + Sync + 'static {}

/// Configuration-related errors
///
/// These errors occur during configuration loading, parsing, or validation.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {details}")]
    ParseError { details: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {key}: {value} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    /// Environment variable error
    #[error("Environment variable error for {var}: {details}")]
    EnvironmentError { var: String, details: String },
}

impl KitError for ConfigurationError {}

/// Conversion errors for the hex and string-map helpers
#[derive(Error, Debug, PartialEq)]
pub enum ConversionError {
    /// Input was empty where content is required
    #[error("Empty string")]
    Empty,

    /// Character bytes contained something other than ASCII letters
    #[error("Not only alphabetical characters")]
    NotAlphabetic,

    /// Hex decoding failed
    #[error("Invalid hex input: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// A struct field had a type that cannot be rendered
    #[error("Wrong type in struct: field {field} is {kind}")]
    UnsupportedField { field: String, kind: &'static str },

    /// The input was neither a struct nor a string-keyed map
    #[error(
        "Wrong input type for conversion to a string map. \
         Only structures and string-keyed maps are accepted. Given type: {kind}"
    )]
    UnsupportedInput { kind: &'static str },

    /// The value could not be serialized
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl KitError for ConversionError {}

/// Hashing input errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HashingError {
    /// Username or password was empty
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Information to authenticate was empty
    #[error("Invalid information")]
    InvalidInformation,

    /// The MAC key was rejected
    #[error("Invalid key length: {0}")]
    InvalidKey(String),
}

impl KitError for HashingError {}

impl ConfigurationError {
    /// Create an invalid value error
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
