//! # Common
//!
//! Core shared types and small helpers for the service-kit workspace.
//!
//! ## Key Features
//! - Error types with the `KitError` marker trait
//! - Figment-based layered configuration loading
//! - Tracing subscriber setup
//! - Hex/byte string conversions and struct-to-string-map flattening
//! - CRC-8 (SAE J1850) checksums
//! - Salted SHA-256 and HMAC-SHA256 hashing
//! - Stack trace and function name introspection

pub mod config;
pub mod convert;
pub mod crc8;
pub mod debug;
pub mod error;
pub mod hashing;
pub mod logging;
pub mod rtti;

// Re-export commonly used types at the crate root for convenience
pub use config::{ConfigValidation, LoggingConfig};
pub use error::*;

/// Version of the common crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
