//! # Configuration Abstractions
//!
//! Layered configuration loading and the configuration sections shared by
//! every service-kit component.

pub mod loader;
pub mod types;

// Re-export commonly used types
pub use loader::*;
pub use types::*;
