//! # Service Logger
//!
//! Channel based logger used by service coordinators to report lifecycle
//! status, errors, warnings, informational and debug messages.
//!
//! ## Key Features
//! - Five independent bounded channels, each drained by its own tokio task
//! - Inclusive verbosity threshold (`Debug < Info < Warning < State < Error < Quiet`)
//! - Console output optionally duplicated into an append-mode log file
//! - Synchronous shutdown: `stop` returns once every worker has exited

pub mod config;
pub mod error;
pub mod level;
pub mod logger;
mod output;
pub mod status;

pub use config::{ChannelCapacity, LoggerConfig};
pub use error::LoggerError;
pub use level::{Channel, LogLevel};
pub use logger::ServerLogger;
pub use status::Status;
