//! Logger configuration

use crate::level::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name used by [`crate::ServerLogger::unnamed`]
pub const UNNAMED_SERVER: &str = "Unnamed Server";

/// Configuration of a [`crate::ServerLogger`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Name written in front of every line
    pub server_name: String,

    /// Directory holding the log file, file logging is off when empty
    pub log_dir: Option<PathBuf>,

    /// Log file name inside `log_dir`, file logging is off when empty
    pub log_file_name: Option<String>,

    /// Verbosity threshold
    pub level: LogLevel,

    /// Buffer sizes of the five channels
    pub capacity: ChannelCapacity,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            server_name: UNNAMED_SERVER.to_string(),
            log_dir: None,
            log_file_name: None,
            level: LogLevel::Info,
            capacity: ChannelCapacity::default(),
        }
    }
}

impl LoggerConfig {
    pub fn new(server_name: impl Into<String>, level: LogLevel) -> Self {
        Self {
            server_name: server_name.into(),
            level,
            ..Self::default()
        }
    }

    /// Write to `{dir}/{file_name}` in addition to stdout
    pub fn with_file(mut self, dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        self.log_dir = Some(dir.into());
        self.log_file_name = Some(file_name.into());
        self
    }

    /// Full path of the log file, if both directory and file name are set
    pub fn log_file_path(&self) -> Option<PathBuf> {
        match (&self.log_dir, &self.log_file_name) {
            (Some(dir), Some(name)) if !dir.as_os_str().is_empty() && !name.is_empty() => {
                Some(dir.join(name))
            }
            _ => None,
        }
    }
}

/// Per-channel buffer sizes
///
/// Zero is not a valid tokio channel capacity and is raised to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelCapacity {
    pub status: usize,
    pub error: usize,
    pub warning: usize,
    pub info: usize,
    pub debug: usize,
}

impl Default for ChannelCapacity {
    fn default() -> Self {
        Self {
            status: 16,
            error: 100,
            warning: 1000,
            info: 10_000,
            debug: 10_000,
        }
    }
}
