//! Error types for the channel logger

use common::KitError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Server name must not be empty")]
    EmptyName,

    #[error("Logger already running")]
    AlreadyRunning,

    #[error("Logger not running")]
    NotRunning,

    #[error("Creating log file path {path}: {source}")]
    CreateLogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Opening log file {path}: {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl KitError for LoggerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_error_display() {
        let err = LoggerError::CreateLogDir {
            path: PathBuf::from("/root/logs"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            err.to_string(),
            "Creating log file path /root/logs: permission denied"
        );
        assert_eq!(LoggerError::EmptyName.to_string(), "Server name must not be empty");
    }
}
