//! Error types for transports, clients and the service coordinator

use common::KitError;
use service_logger::LoggerError;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::transport::TransportKind;

/// Boxed error carried from the gRPC framework
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised by [`crate::Transport`] implementations
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{kind} server: Failed to listen on port {port}: {source}")]
    Bind {
        kind: TransportKind,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} server: Failed to read {path}: {source}")]
    Io {
        kind: TransportKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} server: Failed to generate credentials: {source}")]
    Credentials {
        kind: TransportKind,
        #[source]
        source: BoxError,
    },

    #[error("{kind} server: Is not initialized")]
    NotInitialized { kind: TransportKind },

    #[error("{kind} server: Instance is already running")]
    AlreadyRunning { kind: TransportKind },

    #[error("{kind} server: Is not running")]
    NotRunning { kind: TransportKind },

    #[error("{kind} server: {source}")]
    Serve {
        kind: TransportKind,
        #[source]
        source: BoxError,
    },
}

impl KitError for TransportError {}

/// Errors raised by [`crate::GrpcClient`]
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("GRPC client: Is not initialized")]
    NotInitialized,

    #[error("GRPC client: Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GRPC client: Failed to create TLS credentials: {source}")]
    Credentials {
        #[source]
        source: BoxError,
    },

    #[error("GRPC client: Invalid endpoint {endpoint}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: BoxError,
    },

    #[error("GRPC client: After {attempts} attempts, last error: {}", ErrorChain(&**source))]
    ConnectionFailed {
        attempts: u32,
        #[source]
        source: BoxError,
    },
}

impl KitError for ClientError {}

/// Errors raised by [`crate::ServiceCoordinator`]
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service already running")]
    AlreadyRunning,

    #[error("Service not initialized")]
    NotInitialized,

    #[error("Empty server name")]
    EmptyName,

    #[error("Stop channel not initialized")]
    MissingStopSignal,

    #[error("{kind} server not initialized")]
    TransportNotInitialized { kind: TransportKind },

    #[error("Expected a {expected} server, got {found}")]
    TransportMismatch {
        expected: TransportKind,
        found: TransportKind,
    },

    #[error("Server logger not initialized")]
    MissingLogger,

    #[error("Server logger failed on start: {0}")]
    LoggerStart(#[source] LoggerError),

    #[error("Server logger failed on stop: {0}")]
    LoggerStop(#[source] LoggerError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ServiceError {
    /// Whether this error rejected the arguments given to `setup`
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::MissingStopSignal
                | Self::TransportNotInitialized { .. }
                | Self::TransportMismatch { .. }
                | Self::MissingLogger
        )
    }
}

impl KitError for ServiceError {}

/// Renders an error followed by each of its sources, separated by `: `
pub struct ErrorChain<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {cause}")?;
            source = cause.source();
        }
        Ok(())
    }
}
