//! Service coordinator
//!
//! Drives a [`Transport`] together with a [`ServerLogger`] and a
//! [`StopSignal`] through `setup -> serve -> stop`. All lifecycle flags live
//! behind one mutex, so the `serve` check-and-set is atomic and concurrent
//! `stop` calls run the shutdown sequence once. The transport is claimed
//! inside that same critical section, so a `stop` racing a fresh `serve`
//! always finds it running.

use parking_lot::Mutex;
use service_logger::{ServerLogger, Status};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::{ServiceError, TransportError};
use crate::stop_signal::{StopReason, StopSignal};
use crate::transport::{Transport, TransportKind};

#[derive(Default)]
struct CoordinatorState {
    prefix: String,
    transport: Option<Arc<dyn Transport>>,
    logger: Option<Arc<ServerLogger>>,
    stop_signal: Option<StopSignal>,
    initialized: bool,
    running: bool,
    failure: Option<TransportError>,
}

/// Handles shared with the shutdown sequence
struct Parts {
    prefix: String,
    transport: Option<Arc<dyn Transport>>,
    logger: Arc<ServerLogger>,
    stop_signal: StopSignal,
}

/// Orchestrates setup, serving and shutdown of one transport
#[derive(Clone)]
pub struct ServiceCoordinator {
    kind: TransportKind,
    state: Arc<Mutex<CoordinatorState>>,
}

impl ServiceCoordinator {
    /// Coordinator for transports of the given kind
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(CoordinatorState::default())),
        }
    }

    pub fn grpc() -> Self {
        Self::new(TransportKind::Grpc)
    }

    pub fn grpc_web() -> Self {
        Self::new(TransportKind::GrpcWeb)
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// The transport handed to `setup`, until a running service is stopped
    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.state.lock().transport.clone()
    }

    /// Validate the inputs, start the logger and mark the service initialized
    ///
    /// Inputs are checked in order: not running, non-empty name, stop signal,
    /// initialized transport of this coordinator's kind, logger. On any
    /// failure nothing is retained.
    pub async fn setup(
        &self,
        name: &str,
        transport: Option<Arc<dyn Transport>>,
        logger: Option<Arc<ServerLogger>>,
        stop_signal: Option<StopSignal>,
    ) -> Result<(), ServiceError> {
        if self.is_running() {
            return Err(ServiceError::AlreadyRunning);
        }
        if name.is_empty() {
            return Err(ServiceError::EmptyName);
        }

        let prefix = format!("{name} - [SERVICE] ");
        info!("{prefix}Setting up Service");

        let stop_signal = stop_signal.ok_or(ServiceError::MissingStopSignal)?;
        let transport = transport
            .filter(|transport| transport.is_initialized())
            .ok_or(ServiceError::TransportNotInitialized { kind: self.kind })?;
        if transport.kind() != self.kind {
            return Err(ServiceError::TransportMismatch {
                expected: self.kind,
                found: transport.kind(),
            });
        }
        let logger = logger.ok_or(ServiceError::MissingLogger)?;

        logger.start().map_err(ServiceError::LoggerStart)?;
        logger.info("Initialized Server").await;
        logger.status(Status::Initialized).await;

        let mut state = self.state.lock();
        *state = CoordinatorState {
            prefix,
            transport: Some(transport),
            logger: Some(logger),
            stop_signal: Some(stop_signal),
            initialized: true,
            running: false,
            failure: None,
        };

        Ok(())
    }

    /// Serve the transport until the stop signal fires
    ///
    /// Firing the signal, from [`ServiceCoordinator::stop`] or elsewhere,
    /// shuts the service down. Returns after the logger has drained. If the
    /// transport's serve loop failed, its error is returned once shutdown
    /// completes.
    pub async fn serve(&self) -> Result<(), ServiceError> {
        let (serving, logger, stop_signal, prefix) = {
            let mut state = self.state.lock();
            let transport = match (&state.transport, state.initialized) {
                (Some(transport), true) if transport.is_initialized() => transport.clone(),
                _ => return Err(ServiceError::NotInitialized),
            };
            if state.running {
                return Err(ServiceError::AlreadyRunning);
            }
            let (Some(logger), Some(stop_signal)) =
                (state.logger.clone(), state.stop_signal.clone())
            else {
                return Err(ServiceError::NotInitialized);
            };
            let serving = transport.start()?;
            state.running = true;
            (serving, logger, stop_signal, state.prefix.clone())
        };

        let coordinator = self.clone();
        tokio::spawn(async move {
            if let Err(e) = serving.await {
                coordinator.fail(e).await;
            }
        });

        logger.status(Status::Running).await;
        info!("{prefix}Serving");

        if stop_signal.wait().await == StopReason::Closed {
            warn!("{prefix}Server shutdown unexpectedly");
        }
        if self.is_initialized() {
            if let Err(e) = self.stop().await {
                warn!("{prefix}Failed to stop after the stop signal fired: {e}");
            }
        }

        logger.wait_stopped().await;

        let failure = self.state.lock().failure.take();
        match failure {
            Some(failure) => Err(ServiceError::Transport(failure)),
            None => Ok(()),
        }
    }

    /// Shut the service down and stop the logger
    ///
    /// A running transport is stopped, released and the stop signal fired.
    pub async fn stop(&self) -> Result<(), ServiceError> {
        let Parts {
            prefix,
            transport,
            logger,
            stop_signal,
        } = self.begin_stop()?;

        logger.warning("Shutting down").await;
        logger.status(Status::Stopping).await;
        logger.info(format!("Stopping {} Server", self.kind)).await;

        if let Some(transport) = transport {
            if let Err(e) = transport.stop() {
                logger.error(&e).await;
            }
            stop_signal.stop();
        }

        logger.status(Status::Stopped).await;
        logger.info("Shutdown Log Environment").await;
        logger.stop().await.map_err(ServiceError::LoggerStop)?;

        info!("{prefix}Shut down");
        Ok(())
    }

    /// Claim the shutdown so that it runs once, releasing a running transport
    fn begin_stop(&self) -> Result<Parts, ServiceError> {
        let mut state = self.state.lock();
        if !state.initialized {
            return Err(ServiceError::NotInitialized);
        }
        let (Some(logger), Some(stop_signal)) = (state.logger.clone(), state.stop_signal.clone())
        else {
            return Err(ServiceError::NotInitialized);
        };

        state.initialized = false;
        let transport = if state.running {
            state.running = false;
            state.transport.take()
        } else {
            None
        };

        Ok(Parts {
            prefix: state.prefix.clone(),
            transport,
            logger,
            stop_signal,
        })
    }

    /// Record a serve loop failure and shut down
    async fn fail(&self, failure: TransportError) {
        let message = failure.to_string();
        let (prefix, logger) = {
            let mut state = self.state.lock();
            state.failure = Some(failure);
            (state.prefix.clone(), state.logger.clone())
        };
        error!("{prefix}Serving failed: {message}");

        if let Some(logger) = logger {
            logger.error(&message).await;
            logger.status(Status::Error).await;
        }

        if let Err(e) = self.stop().await {
            warn!("{prefix}Failed to stop after serve failure: {e}");
        }
    }
}

impl fmt::Debug for ServiceCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ServiceCoordinator")
            .field("kind", &self.kind)
            .field("prefix", &state.prefix)
            .field("initialized", &state.initialized)
            .field("running", &state.running)
            .finish()
    }
}
