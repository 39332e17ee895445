//! Channel based server logger
//!
//! A [`ServerLogger`] owns five bounded channels (status, error, warning,
//! info, debug). Each channel is drained by its own tokio task which filters
//! by the configured [`LogLevel`] and writes a timestamped, tagged line to
//! stdout and, when configured, to an append-mode log file.

use crate::config::{ChannelCapacity, LoggerConfig, UNNAMED_SERVER};
use crate::error::LoggerError;
use crate::level::{Channel, LogLevel};
use crate::output::{open_log_file, LogOutput};
use crate::status::Status;
use chrono::Local;
use parking_lot::Mutex;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

const LOGGER_TAG: &str = "[LOGGER]  ";
const CHANNEL_TAG: &str = "[CHANNEL] ";
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Sending halves of the five channels, present while the logger runs
struct Senders {
    status: mpsc::Sender<Status>,
    error: mpsc::Sender<String>,
    warning: mpsc::Sender<String>,
    info: mpsc::Sender<String>,
    debug: mpsc::Sender<String>,
}

/// Structured logger with one worker per channel
pub struct ServerLogger {
    name: String,
    prefix: Arc<str>,
    level: LogLevel,
    log_file: Option<PathBuf>,
    capacity: ChannelCapacity,
    senders: Mutex<Option<Senders>>,
    output: Arc<LogOutput>,
    workers: TaskTracker,
}

impl ServerLogger {
    /// Create a logger from its configuration
    ///
    /// File logging is enabled only when both the directory and the file
    /// name are set and non-empty.
    pub fn new(config: LoggerConfig) -> Result<Self, LoggerError> {
        if config.server_name.is_empty() {
            return Err(LoggerError::EmptyName);
        }

        let workers = TaskTracker::new();
        workers.close();

        Ok(Self {
            prefix: Arc::from(format!("{} - ", config.server_name)),
            log_file: config.log_file_path(),
            name: config.server_name,
            level: config.level,
            capacity: config.capacity,
            senders: Mutex::new(None),
            output: Arc::new(LogOutput::default()),
            workers,
        })
    }

    /// Minimal console-only logger that writes nothing
    pub fn unnamed() -> Self {
        let config = LoggerConfig::new(UNNAMED_SERVER, LogLevel::Quiet);
        let workers = TaskTracker::new();
        workers.close();

        Self {
            prefix: Arc::from(format!("{} - ", config.server_name)),
            log_file: None,
            name: config.server_name,
            level: config.level,
            capacity: config.capacity,
            senders: Mutex::new(None),
            output: Arc::new(LogOutput::default()),
            workers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Path of the log file, if file logging is configured
    pub fn log_file_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.senders.lock().is_some()
    }

    /// Whether lines are currently duplicated into the log file
    pub fn is_logging_to_file(&self) -> bool {
        self.output.has_file()
    }

    /// Open the log file, if configured, and spawn the channel workers
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), LoggerError> {
        let mut senders = self.senders.lock();
        if senders.is_some() {
            return Err(LoggerError::AlreadyRunning);
        }

        info!("{}{LOGGER_TAG}Starting Server Logger", self.prefix);

        if let Some(path) = &self.log_file {
            let dir = path.parent().unwrap_or(path.as_path());
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.output
                .attach(open_log_file(&self.prefix, dir, &file_name)?);
        }

        let capacity = self.capacity;
        let (status_tx, status_rx) = mpsc::channel(capacity.status.max(1));
        let (error_tx, error_rx) = mpsc::channel(capacity.error.max(1));
        let (warning_tx, warning_rx) = mpsc::channel(capacity.warning.max(1));
        let (info_tx, info_rx) = mpsc::channel(capacity.info.max(1));
        let (debug_tx, debug_rx) = mpsc::channel(capacity.debug.max(1));

        self.workers.reopen();
        self.spawn_worker(error_rx, Channel::Error);
        self.spawn_worker(status_rx, Channel::Status);
        self.spawn_worker(warning_rx, Channel::Warning);
        self.spawn_worker(info_rx, Channel::Info);
        self.spawn_worker(debug_rx, Channel::Debug);

        *senders = Some(Senders {
            status: status_tx,
            error: error_tx,
            warning: warning_tx,
            info: info_tx,
            debug: debug_tx,
        });

        info!("{}{LOGGER_TAG}Started Server Logger", self.prefix);
        Ok(())
    }

    /// Close all channels, wait for every worker to exit and close the log
    /// file
    pub async fn stop(&self) -> Result<(), LoggerError> {
        let senders = self.senders.lock().take().ok_or(LoggerError::NotRunning)?;

        info!("{}{LOGGER_TAG}Stopping Server Logger", self.prefix);
        info!("{}{LOGGER_TAG}Closing Channels", self.prefix);
        drop(senders);

        self.workers.close();
        self.workers.wait().await;
        info!("{}{LOGGER_TAG}Closed Channels", self.prefix);

        info!("{}{LOGGER_TAG}Closing Log Files", self.prefix);
        self.output.detach();
        info!("{}{LOGGER_TAG}Closed Log Files", self.prefix);

        info!("{}{LOGGER_TAG}Stopped Server Logger", self.prefix);
        Ok(())
    }

    /// Resolves once every worker has exited
    ///
    /// Returns immediately if the logger was never started.
    pub async fn wait_stopped(&self) {
        self.workers.wait().await;
    }

    pub async fn status(&self, status: Status) {
        let sender = self.senders.lock().as_ref().map(|s| s.status.clone());
        self.deliver(sender, status, Channel::Status).await;
    }

    pub async fn error(&self, error: impl fmt::Display) {
        let sender = self.senders.lock().as_ref().map(|s| s.error.clone());
        self.deliver(sender, error.to_string(), Channel::Error).await;
    }

    pub async fn warning(&self, message: impl fmt::Display) {
        let sender = self.senders.lock().as_ref().map(|s| s.warning.clone());
        self.deliver(sender, message.to_string(), Channel::Warning)
            .await;
    }

    pub async fn info(&self, message: impl fmt::Display) {
        let sender = self.senders.lock().as_ref().map(|s| s.info.clone());
        self.deliver(sender, message.to_string(), Channel::Info).await;
    }

    pub async fn debug(&self, message: impl fmt::Display) {
        let sender = self.senders.lock().as_ref().map(|s| s.debug.clone());
        self.deliver(sender, message.to_string(), Channel::Debug).await;
    }

    async fn deliver<T>(&self, sender: Option<mpsc::Sender<T>>, message: T, channel: Channel) {
        let delivered = match sender {
            Some(sender) => sender.send(message).await.is_ok(),
            None => false,
        };
        if !delivered {
            warn!(
                "{}{LOGGER_TAG}Dropped {channel} message, logger is not running",
                self.prefix
            );
        }
    }

    fn spawn_worker<T>(&self, receiver: mpsc::Receiver<T>, channel: Channel)
    where
        T: fmt::Display + Send + 'static,
    {
        self.workers.spawn(run_worker(
            receiver,
            channel,
            self.level,
            Arc::clone(&self.prefix),
            Arc::clone(&self.output),
        ));
    }
}

impl fmt::Debug for ServerLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerLogger")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("log_file", &self.log_file)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn run_worker<T: fmt::Display>(
    mut receiver: mpsc::Receiver<T>,
    channel: Channel,
    threshold: LogLevel,
    prefix: Arc<str>,
    output: Arc<LogOutput>,
) {
    debug!("{prefix}{CHANNEL_TAG}Listening to {channel} channel");

    while let Some(message) = receiver.recv().await {
        if !threshold.allows(channel.level()) {
            continue;
        }
        output.write_line(&format_line(&prefix, channel, &message));
    }

    debug!("{prefix}{CHANNEL_TAG}Stopped {channel} channel");
}

fn format_line(prefix: &str, channel: Channel, message: &dyn fmt::Display) -> String {
    format!(
        "{} {prefix}{}{message}",
        Local::now().format(TIMESTAMP_FORMAT),
        channel.tag()
    )
}
