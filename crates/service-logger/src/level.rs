//! Verbosity levels and per-channel tags

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verbosity threshold, lower is more verbose
///
/// A message at level `m` is written when the configured threshold `t`
/// satisfies `t <= m`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warning = 2,
    State = 3,
    Error = 4,
    Quiet = 5,
}

impl LogLevel {
    /// Whether a message at `message_level` passes this threshold
    pub fn allows(self, message_level: LogLevel) -> bool {
        self <= message_level
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::State => "state",
            LogLevel::Error => "error",
            LogLevel::Quiet => "quiet",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "state" | "status" => Ok(LogLevel::State),
            "error" => Ok(LogLevel::Error),
            "quiet" => Ok(LogLevel::Quiet),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// The five logger channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Status,
    Error,
    Warning,
    Info,
    Debug,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Status,
        Channel::Error,
        Channel::Warning,
        Channel::Info,
        Channel::Debug,
    ];

    /// Level a message on this channel is filtered at
    pub fn level(self) -> LogLevel {
        match self {
            Channel::Status => LogLevel::State,
            Channel::Error => LogLevel::Error,
            Channel::Warning => LogLevel::Warning,
            Channel::Info => LogLevel::Info,
            Channel::Debug => LogLevel::Debug,
        }
    }

    /// Fixed-width tag written before each message
    pub fn tag(self) -> &'static str {
        match self {
            Channel::Status => "[STATUS]  ",
            Channel::Error => "[ERROR]   ",
            Channel::Warning => "[WARNING] ",
            Channel::Info => "[INFO]    ",
            Channel::Debug => "[DEBUG]   ",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Status => "status",
            Channel::Error => "error",
            Channel::Warning => "warning",
            Channel::Info => "info",
            Channel::Debug => "debug",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
