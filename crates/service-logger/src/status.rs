//! Lifecycle status vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a service, in the order a service moves through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Status {
    Undefined = 0,
    Initialized = 1,
    Starting = 2,
    Started = 3,
    Running = 4,
    Stopping = 5,
    Stopped = 6,
    Error = 7,
}

impl Status {
    /// All statuses in their stable order
    pub const ALL: [Status; 8] = [
        Status::Undefined,
        Status::Initialized,
        Status::Starting,
        Status::Started,
        Status::Running,
        Status::Stopping,
        Status::Stopped,
        Status::Error,
    ];

    /// Numeric code of this status
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Status for a numeric code, if it is in range
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Stable name, e.g. `StateRunning`
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Undefined => "StateUndefined",
            Status::Initialized => "StateInitialized",
            Status::Starting => "StateStarting",
            Status::Started => "StateStarted",
            Status::Running => "StateRunning",
            Status::Stopping => "StateStopping",
            Status::Stopped => "StateStopped",
            Status::Error => "StateError",
        }
    }

    /// Render a raw code, falling back to `Status(n)` for unknown values
    pub fn describe(code: i32) -> String {
        match Self::from_code(code) {
            Some(status) => status.to_string(),
            None => format!("Status({code})"),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
