//! One-shot stop signal between a coordinator's `stop` and its `serve`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Why a [`StopSignal`] fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// [`StopSignal::stop`] was called
    Requested,
    /// [`StopSignal::close`] was called without a stop request
    Closed,
}

#[derive(Debug, Default)]
struct Inner {
    token: CancellationToken,
    requested: AtomicBool,
}

/// Cloneable one-shot signal; firing it more than once is a no-op
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Returns `false` if the signal had already fired.
    pub fn stop(&self) -> bool {
        if self.inner.token.is_cancelled() || self.inner.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.inner.token.cancel();
        true
    }

    /// Fire without requesting a stop, waiters see [`StopReason::Closed`]
    pub fn close(&self) {
        self.inner.token.cancel();
    }

    pub fn is_fired(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Wait until the signal fires
    pub async fn wait(&self) -> StopReason {
        self.inner.token.cancelled().await;
        if self.inner.requested.load(Ordering::SeqCst) {
            StopReason::Requested
        } else {
            StopReason::Closed
        }
    }
}
