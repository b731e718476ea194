//! Run-wide cancellation signal shared by the context, the supervisor and stage workers.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ReleaseError;

/// Why a run was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Operator interrupt (Ctrl-C, SIGTERM)
    Interrupted,
    /// The run timeout elapsed
    DeadlineExceeded {
        /// Configured run timeout
        timeout: Duration,
    },
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Interrupted => write!(f, "interrupted by operator"),
            CancelReason::DeadlineExceeded { timeout } => {
                write!(f, "timeout of {:?} exceeded", timeout)
            }
        }
    }
}

/// Cloneable cancellation handle. The first recorded reason wins.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl Cancellation {
    /// Create a fresh, uncancelled handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel with a reason. Returns `false` if the run was already cancelled.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        let first = self.reason.set(reason).is_ok();
        self.token.cancel();
        if first {
            log::debug!("run cancelled: {}", reason);
        }
        first
    }

    /// Whether cancellation has fired
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Reason recorded by the first `cancel` call, if any
    pub fn reason(&self) -> Option<CancelReason> {
        self.reason.get().copied()
    }

    /// Wait until cancellation fires
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Token for stage workers that want to `select!` on cancellation themselves
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Error describing this cancellation, for code that has to stop because of it.
    ///
    /// A run torn down without a recorded reason reports as interrupted.
    pub fn error(&self) -> ReleaseError {
        ReleaseError::Cancelled(self.reason().unwrap_or(CancelReason::Interrupted))
    }

    /// Cancel without recording a reason, used when the run is torn down.
    pub(crate) fn release(&self) {
        self.token.cancel();
    }
}
