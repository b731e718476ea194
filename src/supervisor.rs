//! Bridges operator interrupts and the run deadline into cancellation.
//!
//! The deadline timer itself belongs to the [`Context`](crate::context::Context);
//! the supervisor listens for interrupts, cancels the run when one arrives,
//! and gives the in-flight stage a bounded grace period to return once the run
//! is cancelled for any reason. A stage that outlives the grace period is
//! abandoned and the run is reported as cancelled.

use crate::context::{CancelReason, Cancellation};
use crate::error::Result;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::time::Duration;

/// Time a stage gets to unwind after cancellation fires
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Supervises one release run
pub struct Supervisor {
    grace_period: Duration,
    interrupt: Option<BoxFuture<'static, ()>>,
}

impl Supervisor {
    /// Supervisor listening for Ctrl-C (and SIGTERM on unix)
    pub fn new() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            interrupt: Some(shutdown_signal().boxed()),
        }
    }

    /// Supervisor that only reacts to the context's own cancellation
    pub fn without_signals() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            interrupt: None,
        }
    }

    /// Replace the interrupt source
    pub fn with_interrupt<F>(mut self, interrupt: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.interrupt = Some(interrupt.boxed());
        self
    }

    /// Change the grace period
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Grace period in effect
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Drive `work` until it finishes or cancellation outlasts the grace period.
    ///
    /// Only the first interrupt has any effect.
    pub async fn run<W>(self, cancellation: &Cancellation, work: W) -> Result<()>
    where
        W: Future<Output = Result<()>>,
    {
        let Supervisor {
            grace_period,
            interrupt,
        } = self;

        let watcher = async {
            let interrupt = async move {
                match interrupt {
                    Some(interrupt) => interrupt.await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                _ = interrupt => {
                    if cancellation.cancel(CancelReason::Interrupted) {
                        log::warn!("received interrupt, cancelling release");
                    }
                }
                _ = cancellation.cancelled() => {}
            }
            if let Some(reason) = cancellation.reason() {
                log::warn!(
                    "{reason}: waiting up to {:.2?} for the current stage to stop",
                    grace_period
                );
            }
            tokio::time::sleep(grace_period).await;
        };

        tokio::select! {
            biased;
            result = work => result,
            _ = watcher => {
                log::error!("stage did not stop within {:.2?}, abandoning it", grace_period);
                Err(cancellation.error())
            }
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("grace_period", &self.grace_period)
            .field("interrupt", &self.interrupt.is_some())
            .finish()
    }
}

/// Resolves on the first Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                log::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use std::time::Instant;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_work_result_passes_through() {
        let cancellation = Cancellation::new();
        let result = Supervisor::without_signals()
            .run(&cancellation, async { Ok(()) })
            .await;
        assert!(result.is_ok());
        assert!(!cancellation.is_cancelled());
    }

    #[tokio::test]
    async fn test_interrupt_cancels_and_abandons_stuck_work() {
        let cancellation = Cancellation::new();
        let (tx, rx) = oneshot::channel::<()>();
        let supervisor = Supervisor::without_signals()
            .with_grace_period(Duration::from_millis(20))
            .with_interrupt(async move {
                let _ = rx.await;
            });

        tx.send(()).expect("receiver alive");
        let started = Instant::now();
        let err = supervisor
            .run(&cancellation, async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ReleaseError::Cancelled(CancelReason::Interrupted)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_cooperative_work_returns_within_grace() {
        let cancellation = Cancellation::new();
        let worker = cancellation.clone();
        let supervisor = Supervisor::without_signals().with_grace_period(Duration::from_secs(30));

        cancellation.cancel(CancelReason::Interrupted);
        let err = supervisor
            .run(&cancellation, async move {
                worker.cancelled().await;
                Err(ReleaseError::from(anyhow::anyhow!("stopped early")))
            })
            .await
            .unwrap_err();

        // the work's own result wins while inside the grace period
        assert_eq!(err.to_string(), "stopped early");
    }

    #[tokio::test]
    async fn test_interrupt_after_deadline_keeps_first_reason() {
        let cancellation = Cancellation::new();
        let timeout = Duration::from_millis(1);
        cancellation.cancel(CancelReason::DeadlineExceeded { timeout });

        let supervisor = Supervisor::without_signals()
            .with_grace_period(Duration::from_millis(10))
            .with_interrupt(async {});
        let err = supervisor
            .run(&cancellation, std::future::pending())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ReleaseError::Cancelled(CancelReason::DeadlineExceeded { .. })
        ));
    }
}
