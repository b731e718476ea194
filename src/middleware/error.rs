//! Normalizes every way a stage can end badly into a [`StageError`].

use super::Middleware;
use crate::error::{ReleaseError, StageError};
use crate::pipeline::{Action, action};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Tags stage errors with the stage name, turns panics into errors and
/// swallows skips.
///
/// Cancellation passes through untouched so the driver can tell a stopped
/// run from a broken one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorHandler;

impl Middleware for ErrorHandler {
    fn wrap(&self, name: &str, next: Action) -> Action {
        let name: Arc<str> = Arc::from(name);

        action(move |ctx| {
            let name = Arc::clone(&name);
            let next = Arc::clone(&next);
            Box::pin(async move {
                let outcome = AssertUnwindSafe(next(&mut *ctx)).catch_unwind().await;

                match outcome {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(ReleaseError::Skipped { reason })) => {
                        log::warn!("{name} skipped: {reason}");
                        Ok(())
                    }
                    Ok(Err(err @ ReleaseError::Cancelled(_))) => Err(err),
                    Ok(Err(err)) => Err(StageError::Failed {
                        stage: name.to_string(),
                        source: Box::new(err),
                    }
                    .into()),
                    Err(payload) => Err(StageError::Panicked {
                        stage: name.to_string(),
                        message: panic_message(payload.as_ref()),
                    }
                    .into()),
                }
            })
        })
    }
}

/// Render a panic payload as text
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
