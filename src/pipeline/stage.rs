//! Stage descriptors: a name plus an async action over the run context.

use crate::context::Context;
use crate::error::Result;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Type-erased stage action. Middleware wraps one `Action` into another.
pub type Action = Arc<dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Erase a closure into an [`Action`].
///
/// Going through this function pins the closure's signature to the
/// higher-ranked form `Action` needs.
pub fn action<F>(f: F) -> Action
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A named unit of work in the release pipeline
#[derive(Clone)]
pub struct Stage {
    name: String,
    action: Action,
}

impl Stage {
    /// Create a stage from a name and an async action.
    ///
    /// ```ignore
    /// let stage = Stage::new("build", |ctx| Box::pin(async move {
    ///     build(ctx.config()).await
    /// }));
    /// ```
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, Result<()>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            action: action(f),
        }
    }

    /// Create a stage from an already erased action
    pub fn from_action(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
        }
    }

    /// Stage name, used in logs and errors
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw, unwrapped action
    pub fn action(&self) -> Action {
        Arc::clone(&self.action)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}
