//! Middleware applied uniformly to every stage invocation.
//!
//! A [`Middleware`] turns one [`Action`] into another. A [`Chain`] is an
//! ordered list of them, outermost first, applied to each stage when a
//! pipeline is built. The default chain is logging around error handling, so
//! the "finished" record sees the translated outcome and the true duration.

mod error;
mod logging;

pub use error::ErrorHandler;
pub use logging::{DEFAULT_INITIAL_PADDING, Logging};

pub(crate) use error::panic_message;

use crate::pipeline::{Action, Stage};
use std::sync::Arc;

/// Wraps a stage action with cross-cutting behavior
pub trait Middleware: Send + Sync {
    /// Wrap `next`, the action of the stage called `name`
    fn wrap(&self, name: &str, next: Action) -> Action;
}

/// Ordered middleware list, outermost first
#[derive(Clone)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    /// Chain with no middleware; stages run bare
    pub fn empty() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer inside the ones already present
    pub fn with(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether the chain has no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wrap a stage's action with every layer
    pub fn wrap(&self, stage: &Stage) -> Action {
        self.layers
            .iter()
            .rev()
            .fold(stage.action(), |next, layer| layer.wrap(stage.name(), next))
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::empty()
            .with(Logging::default())
            .with(ErrorHandler)
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("layers", &self.layers.len()).finish()
    }
}
