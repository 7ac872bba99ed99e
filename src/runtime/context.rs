//! Owning execution context for a scheduler instance.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

/// Tokio runtime handle on which the scheduler, its bootstrap and every
/// dispatch run.
#[derive(Clone, Debug)]
pub struct ExecutionContext {
    handle: Arc<tokio::runtime::Handle>,
}

impl ExecutionContext {
    /// Wrap an existing runtime handle.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Context of the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }

    /// Spawn a future on this context.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(fut)
    }
}
