//! Timeout wrapper for time-limited handlers.

use hookwire_core::{Handler, HandlerResult, HookContext, HookError, HookValue};
use std::time::Duration;
use tokio::time::timeout;

/// A handler that fails with [`HookError::Timeout`] when the wrapped handler
/// does not finish within `duration`.
///
/// The dispatcher itself never times out a handler; wrap slow or untrusted
/// handlers with this before registering them.
#[derive(Debug, Clone)]
pub struct Timeout<H> {
    inner: H,
    duration: Duration,
}

impl<H> Timeout<H> {
    /// Wrap `inner` with a time limit.
    pub fn new(inner: H, duration: Duration) -> Self {
        Self { inner, duration }
    }

    /// The configured time limit.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl<V: HookValue, H: Handler<V>> Handler<V> for Timeout<H> {
    async fn call(&self, value: V, ctx: HookContext) -> HandlerResult<V> {
        match timeout(self.duration, self.inner.call(value, ctx)).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(HookError::Timeout(self.duration))),
        }
    }
}
