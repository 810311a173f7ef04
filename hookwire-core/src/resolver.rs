//! Handler resolution capability.

use crate::descriptor::HandlerTarget;
use crate::error::ResolveError;
use crate::handler::SharedHandler;
use crate::value::HookValue;

/// Turns an indirect [`HandlerTarget`] into an invocable handler.
///
/// The host owns construction: how instances are built, cached or injected
/// with dependencies is up to the implementation.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot resolve handlers for values of type `{V}`",
    label = "missing `HandlerResolver<{V}>` implementation"
)]
pub trait HandlerResolver<V: HookValue>: Send + Sync + 'static {
    /// Produce a handler for `target`.
    fn resolve(&self, target: &HandlerTarget) -> Result<SharedHandler<V>, ResolveError>;
}

/// A resolver that rejects every indirect handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl<V: HookValue> HandlerResolver<V> for NoResolver {
    fn resolve(&self, target: &HandlerTarget) -> Result<SharedHandler<V>, ResolveError> {
        Err(ResolveError::NoResolver(target.to_string()))
    }
}

impl<V, F> HandlerResolver<V> for F
where
    V: HookValue,
    F: Fn(&HandlerTarget) -> Result<SharedHandler<V>, ResolveError> + Send + Sync + 'static,
{
    fn resolve(&self, target: &HandlerTarget) -> Result<SharedHandler<V>, ResolveError> {
        (self)(target)
    }
}
