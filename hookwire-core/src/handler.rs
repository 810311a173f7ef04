//! # Handlers
//!
//! A handler receives the current value and the dispatch's [`HookContext`]
//! and returns the next value, or an error that the dispatcher absorbs.
//!
//! # Usage Patterns
//!
//! 1. **Direct closure**: `|value, ctx| async move { Ok::<_, BoxError>(value) }`
//! 2. **Async fn**: `async fn trim(value: String, ctx: HookContext) -> Result<String, BoxError>`
//! 3. **Struct implementation**: `impl Handler<MyValue> for MyHandler`
//!
//! # Static vs Dynamic Dispatch
//!
//! [`Handler`] uses native `async fn` for zero-cost static dispatch. The
//! registry stores handlers as [`SharedHandler`], built on the object-safe
//! [`DynHandler`].

use crate::context::HookContext;
use crate::error::BoxError;
use crate::value::HookValue;
use std::{future::Future, pin::Pin, sync::Arc};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The result every handler produces.
pub type HandlerResult<V> = Result<V, BoxError>;

/// A registered callback.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle hook values of type `{V}`",
    label = "missing `Handler<{V}>` implementation",
    note = "Handlers take `({V}, HookContext)` and return `Result<{V}, E>`."
)]
pub trait Handler<V: HookValue>: Send + Sync + 'static {
    /// Invoke the handler.
    fn call(&self, value: V, ctx: HookContext)
    -> impl Future<Output = HandlerResult<V>> + Send;
}

// Blanket impl for closures and async fns
impl<V, F, Fut, E> Handler<V> for F
where
    V: HookValue,
    F: Fn(V, HookContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send,
    E: Into<BoxError>,
{
    async fn call(&self, value: V, ctx: HookContext) -> HandlerResult<V> {
        (self)(value, ctx).await.map_err(Into::into)
    }
}

/// Object-safe version of [`Handler`].
pub trait DynHandler<V: HookValue>: Send + Sync + 'static {
    /// Invoke the handler (dynamic dispatch version).
    fn call_dyn(&self, value: V, ctx: HookContext) -> BoxFuture<'_, HandlerResult<V>>;

    /// Type name of the underlying handler, used in registration ids.
    fn type_name(&self) -> &'static str;
}

impl<V: HookValue, T: Handler<V>> DynHandler<V> for T {
    fn call_dyn(&self, value: V, ctx: HookContext) -> BoxFuture<'_, HandlerResult<V>> {
        Box::pin(self.call(value, ctx))
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A shared, type-erased handler as stored in the registry.
pub type SharedHandler<V> = Arc<dyn DynHandler<V>>;

/// Erase a handler into a [`SharedHandler`].
pub fn shared<V: HookValue, H: Handler<V>>(handler: H) -> SharedHandler<V> {
    Arc::new(handler)
}
