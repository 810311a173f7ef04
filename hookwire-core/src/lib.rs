//! # hookwire-core
//!
//! Core traits and types for the hookwire dispatch engine.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! modules that register handlers without needing the engine itself.
//!
//! # Building Blocks
//!
//! - [`Handler`] / [`DynHandler`]: the callback shape, `(V, HookContext) -> Result<V, E>`
//! - [`HookContext`]: per-dispatch stop flag, metadata and identity fields
//! - [`HandlerKind`]: a direct handler or a [`HandlerTarget`] resolved later
//! - [`HandlerResolver`]: host capability that instantiates indirect handlers
//! - [`Truthy`]: result test used by short-circuit dispatch
//!
//! # Error Types
//!
//! - [`DispatchError`] - Returned by a dispatch (re-entrancy)
//! - [`HookError`] - Absorbed handler failures
//! - [`ResolveError`] - Resolution failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod context;
mod descriptor;
mod error;
mod handler;
mod resolver;
mod value;

// Re-exports
pub use context::{HookContext, HookContextBuilder};
pub use descriptor::{HandlerKind, HandlerTarget, METHOD_SEPARATOR};
pub use error::{BoxError, DispatchError, HookError, ResolveError};
pub use handler::{BoxFuture, DynHandler, Handler, HandlerResult, SharedHandler, shared};
pub use resolver::{HandlerResolver, NoResolver};
pub use value::{HookValue, Truthy};
