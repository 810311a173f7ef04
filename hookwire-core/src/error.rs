//! Error types for hookwire.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`DispatchError`] - The only error a dispatch call propagates
//! - [`HookError`] - Failures absorbed while invoking a single handler
//! - [`ResolveError`] - Failures turning an indirect descriptor into a handler

use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned to the caller of a dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The hook name is already running a handler on this dispatcher.
    #[error("hook `{hook}` is already being dispatched")]
    Reentrant {
        /// The literal hook name that was requested.
        hook: String,
    },
}

impl DispatchError {
    /// The hook name this error refers to.
    pub fn hook(&self) -> &str {
        match self {
            DispatchError::Reentrant { hook } => hook,
        }
    }
}

/// A failure raised while invoking one handler.
///
/// These never reach the dispatch caller; the dispatcher reports them and
/// treats the handler as having made no contribution.
#[derive(Error, Debug)]
pub enum HookError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The handler panicked.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// The handler did not finish in time.
    #[error("handler timed out after {0:?}")]
    Timeout(Duration),

    /// The handler descriptor could not be resolved.
    #[error("handler could not be resolved: {0}")]
    Resolve(#[from] ResolveError),

    /// A nested dispatch failed inside the handler.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl HookError {
    /// Classify an error returned by a handler.
    ///
    /// Errors that already are a [`HookError`] or a [`DispatchError`] keep
    /// their variant; anything else becomes [`HookError::Handler`].
    pub fn from_boxed(err: BoxError) -> Self {
        let err = match err.downcast::<HookError>() {
            Ok(hook) => return *hook,
            Err(err) => err,
        };
        match err.downcast::<DispatchError>() {
            Ok(dispatch) => HookError::Dispatch(*dispatch),
            Err(err) => HookError::Handler(err),
        }
    }
}

impl From<BoxError> for HookError {
    fn from(err: BoxError) -> Self {
        HookError::from_boxed(err)
    }
}

/// Errors that can occur while resolving an indirect handler.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The dispatcher has no resolver for indirect handlers.
    #[error("no resolver configured for `{0}`")]
    NoResolver(String),

    /// The resolver does not know the requested type.
    #[error("unknown handler type `{0}`")]
    UnknownType(String),

    /// The type exists but does not expose the requested method.
    #[error("handler type `{type_name}` has no method `{method}`")]
    UnknownMethod {
        /// The resolved type name.
        type_name: String,
        /// The requested method.
        method: String,
    },

    /// Constructing an instance of the type failed.
    #[error("failed to construct handler type `{type_name}`")]
    Construction {
        /// The type that failed to construct.
        type_name: String,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}
