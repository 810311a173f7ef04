//! # hookwire - Named hook dispatch
//!
//! `hookwire` lets independent modules register handlers under string hook
//! names (with `*` wildcards) and lets the host run them in priority order
//! with one of three semantics:
//!
//! - **filter**: each handler transforms the previous handler's output
//! - **action**: every handler gets the same payload; outputs are collected
//! - **until**: handlers run until one returns a truthy value
//!
//! Handler failures are logged and absorbed; one broken extension never
//! aborts the others. A hook that re-enters itself while running is rejected.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hookwire::prelude::*;
//!
//! let dispatcher = Dispatcher::<String>::new();
//!
//! dispatcher.add("title", |t: String, _ctx: HookContext| async move {
//!     Ok::<_, BoxError>(t.to_uppercase())
//! }, HookOptions::new().priority(10));
//!
//! let title = dispatcher.apply_filters("title", "hello".to_string()).await?;
//! assert_eq!(title, "HELLO");
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use hookwire_core::{
    // Errors
    BoxError,
    BoxFuture,
    DispatchError,
    // Handler
    DynHandler,
    Handler,
    // Descriptors
    HandlerKind,
    HandlerResolver,
    HandlerResult,
    HandlerTarget,
    // Context
    HookContext,
    HookContextBuilder,
    HookError,
    // Values
    HookValue,
    METHOD_SEPARATOR,
    NoResolver,
    ResolveError,
    SharedHandler,
    Truthy,
    shared,
};

// Engine
pub use hookwire_std::{
    AddOutcome, DEFAULT_PRIORITY, Dispatcher, DispatcherBuilder, ErrorReporter, HandlerFailure,
    HookEntry, HookOptions, HookPattern, HookService, Registry, RunningGuard, RunningSet,
    ServiceResolver,
};

#[cfg(feature = "timeout")]
pub use hookwire_std::Timeout;

#[cfg(feature = "inventory")]
pub use hookwire_std::{HandlerFactory, HookRegistration};

/// Standard handler wrappers.
pub mod handlers {
    #![allow(clippy::wildcard_imports)]
    pub use hookwire_std::handlers::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use hookwire_std::testing::*;
}

/// Prelude module - common imports for hookwire.
///
/// # Usage
///
/// ```rust,ignore
/// use hookwire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        DispatchError,
        // Engine
        Dispatcher,
        // Core traits
        Handler,
        HandlerResolver,
        HookContext,
        HookError,
        HookOptions,
        HookService,
        ServiceResolver,
        Truthy,
    };
}

#[cfg(feature = "macros")]
pub use hookwire_macros::hook;

#[cfg(feature = "inventory")]
pub use hookwire_std::inventory;
