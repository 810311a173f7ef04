//! # hookwire-std
//!
//! The hookwire dispatch engine.
//!
//! This crate provides:
//! - **Pattern matching**: [`HookPattern`] for `ns.*` style wildcard names
//! - **Storage**: [`Registry`] with priority buckets and id-based deduplication
//! - **Dispatch**: [`Dispatcher`] with `filter`, `action` and `until` semantics
//! - **Re-entrancy protection**: [`RunningSet`] and its scoped [`RunningGuard`]
//! - **Resolution**: [`ServiceResolver`] for `"Type#method"` registrations
//! - **Handlers**: [`Timeout`] (feature `timeout`)
//! - **Startup registration**: [`HookRegistration`] (feature `inventory`)

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use hookwire_core;

// Modules
pub mod dispatcher;
pub mod handlers;
pub mod pattern;
pub mod registry;
pub mod running;
pub mod service;
pub mod testing;

#[cfg(feature = "inventory")]
pub mod collected;

pub use dispatcher::{Dispatcher, DispatcherBuilder, ErrorReporter, HandlerFailure};
pub use pattern::HookPattern;
pub use registry::{AddOutcome, DEFAULT_PRIORITY, HookEntry, HookOptions, Registry};
pub use running::{RunningGuard, RunningSet};
pub use service::{HookService, ServiceResolver};

#[cfg(feature = "timeout")]
pub use handlers::Timeout;

#[cfg(feature = "inventory")]
pub use collected::{HandlerFactory, HookRegistration};

#[cfg(feature = "inventory")]
pub use inventory;
