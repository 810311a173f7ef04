//! Startup registration collected via `inventory`.
//!
//! Handlers anywhere in the program submit a static [`HookRegistration`];
//! [`Dispatcher::register_collected`] then adds all of them in one explicit
//! pass at startup. The `#[hook]` attribute generates these records.
//!
//! ```rust,ignore
//! inventory::submit! {
//!     HookRegistration::new("post.saved", 10, false, "blog::reindex", reindex_factory)
//! }
//!
//! let dispatcher = Dispatcher::<Post>::new();
//! dispatcher.register_collected();
//! ```

use crate::dispatcher::Dispatcher;
use crate::registry::HookOptions;
use hookwire_core::{HandlerKind, HookValue, SharedHandler};
use std::any::Any;

/// Builds the type-erased handler of a [`HookRegistration`].
///
/// The box must hold a [`SharedHandler<V>`] for the dispatcher's `V`.
pub type HandlerFactory = fn() -> Box<dyn Any + Send + Sync>;

/// A handler registration submitted at compile time.
#[derive(Debug)]
pub struct HookRegistration {
    /// Hook name, possibly with wildcards.
    pub hook: &'static str,
    /// Priority bucket; lower runs earlier.
    pub priority: i32,
    /// Remove after the first invocation.
    pub once: bool,
    /// Stable id, usually the handler's path in the source.
    pub id: &'static str,
    /// Builds the handler.
    pub factory: HandlerFactory,
}

impl HookRegistration {
    /// Create a registration record.
    pub const fn new(
        hook: &'static str,
        priority: i32,
        once: bool,
        id: &'static str,
        factory: HandlerFactory,
    ) -> Self {
        Self {
            hook,
            priority,
            once,
            id,
            factory,
        }
    }
}

inventory::collect!(HookRegistration);

impl<V: HookValue> Dispatcher<V> {
    /// Add every submitted [`HookRegistration`] whose handler takes `V`.
    ///
    /// Registrations for other value types are skipped. Because ids are
    /// stable, calling this again only re-adds entries that were removed.
    /// Returns the number of entries inserted.
    pub fn register_collected(&self) -> usize {
        let mut inserted = 0;
        for registration in inventory::iter::<HookRegistration> {
            let Ok(handler) = (registration.factory)().downcast::<SharedHandler<V>>() else {
                continue;
            };
            let options = HookOptions::new()
                .priority(registration.priority)
                .set_once(registration.once)
                .id(registration.id);
            if self
                .add_kind(registration.hook, HandlerKind::Direct(*handler), options)
                .inserted
            {
                inserted += 1;
            }
        }
        tracing::debug!(inserted, "registered collected hook handlers");
        inserted
    }
}
