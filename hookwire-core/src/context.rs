//! # Execution Context
//!
//! A [`HookContext`] is created once per dispatch and handed to every handler
//! that dispatch invokes. Handlers use it to stop propagation and to pass
//! auxiliary data forward to later handlers.
//!
//! The context is a cheap handle: cloning it shares the same stop flag and
//! metadata, so handlers receive it by value.
//!
//! ```rust,ignore
//! let ctx = HookContext::builder().user("alice").module("blog").build();
//! let widgets = dispatcher.action("dashboard.widgets", payload, &ctx).await?;
//! if ctx.is_stopped() { ... }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type MetaValue = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Inner {
    stopped: AtomicBool,
    metadata: Mutex<HashMap<String, MetaValue>>,
    user: Option<String>,
    module: Option<String>,
    cache_key: Option<String>,
}

/// Per-dispatch state shared by all handlers of one dispatch.
#[derive(Clone, Default)]
pub struct HookContext {
    inner: Arc<Inner>,
}

impl HookContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a context with identity fields.
    pub fn builder() -> HookContextBuilder {
        HookContextBuilder::default()
    }

    /// Ask the dispatcher not to run any further handlers.
    ///
    /// The handler that calls this still completes normally.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
    }

    /// Whether a handler has called [`stop`](Self::stop).
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Store a metadata value under `key`, replacing any previous value.
    pub fn set_meta<T>(&self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.metadata().insert(key.into(), Arc::new(value));
    }

    /// Fetch a clone of the metadata value under `key`.
    ///
    /// Returns `None` when the key is missing or holds a different type.
    pub fn meta<T>(&self, key: &str) -> Option<T>
    where
        T: Any + Clone,
    {
        self.metadata()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Whether any metadata value is stored under `key`.
    pub fn has_meta(&self, key: &str) -> bool {
        self.metadata().contains_key(key)
    }

    /// Remove the metadata value under `key`. Returns whether one existed.
    pub fn remove_meta(&self, key: &str) -> bool {
        self.metadata().remove(key).is_some()
    }

    /// All metadata keys, sorted.
    pub fn meta_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.metadata().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// The acting user, if the caller supplied one.
    pub fn user(&self) -> Option<&str> {
        self.inner.user.as_deref()
    }

    /// The owning module, if the caller supplied one.
    pub fn module(&self) -> Option<&str> {
        self.inner.module.as_deref()
    }

    /// The cache key, if the caller supplied one.
    pub fn cache_key(&self) -> Option<&str> {
        self.inner.cache_key.as_deref()
    }

    fn metadata(&self) -> std::sync::MutexGuard<'_, HashMap<String, MetaValue>> {
        self.inner
            .metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("stopped", &self.is_stopped())
            .field("metadata", &self.meta_keys())
            .field("user", &self.inner.user)
            .field("module", &self.inner.module)
            .field("cache_key", &self.inner.cache_key)
            .finish()
    }
}

/// Builder for a [`HookContext`] carrying identity fields.
#[derive(Debug, Default)]
pub struct HookContextBuilder {
    user: Option<String>,
    module: Option<String>,
    cache_key: Option<String>,
}

impl HookContextBuilder {
    /// Set the acting user.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the owning module.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Set the cache key.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Build the context.
    pub fn build(self) -> HookContext {
        HookContext {
            inner: Arc::new(Inner {
                user: self.user,
                module: self.module,
                cache_key: self.cache_key,
                ..Inner::default()
            }),
        }
    }
}
