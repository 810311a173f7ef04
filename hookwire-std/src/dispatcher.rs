//! # Dispatcher
//!
//! The dispatcher owns the [`Registry`] and the [`RunningSet`] and runs the
//! three execution semantics over them:
//!
//! | Method | Handlers receive | Returns |
//! |--------|------------------|---------|
//! | [`filter`](Dispatcher::filter) | the previous handler's output | the final value |
//! | [`action`](Dispatcher::action) | the same payload | every output, in order |
//! | [`until`](Dispatcher::until) | the same payload | the first truthy output |
//!
//! Every dispatch works on a snapshot of the matching entries taken when it
//! starts. Handler failures never reach the caller: they are logged, passed
//! to the configured [`ErrorReporter`], and count as no contribution. The only
//! error a dispatch returns is [`DispatchError::Reentrant`].
//!
//! ```rust,ignore
//! let dispatcher = Arc::new(Dispatcher::<String>::new());
//! dispatcher.add("title", |t: String, _ctx: HookContext| async move {
//!     Ok::<_, BoxError>(t.trim().to_string())
//! }, HookOptions::new());
//!
//! let title = dispatcher.filter("title", "  Hello ".into(), &HookContext::new()).await?;
//! ```

use crate::registry::{AddOutcome, DEFAULT_PRIORITY, HookEntry, HookOptions, Registry};
use crate::running::RunningSet;
use futures::FutureExt;
use hookwire_core::{
    DispatchError, Handler, HandlerKind, HandlerResolver, HandlerTarget, HookContext, HookError,
    HookValue, NoResolver, SharedHandler, Truthy, shared,
};
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::Instrument;

/// Callback receiving every absorbed handler failure.
pub type ErrorReporter = Arc<dyn Fn(&HandlerFailure) + Send + Sync>;

/// A handler failure absorbed during a dispatch.
#[derive(Debug)]
pub struct HandlerFailure {
    /// The hook name that was dispatched.
    pub hook: String,
    /// The name the failing entry was registered under.
    pub registered: String,
    /// The failing entry's id.
    pub id: String,
    /// The failing entry's priority.
    pub priority: i32,
    /// What went wrong.
    pub error: HookError,
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Filter,
    Action,
    Until,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::Filter => "filter",
            Mode::Action => "action",
            Mode::Until => "until",
        }
    }
}

/// The hook dispatch engine.
///
/// Construct one per process and share it by `Arc`.
pub struct Dispatcher<V: HookValue> {
    registry: RwLock<Registry<V>>,
    running: RunningSet,
    resolver: Arc<dyn HandlerResolver<V>>,
    reporter: Option<ErrorReporter>,
}

impl<V: HookValue> Default for Dispatcher<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: HookValue> fmt::Debug for Dispatcher<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("hooks", &self.names())
            .field("running", &self.running)
            .field("reporter", &self.reporter.is_some())
            .finish_non_exhaustive()
    }
}

impl<V: HookValue> Dispatcher<V> {
    /// Create a dispatcher with default settings and no resolver.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a dispatcher.
    pub fn builder() -> DispatcherBuilder<V> {
        DispatcherBuilder::default()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a direct handler under `name`.
    pub fn add<H: Handler<V>>(&self, name: &str, handler: H, options: HookOptions) -> AddOutcome {
        self.add_kind(name, HandlerKind::Direct(shared(handler)), options)
    }

    /// Register a shared handler or an indirect target under `name`.
    ///
    /// Registering clones of one [`SharedHandler`] at the same priority
    /// derives the same id, so only the first is kept.
    pub fn add_kind(
        &self,
        name: &str,
        handler: impl Into<HandlerKind<V>>,
        options: HookOptions,
    ) -> AddOutcome {
        self.write().add(name, handler.into(), options)
    }

    /// Register a `"Type"` or `"Type#method"` descriptor under `name`.
    pub fn add_target(&self, name: &str, descriptor: &str, options: HookOptions) -> AddOutcome {
        self.add_kind(name, HandlerTarget::parse(descriptor), options)
    }

    /// Remove a whole hook name, or only the entry with `id`.
    pub fn remove(&self, name: &str, id: Option<&str>) -> usize {
        self.write().remove(name, id)
    }

    /// Whether a dispatch for `name` would find a handler.
    pub fn has(&self, name: &str) -> bool {
        self.read().has(name)
    }

    /// Entries a dispatch for `name` would run right now, in order.
    pub fn handlers(&self, name: &str) -> Vec<HookEntry<V>> {
        self.read().snapshot(name)
    }

    /// Number of entries registered under exactly `name`.
    pub fn count(&self, name: &str) -> usize {
        self.read().count(name)
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered hook names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.read().names()
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Whether a handler for `name` is executing right now.
    pub fn is_running(&self, name: &str) -> bool {
        self.running.contains(name)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Thread `initial` through every handler of `name`.
    ///
    /// A failing handler leaves the value as it was before that handler.
    pub async fn filter(
        &self,
        name: &str,
        initial: V,
        ctx: &HookContext,
    ) -> Result<V, DispatchError> {
        async {
            let mut value = initial;
            for entry in self.entries(name) {
                if let Some(next) = self.invoke(name, &entry, value.clone(), ctx).await? {
                    value = next;
                }
                if ctx.is_stopped() {
                    break;
                }
            }
            Ok(value)
        }
        .instrument(dispatch_span(name, Mode::Filter))
        .await
    }

    /// Hand `payload` to every handler of `name` and collect their outputs.
    ///
    /// Failing handlers contribute no entry.
    pub async fn action(
        &self,
        name: &str,
        payload: V,
        ctx: &HookContext,
    ) -> Result<Vec<V>, DispatchError> {
        async {
            let mut outputs = Vec::new();
            for entry in self.entries(name) {
                if let Some(output) = self.invoke(name, &entry, payload.clone(), ctx).await? {
                    outputs.push(output);
                }
                if ctx.is_stopped() {
                    break;
                }
            }
            Ok(outputs)
        }
        .instrument(dispatch_span(name, Mode::Action))
        .await
    }

    /// Hand `payload` to the handlers of `name` until one returns a truthy
    /// value.
    ///
    /// If a handler stops the context, its output is returned as is, even
    /// when falsy; `None` then means that handler failed. `None` is also
    /// returned when every handler ran without a truthy result.
    pub async fn until(
        &self,
        name: &str,
        payload: V,
        ctx: &HookContext,
    ) -> Result<Option<V>, DispatchError>
    where
        V: Truthy,
    {
        async {
            for entry in self.entries(name) {
                let output = self.invoke(name, &entry, payload.clone(), ctx).await?;
                if output.as_ref().is_some_and(Truthy::is_truthy) || ctx.is_stopped() {
                    return Ok(output);
                }
            }
            Ok(None)
        }
        .instrument(dispatch_span(name, Mode::Until))
        .await
    }

    /// [`filter`](Self::filter) with a fresh context.
    pub async fn apply_filters(&self, name: &str, initial: V) -> Result<V, DispatchError> {
        self.filter(name, initial, &HookContext::new()).await
    }

    /// [`action`](Self::action) with a fresh context.
    pub async fn do_action(&self, name: &str, payload: V) -> Result<Vec<V>, DispatchError> {
        self.action(name, payload, &HookContext::new()).await
    }

    /// [`until`](Self::until) with a fresh context.
    pub async fn first_of(&self, name: &str, payload: V) -> Result<Option<V>, DispatchError>
    where
        V: Truthy,
    {
        self.until(name, payload, &HookContext::new()).await
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn entries(&self, name: &str) -> Vec<HookEntry<V>> {
        let entries = self.read().snapshot(name);
        tracing::trace!(handlers = entries.len(), "dispatching");
        entries
    }

    /// Run one entry. `Ok(None)` means the entry made no contribution.
    async fn invoke(
        &self,
        name: &str,
        entry: &HookEntry<V>,
        input: V,
        ctx: &HookContext,
    ) -> Result<Option<V>, DispatchError> {
        let guard = self.running.enter(name)?;
        if entry.is_once() {
            if !entry.claim() {
                tracing::trace!(id = %entry.id(), "once handler already taken");
                return Ok(None);
            }
            // Removed before the call so a cancelled dispatch cannot strand it.
            self.write().remove(entry.name(), Some(entry.id()));
        }

        let result = match self.resolve(entry) {
            Ok(handler) => call_handler(&handler, input, ctx.clone()).await,
            Err(err) => Err(err),
        };
        drop(guard);

        match result {
            Ok(output) => Ok(Some(output)),
            Err(error) => {
                self.report(name, entry, error);
                Ok(None)
            }
        }
    }

    fn resolve(&self, entry: &HookEntry<V>) -> Result<SharedHandler<V>, HookError> {
        match entry.handler() {
            HandlerKind::Direct(handler) => Ok(Arc::clone(handler)),
            HandlerKind::Indirect(target) => Ok(self.resolver.resolve(target)?),
        }
    }

    fn report(&self, name: &str, entry: &HookEntry<V>, error: HookError) {
        tracing::warn!(
            hook = %name,
            registered = %entry.name(),
            id = %entry.id(),
            priority = entry.priority(),
            error = %error,
            "hook handler failed"
        );
        if let Some(reporter) = &self.reporter {
            reporter(&HandlerFailure {
                hook: name.to_string(),
                registered: entry.name().to_string(),
                id: entry.id().to_string(),
                priority: entry.priority(),
                error,
            });
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry<V>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry<V>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn dispatch_span(name: &str, mode: Mode) -> tracing::Span {
    tracing::debug_span!("hook_dispatch", hook = %name, mode = mode.as_str())
}

async fn call_handler<V: HookValue>(
    handler: &SharedHandler<V>,
    input: V,
    ctx: HookContext,
) -> Result<V, HookError> {
    match AssertUnwindSafe(handler.call_dyn(input, ctx)).catch_unwind().await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(HookError::from_boxed(err)),
        Err(payload) => Err(HookError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Builder for a [`Dispatcher`].
pub struct DispatcherBuilder<V: HookValue> {
    resolver: Option<Arc<dyn HandlerResolver<V>>>,
    reporter: Option<ErrorReporter>,
    default_priority: i32,
}

impl<V: HookValue> Default for DispatcherBuilder<V> {
    fn default() -> Self {
        Self {
            resolver: None,
            reporter: None,
            default_priority: DEFAULT_PRIORITY,
        }
    }
}

impl<V: HookValue> DispatcherBuilder<V> {
    /// Resolve indirect handlers through `resolver`.
    pub fn resolver<R: HandlerResolver<V>>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Call `reporter` for every absorbed handler failure.
    pub fn on_error<F>(mut self, reporter: F) -> Self
    where
        F: Fn(&HandlerFailure) + Send + Sync + 'static,
    {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    /// Priority for registrations that do not specify one.
    pub fn default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher<V> {
        let resolver: Arc<dyn HandlerResolver<V>> = match self.resolver {
            Some(resolver) => resolver,
            None => Arc::new(NoResolver),
        };
        Dispatcher {
            registry: RwLock::new(Registry::with_default_priority(self.default_priority)),
            running: RunningSet::new(),
            resolver,
            reporter: self.reporter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookwire_core::{BoxError, ResolveError};
    use std::sync::Mutex;

    fn add_one(dispatcher: &Dispatcher<i32>, name: &str, options: HookOptions) {
        dispatcher.add(
            name,
            |v: i32, _ctx: HookContext| async move { Ok::<_, BoxError>(v + 1) },
            options,
        );
    }

    #[tokio::test]
    async fn test_filter_without_handlers_returns_initial() {
        let dispatcher = Dispatcher::<i32>::new();
        assert_eq!(dispatcher.apply_filters("nothing", 7).await.unwrap(), 7);
        assert!(dispatcher.do_action("nothing", 7).await.unwrap().is_empty());
        assert_eq!(dispatcher.first_of("nothing", 7).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_default_priority_from_builder() {
        let dispatcher = Dispatcher::<i32>::builder().default_priority(10).build();
        add_one(&dispatcher, "n", HookOptions::new());
        assert_eq!(dispatcher.handlers("n")[0].priority(), 10);
    }

    #[tokio::test]
    async fn test_once_entry_is_removed_after_failure() {
        let dispatcher = Dispatcher::<i32>::new();
        dispatcher.add(
            "n",
            |_v: i32, _ctx: HookContext| async move { Err::<i32, _>(BoxError::from("bad")) },
            HookOptions::new().once(),
        );

        assert_eq!(dispatcher.apply_filters("n", 1).await.unwrap(), 1);
        assert!(!dispatcher.has("n"));
    }

    #[tokio::test]
    async fn test_panicking_handler_is_reported() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        let dispatcher = Dispatcher::<i32>::builder()
            .on_error(move |failure| {
                sink.lock().unwrap().push(failure.error.to_string());
            })
            .build();

        dispatcher.add(
            "n",
            |_v: i32, _ctx: HookContext| async move {
                if true {
                    panic!("kaboom");
                }
                Ok::<i32, BoxError>(0)
            },
            HookOptions::new().priority(1),
        );
        add_one(&dispatcher, "n", HookOptions::new().priority(2));

        assert_eq!(dispatcher.apply_filters("n", 1).await.unwrap(), 2);
        assert!(!dispatcher.is_running("n"));
        assert_eq!(*failures.lock().unwrap(), vec!["handler panicked: kaboom"]);
    }

    #[tokio::test]
    async fn test_indirect_without_resolver_is_absorbed() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        let dispatcher = Dispatcher::<i32>::builder()
            .on_error(move |failure| {
                let unresolved = matches!(
                    failure.error,
                    HookError::Resolve(ResolveError::NoResolver(_))
                );
                sink.lock().unwrap().push((failure.id.clone(), unresolved));
            })
            .build();

        dispatcher.add_target("n", "Missing#run", HookOptions::new().priority(1).id("ghost"));
        add_one(&dispatcher, "n", HookOptions::new().priority(2));

        assert_eq!(dispatcher.do_action("n", 1).await.unwrap(), vec![2]);
        assert_eq!(*failures.lock().unwrap(), vec![("ghost".to_string(), true)]);
    }
}
