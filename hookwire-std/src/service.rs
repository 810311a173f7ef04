//! Name-based handler resolution.
//!
//! [`ServiceResolver`] maps type names to host-provided [`HookService`]
//! instances, so registrations can refer to `"Sidebar"` or
//! `"Sidebar#render"` without holding the object themselves.
//!
//! ```rust,ignore
//! let resolver = ServiceResolver::new()
//!     .instance("Sidebar", Sidebar::default())
//!     .factory("Audit", || Ok::<_, BoxError>(Audit::connect()));
//!
//! let dispatcher = Dispatcher::builder().resolver(resolver).build();
//! dispatcher.add_target("page.render", "Sidebar#render", HookOptions::new());
//! ```

use hookwire_core::{
    BoxError, BoxFuture, Handler, HandlerResolver, HandlerResult, HandlerTarget, HookContext,
    HookValue, ResolveError, SharedHandler, shared,
};
use std::collections::HashMap;
use std::sync::Arc;

/// An object that can be invoked as a hook handler, by default or by method.
pub trait HookService<V: HookValue>: Send + Sync + 'static {
    /// Default invocation, used for bare `"Type"` descriptors.
    fn invoke(&self, value: V, ctx: HookContext) -> BoxFuture<'_, HandlerResult<V>>;

    /// Whether `method` can be called on this service.
    fn has_method(&self, method: &str) -> bool {
        let _ = method;
        false
    }

    /// Invoke `method`, used for `"Type#method"` descriptors.
    fn call_method<'a>(
        &'a self,
        method: &'a str,
        value: V,
        ctx: HookContext,
    ) -> BoxFuture<'a, HandlerResult<V>> {
        let _ = (value, ctx);
        Box::pin(async move { Err(BoxError::from(format!("no method `{method}`"))) })
    }
}

type Factory<V> = Arc<dyn Fn() -> Result<Arc<dyn HookService<V>>, BoxError> + Send + Sync>;

enum Source<V: HookValue> {
    Instance(Arc<dyn HookService<V>>),
    Factory(Factory<V>),
}

/// Resolves indirect handlers from registered services.
pub struct ServiceResolver<V: HookValue> {
    services: HashMap<String, Source<V>>,
}

impl<V: HookValue> Default for ServiceResolver<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: HookValue> ServiceResolver<V> {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Serve `type_name` from one shared instance.
    pub fn instance<S: HookService<V>>(mut self, type_name: impl Into<String>, service: S) -> Self {
        self.services
            .insert(type_name.into(), Source::Instance(Arc::new(service)));
        self
    }

    /// Construct a fresh instance of `type_name` on every resolution.
    pub fn factory<S, E, F>(mut self, type_name: impl Into<String>, factory: F) -> Self
    where
        S: HookService<V>,
        E: Into<BoxError>,
        F: Fn() -> Result<S, E> + Send + Sync + 'static,
    {
        let factory: Factory<V> = Arc::new(move || {
            factory()
                .map(|service| Arc::new(service) as Arc<dyn HookService<V>>)
                .map_err(Into::into)
        });
        self.services.insert(type_name.into(), Source::Factory(factory));
        self
    }

    /// Whether `type_name` is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.services.contains_key(type_name)
    }

    fn service(&self, type_name: &str) -> Result<Arc<dyn HookService<V>>, ResolveError> {
        match self.services.get(type_name) {
            Some(Source::Instance(service)) => Ok(Arc::clone(service)),
            Some(Source::Factory(factory)) => {
                factory().map_err(|source| ResolveError::Construction {
                    type_name: type_name.to_string(),
                    source,
                })
            }
            None => Err(ResolveError::UnknownType(type_name.to_string())),
        }
    }
}

impl<V: HookValue> HandlerResolver<V> for ServiceResolver<V> {
    fn resolve(&self, target: &HandlerTarget) -> Result<SharedHandler<V>, ResolveError> {
        let service = self.service(target.type_name())?;
        let method = match target.method_name() {
            Some(method) if !service.has_method(method) => {
                return Err(ResolveError::UnknownMethod {
                    type_name: target.type_name().to_string(),
                    method: method.to_string(),
                });
            }
            method => method.map(str::to_string),
        };
        Ok(shared(BoundService { service, method }))
    }
}

/// A service bound to one of its entry points.
struct BoundService<V: HookValue> {
    service: Arc<dyn HookService<V>>,
    method: Option<String>,
}

impl<V: HookValue> Handler<V> for BoundService<V> {
    async fn call(&self, value: V, ctx: HookContext) -> HandlerResult<V> {
        match &self.method {
            Some(method) => self.service.call_method(method, value, ctx).await,
            None => self.service.invoke(value, ctx).await,
        }
    }
}
