//! Handler descriptors.
//!
//! A registration either carries a directly invocable handler or names a
//! type (and optionally a method) that a [`HandlerResolver`] turns into one
//! at dispatch time.
//!
//! [`HandlerResolver`]: crate::HandlerResolver

use crate::handler::SharedHandler;
use crate::value::HookValue;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Separator between type and method in a string descriptor.
pub const METHOD_SEPARATOR: char = '#';

/// An indirect handler: a type name and an optional method on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerTarget {
    type_name: String,
    method: Option<String>,
}

impl HandlerTarget {
    /// Target the default invocation of `type_name`.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method: None,
        }
    }

    /// Target `method` on `type_name`.
    pub fn method(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method: Some(method.into()),
        }
    }

    /// Parse `"Type"` or `"Type#method"`.
    ///
    /// An empty method part (`"Type#"`) targets the default invocation.
    pub fn parse(descriptor: &str) -> Self {
        match descriptor.split_once(METHOD_SEPARATOR) {
            Some((type_name, method)) if !method.is_empty() => Self::method(type_name, method),
            Some((type_name, _)) => Self::new(type_name),
            None => Self::new(descriptor),
        }
    }

    /// The type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The method, if any.
    pub fn method_name(&self) -> Option<&str> {
        self.method.as_deref()
    }
}

impl fmt::Display for HandlerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{}{}{}", self.type_name, METHOD_SEPARATOR, method),
            None => f.write_str(&self.type_name),
        }
    }
}

impl FromStr for HandlerTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for HandlerTarget {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// What a registration invokes.
pub enum HandlerKind<V: HookValue> {
    /// A directly invocable handler.
    Direct(SharedHandler<V>),
    /// A type/method pair resolved at dispatch time.
    Indirect(HandlerTarget),
}

impl<V: HookValue> HandlerKind<V> {
    /// A stable description of the handler, used to derive registration ids.
    ///
    /// Direct handlers are identified by their type name and the address of
    /// their shared allocation, so clones of one [`SharedHandler`] share a
    /// signature while two separately created closures do not.
    pub fn signature(&self) -> String {
        match self {
            HandlerKind::Direct(handler) => format!(
                "{}@{:p}",
                handler.type_name(),
                Arc::as_ptr(handler) as *const ()
            ),
            HandlerKind::Indirect(target) => target.to_string(),
        }
    }
}

impl<V: HookValue> Clone for HandlerKind<V> {
    fn clone(&self) -> Self {
        match self {
            HandlerKind::Direct(handler) => HandlerKind::Direct(Arc::clone(handler)),
            HandlerKind::Indirect(target) => HandlerKind::Indirect(target.clone()),
        }
    }
}

impl<V: HookValue> fmt::Debug for HandlerKind<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerKind::Direct(handler) => f
                .debug_tuple("Direct")
                .field(&handler.type_name())
                .finish(),
            HandlerKind::Indirect(target) => f.debug_tuple("Indirect").field(target).finish(),
        }
    }
}

impl<V: HookValue> From<SharedHandler<V>> for HandlerKind<V> {
    fn from(handler: SharedHandler<V>) -> Self {
        HandlerKind::Direct(handler)
    }
}

impl<V: HookValue> From<HandlerTarget> for HandlerKind<V> {
    fn from(target: HandlerTarget) -> Self {
        HandlerKind::Indirect(target)
    }
}
