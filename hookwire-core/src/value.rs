//! Value traits for dispatched payloads.

use std::sync::Arc;

/// A value that can flow through a hook dispatch.
///
/// Filters thread the value from handler to handler, actions and `until`
/// hand every handler its own clone of the payload, so values must be
/// `Clone` as well as thread-safe.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be dispatched through hooks",
    label = "must be `Clone + Send + Sync + 'static`",
    note = "Hook values are cloned per handler and shared across tasks."
)]
pub trait HookValue: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> HookValue for T {}

/// Truthiness of a handler result, used by short-circuit dispatch.
///
/// Falsy values are `false`, numeric zero, the empty string, the string
/// `"0"`, empty collections, `()` and `None`.
pub trait Truthy {
    /// Whether the value counts as a result.
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for () {
    fn is_truthy(&self) -> bool {
        false
    }
}

macro_rules! impl_truthy_int {
    ($($t:ty),+) => {
        $(
            impl Truthy for $t {
                fn is_truthy(&self) -> bool {
                    *self != 0
                }
            }
        )+
    };
}

impl_truthy_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Truthy for f32 {
    fn is_truthy(&self) -> bool {
        *self != 0.0
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0
    }
}

impl Truthy for str {
    fn is_truthy(&self) -> bool {
        !self.is_empty() && self != "0"
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        self.as_str().is_truthy()
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy + ?Sized> Truthy for Box<T> {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

impl<T: Truthy + ?Sized> Truthy for Arc<T> {
    fn is_truthy(&self) -> bool {
        (**self).is_truthy()
    }
}

#[cfg(feature = "json")]
impl Truthy for serde_json::Value {
    fn is_truthy(&self) -> bool {
        use serde_json::Value;

        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => s.is_truthy(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(_) => true,
        }
    }
}
