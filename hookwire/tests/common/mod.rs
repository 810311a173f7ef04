#![allow(dead_code)]

use hookwire::{BoxError, Dispatcher, HookContext, HookOptions, HookValue, Truthy};
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Value Types
// ============================================================================

/// A loosely typed payload, like the values a plugin host passes around.
#[derive(Clone, Debug, PartialEq)]
pub enum Val {
    Null,
    Int(i64),
    Text(String),
}

impl Val {
    pub fn text(s: &str) -> Self {
        Val::Text(s.to_string())
    }
}

impl Truthy for Val {
    fn is_truthy(&self) -> bool {
        match self {
            Val::Null => false,
            Val::Int(n) => n.is_truthy(),
            Val::Text(s) => s.is_truthy(),
        }
    }
}

// ============================================================================
// Test Handlers
// ============================================================================

/// Shared log of handler labels in the order they ran.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, label: impl Into<String>) {
        self.0.lock().unwrap().push(label.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Register a handler that records `label` in `trace` and returns `output`.
pub fn add_traced<V: HookValue>(
    dispatcher: &Dispatcher<V>,
    trace: &Trace,
    name: &str,
    label: &str,
    output: V,
    options: HookOptions,
) -> String {
    let trace = trace.clone();
    let label = label.to_string();
    dispatcher
        .add(
            name,
            move |_value: V, _ctx: HookContext| {
                let trace = trace.clone();
                let label = label.clone();
                let output = output.clone();
                async move {
                    trace.push(label);
                    Ok::<_, BoxError>(output)
                }
            },
            options,
        )
        .id
}

/// Register a handler that records `label` in `trace` and passes the value on.
pub fn add_passthrough<V: HookValue>(
    dispatcher: &Dispatcher<V>,
    trace: &Trace,
    name: &str,
    label: &str,
    options: HookOptions,
) -> String {
    let trace = trace.clone();
    let label = label.to_string();
    dispatcher
        .add(
            name,
            move |value: V, _ctx: HookContext| {
                let trace = trace.clone();
                let label = label.clone();
                async move {
                    trace.push(label);
                    Ok::<_, BoxError>(value)
                }
            },
            options,
        )
        .id
}
