//! Testing utilities for hookwire.
//!
//! This module provides handlers that make dispatch behavior easy to assert on.
//!
//! # Features
//!
//! - [`RecordingHandler`]: records every input it receives and the context state
//! - [`FailingHandler`]: always returns an error
//! - [`CountingHandler`]: counts invocations and passes the value through

use hookwire_core::{BoxError, Handler, HandlerResult, HookContext, HookValue};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Recording Handler
// ============================================================================

/// A handler that records its inputs and returns a programmed output.
///
/// Without an output it echoes its input. It can also stop the context
/// after recording.
///
/// # Example
///
/// ```rust,ignore
/// let recorder = RecordingHandler::<i32>::returning(7);
/// dispatcher.add("x", recorder.clone(), HookOptions::new());
///
/// dispatcher.do_action("x", 1).await?;
/// assert_eq!(recorder.inputs(), vec![1]);
/// ```
pub struct RecordingHandler<V> {
    inputs: Arc<Mutex<Vec<V>>>,
    output: Option<V>,
    stop: bool,
}

impl<V: HookValue> RecordingHandler<V> {
    /// Create a recording handler that echoes its input.
    pub fn new() -> Self {
        Self {
            inputs: Arc::new(Mutex::new(Vec::new())),
            output: None,
            stop: false,
        }
    }

    /// Create a recording handler that always returns `output`.
    pub fn returning(output: V) -> Self {
        Self {
            output: Some(output),
            ..Self::new()
        }
    }

    /// Stop the context after recording.
    pub fn stopping(mut self) -> Self {
        self.stop = true;
        self
    }

    /// Get a clone of the recorded inputs.
    pub fn inputs(&self) -> Vec<V> {
        self.inputs.lock().unwrap().clone()
    }

    /// Get the number of recorded calls.
    pub fn count(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    /// Clear all recorded inputs.
    pub fn clear(&self) {
        self.inputs.lock().unwrap().clear();
    }
}

impl<V: HookValue> Default for RecordingHandler<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: HookValue> Clone for RecordingHandler<V> {
    fn clone(&self) -> Self {
        Self {
            inputs: self.inputs.clone(),
            output: self.output.clone(),
            stop: self.stop,
        }
    }
}

impl<V: HookValue> Handler<V> for RecordingHandler<V> {
    async fn call(&self, value: V, ctx: HookContext) -> HandlerResult<V> {
        self.inputs.lock().unwrap().push(value.clone());
        if self.stop {
            ctx.stop();
        }
        Ok(self.output.clone().unwrap_or(value))
    }
}

// ============================================================================
// Failing Handler
// ============================================================================

/// A handler that always fails with `message`.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    message: String,
    calls: Arc<AtomicUsize>,
}

impl FailingHandler {
    /// Create a failing handler.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times the handler ran.
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<V: HookValue> Handler<V> for FailingHandler {
    async fn call(&self, _value: V, _ctx: HookContext) -> HandlerResult<V> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BoxError::from(self.message.clone()))
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations and returns its input unchanged.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingHandler::new();
/// dispatcher.add("x", counter.clone(), HookOptions::new().once());
///
/// dispatcher.do_action("x", ()).await?;
/// dispatcher.do_action("x", ()).await?;
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<V: HookValue> Handler<V> for CountingHandler {
    async fn call(&self, value: V, _ctx: HookContext) -> HandlerResult<V> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }
}
