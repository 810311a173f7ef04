//! Re-entrancy guard.
//!
//! The dispatcher enters a hook name into the [`RunningSet`] around every
//! handler invocation. A second entry for the same name, whether from a
//! recursive dispatch or a concurrent one, is rejected until the first
//! [`RunningGuard`] is dropped.

use hookwire_core::DispatchError;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Hook names currently running a handler.
#[derive(Debug, Default)]
pub struct RunningSet {
    names: Mutex<HashSet<String>>,
}

impl RunningSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as running until the returned guard is dropped.
    pub fn enter(&self, name: &str) -> Result<RunningGuard<'_>, DispatchError> {
        if !self.lock().insert(name.to_string()) {
            return Err(DispatchError::Reentrant {
                hook: name.to_string(),
            });
        }
        Ok(RunningGuard {
            set: self,
            name: name.to_string(),
        })
    }

    /// Whether `name` is currently running.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    /// Number of names currently running.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is running.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.names.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scoped membership in a [`RunningSet`].
#[derive(Debug)]
#[must_use = "the hook name is released as soon as the guard is dropped"]
pub struct RunningGuard<'a> {
    set: &'a RunningSet,
    name: String,
}

impl RunningGuard<'_> {
    /// The guarded hook name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_entry_is_rejected() {
        let set = RunningSet::new();
        let guard = set.enter("x").unwrap();
        assert_eq!(guard.name(), "x");

        let err = set.enter("x").unwrap_err();
        assert_eq!(err.hook(), "x");
        assert!(set.enter("y").is_ok());
    }

    #[test]
    fn test_drop_releases_name() {
        let set = RunningSet::new();
        {
            let _guard = set.enter("x").unwrap();
            assert!(set.contains("x"));
        }
        assert!(!set.contains("x"));
        assert!(set.is_empty());
        assert!(set.enter("x").is_ok());
    }

    #[test]
    fn test_panic_releases_name() {
        let set = RunningSet::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = set.enter("x").unwrap();
            panic!("handler blew up");
        }));

        assert!(result.is_err());
        assert_eq!(set.len(), 0);
    }
}
