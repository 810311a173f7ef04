//! Wildcard hook-name matching.
//!
//! A registered name may use `*` in place of characters within a segment:
//! `dashboard.*` answers `dashboard.widgets` and `dashboard.stats`, but not
//! `dashboard.a.b`. Segments are separated by `.`.

use regex::Regex;

/// The wildcard marker.
pub const WILDCARD: char = '*';

/// The segment separator.
pub const SEPARATOR: char = '.';

/// A registered hook name, compiled for matching.
#[derive(Debug, Clone)]
pub struct HookPattern {
    name: String,
    regex: Option<Regex>,
}

impl HookPattern {
    /// Compile a registered hook name.
    ///
    /// Names without a wildcard only ever match themselves.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let regex = if name.contains(WILDCARD) {
            compile(&name)
        } else {
            None
        };
        Self { name, regex }
    }

    /// The name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the name contains a wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.regex.is_some()
    }

    /// Whether this registered name answers a dispatch for `requested`.
    pub fn matches(&self, requested: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(requested),
            None => self.name == requested,
        }
    }
}

/// Translate `a.*` into `^a\.[^.]+$`.
fn compile(name: &str) -> Option<Regex> {
    let segment = format!("[^{}]+", regex::escape(&SEPARATOR.to_string()));
    let body = regex::escape(name).replace(&regex::escape(&WILDCARD.to_string()), &segment);
    match Regex::new(&format!("^{body}$")) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::warn!(
                hook = %name,
                error = %err,
                "wildcard hook name did not compile; matching literally"
            );
            None
        }
    }
}
