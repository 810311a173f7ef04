//! The hook registry.
//!
//! Maps a hook name to priority buckets of [`HookEntry`] values. Priorities
//! are kept sorted; insertion order within a bucket is preserved. Every entry
//! carries an id that is unique across the whole registry.

use crate::pattern::HookPattern;
use hookwire_core::{HandlerKind, HookValue};
use std::collections::{BTreeMap, HashMap};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Priority used when a registration does not specify one.
pub const DEFAULT_PRIORITY: i32 = 50;

/// Options for a single registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookOptions {
    priority: Option<i32>,
    once: bool,
    id: Option<String>,
}

impl HookOptions {
    /// Options with the registry's default priority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run at `priority`; lower runs earlier.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Remove the handler after its first invocation.
    pub fn once(self) -> Self {
        self.set_once(true)
    }

    /// Set the once flag explicitly.
    pub fn set_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Register under an explicit id instead of a derived one.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Result of [`Registry::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// The effective registration id.
    pub id: String,
    /// `false` when an entry with this id already existed.
    pub inserted: bool,
}

/// One registered handler.
pub struct HookEntry<V: HookValue> {
    id: Arc<str>,
    name: Arc<str>,
    priority: i32,
    once: bool,
    handler: HandlerKind<V>,
    seq: u64,
    claimed: Arc<AtomicBool>,
}

impl<V: HookValue> HookEntry<V> {
    /// The registration id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The hook name this entry was registered under (may be a wildcard).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The priority bucket.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether the entry is removed after its first invocation.
    pub fn is_once(&self) -> bool {
        self.once
    }

    /// The registered handler.
    pub fn handler(&self) -> &HandlerKind<V> {
        &self.handler
    }

    /// Take the single invocation of a `once` entry.
    ///
    /// Returns `true` for exactly one caller across all snapshots of this entry.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::SeqCst)
    }
}

impl<V: HookValue> Clone for HookEntry<V> {
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            name: Arc::clone(&self.name),
            priority: self.priority,
            once: self.once,
            handler: self.handler.clone(),
            seq: self.seq,
            claimed: Arc::clone(&self.claimed),
        }
    }
}

impl<V: HookValue> std::fmt::Debug for HookEntry<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("once", &self.once)
            .field("handler", &self.handler)
            .finish()
    }
}

struct HookBucket<V: HookValue> {
    pattern: HookPattern,
    priorities: BTreeMap<i32, Vec<HookEntry<V>>>,
}

impl<V: HookValue> HookBucket<V> {
    fn new(name: &str) -> Self {
        Self {
            pattern: HookPattern::new(name),
            priorities: BTreeMap::new(),
        }
    }

    fn entries(&self) -> impl Iterator<Item = &HookEntry<V>> {
        self.priorities.values().flatten()
    }

    fn len(&self) -> usize {
        self.priorities.values().map(Vec::len).sum()
    }
}

/// Storage for hook registrations.
///
/// `Registry` is not synchronized itself; the dispatcher keeps it behind a
/// lock.
pub struct Registry<V: HookValue> {
    hooks: HashMap<String, HookBucket<V>>,
    ids: HashMap<Arc<str>, (String, i32)>,
    next_seq: u64,
    default_priority: i32,
}

impl<V: HookValue> Default for Registry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: HookValue> Registry<V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::with_default_priority(DEFAULT_PRIORITY)
    }

    /// Create an empty registry whose unspecified priority is `priority`.
    pub fn with_default_priority(priority: i32) -> Self {
        Self {
            hooks: HashMap::new(),
            ids: HashMap::new(),
            next_seq: 0,
            default_priority: priority,
        }
    }

    /// Register `handler` under `name`.
    ///
    /// A registration whose id already exists anywhere in the registry is
    /// ignored.
    pub fn add(&mut self, name: &str, handler: HandlerKind<V>, options: HookOptions) -> AddOutcome {
        let priority = options.priority.unwrap_or(self.default_priority);
        let id = options
            .id
            .unwrap_or_else(|| derive_id(name, &handler.signature(), priority));

        if self.ids.contains_key(id.as_str()) {
            tracing::trace!(hook = %name, %id, "duplicate registration ignored");
            return AddOutcome {
                id,
                inserted: false,
            };
        }

        let id: Arc<str> = Arc::from(id);
        let entry = HookEntry {
            id: Arc::clone(&id),
            name: Arc::from(name),
            priority,
            once: options.once,
            handler,
            seq: self.next_seq,
            claimed: Arc::new(AtomicBool::new(false)),
        };
        self.next_seq += 1;

        self.ids.insert(Arc::clone(&id), (name.to_string(), priority));
        self.hooks
            .entry(name.to_string())
            .or_insert_with(|| HookBucket::new(name))
            .priorities
            .entry(priority)
            .or_default()
            .push(entry);

        tracing::debug!(
            hook = %name,
            %id,
            priority,
            once = options.once,
            "registered hook handler"
        );
        AddOutcome {
            id: id.to_string(),
            inserted: true,
        }
    }

    /// Remove registrations from `name`.
    ///
    /// With `id` of `None` the whole hook name goes; otherwise only the entry
    /// with that id, if it is registered under `name`. Returns the number of
    /// entries removed.
    pub fn remove(&mut self, name: &str, id: Option<&str>) -> usize {
        let removed = match id {
            None => self.remove_name(name),
            Some(id) => usize::from(self.remove_id(name, id)),
        };
        if removed > 0 {
            tracing::debug!(hook = %name, id = ?id, removed, "removed hook handlers");
        }
        removed
    }

    fn remove_name(&mut self, name: &str) -> usize {
        let Some(bucket) = self.hooks.remove(name) else {
            return 0;
        };
        for entry in bucket.entries() {
            self.ids.remove(entry.id());
        }
        bucket.len()
    }

    fn remove_id(&mut self, name: &str, id: &str) -> bool {
        let priority = match self.ids.get(id) {
            Some((registered, priority)) if registered == name => *priority,
            _ => return false,
        };
        let Some(bucket) = self.hooks.get_mut(name) else {
            return false;
        };
        let Some(entries) = bucket.priorities.get_mut(&priority) else {
            return false;
        };

        entries.retain(|entry| entry.id() != id);
        if entries.is_empty() {
            bucket.priorities.remove(&priority);
        }
        if bucket.priorities.is_empty() {
            self.hooks.remove(name);
        }
        self.ids.remove(id);
        true
    }

    /// Whether a dispatch for `name` would find at least one handler.
    pub fn has(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
            || self
                .hooks
                .values()
                .any(|bucket| bucket.pattern.is_wildcard() && bucket.pattern.matches(name))
    }

    /// Entries a dispatch for `name` runs, in execution order.
    ///
    /// Ordering: ascending priority; at equal priority, entries registered
    /// under `name` itself come before wildcard matches; otherwise
    /// registration order.
    pub fn snapshot(&self, name: &str) -> Vec<HookEntry<V>> {
        let mut entries: Vec<HookEntry<V>> = self
            .hooks
            .iter()
            .filter(|(registered, bucket)| {
                registered.as_str() == name
                    || (bucket.pattern.is_wildcard() && bucket.pattern.matches(name))
            })
            .flat_map(|(_, bucket)| bucket.entries().cloned())
            .collect();

        entries.sort_by_key(|entry| (entry.priority, &*entry.name != name, entry.seq));
        entries
    }

    /// Whether an entry with `id` is registered under any name.
    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Number of entries registered under exactly `name`.
    pub fn count(&self, name: &str) -> usize {
        self.hooks.get(name).map_or(0, HookBucket::len)
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Registered hook names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hooks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.hooks.clear();
        self.ids.clear();
    }
}

fn derive_id(name: &str, signature: &str, priority: i32) -> String {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    signature.hash(&mut hasher);
    priority.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
