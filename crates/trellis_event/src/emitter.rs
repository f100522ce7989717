//! Event emitter
//!
//! Holds the subscription registry and performs namespaced dispatch.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use trellis_core::{empty_params, Logger, Params};

use crate::NAMESPACE_SEPARATOR;

/// Subscriber callback
pub type Callback = Arc<dyn Fn(&Params) + Send + Sync>;

/// One or more event names to subscribe to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames(Vec<String>);

impl EventNames {
    /// Iterate the names
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for EventNames {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for EventNames {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<&String> for EventNames {
    fn from(name: &String) -> Self {
        Self(vec![name.clone()])
    }
}

impl From<Vec<&str>> for EventNames {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for EventNames {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for EventNames {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for EventNames {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|s| s.to_string()).collect())
    }
}

/// Callbacks registered for one event name
#[derive(Default)]
struct NameEntry {
    /// Next token; never rewinds while the entry lives
    next_token: u64,
    /// Callbacks in subscription order
    callbacks: BTreeMap<u64, Callback>,
}

/// Subscription registry
#[derive(Default)]
struct Registry {
    names: HashMap<String, NameEntry>,
    /// Bumped on every `clear_all` so stale subscriptions can't hit new tokens
    epoch: u64,
}

impl Registry {
    fn contains(&self, name: &str, token: u64) -> bool {
        self.names
            .get(name)
            .map(|entry| entry.callbacks.contains_key(&token))
            .unwrap_or(false)
    }

    fn snapshot(&self, name: &str) -> Vec<(u64, Callback)> {
        self.names
            .get(name)
            .map(|entry| {
                entry
                    .callbacks
                    .iter()
                    .map(|(token, cb)| (*token, Arc::clone(cb)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Emitter statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterStats {
    /// Total publish calls
    pub published: u64,
    /// Total callback invocations
    pub dispatched: u64,
    /// Currently registered callbacks
    pub subscriptions: usize,
}

struct EmitterInner {
    registry: RwLock<Registry>,
    published: AtomicU64,
    dispatched: AtomicU64,
    logger: Logger,
}

/// Namespaced publish/subscribe emitter
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct Emitter {
    inner: Arc<EmitterInner>,
}

impl Emitter {
    /// Create a new emitter
    pub fn new() -> Self {
        Self::with_logger(Logger::new("trellis::event"))
    }

    /// Create an emitter tracing publishes through `logger`
    pub fn with_logger(logger: Logger) -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                registry: RwLock::new(Registry::default()),
                published: AtomicU64::new(0),
                dispatched: AtomicU64::new(0),
                logger,
            }),
        }
    }

    /// Subscribe a callback to one or more event names
    pub fn subscribe<F>(&self, names: impl Into<EventNames>, callback: F) -> Subscription
    where
        F: Fn(&Params) + Send + Sync + 'static,
    {
        self.subscribe_callback(names, Arc::new(callback))
    }

    /// Subscribe an already shared callback
    pub fn subscribe_callback(&self, names: impl Into<EventNames>, callback: Callback) -> Subscription {
        let names = names.into();
        let mut registry = self.inner.registry.write();
        let epoch = registry.epoch;

        let registrations = names
            .iter()
            .map(|name| {
                let entry = registry.names.entry(name.to_string()).or_default();
                let token = entry.next_token;
                entry.next_token += 1;
                entry.callbacks.insert(token, Arc::clone(&callback));
                (name.to_string(), token)
            })
            .collect();

        Subscription {
            emitter: Arc::downgrade(&self.inner),
            epoch,
            registrations: Mutex::new(registrations),
        }
    }

    /// Publish an event with an empty (`{}`) payload
    pub fn publish_empty(&self, name: &str) {
        self.publish(name, empty_params());
    }

    /// Publish an event
    ///
    /// Subscribers of `name` run first, then subscribers of each shorter
    /// namespace prefix. Dispatch is synchronous; a subscriber that publishes
    /// re-enters immediately.
    pub fn publish(&self, name: &str, payload: Params) {
        self.inner.published.fetch_add(1, Ordering::Relaxed);
        self.inner
            .logger
            .debug(format_args!("publish {} {}", name, payload));

        let mut level = Some(name);
        while let Some(current) = level {
            self.dispatch_level(current, &payload);
            level = current
                .rsplit_once(NAMESPACE_SEPARATOR)
                .map(|(parent, _)| parent);
        }
    }

    fn dispatch_level(&self, name: &str, payload: &Params) {
        let callbacks = self.inner.registry.read().snapshot(name);

        for (token, callback) in callbacks {
            // Skip callbacks removed by an earlier subscriber in this dispatch
            if !self.inner.registry.read().contains(name, token) {
                continue;
            }
            self.inner.dispatched.fetch_add(1, Ordering::Relaxed);
            callback(payload);
        }
    }

    /// Discard every subscription
    pub fn clear_all(&self) {
        let mut registry = self.inner.registry.write();
        registry.names.clear();
        registry.epoch += 1;
    }

    /// Number of callbacks registered for exactly `name`
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.inner
            .registry
            .read()
            .names
            .get(name)
            .map(|entry| entry.callbacks.len())
            .unwrap_or(0)
    }

    /// Check if anything is subscribed to exactly `name`
    pub fn has_subscribers(&self, name: &str) -> bool {
        self.subscriber_count(name) > 0
    }

    /// Get statistics
    pub fn stats(&self) -> EmitterStats {
        let subscriptions = self
            .inner
            .registry
            .read()
            .names
            .values()
            .map(|entry| entry.callbacks.len())
            .sum();

        EmitterStats {
            published: self.inner.published.load(Ordering::Relaxed),
            dispatched: self.inner.dispatched.load(Ordering::Relaxed),
            subscriptions,
        }
    }

    /// Check if two handles point at the same registry
    pub fn ptr_eq(&self, other: &Emitter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").field("stats", &self.stats()).finish()
    }
}

/// Handle returned by [`Emitter::subscribe`]
pub struct Subscription {
    emitter: Weak<EmitterInner>,
    epoch: u64,
    registrations: Mutex<Vec<(String, u64)>>,
}

impl Subscription {
    /// Remove exactly this subscription's registrations
    ///
    /// Calling it again is a no-op, as is calling it after the emitter was
    /// cleared or dropped.
    pub fn unsubscribe(&self) {
        let registrations = std::mem::take(&mut *self.registrations.lock());
        if registrations.is_empty() {
            return;
        }

        let Some(inner) = self.emitter.upgrade() else {
            return;
        };

        let mut registry = inner.registry.write();
        if registry.epoch != self.epoch {
            return;
        }

        for (name, token) in registrations {
            if let Some(entry) = registry.names.get_mut(&name) {
                entry.callbacks.remove(&token);
            }
        }
    }

    /// Check if the subscription still holds registrations
    pub fn is_active(&self) -> bool {
        if self.registrations.lock().is_empty() {
            return false;
        }
        match self.emitter.upgrade() {
            Some(inner) => inner.registry.read().epoch == self.epoch,
            None => false,
        }
    }

    /// Names and tokens held by this subscription
    pub fn tokens(&self) -> Vec<(String, u64)> {
        self.registrations.lock().clone()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("registrations", &*self.registrations.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        let make = move |label: &'static str| -> Callback {
            let log = Arc::clone(&log_clone);
            Arc::new(move |_: &Params| log.lock().push(label.to_string()))
        };
        (log, make)
    }

    #[test]
    fn test_publish_exact_name() {
        let emitter = Emitter::new();
        let (log, make) = recorder();
        emitter.subscribe_callback("test", make("a"));

        emitter.publish_empty("test");

        assert_eq!(*log.lock(), vec!["a"]);
    }

    #[test]
    fn test_namespace_order_most_specific_first() {
        let emitter = Emitter::new();
        let (log, make) = recorder();

        emitter.subscribe_callback("a", make("a1"));
        emitter.subscribe_callback("a:b:c", make("abc1"));
        emitter.subscribe_callback("a:b", make("ab1"));
        emitter.subscribe_callback("a:b:c", make("abc2"));
        emitter.subscribe_callback("a", make("a2"));

        emitter.publish_empty("a:b:c");

        assert_eq!(*log.lock(), vec!["abc1", "abc2", "ab1", "a1", "a2"]);
    }

    #[test]
    fn test_sibling_namespace_not_notified() {
        let emitter = Emitter::new();
        let (log, make) = recorder();
        emitter.subscribe_callback("a:x", make("ax"));
        emitter.subscribe_callback("a:b:c:d", make("abcd"));

        emitter.publish_empty("a:b:c");

        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let emitter = Emitter::new();
        emitter.publish("nobody:listens", json!({ "x": 1 }));
        assert_eq!(emitter.stats().published, 1);
        assert_eq!(emitter.stats().dispatched, 0);
    }

    #[test]
    fn test_payload_is_delivered() {
        let emitter = Emitter::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);
        emitter.subscribe("data", move |payload| {
            *seen_clone.lock() = Some(payload.clone());
        });

        emitter.publish("data", json!({ "value": 42 }));
        assert_eq!(*seen.lock(), Some(json!({ "value": 42 })));

        emitter.publish_empty("data");
        assert_eq!(*seen.lock(), Some(json!({})));
    }

    #[test]
    fn test_tokens_not_reused_after_unsubscribe() {
        let emitter = Emitter::new();
        let first = emitter.subscribe("t", |_| {});
        let second = emitter.subscribe("t", |_| {});
        first.unsubscribe();
        second.unsubscribe();
        let third = emitter.subscribe("t", |_| {});

        assert_eq!(third.tokens(), vec![("t".to_string(), 2)]);
    }

    #[test]
    fn test_unsubscribe_during_dispatch_skips_removed() {
        let emitter = Emitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let victim_clone = Arc::clone(&victim);
        emitter.subscribe("t", move |_| {
            if let Some(sub) = victim_clone.lock().as_ref() {
                sub.unsubscribe();
            }
        });
        let count_clone = Arc::clone(&count);
        *victim.lock() = Some(emitter.subscribe("t", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        emitter.publish_empty("t");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clear_all_invalidates_old_subscriptions() {
        let emitter = Emitter::new();
        let old = emitter.subscribe("t", |_| {});
        emitter.clear_all();
        assert!(!old.is_active());

        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let _fresh = emitter.subscribe("t", move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        // Same name and token as `old`, but a different registry epoch
        old.unsubscribe();
        emitter.publish_empty("t");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stats() {
        let emitter = Emitter::new();
        emitter.subscribe(["a", "b"], |_| {});
        emitter.subscribe("a:b", |_| {});

        emitter.publish_empty("a:b");

        let stats = emitter.stats();
        assert_eq!(stats.published, 1);
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.subscriptions, 3);
    }
}
