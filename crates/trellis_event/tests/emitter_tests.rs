//! Integration tests for trellis_event

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use trellis_event::prelude::*;

fn counter(emitter: &Emitter, name: &str) -> (Arc<AtomicUsize>, Subscription) {
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = Arc::clone(&count);
    let sub = emitter.subscribe(name, move |_| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });
    (count, sub)
}

#[test]
fn test_prefix_subscriber_invoked_once_per_publish() {
    let emitter = Emitter::new();
    let (prefix, _sub) = counter(&emitter, "orders");

    for name in ["orders:created", "orders:created:eu", "orders:deleted:1:2"] {
        let before = prefix.load(Ordering::SeqCst);
        emitter.publish(name, json!({}));
        assert_eq!(prefix.load(Ordering::SeqCst), before + 1, "publishing {name}");
    }
}

#[test]
fn test_prefix_must_end_at_segment_boundary() {
    let emitter = Emitter::new();
    let (prefix, _sub) = counter(&emitter, "order");

    emitter.publish_empty("orders:created");
    assert_eq!(prefix.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unsubscribe_removes_only_its_registration() {
    let emitter = Emitter::new();
    let (first, first_sub) = counter(&emitter, "test");
    let (second, _second_sub) = counter(&emitter, "test");

    first_sub.unsubscribe();
    emitter.publish_empty("test");

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(emitter.subscriber_count("test"), 1);
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let emitter = Emitter::new();
    let (_a, sub_a) = counter(&emitter, "test");
    let (b, _sub_b) = counter(&emitter, "test");

    sub_a.unsubscribe();
    sub_a.unsubscribe();
    sub_a.unsubscribe();
    assert!(!sub_a.is_active());

    emitter.publish_empty("test");
    assert_eq!(b.load(Ordering::SeqCst), 1);
}

#[test]
fn test_subscribe_to_many_names() {
    let emitter = Emitter::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);

    let sub = emitter.subscribe(vec!["open", "close"], move |payload| {
        seen_clone.lock().push(payload["id"].as_u64().unwrap_or(0));
    });

    emitter.publish("open", json!({ "id": 1 }));
    emitter.publish("close", json!({ "id": 2 }));
    emitter.publish("other", json!({ "id": 3 }));
    assert_eq!(*seen.lock(), vec![1, 2]);

    sub.unsubscribe();
    emitter.publish("open", json!({ "id": 4 }));
    assert_eq!(*seen.lock(), vec![1, 2]);
}

#[test]
fn test_clear_all_resets_registry() {
    let emitter = Emitter::new();
    let (count, _sub) = counter(&emitter, "a:b");

    emitter.clear_all();
    emitter.publish_empty("a:b");

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(emitter.stats().subscriptions, 0);
}

#[test]
fn test_reentrant_publish_recurses_synchronously() {
    let emitter = Emitter::new();
    let depth = Arc::new(AtomicUsize::new(0));
    let order = Arc::new(Mutex::new(Vec::new()));

    let inner = emitter.clone();
    let depth_clone = Arc::clone(&depth);
    let order_clone = Arc::clone(&order);
    emitter.subscribe("tick", move |_| {
        let level = depth_clone.fetch_add(1, Ordering::SeqCst);
        order_clone.lock().push(format!("enter {level}"));
        if level < 2 {
            inner.publish_empty("tick");
        }
        order_clone.lock().push(format!("leave {level}"));
    });

    emitter.publish_empty("tick");

    assert_eq!(
        *order.lock(),
        vec!["enter 0", "enter 1", "enter 2", "leave 2", "leave 1", "leave 0"]
    );
}

#[test]
fn test_panicking_subscriber_aborts_remaining_dispatch() {
    let emitter = Emitter::new();
    emitter.subscribe("boom", |_| panic!("subscriber failure"));
    let (after, _sub) = counter(&emitter, "boom");

    let result = panic::catch_unwind(AssertUnwindSafe(|| emitter.publish_empty("boom")));

    assert!(result.is_err());
    assert_eq!(after.load(Ordering::SeqCst), 0);

    // The registry stays usable afterwards
    emitter.clear_all();
    let (fresh, _sub) = counter(&emitter, "boom");
    emitter.publish_empty("boom");
    assert_eq!(fresh.load(Ordering::SeqCst), 1);
}

#[test]
fn test_clones_share_registry() {
    let emitter = Emitter::new();
    let handle = emitter.clone();
    let (count, _sub) = counter(&handle, "shared");

    emitter.publish_empty("shared");

    assert!(emitter.ptr_eq(&handle));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_publish_from_other_threads() {
    let emitter = Emitter::new();
    let (count, _sub) = counter(&emitter, "work");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let emitter = emitter.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    emitter.publish_empty("work:done");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(count.load(Ordering::SeqCst), 100);
}
