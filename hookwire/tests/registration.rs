//! Registration, removal, once entries and wildcard matching.

mod common;

use common::{Trace, Val, add_passthrough};
use hookwire::testing::CountingHandler;
use hookwire::{BoxError, Dispatcher, HookContext, HookOptions, SharedHandler, shared};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn test_once_handler_runs_exactly_once() {
    let dispatcher = Dispatcher::<Val>::new();
    let counter = CountingHandler::new();
    dispatcher.add("boot", counter.clone(), HookOptions::new().once());

    assert!(dispatcher.has("boot"));
    dispatcher.do_action("boot", Val::Null).await.unwrap();
    dispatcher.do_action("boot", Val::Null).await.unwrap();

    assert_eq!(counter.count(), 1);
    assert!(!dispatcher.has("boot"));
    assert!(dispatcher.names().is_empty());
}

fn slow_once(dispatcher: &Dispatcher<Val>, name: &str, delay: Duration) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    dispatcher.add(
        name,
        move |value: Val, _ctx: HookContext| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Ok::<_, BoxError>(value)
            }
        },
        HookOptions::new().once(),
    );
    calls
}

#[tokio::test]
async fn test_cancelled_dispatch_does_not_strand_once_handler() {
    let dispatcher = Dispatcher::<Val>::new();
    let calls = slow_once(&dispatcher, "boot", Duration::from_millis(200));

    let cancelled = tokio::time::timeout(
        Duration::from_millis(10),
        dispatcher.do_action("boot", Val::Null),
    )
    .await;

    assert!(cancelled.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!dispatcher.has("boot"));
    assert!(!dispatcher.is_running("boot"));

    let outputs = dispatcher.do_action("boot", Val::Null).await.unwrap();
    assert!(outputs.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_wildcard_dispatch_runs_once_handler_once() {
    let dispatcher = Dispatcher::<Val>::new();
    let calls = slow_once(&dispatcher, "ns.*", Duration::from_millis(20));

    let (a, b) = tokio::join!(
        dispatcher.do_action("ns.a", Val::Int(1)),
        dispatcher.do_action("ns.b", Val::Int(2)),
    );

    let outputs = a.unwrap().len() + b.unwrap().len();
    assert_eq!(outputs, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!dispatcher.has("ns.a"));
    assert!(!dispatcher.has("ns.b"));
}

#[tokio::test]
async fn test_once_leaves_other_handlers_registered() {
    let dispatcher = Dispatcher::<Val>::new();
    let once = CountingHandler::new();
    let always = CountingHandler::new();
    dispatcher.add("tick", once.clone(), HookOptions::new().once());
    dispatcher.add("tick", always.clone(), HookOptions::new());

    for _ in 0..3 {
        dispatcher.do_action("tick", Val::Null).await.unwrap();
    }

    assert_eq!(once.count(), 1);
    assert_eq!(always.count(), 3);
    assert_eq!(dispatcher.count("tick"), 1);
}

#[tokio::test]
async fn test_duplicate_id_is_ignored() {
    let dispatcher = Dispatcher::<Val>::new();
    let first = CountingHandler::new();
    let second = CountingHandler::new();

    let a = dispatcher.add("save", first.clone(), HookOptions::new().id("blog::on_save"));
    let b = dispatcher.add("save", second.clone(), HookOptions::new().id("blog::on_save"));

    assert!(a.inserted);
    assert!(!b.inserted);
    assert_eq!(a.id, b.id);
    assert_eq!(dispatcher.count("save"), 1);

    dispatcher.do_action("save", Val::Null).await.unwrap();
    assert_eq!((first.count(), second.count()), (1, 0));
}

#[tokio::test]
async fn test_same_shared_handler_derives_same_id() {
    let dispatcher = Dispatcher::<Val>::new();
    let handler: SharedHandler<Val> =
        shared(|v: Val, _ctx: HookContext| async move { Ok::<_, BoxError>(v) });

    let a = dispatcher.add_kind("save", Arc::clone(&handler), HookOptions::new());
    let b = dispatcher.add_kind("save", Arc::clone(&handler), HookOptions::new());
    let c = dispatcher.add_kind("save", handler, HookOptions::new().priority(1));

    assert!(a.inserted);
    assert!(!b.inserted);
    assert!(c.inserted);
    assert_ne!(a.id, c.id);
    assert_eq!(dispatcher.count("save"), 2);
}

#[tokio::test]
async fn test_wildcard_matches_single_segment() {
    let dispatcher = Dispatcher::<Val>::new();
    let counter = CountingHandler::new();
    dispatcher.add("ns.*", counter.clone(), HookOptions::new());

    dispatcher.do_action("ns.anything", Val::Null).await.unwrap();
    dispatcher.do_action("ns.other", Val::Null).await.unwrap();
    assert_eq!(counter.count(), 2);

    dispatcher.do_action("ns.a.b", Val::Null).await.unwrap();
    dispatcher.do_action("other.anything", Val::Null).await.unwrap();
    assert_eq!(counter.count(), 2);

    assert!(dispatcher.has("ns.anything"));
    assert!(!dispatcher.has("ns.a.b"));
}

#[tokio::test]
async fn test_remove_by_id_keeps_other_entries() {
    let dispatcher = Dispatcher::<Val>::new();
    let trace = Trace::new();
    let first = add_passthrough(&dispatcher, &trace, "x", "x1", HookOptions::new());
    add_passthrough(&dispatcher, &trace, "x", "x2", HookOptions::new());
    add_passthrough(&dispatcher, &trace, "y", "y1", HookOptions::new());

    assert_eq!(dispatcher.remove("y", Some(first.as_str())), 0);
    assert_eq!(dispatcher.remove("x", Some(first.as_str())), 1);
    assert_eq!(dispatcher.remove("x", Some(first.as_str())), 0);

    dispatcher.do_action("x", Val::Null).await.unwrap();
    dispatcher.do_action("y", Val::Null).await.unwrap();

    assert_eq!(trace.entries(), vec!["x2", "y1"]);
}

#[tokio::test]
async fn test_remove_whole_name() {
    let dispatcher = Dispatcher::<Val>::new();
    let trace = Trace::new();
    add_passthrough(&dispatcher, &trace, "x", "x1", HookOptions::new().priority(1));
    add_passthrough(&dispatcher, &trace, "x", "x2", HookOptions::new().priority(2));
    add_passthrough(&dispatcher, &trace, "y", "y1", HookOptions::new());

    assert_eq!(dispatcher.remove("x", None), 2);
    assert_eq!(dispatcher.remove("missing", None), 0);

    assert!(!dispatcher.has("x"));
    assert_eq!(dispatcher.names(), vec!["y".to_string()]);
    assert_eq!(dispatcher.len(), 1);
}

#[tokio::test]
async fn test_dispatch_uses_snapshot_taken_at_start() {
    let dispatcher = Arc::new(Dispatcher::<Val>::new());
    let trace = Trace::new();
    let victim = add_passthrough(
        &dispatcher,
        &trace,
        "x",
        "victim",
        HookOptions::new().priority(2),
    );

    let handle = Arc::clone(&dispatcher);
    dispatcher.add(
        "x",
        move |value: Val, _ctx: HookContext| {
            let handle = Arc::clone(&handle);
            let victim = victim.clone();
            async move {
                handle.remove("x", Some(victim.as_str()));
                Ok::<_, BoxError>(value)
            }
        },
        HookOptions::new().priority(1),
    );

    dispatcher.do_action("x", Val::Null).await.unwrap();
    dispatcher.do_action("x", Val::Null).await.unwrap();

    assert_eq!(trace.entries(), vec!["victim"]);
}

#[tokio::test]
async fn test_clear_empties_everything() {
    let dispatcher = Dispatcher::<Val>::new();
    dispatcher.add("a", CountingHandler::new(), HookOptions::new());
    dispatcher.add("b.*", CountingHandler::new(), HookOptions::new());

    dispatcher.clear();

    assert!(dispatcher.is_empty());
    assert!(!dispatcher.has("b.c"));
}
