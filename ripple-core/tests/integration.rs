//! Integration Tests for the Reactive Runtime
//!
//! These tests drive writes through the dependency graph and check what
//! reaches the host tree.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use ripple_core::component::Component;
use ripple_core::reactive::{ActiveWatcher, ReactiveObject, Value, Watcher};
use ripple_core::render::{h, mount, patch, HostOp, HostTree, MemoryHost, VNode};
use ripple_core::Error;

/// A watcher that reads the given keys and counts its runs.
fn reading(data: &ReactiveObject, keys: &'static [&'static str]) -> (Watcher, Arc<AtomicI32>) {
    let runs = Arc::new(AtomicI32::new(0));
    let watcher = Watcher::new({
        let data = data.clone();
        let runs = runs.clone();
        move || {
            for key in keys {
                data.get(key);
            }
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
    .unwrap();
    (watcher, runs)
}

/// Test that a write is immediately visible to a read.
#[test]
fn write_then_read_round_trips() {
    let data = ReactiveObject::from_json(json!({ "a": 1, "b": "x", "c": null }));

    for (key, value) in [("a", Value::from(2)), ("b", Value::from("y")), ("c", Value::from(true))] {
        data.set(key, value.clone()).unwrap();
        assert!(data.get(key).unwrap().strict_eq(&value));
    }
}

/// Test that writing an unchanged value does not recompute.
#[test]
fn unchanged_write_does_not_notify() {
    let data = ReactiveObject::from_json(json!({ "name": "ripple" }));
    let (_watcher, runs) = reading(&data, &["name"]);

    data.set("name", "ripple").unwrap();
    data.set("name", "ripple").unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

/// Test that updates are not coalesced: two writes, two recomputes.
#[test]
fn sequential_writes_recompute_once_each() {
    let data = ReactiveObject::from_json(json!({ "a": 0, "b": 0 }));
    let (watcher, runs) = reading(&data, &["a", "b", "a"]);

    assert_eq!(watcher.dependency_count(), 2);

    data.property("a").unwrap().dep().notify().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    data.property("b").unwrap().dep().notify().unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 3);

    data.set("a", 1).unwrap();
    data.set("b", 1).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 5);
}

/// Test that a conditional read picks up its new dependency on rerun.
#[test]
fn dependencies_follow_branches() {
    let data = ReactiveObject::from_json(json!({ "flag": false, "other": 0 }));
    let runs = Arc::new(AtomicI32::new(0));

    let watcher = Watcher::new({
        let data = data.clone();
        let runs = runs.clone();
        move || {
            if data.get("flag").and_then(|v| v.as_bool()) == Some(true) {
                data.get("other");
            }
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
    .unwrap();

    assert_eq!(watcher.dependency_count(), 1);
    data.set("other", 1).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    data.set("flag", true).unwrap();
    assert_eq!(watcher.dependency_count(), 2);

    data.set("other", 2).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

/// Test that an edge from an earlier branch still triggers a rerun even
/// though the last evaluation did not count it.
#[test]
fn dependency_count_reflects_last_run_only() {
    let data = ReactiveObject::from_json(json!({ "flag": true, "other": 0 }));
    let runs = Arc::new(AtomicI32::new(0));

    let watcher = Watcher::new({
        let data = data.clone();
        let runs = runs.clone();
        move || {
            if data.get("flag").and_then(|v| v.as_bool()) == Some(true) {
                data.get("other");
            }
            runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
    .unwrap();
    assert_eq!(watcher.dependency_count(), 2);

    data.set("flag", false).unwrap();
    assert_eq!(watcher.dependency_count(), 1);
    assert_eq!(data.property("other").unwrap().dep().watcher_count(), 1);

    data.set("other", 1).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

/// Test that a render writing to what it reads is stopped, not recursed.
#[test]
fn self_triggering_watcher_is_rejected() {
    let data = ReactiveObject::from_json(json!({ "n": 0 }));

    let result = Watcher::new({
        let data = data.clone();
        move || {
            let n = data.get("n").and_then(|v| v.as_f64()).unwrap_or_default();
            data.set("n", n + 1.0)
        }
    });

    assert!(matches!(result, Err(Error::ReentrantEvaluation(_))));
    assert!(!ActiveWatcher::is_active());
}

/// Test that a failed render leaves no active watcher behind.
#[test]
fn failing_render_does_not_leak_active_watcher() {
    let data = ReactiveObject::from_json(json!({ "x": 0 }));

    let failing = Watcher::new_lazy({
        let data = data.clone();
        move || {
            data.get("x");
            Err(Error::MissingTag)
        }
    });

    assert_eq!(failing.evaluate(), Err(Error::MissingTag));
    assert!(!ActiveWatcher::is_active());

    // Nothing is active any more, so this read must not register anyone.
    data.get("x");
    assert_eq!(data.property("x").unwrap().dep().watcher_count(), 1);
}

/// Test that patching against an identical tree touches nothing.
#[test]
fn identical_patch_is_a_no_op() {
    let mut host = MemoryHost::new();
    let body = host.create_node("body");

    let tree = || {
        VNode::new("form")
            .attr("method", "post")
            .child(VNode::new("input").attr("name", "q"))
            .child(VNode::new("button").text("go"))
    };

    let mut old = tree();
    mount(&mut host, body, None, &mut old).unwrap();
    host.take_ops();

    let mut new = tree();
    patch(&mut host, body, &old, &mut new).unwrap();

    assert!(host.ops().iter().all(|op| !op.is_attribute() && !op.is_structural()));
    assert!(host.ops().is_empty());
}

/// Test the boundary cases of the positional children diff.
#[test]
fn children_diff_boundaries() {
    let items = |labels: &[&str]| {
        h(
            "ul",
            None,
            labels.iter().map(|l| VNode::new("li").text(*l)).collect::<Vec<_>>(),
        )
    };

    let mut host = MemoryHost::new();
    let body = host.create_node("body");
    let mut abc = items(&["A", "B", "C"]);
    let root = mount(&mut host, body, None, &mut abc).unwrap();
    host.take_ops();

    let mut ab = items(&["A", "B"]);
    patch(&mut host, body, &abc, &mut ab).unwrap();
    let ops = host.take_ops();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], HostOp::Remove { parent, .. } if parent == root));

    let mut abc2 = items(&["A", "B", "C"]);
    patch(&mut host, body, &ab, &mut abc2).unwrap();
    let ops = host.take_ops();
    let creates = ops.iter().filter(|op| matches!(op, HostOp::Create { .. })).count();
    let appends = ops.iter().filter(|op| matches!(op, HostOp::Append { parent, .. } if *parent == root)).count();
    let removes = ops.iter().filter(|op| matches!(op, HostOp::Remove { .. })).count();
    assert_eq!((creates, appends, removes), (1, 1, 0));
    assert_eq!(host.text_content(root), "ABC");
}

/// Test the text to node-list transition.
#[test]
fn text_to_children_transition() {
    let mut host = MemoryHost::new();
    let body = host.create_node("body");

    let mut old = VNode::new("div").text("hello");
    let root = mount(&mut host, body, None, &mut old).unwrap();
    host.take_ops();

    let mut new = VNode::new("div")
        .child(VNode::new("span").text("x"))
        .child(VNode::new("span").text("y"));
    patch(&mut host, body, &old, &mut new).unwrap();

    let ops = host.take_ops();
    assert_eq!(ops[0], HostOp::SetText { node: root, text: String::new() });
    let creates = ops.iter().filter(|op| matches!(op, HostOp::Create { .. })).count();
    let appends = ops.iter().filter(|op| matches!(op, HostOp::Append { parent, .. } if *parent == root)).count();
    assert_eq!((creates, appends), (2, 2));
    assert_eq!(host.to_html(root), "<div><span>x</span><span>y</span></div>");
}

/// Test the full chain: data write, watcher, render, patch.
#[test]
fn counter_updates_in_place() {
    let host = Arc::new(Mutex::new(MemoryHost::new()));
    let (body, placeholder) = {
        let mut host = host.lock();
        let body = host.create_node("body");
        let placeholder = host.create_node("div");
        host.append_node(body, placeholder).unwrap();
        (body, placeholder)
    };

    let data = ReactiveObject::from_json(json!({ "count": 0 }));
    let component = Component::mount(data, host.clone(), body, Some(placeholder), |data: &ReactiveObject| {
        VNode::new("div")
            .attr("id", "app")
            .text(data.get("count").unwrap_or_default().to_string())
    })
    .unwrap();

    let root = component.root().unwrap();
    assert_eq!(host.lock().children(body), &[root]);
    assert_eq!(host.lock().text_content(root), "0");
    host.lock().take_ops();

    component.data().set("count", 1).unwrap();

    assert_eq!(component.root(), Some(root));
    assert_eq!(host.lock().text_content(root), "1");
    assert_eq!(
        host.lock().ops(),
        &[HostOp::SetText { node: root, text: "1".into() }]
    );
}

/// Test that nested objects and late keys drive re-renders.
#[test]
fn nested_and_added_keys_render() {
    let host = Arc::new(Mutex::new(MemoryHost::new()));
    let body = host.lock().create_node("body");

    let data = ReactiveObject::from_json(json!({ "user": { "name": "ada" } }));
    let component = Component::mount(data, host.clone(), body, None, |data: &ReactiveObject| {
        let user = data.get("user").unwrap_or_default();
        let mut card = VNode::new("section");
        if let Some(user) = user.as_object() {
            card = card.child(VNode::new("h1").text(user.get("name").unwrap_or_default().to_string()));
            if let Some(role) = user.get("role") {
                card = card.child(VNode::new("small").text(role.to_string()));
            }
        }
        card
    })
    .unwrap();
    let root = component.root().unwrap();

    let user = component.data().get_untracked("user").unwrap();
    let user = user.as_object().unwrap().clone();
    user.set("name", "grace").unwrap();
    assert_eq!(host.lock().to_html(root), "<section><h1>grace</h1></section>");

    user.add_reactive_key("role", "admin").unwrap();
    component.data().set("user", component.data().get_untracked("user").unwrap()).unwrap();
    assert_eq!(component.render_count(), 2);

    component
        .data()
        .set("user", Value::from(json!({ "name": "alan", "role": "admin" })))
        .unwrap();
    assert_eq!(
        host.lock().to_html(root),
        "<section><h1>alan</h1><small>admin</small></section>"
    );
}
