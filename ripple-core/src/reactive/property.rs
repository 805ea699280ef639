//! Reactive Properties and Objects
//!
//! Every key of an observed object is backed by one [`ReactiveProperty`],
//! which owns the key's current value and its [`Dep`]. Reads and writes go
//! through explicit accessors:
//!
//! - `read` registers the active watcher (if any) and returns the value.
//! - `write` compares with strict equality, instruments the new value if it
//!   is a plain object, stores it, then notifies synchronously.
//!
//! A [`ReactiveObject`] is the instrumented form of a plain object: an
//! ordered map of key to property. Keys added after installation are only
//! reactive if they go through [`ReactiveObject::add_reactive_key`].

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::trace;

use super::dep::Dep;
use super::value::Value;
use crate::error::{Error, Result};

/// Instrument a value.
///
/// A plain `Map` becomes an `Object`, recursively through nested maps.
/// Every other value, including arrays, is returned unchanged.
pub fn observe(value: Value) -> Value {
    match value {
        Value::Map(entries) => Value::Object(ReactiveObject::install(entries)),
        other => other,
    }
}

/// One observed key: its value and the dep of watchers that read it.
pub struct ReactiveProperty {
    value: RwLock<Value>,
    dep: Dep,
}

impl ReactiveProperty {
    /// Create a property, instrumenting the initial value.
    pub fn new(value: Value) -> Self {
        Self {
            value: RwLock::new(observe(value)),
            dep: Dep::new(),
        }
    }

    /// Read the value, registering the active watcher on this property.
    pub fn read(&self) -> Value {
        self.dep.depend();
        self.value.read().clone()
    }

    /// Read the value without registering anything.
    pub fn read_untracked(&self) -> Value {
        self.value.read().clone()
    }

    /// Store a new value and notify every watcher that read this property.
    ///
    /// A strictly equal value is a no-op and notifies nobody.
    pub fn write(&self, value: Value) -> Result<()> {
        {
            let mut current = self.value.write();
            if current.strict_eq(&value) {
                return Ok(());
            }
            *current = observe(value);
        }

        trace!(dep = %self.dep.id(), "property changed");
        self.dep.notify()
    }

    /// The dep owned by this property.
    pub fn dep(&self) -> &Dep {
        &self.dep
    }
}

impl std::fmt::Debug for ReactiveProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveProperty")
            .field("value", &self.read_untracked())
            .field("dep", &self.dep)
            .finish()
    }
}

/// An observed object. Cloning shares the same properties.
#[derive(Clone)]
pub struct ReactiveObject {
    properties: Arc<RwLock<IndexMap<String, Arc<ReactiveProperty>>>>,
}

impl ReactiveObject {
    /// Instrument every key of a plain object, recursing into nested plain
    /// objects.
    pub fn install(entries: IndexMap<String, Value>) -> Self {
        let properties = entries
            .into_iter()
            .map(|(key, value)| (key, Arc::new(ReactiveProperty::new(value))))
            .collect();

        Self {
            properties: Arc::new(RwLock::new(properties)),
        }
    }

    /// Build an observed object from JSON. Non-object JSON yields an empty
    /// object.
    pub fn from_json(json: serde_json::Value) -> Self {
        match Value::from(json) {
            Value::Map(entries) => Self::install(entries),
            _ => Self::install(IndexMap::new()),
        }
    }

    /// The property backing `key`.
    pub fn property(&self, key: &str) -> Option<Arc<ReactiveProperty>> {
        self.properties.read().get(key).cloned()
    }

    /// Tracked read of `key`. `None` if the key was never installed.
    pub fn get(&self, key: &str) -> Option<Value> {
        // Clone the property out first so the map lock is not held while
        // the dep registers the reader.
        self.property(key).map(|property| property.read())
    }

    /// Untracked read of `key`.
    pub fn get_untracked(&self, key: &str) -> Option<Value> {
        self.property(key).map(|property| property.read_untracked())
    }

    /// Write `key`. The key must already be reactive.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let property = self
            .property(key)
            .ok_or_else(|| Error::UnknownKey(key.to_owned()))?;
        property.write(value.into())
    }

    /// Make a new key reactive after installation.
    ///
    /// If the key already exists this is a plain write, so the key keeps
    /// its one dep and the watchers already registered on it.
    pub fn add_reactive_key(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = value.into();

        let existing = {
            let mut properties = self.properties.write();
            match properties.get(&key) {
                Some(property) => Some(property.clone()),
                None => {
                    trace!(key = %key, "added reactive key");
                    properties.insert(key, Arc::new(ReactiveProperty::new(value.clone())));
                    None
                }
            }
        };

        match existing {
            Some(property) => property.write(value),
            None => Ok(()),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.properties.read().contains_key(key)
    }

    /// Keys in installation order.
    pub fn keys(&self) -> Vec<String> {
        self.properties.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.properties.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.read().is_empty()
    }

    /// Snapshot of every key and value without registering anything.
    pub fn entries_untracked(&self) -> Vec<(String, Value)> {
        self.properties
            .read()
            .iter()
            .map(|(key, property)| (key.clone(), property.read_untracked()))
            .collect()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &ReactiveObject) -> bool {
        Arc::ptr_eq(&self.properties, &other.properties)
    }
}

impl std::fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries_untracked()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Watcher;
    use serde_json::json;
    use std::sync::atomic::{AtomicI32, Ordering};

    fn counter_watching(data: &ReactiveObject, key: &'static str) -> (Watcher, Arc<AtomicI32>) {
        let runs = Arc::new(AtomicI32::new(0));
        let watcher = Watcher::new({
            let data = data.clone();
            let runs = runs.clone();
            move || {
                data.get(key);
                runs.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .unwrap();
        (watcher, runs)
    }

    #[test]
    fn write_then_read_returns_new_value() {
        let data = ReactiveObject::from_json(json!({ "count": 0 }));

        data.set("count", 7).unwrap();
        assert!(data.get("count").unwrap().strict_eq(&Value::from(7)));
    }

    #[test]
    fn read_outside_watcher_records_nothing() {
        let data = ReactiveObject::from_json(json!({ "count": 0 }));

        data.get("count");
        assert_eq!(data.property("count").unwrap().dep().watcher_count(), 0);
    }

    #[test]
    fn nested_objects_are_instrumented() {
        let data = ReactiveObject::from_json(json!({ "foo": "foo", "bar": { "a": 1 } }));

        let bar = data.get_untracked("bar").unwrap();
        let bar = bar.as_object().expect("nested object should be observed");
        assert!(bar.contains_key("a"));
    }

    #[test]
    fn same_value_does_not_notify() {
        let data = ReactiveObject::from_json(json!({ "count": 1 }));
        let (_watcher, runs) = counter_watching(&data, "count");

        data.set("count", 1).unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        data.set("count", 2).unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn assigning_a_plain_object_instruments_it() {
        let data = ReactiveObject::from_json(json!({ "bar": { "a": 1 } }));
        data.set("bar", Value::from(json!({ "b": 2 }))).unwrap();

        let reads = Arc::new(AtomicI32::new(0));
        let _watcher = Watcher::new({
            let data = data.clone();
            let reads = reads.clone();
            move || {
                if let Some(Value::Object(bar)) = data.get("bar") {
                    bar.get("b");
                }
                reads.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .unwrap();

        let bar = data.get_untracked("bar").unwrap();
        bar.as_object().unwrap().set("b", 3).unwrap();
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let data = ReactiveObject::from_json(json!({}));
        assert_eq!(data.set("missing", 1), Err(Error::UnknownKey("missing".into())));
    }

    #[test]
    fn added_key_is_tracked() {
        let data = ReactiveObject::from_json(json!({}));
        data.add_reactive_key("late", 1).unwrap();
        let (_watcher, runs) = counter_watching(&data, "late");

        data.set("late", 2).unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn re_adding_a_key_keeps_its_dep() {
        let data = ReactiveObject::from_json(json!({ "count": 0 }));
        let (_watcher, runs) = counter_watching(&data, "count");
        let dep_before = data.property("count").unwrap().dep().id();

        data.add_reactive_key("count", 5).unwrap();

        assert_eq!(data.property("count").unwrap().dep().id(), dep_before);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn observe_leaves_primitives_alone() {
        assert!(observe(Value::from(3)).strict_eq(&Value::from(3)));
        assert!(observe(Value::Null).is_null());
    }
}
