//! Reactive Primitives
//!
//! This module implements the dependency graph: reactive properties, their
//! deps, and the watchers that re-run when those properties change.
//!
//! # Concepts
//!
//! ## Reactive properties
//!
//! Each key of an observed object is a [`ReactiveProperty`] holding a value
//! and one [`Dep`]. Reading the property while a watcher is active records
//! an edge from the property to that watcher. Writing a different value
//! notifies every recorded watcher.
//!
//! ## Watchers
//!
//! A [`Watcher`] wraps one computation, typically a component's render and
//! patch. It runs once on creation and again, synchronously, each time a
//! dep notifies it.
//!
//! # Implementation Notes
//!
//! The active watcher lives on a thread-local stack managed by the
//! [`ActiveWatcher`] guard. Deps keep only weak references to watchers, so
//! the component that owns a watcher also owns its lifetime.
//!
//! Updates are not batched. Writing two properties read by the same watcher
//! re-runs it twice; callers that need coalescing have to build it on top.

mod context;
mod dep;
mod id;
mod property;
mod value;
mod watcher;

pub use context::ActiveWatcher;
pub use dep::Dep;
pub use id::{DepId, WatcherId};
pub use property::{observe, ReactiveObject, ReactiveProperty};
pub use value::Value;
pub use watcher::Watcher;
