//! Ripple Core
//!
//! This crate provides the core runtime for the Ripple reactive UI framework.
//! It implements:
//!
//! - A dependency-tracking reactivity graph (reactive properties, deps and
//!   watchers)
//! - A virtual tree reconciler that patches a host tree in place
//! - A minimal component that connects the two
//!
//! Everything is synchronous: a property write finishes every re-render and
//! every host mutation it causes before it returns.
//!
//! # Architecture
//!
//! - `reactive`: property reads and writes, dependency tracking, watchers
//! - `render`: tree descriptions, the host tree trait, mount and patch
//! - `component`: one watcher per component, rendering into a host tree
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use ripple_core::component::Component;
//! use ripple_core::reactive::ReactiveObject;
//! use ripple_core::render::{HostTree, MemoryHost, VNode};
//!
//! let host = Arc::new(Mutex::new(MemoryHost::new()));
//! let body = host.lock().create_node("body");
//! let data = ReactiveObject::from_json(serde_json::json!({ "count": 0 }));
//!
//! let counter = Component::mount(data, host.clone(), body, None, |data| {
//!     VNode::new("p").text(data.get("count").unwrap_or_default().to_string())
//! })?;
//!
//! counter.data().set("count", 1)?;
//! // The <p> is patched in place and now reads "1".
//! ```

pub mod component;
pub mod error;
pub mod reactive;
pub mod render;

pub use error::{Error, Result};
