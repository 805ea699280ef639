//! Watcher Implementation
//!
//! A Watcher is one reactive computation, normally the render-and-patch
//! step of a component.
//!
//! # How Watchers Work
//!
//! 1. When created with [`Watcher::new`], the watcher evaluates immediately.
//!    For a component this is the first mount.
//!
//! 2. While the callback runs, the watcher is the active watcher, so every
//!    property it reads registers it on that property's dep.
//!
//! 3. When one of those properties is written, the dep calls
//!    [`Watcher::update`], which simply evaluates again. Edges are
//!    rediscovered on every run, so a callback with conditional reads picks
//!    up new dependencies as its branches change.
//!
//! There is no dirty flag and no scheduler: each update runs to completion
//! before the write that caused it returns.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;

use super::context::ActiveWatcher;
use super::id::{DepId, WatcherId};
use crate::error::Result;

type Getter = dyn Fn() -> Result<()> + Send + Sync;

/// Shared state of a watcher. Deps hold this weakly.
pub(crate) struct WatcherInner {
    id: WatcherId,

    /// The recompute callback. Owns whatever context it needs.
    getter: Box<Getter>,

    /// Deps read on the most recent evaluation.
    dependencies: RwLock<HashSet<DepId>>,

    /// Whether the owning component has been torn down.
    disposed: AtomicBool,

    /// Number of completed evaluations.
    run_count: AtomicUsize,
}

/// A reactive computation that re-runs whenever a property it read changes.
///
/// # Example
///
/// ```rust,ignore
/// let data = ReactiveObject::install(map);
/// let watcher = Watcher::new({
///     let data = data.clone();
///     move || {
///         println!("count is {}", data.get("count").unwrap_or_default());
///         Ok(())
///     }
/// })?;
///
/// data.set("count", 5.into())?; // prints "count is 5"
/// ```
#[derive(Clone)]
pub struct Watcher {
    inner: Arc<WatcherInner>,
}

impl Watcher {
    /// Create a watcher and evaluate it once.
    pub fn new<F>(getter: F) -> Result<Self>
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        let watcher = Self::new_lazy(getter);
        watcher.evaluate()?;
        Ok(watcher)
    }

    /// Create a watcher without evaluating it.
    pub fn new_lazy<F>(getter: F) -> Self
    where
        F: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(WatcherInner {
                id: WatcherId::new(),
                getter: Box::new(getter),
                dependencies: RwLock::new(HashSet::new()),
                disposed: AtomicBool::new(false),
                run_count: AtomicUsize::new(0),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<WatcherInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<WatcherInner> {
        Arc::downgrade(&self.inner)
    }

    /// Get the watcher's unique ID.
    pub fn id(&self) -> WatcherId {
        self.inner.id
    }

    /// Run the callback with this watcher active.
    ///
    /// The active entry is released before this returns, whether the
    /// callback succeeded, failed or panicked.
    pub fn evaluate(&self) -> Result<()> {
        if self.is_disposed() {
            return Ok(());
        }

        let ctx = ActiveWatcher::enter(self.inner.id, self.downgrade())?;
        debug!(watcher = %self.inner.id, "evaluating watcher");

        let result = (self.inner.getter)();

        *self.inner.dependencies.write() = ctx.dependencies().into_iter().collect();
        drop(ctx);

        self.inner.run_count.fetch_add(1, Ordering::SeqCst);
        result
    }

    /// Called by a dep when a property this watcher read has changed.
    pub fn update(&self) -> Result<()> {
        self.evaluate()
    }

    /// Stop this watcher from ever running again.
    pub fn dispose(&self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
    }

    /// Check if the watcher has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    /// Number of evaluations, including the initial one.
    pub fn run_count(&self) -> usize {
        self.inner.run_count.load(Ordering::SeqCst)
    }

    /// Number of distinct deps read on the last evaluation.
    ///
    /// Deps never drop a registration, so a watcher can still be re-run by a
    /// property it read on an earlier evaluation but not on the last one.
    /// This count can therefore be lower than the number of deps that will
    /// notify it.
    pub fn dependency_count(&self) -> usize {
        self.inner.dependencies.read().len()
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.inner.id)
            .field("run_count", &self.run_count())
            .field("dependency_count", &self.dependency_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
