//! Dep Implementation
//!
//! A Dep is the subscriber list of exactly one reactive property. It holds
//! weak back-references to the watchers that read the property, and fans a
//! change out to them.
//!
//! # Notification
//!
//! `notify` runs synchronously and visits every watcher registered at the
//! moment of the call exactly once, in registration order. There is no
//! queue and no coalescing: a watcher that reads three properties that are
//! written one after another recomputes three times.

use std::sync::Weak;

use indexmap::IndexMap;
use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::{trace, warn};

use super::context::ActiveWatcher;
use super::id::{DepId, WatcherId};
use super::watcher::{Watcher, WatcherInner};
use crate::error::{Error, Result};

/// The set of watchers to notify when one property changes.
pub struct Dep {
    id: DepId,

    /// Registered watchers, in registration order. Weak so that a dep never
    /// keeps a torn-down component's watcher alive.
    watchers: RwLock<IndexMap<WatcherId, Weak<WatcherInner>>>,
}

impl Dep {
    /// Create an empty dep.
    pub fn new() -> Self {
        Self {
            id: DepId::new(),
            watchers: RwLock::new(IndexMap::new()),
        }
    }

    /// Get the dep's unique ID.
    pub fn id(&self) -> DepId {
        self.id
    }

    /// Register the active watcher, if there is one.
    ///
    /// Called on every property read. Registering a watcher that is already
    /// present is a no-op.
    pub fn depend(&self) {
        let Some((watcher_id, watcher)) = ActiveWatcher::current() else {
            return;
        };

        ActiveWatcher::track_dependency(self.id);
        self.register(watcher_id, watcher);
    }

    /// Register a watcher explicitly, outside of any evaluation.
    pub fn add_watcher(&self, watcher: &Watcher) {
        self.register(watcher.id(), watcher.downgrade());
    }

    fn register(&self, watcher_id: WatcherId, watcher: Weak<WatcherInner>) {
        let mut watchers = self.watchers.write();
        if !watchers.contains_key(&watcher_id) {
            trace!(dep = %self.id, watcher = %watcher_id, "dep registered watcher");
            watchers.insert(watcher_id, watcher);
        }
    }

    /// Re-run every registered watcher.
    ///
    /// A failing watcher does not stop the others from running; the first
    /// error is returned once all of them have been visited. Watchers that
    /// have been dropped are pruned.
    pub fn notify(&self) -> Result<()> {
        // Snapshot so that renders can register on this dep while we iterate.
        let targets: Vec<(WatcherId, Weak<WatcherInner>)> = self
            .watchers
            .read()
            .iter()
            .map(|(id, weak)| (*id, weak.clone()))
            .collect();

        trace!(dep = %self.id, watchers = targets.len(), "dep notify");

        let mut first_error: Option<Error> = None;
        let mut dropped: SmallVec<[WatcherId; 4]> = SmallVec::new();

        for (watcher_id, weak) in targets {
            match weak.upgrade() {
                Some(inner) => {
                    if let Err(err) = Watcher::from_inner(inner).update() {
                        warn!(dep = %self.id, watcher = %watcher_id, error = %err, "watcher update failed");
                        first_error.get_or_insert(err);
                    }
                }
                None => dropped.push(watcher_id),
            }
        }

        if !dropped.is_empty() {
            let mut watchers = self.watchers.write();
            for watcher_id in dropped {
                watchers.shift_remove(&watcher_id);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Number of registered watchers that are still alive.
    pub fn watcher_count(&self) -> usize {
        self.watchers
            .read()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl Default for Dep {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("id", &self.id)
            .field("watcher_count", &self.watcher_count())
            .finish()
    }
}
