//! Active Watcher Context
//!
//! A property read has to know which computation is asking for it without
//! that computation being passed through every call. The context answers
//! that question: it is the "active watcher" of the dependency protocol.
//!
//! # Implementation
//!
//! We use a thread-local stack. [`ActiveWatcher::enter`] pushes an entry and
//! returns a guard; dropping the guard pops it. Because the pop lives in
//! `Drop`, the entry is released on every exit path of a render, including
//! early `?` returns and panics, so a failed render never leaves a stale
//! watcher behind to collect edges that belong to someone else.
//!
//! Nesting is not expected during normal rendering, but the stack keeps it
//! well defined: reads are always attributed to the innermost entry.

use std::cell::RefCell;
use std::sync::Weak;

use smallvec::SmallVec;

use super::id::{DepId, WatcherId};
use super::watcher::WatcherInner;
use crate::error::{Error, Result};

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = RefCell::new(Vec::new());
}

/// An entry in the context stack.
struct ContextEntry {
    watcher_id: WatcherId,
    /// Back-reference handed to deps on read. Never upgraded here.
    watcher: Weak<WatcherInner>,
    /// Deps read during this evaluation, in read order, without duplicates.
    dependencies: SmallVec<[DepId; 8]>,
}

/// Guard that marks a watcher as active until dropped.
pub struct ActiveWatcher {
    watcher_id: WatcherId,
}

impl ActiveWatcher {
    /// Make the given watcher the active one.
    ///
    /// Fails with [`Error::ReentrantEvaluation`] if the watcher is already
    /// somewhere on the stack.
    pub(crate) fn enter(watcher_id: WatcherId, watcher: Weak<WatcherInner>) -> Result<Self> {
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|entry| entry.watcher_id == watcher_id) {
                return Err(Error::ReentrantEvaluation(watcher_id));
            }
            stack.push(ContextEntry {
                watcher_id,
                watcher,
                dependencies: SmallVec::new(),
            });
            Ok(Self { watcher_id })
        })
    }

    /// Check if any watcher is active on this thread.
    pub fn is_active() -> bool {
        CONTEXT_STACK.with(|stack| !stack.borrow().is_empty())
    }

    /// The ID of the innermost active watcher, if any.
    pub fn current_id() -> Option<WatcherId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().map(|entry| entry.watcher_id))
    }

    /// The innermost active watcher, as a non-owning handle.
    pub(crate) fn current() -> Option<(WatcherId, Weak<WatcherInner>)> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| (entry.watcher_id, entry.watcher.clone()))
        })
    }

    /// Record that the innermost active watcher read the given dep.
    pub(crate) fn track_dependency(dep_id: DepId) {
        CONTEXT_STACK.with(|stack| {
            if let Some(entry) = stack.borrow_mut().last_mut() {
                if !entry.dependencies.contains(&dep_id) {
                    entry.dependencies.push(dep_id);
                }
            }
        });
    }

    /// Deps recorded so far by this guard's evaluation.
    pub fn dependencies(&self) -> SmallVec<[DepId; 8]> {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .iter()
                .rev()
                .find(|entry| entry.watcher_id == self.watcher_id)
                .map(|entry| entry.dependencies.clone())
                .unwrap_or_default()
        })
    }
}

impl Drop for ActiveWatcher {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.watcher_id, self.watcher_id,
                    "ActiveWatcher mismatch: expected {:?}, got {:?}",
                    self.watcher_id, entry.watcher_id
                );
            }
        });
    }
}
