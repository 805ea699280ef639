//! Error types shared by the reactive graph and the reconciler.

use thiserror::Error;

use crate::reactive::WatcherId;
use crate::render::NodeId;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to whoever drove the write, render or patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A tree description without an element kind.
    #[error("vnode has no tag")]
    MissingTag,

    /// An update was asked to reuse a node that was never materialized.
    #[error("vnode <{tag}> has no materialized node to patch against")]
    Unmaterialized { tag: String },

    /// A watcher re-entered its own evaluation (usually a render writing
    /// to a property it also reads).
    #[error("watcher {0} re-entered its own evaluation")]
    ReentrantEvaluation(WatcherId),

    /// A write to a key that was never installed on the object.
    #[error("key `{0}` is not reactive on this object; use add_reactive_key")]
    UnknownKey(String),

    /// The host tree does not know this node.
    #[error("unknown host node {0}")]
    UnknownNode(NodeId),

    /// The host tree was asked to remove or insert relative to a node that
    /// is not a child of the given parent.
    #[error("host node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}
