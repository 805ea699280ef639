//! The host tree the reconciler writes into.

use std::fmt;

use crate::error::Result;

/// Handle to a materialized node, issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The primitive mutations the reconciler performs on a host document.
///
/// These are the only calls the reconciler makes; it never queries the host.
/// `set_text` has text-content semantics: it replaces every child of the
/// node with the given text.
pub trait HostTree {
    /// Create a detached node of the given element kind.
    fn create_node(&mut self, tag: &str) -> NodeId;

    fn set_attribute(&mut self, node: NodeId, key: &str, value: &str) -> Result<()>;

    fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<()>;

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()>;

    /// Insert `node` under `parent` before `before`, or at the end when
    /// `before` is `None`.
    fn insert_node(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>) -> Result<()>;

    fn remove_node(&mut self, parent: NodeId, node: NodeId) -> Result<()>;

    fn append_node(&mut self, parent: NodeId, node: NodeId) -> Result<()>;
}
