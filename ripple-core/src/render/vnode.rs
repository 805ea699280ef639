//! Tree descriptions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::host::NodeId;
use crate::error::{Error, Result};

/// Attribute name to value. Keys are unique and keep their order.
pub type Props = IndexMap<String, String>;

/// The children of a vnode: either text content or child nodes, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Children {
    Text(String),
    Nodes(Vec<VNode>),
}

impl Children {
    pub fn is_text(&self) -> bool {
        matches!(self, Children::Text(_))
    }
}

impl Default for Children {
    fn default() -> Self {
        Children::Nodes(Vec::new())
    }
}

impl From<&str> for Children {
    fn from(text: &str) -> Self {
        Children::Text(text.to_owned())
    }
}

impl From<String> for Children {
    fn from(text: String) -> Self {
        Children::Text(text)
    }
}

impl From<Vec<VNode>> for Children {
    fn from(nodes: Vec<VNode>) -> Self {
        Children::Nodes(nodes)
    }
}

/// A description of one element and its subtree.
///
/// After it has been materialized, a vnode remembers the host node it was
/// rendered into so the next patch can find it. That handle is a lookup key,
/// not ownership: the host owns its nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VNode {
    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Props>,

    #[serde(default)]
    pub children: Children,

    #[serde(skip)]
    pub(crate) elm: Option<NodeId>,
}

impl VNode {
    /// An element with no props and no children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: None,
            children: Children::default(),
            elm: None,
        }
    }

    /// Set one attribute.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props
            .get_or_insert_with(Props::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the children with text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children = Children::Text(text.into());
        self
    }

    /// Append a child node. Turns text content into a child list.
    pub fn child(mut self, child: VNode) -> Self {
        match &mut self.children {
            Children::Nodes(nodes) => nodes.push(child),
            Children::Text(_) => self.children = Children::Nodes(vec![child]),
        }
        self
    }

    /// Check that every node in the subtree names an element kind.
    pub fn validate(&self) -> Result<()> {
        if self.tag.is_empty() {
            return Err(Error::MissingTag);
        }
        match &self.children {
            Children::Text(_) => Ok(()),
            Children::Nodes(children) => children.iter().try_for_each(VNode::validate),
        }
    }

    /// The host node this vnode was materialized into, if any.
    pub fn elm(&self) -> Option<NodeId> {
        self.elm
    }
}

/// Build a vnode from its three parts, like a render function's `h`.
pub fn h(tag: impl Into<String>, props: Option<Props>, children: impl Into<Children>) -> VNode {
    VNode {
        tag: tag.into(),
        props,
        children: children.into(),
        elm: None,
    }
}
