//! In-memory host document.
//!
//! A small arena-backed element tree implementing [`HostTree`]. It keeps a
//! log of every mutation it receives, which is how tests assert the exact
//! number of creates, inserts and removals a patch performed.

use indexmap::IndexMap;

use super::host::{HostTree, NodeId};
use crate::error::{Error, Result};

/// One mutation received by a [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    Create { node: NodeId, tag: String },
    SetAttribute { node: NodeId, key: String, value: String },
    RemoveAttribute { node: NodeId, key: String },
    SetText { node: NodeId, text: String },
    Insert { parent: NodeId, node: NodeId, before: Option<NodeId> },
    Remove { parent: NodeId, node: NodeId },
    Append { parent: NodeId, node: NodeId },
}

impl HostOp {
    /// Whether this op adds or removes a child.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            HostOp::Create { .. } | HostOp::Insert { .. } | HostOp::Remove { .. } | HostOp::Append { .. }
        )
    }

    /// Whether this op touches an attribute.
    pub fn is_attribute(&self) -> bool {
        matches!(self, HostOp::SetAttribute { .. } | HostOp::RemoveAttribute { .. })
    }
}

#[derive(Debug)]
struct HostNode {
    tag: String,
    attributes: IndexMap<String, String>,
    /// Text set through `set_text`. Rendered before any child appended later.
    text: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// An element tree held in memory.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: NodeId) -> Result<&HostNode> {
        self.nodes
            .get(id.raw() as usize)
            .ok_or(Error::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut HostNode> {
        self.nodes
            .get_mut(id.raw() as usize)
            .ok_or(Error::UnknownNode(id))
    }

    /// Unlink `node` from its current parent, if it has one.
    fn detach(&mut self, node: NodeId) -> Result<()> {
        let parent = self.node(node)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|child| *child != node);
            self.node_mut(node)?.parent = None;
        }
        Ok(())
    }

    /// Every mutation received so far.
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Drain the mutation log.
    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.node(node).ok().map(|n| n.tag.as_str())
    }

    pub fn attribute(&self, node: NodeId, key: &str) -> Option<&str> {
        self.node(node).ok()?.attributes.get(key).map(String::as_str)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok()?.parent
    }

    /// Concatenated text of the node and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        if let Ok(n) = self.node(node) {
            out.push_str(&n.text);
            for child in &n.children {
                self.collect_text(*child, out);
            }
        }
    }

    /// Serialize a subtree as markup.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Ok(n) = self.node(node) else {
            return;
        };
        out.push('<');
        out.push_str(&n.tag);
        for (key, value) in &n.attributes {
            out.push_str(&format!(" {}=\"{}\"", key, value.replace('"', "&quot;")));
        }
        out.push('>');
        out.push_str(&n.text);
        for child in &n.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&n.tag);
        out.push('>');
    }
}

impl HostTree for MemoryHost {
    fn create_node(&mut self, tag: &str) -> NodeId {
        let node = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(HostNode {
            tag: tag.to_owned(),
            attributes: IndexMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
        });
        self.ops.push(HostOp::Create { node, tag: tag.to_owned() });
        node
    }

    fn set_attribute(&mut self, node: NodeId, key: &str, value: &str) -> Result<()> {
        self.node_mut(node)?
            .attributes
            .insert(key.to_owned(), value.to_owned());
        self.ops.push(HostOp::SetAttribute {
            node,
            key: key.to_owned(),
            value: value.to_owned(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, key: &str) -> Result<()> {
        self.node_mut(node)?.attributes.shift_remove(key);
        self.ops.push(HostOp::RemoveAttribute { node, key: key.to_owned() });
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        self.node_mut(node)?.text = text.to_owned();
        self.ops.push(HostOp::SetText { node, text: text.to_owned() });
        Ok(())
    }

    fn insert_node(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>) -> Result<()> {
        self.node(node)?;
        self.detach(node)?;

        let siblings = &self.node(parent)?.children;
        let index = match before {
            Some(anchor) => siblings
                .iter()
                .position(|child| *child == anchor)
                .ok_or(Error::NotAChild { parent, child: anchor })?,
            None => siblings.len(),
        };

        self.node_mut(parent)?.children.insert(index, node);
        self.node_mut(node)?.parent = Some(parent);
        self.ops.push(HostOp::Insert { parent, node, before });
        Ok(())
    }

    fn remove_node(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|child| *child == node)
            .ok_or(Error::NotAChild { parent, child: node })?;
        siblings.remove(index);

        self.node_mut(node)?.parent = None;
        self.ops.push(HostOp::Remove { parent, node });
        Ok(())
    }

    fn append_node(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        self.node(node)?;
        self.node(parent)?;
        self.detach(node)?;

        self.node_mut(parent)?.children.push(node);
        self.node_mut(node)?.parent = Some(parent);
        self.ops.push(HostOp::Append { parent, node });
        Ok(())
    }
}
