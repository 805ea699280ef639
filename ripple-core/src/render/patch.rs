//! Reconciliation
//!
//! Turns tree descriptions into host nodes, and brings an already rendered
//! tree in line with a new description using the fewest host mutations the
//! positional algorithm allows.
//!
//! # Algorithm
//!
//! - **Mount**: build the whole subtree with [`create_elm`], insert it in
//!   place of a placeholder, then remove the placeholder.
//! - **Update**: reuse the node recorded on the old vnode. Same tag: diff
//!   props, then children. Different tag: build the new subtree and swap it
//!   in where the old node was.
//! - **Children**: matched by index, never by key. Common slots are patched
//!   in place; surplus old children have their own recorded nodes removed;
//!   surplus new children are created and appended. A reorder therefore shows
//!   up as per-slot content changes, never as a move.

use tracing::debug;

use super::host::{HostTree, NodeId};
use super::vnode::{Children, VNode};
use crate::error::{Error, Result};

/// Materialize a vnode and its subtree.
///
/// Records the new node on the vnode before returning it.
pub fn create_elm<H: HostTree + ?Sized>(host: &mut H, vnode: &mut VNode) -> Result<NodeId> {
    if vnode.tag.is_empty() {
        return Err(Error::MissingTag);
    }

    let elm = host.create_node(&vnode.tag);

    if let Some(props) = &vnode.props {
        for (key, value) in props {
            host.set_attribute(elm, key, value)?;
        }
    }

    match &mut vnode.children {
        Children::Text(text) => {
            if !text.is_empty() {
                host.set_text(elm, text)?;
            }
        }
        Children::Nodes(children) => {
            for child in children.iter_mut() {
                let child_elm = create_elm(host, child)?;
                host.append_node(elm, child_elm)?;
            }
        }
    }

    vnode.elm = Some(elm);
    Ok(elm)
}

/// First render: materialize `vnode` and put it under `parent`.
///
/// With a placeholder, the new node takes the placeholder's position and the
/// placeholder is removed. Without one, the node is appended.
pub fn mount<H: HostTree + ?Sized>(
    host: &mut H,
    parent: NodeId,
    placeholder: Option<NodeId>,
    vnode: &mut VNode,
) -> Result<NodeId> {
    vnode.validate()?;
    let elm = create_elm(host, vnode)?;
    host.insert_node(parent, elm, placeholder)?;
    if let Some(placeholder) = placeholder {
        host.remove_node(parent, placeholder)?;
    }

    debug!(tag = %vnode.tag, node = %elm, "mounted tree");
    Ok(elm)
}

/// Bring the host node recorded on `old` in line with `new`.
///
/// `parent` is the host parent of that node; it is only touched when the
/// tags differ and the subtree has to be replaced.
///
/// The whole new tree is checked before the first host call, so a
/// malformed description leaves the host exactly as it was.
pub fn patch<H: HostTree + ?Sized>(
    host: &mut H,
    parent: NodeId,
    old: &VNode,
    new: &mut VNode,
) -> Result<()> {
    new.validate()?;
    patch_vnode(host, parent, old, new)
}

fn patch_vnode<H: HostTree + ?Sized>(
    host: &mut H,
    parent: NodeId,
    old: &VNode,
    new: &mut VNode,
) -> Result<()> {
    let elm = old.elm.ok_or_else(|| Error::Unmaterialized {
        tag: old.tag.clone(),
    })?;

    if old.tag != new.tag {
        let replacement = create_elm(host, new)?;
        host.insert_node(parent, replacement, Some(elm))?;
        host.remove_node(parent, elm)?;
        debug!(old = %old.tag, new = %new.tag, node = %replacement, "replaced subtree");
        return Ok(());
    }

    new.elm = Some(elm);
    diff_props(host, elm, old, new)?;
    patch_children(host, elm, &old.children, &mut new.children)
}

/// Update the attributes of `elm` from `old.props` to `new.props`.
///
/// Identical props produce no host calls at all.
pub fn diff_props<H: HostTree + ?Sized>(
    host: &mut H,
    elm: NodeId,
    old: &VNode,
    new: &VNode,
) -> Result<()> {
    if let Some(old_props) = &old.props {
        for key in old_props.keys() {
            let kept = new.props.as_ref().is_some_and(|props| props.contains_key(key));
            if !kept {
                host.remove_attribute(elm, key)?;
            }
        }
    }

    if let Some(new_props) = &new.props {
        for (key, value) in new_props {
            let previous = old.props.as_ref().and_then(|props| props.get(key));
            if previous != Some(value) {
                host.set_attribute(elm, key, value)?;
            }
        }
    }

    Ok(())
}

/// Handle every combination of text and node children.
fn patch_children<H: HostTree + ?Sized>(
    host: &mut H,
    elm: NodeId,
    old: &Children,
    new: &mut Children,
) -> Result<()> {
    match (old, new) {
        (Children::Text(old_text), Children::Text(new_text)) => {
            if old_text != new_text {
                host.set_text(elm, new_text)?;
            }
        }
        (Children::Nodes(_), Children::Text(new_text)) => {
            host.set_text(elm, "")?;
            if !new_text.is_empty() {
                host.set_text(elm, new_text)?;
            }
        }
        (Children::Text(_), Children::Nodes(new_children)) => {
            host.set_text(elm, "")?;
            for child in new_children.iter_mut() {
                let child_elm = create_elm(host, child)?;
                host.append_node(elm, child_elm)?;
            }
        }
        (Children::Nodes(old_children), Children::Nodes(new_children)) => {
            diff_child_lists(host, elm, old_children, new_children)?;
        }
    }
    Ok(())
}

/// Positional diff of two child lists under `parent`.
///
/// Like [`patch`], rejects a malformed new list before touching the host.
pub fn diff_children<H: HostTree + ?Sized>(
    host: &mut H,
    parent: NodeId,
    old: &[VNode],
    new: &mut [VNode],
) -> Result<()> {
    new.iter().try_for_each(VNode::validate)?;
    diff_child_lists(host, parent, old, new)
}

fn diff_child_lists<H: HostTree + ?Sized>(
    host: &mut H,
    parent: NodeId,
    old: &[VNode],
    new: &mut [VNode],
) -> Result<()> {
    let common = old.len().min(new.len());

    for (old_child, new_child) in old.iter().zip(new.iter_mut()) {
        patch_vnode(host, parent, old_child, new_child)?;
    }

    if old.len() > new.len() {
        for old_child in &old[common..] {
            let elm = old_child.elm.ok_or_else(|| Error::Unmaterialized {
                tag: old_child.tag.clone(),
            })?;
            host.remove_node(parent, elm)?;
        }
        debug!(parent = %parent, removed = old.len() - common, "removed surplus children");
    } else if new.len() > old.len() {
        for new_child in &mut new[common..] {
            let elm = create_elm(host, new_child)?;
            host.append_node(parent, elm)?;
        }
    }

    Ok(())
}
