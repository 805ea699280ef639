//! Virtual Tree Rendering
//!
//! Tree descriptions ([`VNode`]) and the reconciler that applies them to a
//! host tree through the [`HostTree`] trait.
//!
//! On the first render a description is materialized whole. On every later
//! render it is diffed against the previous description, and only the
//! differences reach the host: changed attributes, changed text, surplus
//! children removed, missing children appended. Children are matched by
//! position; there are no keys and no moves.

mod host;
mod memory;
mod patch;
mod vnode;

pub use host::{HostTree, NodeId};
pub use memory::{HostOp, MemoryHost};
pub use patch::{create_elm, diff_children, diff_props, mount, patch};
pub use vnode::{h, Children, Props, VNode};
