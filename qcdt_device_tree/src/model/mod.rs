// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A mutable, in-memory device tree model.
//!
//! [`DeviceTree`] is the editing half of this crate: build one from
//! scratch, or convert a parsed [`Fdt`](crate::fdt::Fdt) with
//! [`DeviceTree::from_fdt`], edit nodes and properties freely, then
//! serialize back to a compact blob with [`DeviceTree::to_dtb`]. Property
//! writes always replace the full value, so repeated edits leave no stale
//! bytes behind.

mod node;
mod property;

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::FdtError;
use crate::fdt::Fdt;
use crate::memreserve::MemoryReservation;
use crate::writer;

pub use node::{DeviceTreeNode, DeviceTreeNodeBuilder};
pub use property::DeviceTreeProperty;

/// A mutable, in-memory representation of a device tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTree {
    root: DeviceTreeNode,
    /// The memory reservations carried by this tree.
    pub memory_reservations: Vec<MemoryReservation>,
}

impl DeviceTree {
    /// Creates a new `DeviceTree` with the given root node.
    #[must_use]
    pub fn new(root: DeviceTreeNode) -> Self {
        Self {
            root,
            memory_reservations: Vec::new(),
        }
    }

    /// Builds a mutable model from a parsed blob, copying every node,
    /// property and memory reservation.
    ///
    /// # Errors
    ///
    /// Fails if the blob's structure block is malformed.
    pub fn from_fdt(fdt: &Fdt<'_>) -> Result<Self, FdtError> {
        Ok(DeviceTree {
            root: DeviceTreeNode::try_from(fdt.root()?)?,
            memory_reservations: fdt.memory_reservations().collect(),
        })
    }

    /// Serializes this tree to a compact DTB.
    ///
    /// The output carries no internal free space and is padded to a
    /// 4-byte boundary; the header `totalsize` equals the padded length.
    ///
    /// # Panics
    ///
    /// May panic if a block size or property value length exceeds
    /// [`u32::MAX`].
    #[must_use]
    pub fn to_dtb(&self) -> Vec<u8> {
        writer::to_bytes(self)
    }

    /// Returns a reference to the root node.
    #[must_use]
    pub fn root(&self) -> &DeviceTreeNode {
        &self.root
    }

    /// Returns a mutable reference to the root node.
    pub fn root_mut(&mut self) -> &mut DeviceTreeNode {
        &mut self.root
    }

    /// Resolves an absolute path to a mutable node reference.
    ///
    /// Returns `None` when the path is not absolute or no such node
    /// exists.
    pub fn find_node_mut(&mut self, path: &str) -> Option<&mut DeviceTreeNode> {
        if !path.starts_with('/') {
            return None;
        }
        let mut current = &mut self.root;
        for component in path.split('/').filter(|s| !s.is_empty()) {
            current = current.child_mut(component)?;
        }
        Some(current)
    }

    /// Detaches the node at `path` (and its whole subtree) from the tree.
    ///
    /// Returns `None` when the path does not resolve — including when an
    /// ancestor is already gone, when the path is not absolute, and when
    /// it names the root (the root cannot be detached).
    ///
    /// # Examples
    ///
    /// ```
    /// # use qcdt_device_tree::model::{DeviceTree, DeviceTreeNode};
    /// let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
    /// tree.root_mut().add_child(DeviceTreeNode::new("soc"));
    /// assert!(tree.remove_node("/soc").is_some());
    /// assert!(tree.remove_node("/soc").is_none());
    /// ```
    pub fn remove_node(&mut self, path: &str) -> Option<DeviceTreeNode> {
        let stripped = path.strip_prefix('/')?;
        if stripped.is_empty() {
            return None;
        }
        let (parent, leaf) = match stripped.rsplit_once('/') {
            Some((head, leaf)) => (alloc::format!("/{head}"), leaf),
            None => (String::from("/"), stripped),
        };
        if leaf.is_empty() {
            return None;
        }
        self.find_node_mut(&parent)?.remove_child(leaf)
    }
}
