// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use indexmap::IndexMap;
use twox_hash::xxhash64;

use super::property::DeviceTreeProperty;
use crate::error::FdtError;
use crate::fdt::FdtNode;

const HASH_SEED: u64 = 0x00d7_b007;

fn new_map<V>() -> IndexMap<String, V, xxhash64::State> {
    IndexMap::with_hasher(xxhash64::State::with_seed(HASH_SEED))
}

/// A mutable, in-memory device tree node.
///
/// Children and properties live in [`IndexMap`]s: name lookups are O(1)
/// and iteration preserves insertion order, which keeps serialized output
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTreeNode {
    name: String,
    properties: IndexMap<String, DeviceTreeProperty, xxhash64::State>,
    children: IndexMap<String, DeviceTreeNode, xxhash64::State>,
}

impl Default for DeviceTreeNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            properties: new_map(),
            children: new_map(),
        }
    }
}

impl DeviceTreeNode {
    /// Creates a node with the given name and no contents.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Starts building a node with the given name.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> DeviceTreeNodeBuilder {
        DeviceTreeNodeBuilder {
            node: DeviceTreeNode::new(name),
        }
    }

    /// Returns the name of this node.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns an iterator over the properties of this node, in
    /// insertion order.
    pub fn properties(&self) -> impl Iterator<Item = &DeviceTreeProperty> {
        self.properties.values()
    }

    /// Looks up a property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&DeviceTreeProperty> {
        self.properties.get(name)
    }

    /// Looks up a property by name, mutably.
    #[must_use]
    pub fn property_mut(&mut self, name: &str) -> Option<&mut DeviceTreeProperty> {
        self.properties.get_mut(name)
    }

    /// Sets a property, creating it or replacing its full value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qcdt_device_tree::model::DeviceTreeNode;
    /// let mut node = DeviceTreeNode::new("n");
    /// node.set_property("rev", 1u32.to_be_bytes());
    /// node.set_property("rev", 2u32.to_be_bytes());
    /// assert_eq!(node.property("rev").unwrap().as_u32(), Some(2));
    /// ```
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        let name = name.into();
        self.properties
            .insert(name.clone(), DeviceTreeProperty::new(name, value));
    }

    /// Adds a property, replacing any existing property of the same name.
    pub fn add_property(&mut self, property: DeviceTreeProperty) {
        self.properties.insert(property.name().to_owned(), property);
    }

    /// Removes a property by name, returning it if present.
    pub fn remove_property(&mut self, name: &str) -> Option<DeviceTreeProperty> {
        self.properties.shift_remove(name)
    }

    /// Returns an iterator over the children of this node, in insertion
    /// order.
    pub fn children(&self) -> impl Iterator<Item = &DeviceTreeNode> {
        self.children.values()
    }

    /// Looks up a direct child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&DeviceTreeNode> {
        self.children.get(name)
    }

    /// Looks up a direct child by name, mutably.
    #[must_use]
    pub fn child_mut(&mut self, name: &str) -> Option<&mut DeviceTreeNode> {
        self.children.get_mut(name)
    }

    /// Adds a child node, replacing any existing child of the same name.
    pub fn add_child(&mut self, child: DeviceTreeNode) {
        self.children.insert(child.name().to_owned(), child);
    }

    /// Removes a direct child by name, returning it (and its subtree) if
    /// present.
    pub fn remove_child(&mut self, name: &str) -> Option<DeviceTreeNode> {
        self.children.shift_remove(name)
    }
}

impl<'a> TryFrom<FdtNode<'a>> for DeviceTreeNode {
    type Error = FdtError;

    fn try_from(node: FdtNode<'a>) -> Result<Self, FdtError> {
        let mut owned = DeviceTreeNode::new(node.name()?.to_string());
        for property in node.properties() {
            owned.add_property(property?.into());
        }
        for child in node.children() {
            owned.add_child(child?.try_into()?);
        }
        Ok(owned)
    }
}

/// A builder for [`DeviceTreeNode`]s.
#[derive(Debug, Default)]
pub struct DeviceTreeNodeBuilder {
    node: DeviceTreeNode,
}

impl DeviceTreeNodeBuilder {
    /// Adds a property to the node under construction.
    #[must_use]
    pub fn property(mut self, property: DeviceTreeProperty) -> Self {
        self.node.add_property(property);
        self
    }

    /// Adds a child to the node under construction.
    #[must_use]
    pub fn child(mut self, child: DeviceTreeNode) -> Self {
        self.node.add_child(child);
        self
    }

    /// Finishes building the node.
    #[must_use]
    pub fn build(self) -> DeviceTreeNode {
        self.node
    }
}
