// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![cfg(feature = "write")]

use qcdt_device_tree::fdt::Fdt;
use qcdt_device_tree::model::{DeviceTree, DeviceTreeNode, DeviceTreeProperty};

#[test]
fn edit_properties_and_children() {
    let mut tree = DeviceTree::new(DeviceTreeNode::new(""));

    let root = tree.root_mut();
    root.add_child(DeviceTreeNode::new("chosen"));
    root.set_property("compatible", *b"qcom,msm8974\0");
    assert_eq!(root.children().count(), 1);
    assert_eq!(root.properties().count(), 1);

    let chosen = tree.find_node_mut("/chosen").unwrap();
    chosen.set_property("bootargs", *b"console=ttyMSM0\0");
    assert!(chosen.property("bootargs").is_some());

    let removed = chosen.remove_property("bootargs").unwrap();
    assert_eq!(removed.value(), b"console=ttyMSM0\0");
    assert!(chosen.property("bootargs").is_none());
}

#[test]
fn set_property_replaces_full_value() {
    let mut node = DeviceTreeNode::new("n");
    node.set_property("id", vec![0u8; 12]);
    node.set_property("id", 7u32.to_be_bytes());
    // No residue of the longer previous value.
    assert_eq!(node.property("id").unwrap().value(), 7u32.to_be_bytes());
}

#[test]
fn append_value_extends_cell_arrays() {
    let mut prop = DeviceTreeProperty::new("qcom,msm-id", 126u32.to_be_bytes());
    prop.append_value(8u32.to_be_bytes());
    prop.append_value(0x10000u32.to_be_bytes());

    let expected: Vec<u8> = [126u32, 8, 0x10000]
        .iter()
        .flat_map(|v| v.to_be_bytes())
        .collect();
    assert_eq!(prop.value(), expected);
    assert!(prop.as_u32().is_none());
}

#[test]
fn remove_node_by_path() {
    let mut tree = DeviceTree::new(
        DeviceTreeNode::builder("")
            .child(
                DeviceTreeNode::builder("soc")
                    .child(DeviceTreeNode::new("spmi"))
                    .build(),
            )
            .build(),
    );

    assert!(tree.remove_node("/soc/spmi").is_some());
    // Second removal resolves nothing.
    assert!(tree.remove_node("/soc/spmi").is_none());
    // Removing a parent takes the remaining subtree with it.
    assert!(tree.remove_node("/soc").is_some());
    assert!(tree.remove_node("/soc/anything").is_none());
    // The root itself and relative paths never resolve.
    assert!(tree.remove_node("/").is_none());
    assert!(tree.remove_node("soc").is_none());
}

#[test]
fn from_fdt_round_trips() {
    let mut original = DeviceTree::new(
        DeviceTreeNode::builder("")
            .property(DeviceTreeProperty::new("#address-cells", 1u32.to_be_bytes()))
            .child(
                DeviceTreeNode::builder("cpus")
                    .child(DeviceTreeNode::new("cpu@0"))
                    .child(DeviceTreeNode::new("cpu@1"))
                    .build(),
            )
            .build(),
    );

    let dtb = original.to_dtb();
    let fdt = Fdt::new(&dtb).unwrap();
    let reparsed = DeviceTree::from_fdt(&fdt).unwrap();
    assert_eq!(reparsed, original);

    // Edits to the copy leave the original untouched.
    original.remove_node("/cpus/cpu@1");
    assert!(reparsed.root().child("cpus").unwrap().child("cpu@1").is_some());
}
