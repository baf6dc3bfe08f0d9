// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![cfg(feature = "write")]

use qcdt_device_tree::MemoryReservation;
use qcdt_device_tree::fdt::Fdt;
use qcdt_device_tree::model::{DeviceTree, DeviceTreeNode, DeviceTreeProperty};

fn sample_dtb() -> Vec<u8> {
    let mut tree = DeviceTree::new(
        DeviceTreeNode::builder("")
            .property(DeviceTreeProperty::new("model", *b"sample\0"))
            .child(
                DeviceTreeNode::builder("memory")
                    .property(DeviceTreeProperty::new("reg", 0x8000_0000u32.to_be_bytes()))
                    .build(),
            )
            .child(
                DeviceTreeNode::builder("soc")
                    .child(DeviceTreeNode::new("serial@f9960000"))
                    .child(DeviceTreeNode::new("qcom,mdss_mdp"))
                    .build(),
            )
            .build(),
    );
    tree.memory_reservations
        .push(MemoryReservation::new(0x4000_0000, 0x1000));
    tree.to_dtb()
}

#[test]
fn children_iterate_in_order() {
    let dtb = sample_dtb();
    let fdt = Fdt::new(&dtb).unwrap();
    let root = fdt.root().unwrap();
    assert_eq!(root.name().unwrap(), "");

    let names: Vec<_> = root
        .children()
        .map(|child| child.unwrap().name().unwrap())
        .collect();
    assert_eq!(names, ["memory", "soc"]);
}

#[test]
fn find_node_resolves_nested_paths() {
    let dtb = sample_dtb();
    let fdt = Fdt::new(&dtb).unwrap();

    let serial = fdt.find_node("/soc/serial@f9960000").unwrap().unwrap();
    assert_eq!(serial.name().unwrap(), "serial@f9960000");

    assert!(fdt.find_node("/soc/missing").unwrap().is_none());
    assert!(fdt.find_node("relative/path").unwrap().is_none());
    assert_eq!(fdt.find_node("/").unwrap().unwrap().name().unwrap(), "");
}

#[test]
fn property_lookup_and_cells() {
    let dtb = sample_dtb();
    let fdt = Fdt::new(&dtb).unwrap();
    let memory = fdt.find_node("/memory").unwrap().unwrap();

    let reg = memory.property("reg").unwrap().unwrap();
    assert_eq!(reg.as_u32().unwrap(), 0x8000_0000);
    assert_eq!(reg.cells().unwrap().collect::<Vec<_>>(), [0x8000_0000]);

    assert!(memory.property("absent").unwrap().is_none());
}

#[test]
fn cells_reject_ragged_values() {
    let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
    tree.root_mut().set_property("ragged", *b"abcde");
    let dtb = tree.to_dtb();

    let fdt = Fdt::new(&dtb).unwrap();
    let prop = fdt.root().unwrap().property("ragged").unwrap().unwrap();
    assert!(prop.cells().is_err());
    assert_eq!(prop.value(), b"abcde");
}

#[test]
fn memory_reservations_round_trip() {
    let dtb = sample_dtb();
    let fdt = Fdt::new(&dtb).unwrap();
    let reservations: Vec<_> = fdt.memory_reservations().collect();
    assert_eq!(reservations, [MemoryReservation::new(0x4000_0000, 0x1000)]);
}
