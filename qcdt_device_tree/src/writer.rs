// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Serialization of the mutable model back to a DTB blob.

use alloc::borrow::ToOwned;
use alloc::collections::btree_map::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use zerocopy::IntoBytes;

use crate::fdt::{
    FDT_BEGIN_NODE, FDT_END, FDT_END_NODE, FDT_LAST_COMP_VERSION, FDT_MAGIC, FDT_PROP,
    FDT_VERSION, FdtHeader, align_up,
};
use crate::model::{DeviceTree, DeviceTreeNode};

/// Interns property names into the strings block, reusing offsets for
/// repeated names.
#[derive(Default)]
struct StringTable {
    block: Vec<u8>,
    offsets: BTreeMap<String, u32>,
}

impl StringTable {
    fn intern(&mut self, name: &str) -> u32 {
        if let Some(offset) = self.offsets.get(name) {
            return *offset;
        }
        let offset = u32::try_from(self.block.len()).expect("strings block exceeds u32");
        self.block.extend_from_slice(name.as_bytes());
        self.block.push(0);
        self.offsets.insert(name.to_owned(), offset);
        offset
    }
}

pub(crate) fn to_bytes(tree: &DeviceTree) -> Vec<u8> {
    let mut structure = Vec::new();
    let mut strings = StringTable::default();
    emit_node(&mut structure, &mut strings, tree.root());
    structure.extend_from_slice(&FDT_END.to_be_bytes());

    let mut reservations = Vec::new();
    for reservation in &tree.memory_reservations {
        reservations.extend_from_slice(&reservation.address().to_be_bytes());
        reservations.extend_from_slice(&reservation.size().to_be_bytes());
    }
    // Terminator entry.
    reservations.extend_from_slice(&[0u8; 16]);

    let off_mem_rsvmap = size_of::<FdtHeader>();
    let off_dt_struct = off_mem_rsvmap + reservations.len();
    let off_dt_strings = off_dt_struct + structure.len();
    // Emitted blobs are kept 4-byte-aligned end to end.
    let totalsize = align_up(off_dt_strings + strings.block.len());

    let as_u32 = |value: usize, what: &str| -> zerocopy::byteorder::big_endian::U32 {
        u32::try_from(value)
            .unwrap_or_else(|_| panic!("{what} exceeds u32"))
            .into()
    };
    let header = FdtHeader {
        magic: FDT_MAGIC.into(),
        totalsize: as_u32(totalsize, "totalsize"),
        off_dt_struct: as_u32(off_dt_struct, "off_dt_struct"),
        off_dt_strings: as_u32(off_dt_strings, "off_dt_strings"),
        off_mem_rsvmap: as_u32(off_mem_rsvmap, "off_mem_rsvmap"),
        version: FDT_VERSION.into(),
        last_comp_version: FDT_LAST_COMP_VERSION.into(),
        boot_cpuid_phys: 0u32.into(),
        size_dt_strings: as_u32(strings.block.len(), "size_dt_strings"),
        size_dt_struct: as_u32(structure.len(), "size_dt_struct"),
    };

    let mut dtb = Vec::with_capacity(totalsize);
    dtb.extend_from_slice(header.as_bytes());
    dtb.extend_from_slice(&reservations);
    dtb.extend_from_slice(&structure);
    dtb.extend_from_slice(&strings.block);
    dtb.resize(totalsize, 0);
    dtb
}

fn emit_node(structure: &mut Vec<u8>, strings: &mut StringTable, node: &DeviceTreeNode) {
    structure.extend_from_slice(&FDT_BEGIN_NODE.to_be_bytes());
    structure.extend_from_slice(node.name().as_bytes());
    structure.push(0);
    pad(structure);

    for prop in node.properties() {
        let name_offset = strings.intern(prop.name());
        structure.extend_from_slice(&FDT_PROP.to_be_bytes());
        structure.extend_from_slice(
            &u32::try_from(prop.value().len())
                .expect("property value length exceeds u32")
                .to_be_bytes(),
        );
        structure.extend_from_slice(&name_offset.to_be_bytes());
        structure.extend_from_slice(prop.value());
        pad(structure);
    }

    for child in node.children() {
        emit_node(structure, strings, child);
    }

    structure.extend_from_slice(&FDT_END_NODE.to_be_bytes());
}

fn pad(block: &mut Vec<u8>) {
    block.resize(align_up(block.len()), 0);
}

#[cfg(test)]
mod tests {
    use crate::fdt::Fdt;
    use crate::model::{DeviceTree, DeviceTreeNode};

    #[test]
    fn output_is_aligned_and_self_describing() {
        let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
        tree.root_mut()
            .set_property("odd-length", *b"abc"); // forces strings/value padding
        let dtb = tree.to_dtb();

        assert_eq!(dtb.len() % 4, 0);
        let fdt = Fdt::new(&dtb).expect("writer output must parse");
        assert_eq!(fdt.total_size(), dtb.len());
    }
}
