// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsing, editing and serialization of Flattened Device Tree (FDT) blobs.
//!
//! Two APIs are provided:
//!
//! - A read-only, zero-copy view of an FDT blob, centered around
//!   [`Fdt`](fdt::Fdt). Parsing performs no allocation, which makes this
//!   half of the crate usable from `no_std` environments such as
//!   bootloaders.
//! - A mutable, in-memory model behind the `write` feature, centered
//!   around [`DeviceTree`](model::DeviceTree). A model can be built from
//!   scratch or converted from an [`Fdt`](fdt::Fdt), edited freely, and
//!   serialized back to a compact DTB with
//!   [`DeviceTree::to_dtb`](model::DeviceTree::to_dtb).
//!
//! Serialized blobs are always compact (no internal free space) and their
//! total size is rounded up to a 4-byte boundary, with the header
//! `totalsize` matching the padded length.
//!
//! # Examples
//!
//! ```
//! use qcdt_device_tree::fdt::Fdt;
//! use qcdt_device_tree::model::{DeviceTree, DeviceTreeNode, DeviceTreeProperty};
//!
//! let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
//! tree.root_mut().add_child(
//!     DeviceTreeNode::builder("memory")
//!         .property(DeviceTreeProperty::new("reg", 0x8000_0000u32.to_be_bytes()))
//!         .build(),
//! );
//!
//! let dtb = tree.to_dtb();
//! let fdt = Fdt::new(&dtb).unwrap();
//! let memory = fdt.find_node("/memory").unwrap().unwrap();
//! let reg = memory.property("reg").unwrap().unwrap();
//! assert_eq!(reg.as_u32().unwrap(), 0x8000_0000);
//! ```

#![no_std]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod fdt;
pub mod memreserve;
#[cfg(feature = "write")]
pub mod model;
#[cfg(feature = "write")]
mod writer;

pub use error::{FdtError, FdtErrorKind};
pub use memreserve::MemoryReservation;

/// Convenience alias for results produced by this crate.
pub type Result<T> = core::result::Result<T, FdtError>;
