// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Splitting a concatenation of device tree blobs at their self-declared
//! lengths.

use std::fs;
use std::path::Path;

use log::{info, warn};
use qcdt_device_tree::fdt::Fdt;

use crate::error::Error;

/// Writes every valid blob in `image` to `<outdir>/<index>.dtb`, in
/// order, stopping at the first byte range that is not a valid blob.
/// Returns the number of blobs written.
///
/// # Errors
///
/// Fails only on write failures; trailing garbage merely ends the scan.
pub fn split_blobs(image: &[u8], outdir: &Path) -> Result<u32, Error> {
    let mut offset = 0;
    let mut index = 0u32;
    while let Some(blob) = blob_at(image, offset) {
        fs::write(outdir.join(format!("{index}.dtb")), blob)?;
        info!("blob {index}: {} bytes at offset {offset:#x}", blob.len());
        offset += blob.len();
        index += 1;
    }
    if index == 0 {
        warn!("no device tree blobs found in image");
    }
    Ok(index)
}

/// The blob starting at `offset`, if its declared size fits the image
/// and it parses.
fn blob_at(image: &[u8], offset: usize) -> Option<&[u8]> {
    let size_field = image.get(offset + 4..offset + 8)?;
    let totalsize = u32::from_be_bytes(size_field.try_into().ok()?) as usize;
    let blob = image.get(offset..offset.checked_add(totalsize)?)?;
    Fdt::new(blob).ok()?;
    Some(blob)
}

#[cfg(test)]
mod tests {
    use qcdt_device_tree::model::{DeviceTree, DeviceTreeNode};

    use super::*;

    #[test]
    fn scan_stops_at_first_invalid_range() {
        let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
        tree.root_mut().set_property("linux,phandle", 1u32.to_be_bytes());
        let first = tree.to_dtb();

        let mut image = first.clone();
        image.extend_from_slice(b"not a blob");

        assert_eq!(blob_at(&image, 0), Some(first.as_slice()));
        assert_eq!(blob_at(&image, first.len()), None);
        assert_eq!(blob_at(&image, image.len()), None);
    }
}
