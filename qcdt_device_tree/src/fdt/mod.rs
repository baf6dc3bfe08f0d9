// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A read-only, zero-copy view of a Flattened Device Tree blob.
//!
//! [`Fdt`] validates the blob header on construction and hands out
//! [`FdtNode`] and [`FdtProperty`] views that borrow from the original
//! byte slice. Lookups walk the structure block token by token, so path
//! resolution is linear in the size of the tree. Callers that need to
//! edit a tree convert to a [`DeviceTree`](crate::model::DeviceTree)
//! instead of mutating the blob in place.

mod node;
mod property;

use core::ffi::CStr;

use zerocopy::byteorder::big_endian;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::{FdtError, FdtErrorKind};
use crate::memreserve::MemoryReservation;

pub use node::{FdtChildren, FdtNode};
pub use property::{Cells, FdtProperties, FdtProperty};

/// FDT specification version this crate reads and writes.
pub(crate) const FDT_VERSION: u32 = 17;
pub(crate) const FDT_LAST_COMP_VERSION: u32 = 16;
pub(crate) const FDT_MAGIC: u32 = 0xd00d_feed;
pub(crate) const TOKEN_SIZE: usize = size_of::<u32>();

pub(crate) const FDT_BEGIN_NODE: u32 = 0x1;
pub(crate) const FDT_END_NODE: u32 = 0x2;
pub(crate) const FDT_PROP: u32 = 0x3;
pub(crate) const FDT_NOP: u32 = 0x4;
pub(crate) const FDT_END: u32 = 0x9;

#[repr(C, packed)]
#[derive(Debug, Copy, Clone, FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout)]
pub(crate) struct FdtHeader {
    pub(crate) magic: big_endian::U32,
    pub(crate) totalsize: big_endian::U32,
    pub(crate) off_dt_struct: big_endian::U32,
    pub(crate) off_dt_strings: big_endian::U32,
    pub(crate) off_mem_rsvmap: big_endian::U32,
    pub(crate) version: big_endian::U32,
    pub(crate) last_comp_version: big_endian::U32,
    pub(crate) boot_cpuid_phys: big_endian::U32,
    pub(crate) size_dt_strings: big_endian::U32,
    pub(crate) size_dt_struct: big_endian::U32,
}

/// A structure-block token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FdtToken {
    BeginNode,
    EndNode,
    Prop,
    Nop,
    End,
}

impl TryFrom<u32> for FdtToken {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, u32> {
        match value {
            FDT_BEGIN_NODE => Ok(FdtToken::BeginNode),
            FDT_END_NODE => Ok(FdtToken::EndNode),
            FDT_PROP => Ok(FdtToken::Prop),
            FDT_NOP => Ok(FdtToken::Nop),
            FDT_END => Ok(FdtToken::End),
            other => Err(other),
        }
    }
}

/// A validated, read-only flattened device tree.
#[derive(Debug)]
pub struct Fdt<'a> {
    pub(crate) data: &'a [u8],
}

impl<'a> Fdt<'a> {
    /// Parses the header of `data` and returns a view of the blob.
    ///
    /// # Errors
    ///
    /// Fails if the slice is shorter than an FDT header, the magic number
    /// is wrong, the declared version is unsupported, or the declared
    /// total size disagrees with the slice length.
    pub fn new(data: &'a [u8]) -> crate::Result<Self> {
        if data.len() < size_of::<FdtHeader>() {
            return Err(FdtError::new(FdtErrorKind::Truncated, 0));
        }

        let fdt = Fdt { data };
        let header = fdt.header();

        if header.magic.get() != FDT_MAGIC {
            return Err(FdtError::new(FdtErrorKind::BadMagic, 0));
        }
        let version = header.version.get();
        if !(header.last_comp_version.get()..=version).contains(&FDT_VERSION) {
            return Err(FdtError::new(FdtErrorKind::UnsupportedVersion(version), 20));
        }
        if header.totalsize.get() as usize != data.len() {
            return Err(FdtError::new(FdtErrorKind::Truncated, 4));
        }

        Ok(fdt)
    }

    /// Total size of the blob in bytes, as declared by its header.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.header().totalsize.get() as usize
    }

    pub(crate) fn header(&self) -> &FdtHeader {
        let (header, _) = FdtHeader::ref_from_prefix(self.data)
            .expect("constructor checked the slice holds a full header");
        header
    }

    /// Returns the (nameless) root node.
    ///
    /// # Errors
    ///
    /// Fails if the structure block does not open with a begin-node token.
    pub fn root(&self) -> crate::Result<FdtNode<'_>> {
        let offset = self.header().off_dt_struct.get() as usize;
        if self.token_at(offset)? != FdtToken::BeginNode {
            return Err(FdtError::new(FdtErrorKind::BadToken(FDT_BEGIN_NODE), offset));
        }
        Ok(FdtNode { fdt: self, offset })
    }

    /// Resolves an absolute path to a node.
    ///
    /// Returns `Ok(None)` when the path is well-formed but no node with
    /// that path exists (including paths that are not absolute).
    ///
    /// # Errors
    ///
    /// Fails only when the blob itself is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use qcdt_device_tree::model::{DeviceTree, DeviceTreeNode};
    /// # use qcdt_device_tree::fdt::Fdt;
    /// # let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
    /// # tree.root_mut().add_child(DeviceTreeNode::new("cpus"));
    /// # let dtb = tree.to_dtb();
    /// let fdt = Fdt::new(&dtb).unwrap();
    /// assert!(fdt.find_node("/cpus").unwrap().is_some());
    /// assert!(fdt.find_node("/nope").unwrap().is_none());
    /// ```
    pub fn find_node(&self, path: &str) -> crate::Result<Option<FdtNode<'_>>> {
        if !path.starts_with('/') {
            return Ok(None);
        }
        let mut current = self.root()?;
        for component in path.split('/').filter(|s| !s.is_empty()) {
            match current.child(component)? {
                Some(child) => current = child,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Returns an iterator over the memory reservation block.
    pub fn memory_reservations(&self) -> impl Iterator<Item = MemoryReservation> + 'a {
        MemReserveIter {
            data: self.data,
            offset: self.header().off_mem_rsvmap.get() as usize,
        }
    }

    pub(crate) fn u32_at(&self, offset: usize) -> crate::Result<u32> {
        big_endian::U32::read_from_prefix(self.data.get(offset..).unwrap_or_default())
            .map(|(val, _)| val.get())
            .map_err(|_| FdtError::new(FdtErrorKind::Truncated, offset))
    }

    pub(crate) fn token_at(&self, offset: usize) -> crate::Result<FdtToken> {
        let raw = self.u32_at(offset)?;
        FdtToken::try_from(raw).map_err(|t| FdtError::new(FdtErrorKind::BadToken(t), offset))
    }

    /// Reads the NUL-terminated string starting at `offset`.
    pub(crate) fn cstr_at(&self, offset: usize) -> crate::Result<&'a str> {
        let slice = self
            .data
            .get(offset..)
            .ok_or(FdtError::new(FdtErrorKind::BadString, offset))?;
        match CStr::from_bytes_until_nul(slice).map(CStr::to_str) {
            Ok(Ok(s)) => Ok(s),
            _ => Err(FdtError::new(FdtErrorKind::BadString, offset)),
        }
    }

    /// Reads a property name out of the strings block.
    pub(crate) fn string(&self, name_offset: usize) -> crate::Result<&'a str> {
        let header = self.header();
        let start = header.off_dt_strings.get() as usize + name_offset;
        let end = header.off_dt_strings.get() as usize + header.size_dt_strings.get() as usize;
        if start >= end {
            return Err(FdtError::new(FdtErrorKind::BadString, start));
        }
        self.cstr_at(start)
    }

    /// Offset just past the begin-node token and the node name.
    pub(crate) fn skip_node_header(&self, offset: usize) -> crate::Result<usize> {
        let name_start = offset + TOKEN_SIZE;
        let name = self.cstr_at(name_start)?;
        Ok(align_up(name_start + name.len() + 1))
    }

    /// Offset just past a property, `offset` pointing at its prop token.
    pub(crate) fn skip_property(&self, offset: usize) -> crate::Result<usize> {
        let len = self.u32_at(offset + TOKEN_SIZE)? as usize;
        Ok(align_up(offset + 3 * TOKEN_SIZE + len))
    }

    /// Offset just past a whole node, `offset` pointing at its begin-node
    /// token. Iterative rather than recursive so blob depth cannot
    /// exhaust the stack.
    pub(crate) fn skip_node(&self, mut offset: usize) -> crate::Result<usize> {
        let mut depth = 0usize;
        loop {
            match self.token_at(offset)? {
                FdtToken::BeginNode => {
                    depth += 1;
                    offset = self.skip_node_header(offset)?;
                }
                FdtToken::Prop => offset = self.skip_property(offset)?,
                FdtToken::Nop => offset += TOKEN_SIZE,
                FdtToken::EndNode => {
                    if depth == 0 {
                        return Err(FdtError::new(FdtErrorKind::BadToken(FDT_END_NODE), offset));
                    }
                    offset += TOKEN_SIZE;
                    depth -= 1;
                    if depth == 0 {
                        return Ok(offset);
                    }
                }
                FdtToken::End => return Err(FdtError::new(FdtErrorKind::Truncated, offset)),
            }
        }
    }
}

pub(crate) fn align_up(offset: usize) -> usize {
    offset.next_multiple_of(TOKEN_SIZE)
}

struct MemReserveIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Iterator for MemReserveIter<'_> {
    type Item = MemoryReservation;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.data.get(self.offset..self.offset + 16)?;
        let (address, _) = big_endian::U64::read_from_prefix(entry).ok()?;
        let (size, _) = big_endian::U64::read_from_prefix(&entry[8..]).ok()?;
        if address.get() == 0 && size.get() == 0 {
            return None;
        }
        self.offset += 16;
        Some(MemoryReservation::new(address.get(), size.get()))
    }
}
