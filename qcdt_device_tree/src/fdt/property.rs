// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Read-only view of a device tree property.

use zerocopy::byteorder::big_endian;
use zerocopy::FromBytes;

use super::{Fdt, FdtToken, TOKEN_SIZE};
use crate::error::{FdtError, FdtErrorKind};
use crate::fdt::node::IterState;

/// A property of a device tree node.
#[derive(Debug, PartialEq, Eq)]
pub struct FdtProperty<'a> {
    name: &'a str,
    value: &'a [u8],
    value_offset: usize,
}

impl<'a> FdtProperty<'a> {
    /// Returns the name of this property.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the raw value bytes of this property.
    #[must_use]
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Interprets the value as a single big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Fails unless the value is exactly 4 bytes long.
    pub fn as_u32(&self) -> crate::Result<u32> {
        big_endian::U32::ref_from_bytes(self.value)
            .map(|val| val.get())
            .map_err(|_| FdtError::new(FdtErrorKind::Truncated, self.value_offset))
    }

    /// Interprets the value as a flat array of big-endian 32-bit cells.
    ///
    /// # Errors
    ///
    /// Fails unless the value length is a multiple of 4 bytes.
    pub fn cells(&self) -> crate::Result<Cells<'a>> {
        if !self.value.len().is_multiple_of(4) {
            return Err(FdtError::new(FdtErrorKind::Truncated, self.value_offset));
        }
        Ok(Cells { data: self.value })
    }
}

/// Iterator over the big-endian 32-bit cells of a property value.
#[derive(Debug, Clone)]
pub struct Cells<'a> {
    data: &'a [u8],
}

impl Iterator for Cells<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let (cell, rest) = big_endian::U32::read_from_prefix(self.data).ok()?;
        self.data = rest;
        Some(cell.get())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.data.len() / 4;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Cells<'_> {}

/// Iterator over the properties of a node.
#[derive(Debug)]
pub struct FdtProperties<'a> {
    fdt: &'a Fdt<'a>,
    offset: usize,
    state: IterState,
}

impl<'a> FdtProperties<'a> {
    pub(crate) fn new(fdt: &'a Fdt<'a>, offset: usize) -> Self {
        Self {
            fdt,
            offset,
            state: IterState::AtHeader,
        }
    }

    fn scan(&mut self) -> Result<Option<FdtProperty<'a>>, FdtError> {
        loop {
            match self.fdt.token_at(self.offset)? {
                FdtToken::Prop => {
                    let len = self.fdt.u32_at(self.offset + TOKEN_SIZE)? as usize;
                    let name_offset = self.fdt.u32_at(self.offset + 2 * TOKEN_SIZE)? as usize;
                    let value_offset = self.offset + 3 * TOKEN_SIZE;
                    let name = self.fdt.string(name_offset)?;
                    let value = self
                        .fdt
                        .data
                        .get(value_offset..value_offset + len)
                        .ok_or(FdtError::new(FdtErrorKind::Truncated, value_offset))?;
                    self.offset = self.fdt.skip_property(self.offset)?;
                    return Ok(Some(FdtProperty {
                        name,
                        value,
                        value_offset,
                    }));
                }
                FdtToken::Nop => self.offset += TOKEN_SIZE,
                // Properties always precede subnodes.
                _ => return Ok(None),
            }
        }
    }
}

impl<'a> Iterator for FdtProperties<'a> {
    type Item = crate::Result<FdtProperty<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == IterState::AtHeader {
            match self.fdt.skip_node_header(self.offset) {
                Ok(offset) => {
                    self.offset = offset;
                    self.state = IterState::InBody;
                }
                Err(e) => {
                    self.state = IterState::Done;
                    return Some(Err(e));
                }
            }
        }
        if self.state == IterState::Done {
            return None;
        }
        match self.scan() {
            Ok(Some(prop)) => Some(Ok(prop)),
            Ok(None) => {
                self.state = IterState::Done;
                None
            }
            Err(e) => {
                self.state = IterState::Done;
                Some(Err(e))
            }
        }
    }
}
