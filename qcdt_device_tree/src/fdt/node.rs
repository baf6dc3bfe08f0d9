// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Read-only view of a device tree node.

use super::{Fdt, FdtToken, TOKEN_SIZE};
use crate::error::FdtError;
use crate::fdt::property::{FdtProperties, FdtProperty};

/// A node in a flattened device tree.
///
/// The node borrows the underlying blob; `offset` points at its
/// begin-node token.
#[derive(Clone, Copy)]
pub struct FdtNode<'a> {
    pub(crate) fdt: &'a Fdt<'a>,
    pub(crate) offset: usize,
}

impl<'a> FdtNode<'a> {
    /// Returns the name of this node. The root node's name is empty.
    ///
    /// # Errors
    ///
    /// Fails if the name is not valid NUL-terminated UTF-8.
    pub fn name(&self) -> crate::Result<&'a str> {
        self.fdt.cstr_at(self.offset + TOKEN_SIZE)
    }

    /// Looks up a property of this node by name.
    ///
    /// # Errors
    ///
    /// Fails only when the blob itself is malformed.
    pub fn property(&self, name: &str) -> crate::Result<Option<FdtProperty<'a>>> {
        for property in self.properties() {
            let property = property?;
            if property.name() == name {
                return Ok(Some(property));
            }
        }
        Ok(None)
    }

    /// Returns an iterator over the properties of this node.
    #[must_use]
    pub fn properties(&self) -> FdtProperties<'a> {
        FdtProperties::new(self.fdt, self.offset)
    }

    /// Looks up a direct child of this node by name.
    ///
    /// # Errors
    ///
    /// Fails only when the blob itself is malformed.
    pub fn child(&self, name: &str) -> crate::Result<Option<FdtNode<'a>>> {
        for child in self.children() {
            let child = child?;
            if child.name()? == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Returns an iterator over the direct children of this node, in
    /// blob order.
    #[must_use]
    pub fn children(&self) -> FdtChildren<'a> {
        FdtChildren {
            fdt: self.fdt,
            offset: self.offset,
            state: IterState::AtHeader,
        }
    }
}

impl core::fmt::Debug for FdtNode<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FdtNode")
            .field("offset", &self.offset)
            .field("name", &self.name().unwrap_or("<bad name>"))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IterState {
    /// Positioned at the parent's begin-node token.
    AtHeader,
    /// Positioned inside the parent's body.
    InBody,
    /// Exhausted, or a decoding error was already reported.
    Done,
}

/// Iterator over the direct children of a node.
#[derive(Debug)]
pub struct FdtChildren<'a> {
    fdt: &'a Fdt<'a>,
    offset: usize,
    state: IterState,
}

impl<'a> Iterator for FdtChildren<'a> {
    type Item = crate::Result<FdtNode<'a>>;

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
            Ok(Some(node)) => Some(Ok(node)),
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

impl<'a> FdtChildren<'a> {
    /// Advances past properties and nops until the next sibling node or
    /// the end of the parent's body.
    fn scan(&mut self) -> Result<Option<FdtNode<'a>>, FdtError> {
        loop {
            match self.fdt.token_at(self.offset)? {
                FdtToken::BeginNode => {
                    let node = FdtNode {
                        fdt: self.fdt,
                        offset: self.offset,
                    };
                    self.offset = self.fdt.skip_node(self.offset)?;
                    return Ok(Some(node));
                }
                FdtToken::Prop => self.offset = self.fdt.skip_property(self.offset)?,
                FdtToken::Nop => self.offset += TOKEN_SIZE,
                FdtToken::EndNode | FdtToken::End => return Ok(None),
            }
        }
    }
}
