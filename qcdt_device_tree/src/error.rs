// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types for the `qcdt_device_tree` crate.

use core::fmt;

/// An error raised while decoding a device tree blob.
///
/// Carries the byte offset into the blob at which decoding failed, which
/// is usually the only useful lead when a blob is corrupt.
#[derive(Debug)]
#[non_exhaustive]
pub struct FdtError {
    offset: usize,
    /// What went wrong.
    pub kind: FdtErrorKind,
}

impl FdtError {
    pub(crate) fn new(kind: FdtErrorKind, offset: usize) -> Self {
        Self { offset, kind }
    }

    /// Byte offset into the blob at which the error was detected.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// The kind of a device tree decoding error.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum FdtErrorKind {
    /// The blob does not start with the FDT magic number.
    BadMagic,
    /// The blob declares a version this crate cannot read.
    UnsupportedVersion(u32),
    /// The blob is shorter than a length field claims.
    Truncated,
    /// A structure token with an unknown value was encountered.
    BadToken(u32),
    /// A node or property name is not valid NUL-terminated UTF-8.
    BadString,
}

impl fmt::Display for FdtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl fmt::Display for FdtErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdtErrorKind::BadMagic => write!(f, "bad FDT magic number"),
            FdtErrorKind::UnsupportedVersion(version) => {
                write!(f, "unsupported FDT version {version}")
            }
            FdtErrorKind::Truncated => write!(f, "FDT blob is truncated"),
            FdtErrorKind::BadToken(token) => write!(f, "bad FDT token 0x{token:x}"),
            FdtErrorKind::BadString => write!(f, "bad string in FDT blob"),
        }
    }
}

impl core::error::Error for FdtError {}
