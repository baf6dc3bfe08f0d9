// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types for the variant-emission pipeline.

use qcdt_device_tree::FdtError;
use thiserror::Error;

/// Any failure while decoding, pruning, patching or emitting a tree.
#[derive(Debug, Error)]
pub enum Error {
    /// The root properties match none of the known identifier layouts.
    #[error("no recognizable combination of identifier properties at the tree root")]
    Format,

    /// An identifier array is not a whole number of entries.
    #[error("property {name:?} has a malformed length of {len} bytes")]
    MalformedProperty {
        /// Name of the offending property.
        name: &'static str,
        /// Its byte length.
        len: usize,
    },

    /// A required identifier list decoded to zero entries.
    #[error("property {0:?} declares a format but no variants")]
    EmptyVariantSet(&'static str),

    /// Node nesting exceeded the traversal bound.
    #[error("node {path:?} exceeds the maximum nesting depth")]
    TreeTooDeep {
        /// Path of the node at which the bound was exceeded.
        path: String,
    },

    /// A removal decision could not be applied.
    #[error("cannot prune {path:?}")]
    Prune {
        /// The path that failed to prune.
        path: String,
    },

    /// A variant record defines fields its format does not allow, or
    /// misses fields its format requires.
    #[error("format {format} variant record has inconsistent {field} fields")]
    Patch {
        /// The record's declared format number.
        format: u32,
        /// The field group that disagrees with the format.
        field: &'static str,
    },

    /// The source blob is not a valid device tree.
    #[error(transparent)]
    Fdt(#[from] FdtError),

    /// Reading an input or writing an output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
