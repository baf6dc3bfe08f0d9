// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Post-processing tools for Qualcomm boot firmware device tree blobs.
//!
//! A Qualcomm source blob encodes many board variants at once through the
//! `qcom,msm-id`, `qcom,board-id` and `qcom,pmic-id` root properties. The
//! modules here decode those encodings into concrete variant records
//! ([`variant`]), prune the tree down to the subtrees early boot cares
//! about ([`prune`]), stamp each variant's identity back into the tree
//! ([`patch`]) and emit one numbered blob per variant ([`pipeline`]).
//!
//! Two companion formats are handled as well: the legacy QCDT container
//! table ([`qcdt`]) and plain concatenations of blobs ([`split`]).

pub mod error;
pub mod patch;
pub mod pipeline;
pub mod prune;
pub mod qcdt;
pub mod split;
pub mod variant;

pub use error::Error;
