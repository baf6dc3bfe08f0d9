// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stamping one variant's identity into the working tree.
//!
//! Every write replaces the full property value, so patching variant
//! *i + 1* after variant *i* needs no rollback: nothing of the previous
//! value survives.

use qcdt_device_tree::model::DeviceTree;
use zerocopy::byteorder::big_endian;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::Error;
use crate::variant::{BOARD_ID, IdFormat, MSM_ID, PMIC_ID, ResolvedVariant};

/// Root property carrying the resolved identity record of an emitted
/// blob, so downstream boot stages need not re-decode the arrays.
pub const SOC_INFO_PROP: &str = "qcdt,soc-info";

/// The fixed 36-byte resolved identity record, nine big-endian words.
///
/// Fields a format leaves undefined are written as zero.
#[repr(C)]
#[derive(Debug, Copy, Clone, FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout)]
pub struct SocInfo {
    /// Identifier format version (1, 2 or 3).
    pub version: big_endian::U32,
    /// Chipset (SoC) id.
    pub chipset: big_endian::U32,
    /// Platform (board) id.
    pub platform: big_endian::U32,
    /// Platform subtype.
    pub subtype: big_endian::U32,
    /// SoC silicon revision.
    pub revision: big_endian::U32,
    /// PMIC revision slots, zero below format 3.
    pub pmic: [big_endian::U32; 4],
}

impl From<&ResolvedVariant> for SocInfo {
    fn from(variant: &ResolvedVariant) -> Self {
        let pmic = variant.pmic.unwrap_or_default();
        SocInfo {
            version: variant.format.number().into(),
            chipset: variant.chipset.into(),
            platform: variant.platform.into(),
            subtype: variant.subtype.into(),
            revision: variant.revision.into(),
            pmic: pmic.map(Into::into),
        }
    }
}

/// Overwrites the root identifier properties of `tree` to describe
/// exactly `variant`, then writes the [`SocInfo`] record.
///
/// # Errors
///
/// Fails with [`Error::Patch`] when the record's optional fields
/// contradict its declared format.
pub fn patch_variant(tree: &mut DeviceTree, variant: &ResolvedVariant) -> Result<(), Error> {
    check_consistency(variant)?;

    let root = tree.root_mut();
    match variant.format {
        IdFormat::V1 => {
            let mut words = vec![variant.chipset, variant.platform, variant.revision];
            if let Some(extended) = variant.extended_revision {
                words.push(extended);
            }
            root.set_property(MSM_ID, cells(&words));
        }
        IdFormat::V2 | IdFormat::V3 => {
            root.set_property(MSM_ID, cells(&[variant.chipset, variant.revision]));
            root.set_property(BOARD_ID, cells(&[variant.platform, variant.subtype]));
            if let Some(pmic) = variant.pmic {
                root.set_property(PMIC_ID, cells(&pmic));
            }
        }
    }

    root.set_property(SOC_INFO_PROP, SocInfo::from(variant).as_bytes());
    Ok(())
}

fn check_consistency(variant: &ResolvedVariant) -> Result<(), Error> {
    let patch_error = |field| Error::Patch {
        format: variant.format.number(),
        field,
    };
    match variant.format {
        IdFormat::V1 => {
            if variant.pmic.is_some() {
                return Err(patch_error("pmic"));
            }
        }
        IdFormat::V2 => {
            if variant.pmic.is_some() {
                return Err(patch_error("pmic"));
            }
            if variant.extended_revision.is_some() {
                return Err(patch_error("extended revision"));
            }
        }
        IdFormat::V3 => {
            if variant.pmic.is_none() {
                return Err(patch_error("pmic"));
            }
            if variant.extended_revision.is_some() {
                return Err(patch_error("extended revision"));
            }
        }
    }
    Ok(())
}

fn cells(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use qcdt_device_tree::model::DeviceTreeNode;

    use super::*;

    fn v2_variant(chipset: u32, platform: u32) -> ResolvedVariant {
        ResolvedVariant {
            format: IdFormat::V2,
            chipset,
            platform,
            subtype: platform + 1,
            revision: chipset + 1,
            extended_revision: None,
            pmic: None,
        }
    }

    #[test]
    fn soc_info_is_nine_big_endian_words() {
        let variant = ResolvedVariant {
            format: IdFormat::V3,
            chipset: 0x0102_0304,
            platform: 5,
            subtype: 6,
            revision: 7,
            extended_revision: None,
            pmic: Some([8, 9, 10, 11]),
        };
        let info = SocInfo::from(&variant);
        let bytes = info.as_bytes();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[..8], [0, 0, 0, 3, 1, 2, 3, 4]);
        assert_eq!(&bytes[32..], 11u32.to_be_bytes());
    }

    #[test]
    fn v1_extended_entry_writes_four_words() {
        let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
        let variant = ResolvedVariant {
            format: IdFormat::V1,
            chipset: 126,
            platform: 8,
            subtype: 0,
            revision: 0x10000,
            extended_revision: Some(7),
            pmic: None,
        };
        patch_variant(&mut tree, &variant).unwrap();

        let msm = tree.root().property(MSM_ID).unwrap();
        assert_eq!(msm.value(), cells(&[126, 8, 0x10000, 7]));
        assert!(tree.root().property(BOARD_ID).is_none());
        assert_eq!(tree.root().property(SOC_INFO_PROP).unwrap().value().len(), 36);
    }

    #[test]
    fn second_patch_leaves_no_residue() {
        let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
        patch_variant(&mut tree, &v2_variant(1, 100)).unwrap();
        patch_variant(&mut tree, &v2_variant(2, 200)).unwrap();

        let root = tree.root();
        assert_eq!(root.property(MSM_ID).unwrap().value(), cells(&[2, 3]));
        assert_eq!(root.property(BOARD_ID).unwrap().value(), cells(&[200, 201]));
        let info = SocInfo::ref_from_bytes(root.property(SOC_INFO_PROP).unwrap().value()).unwrap();
        assert_eq!(info.chipset.get(), 2);
        assert_eq!(info.platform.get(), 200);
    }

    #[test]
    fn v3_record_without_pmic_is_rejected() {
        let mut tree = DeviceTree::new(DeviceTreeNode::new(""));
        let variant = ResolvedVariant {
            format: IdFormat::V3,
            pmic: None,
            ..v2_variant(1, 100)
        };
        assert!(matches!(
            patch_variant(&mut tree, &variant),
            Err(Error::Patch { format: 3, .. })
        ));
        // Nothing was written.
        assert!(tree.root().property(SOC_INFO_PROP).is_none());
    }
}
