// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The legacy QCDT container table.
//!
//! A QCDT image opens with a little-endian header (`"QCDT"` magic,
//! version, entry count) followed by `num_entries` fixed-size records;
//! each record carries identifier fields plus an offset/size pair
//! pointing at a blob elsewhere in the same image. Versions differ only
//! in record width: v1 is 20 bytes, v2 adds a subtype word, v3 adds four
//! PMIC words.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::{debug, info};
use thiserror::Error;
use zerocopy::byteorder::little_endian;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// `"QCDT"` read as a little-endian word.
pub const QCDT_MAGIC: u32 = u32::from_le_bytes(*b"QCDT");

/// Failures while decoding a QCDT image.
#[derive(Debug, Error)]
pub enum QcdtError {
    /// The image does not open with the QCDT magic.
    #[error("not a QCDT image")]
    BadMagic,

    /// The header declares a table version this module does not know.
    #[error("unsupported QCDT table version {0}")]
    UnsupportedVersion(u32),

    /// The image ends inside the entry table.
    #[error("table truncated at entry {0}")]
    TruncatedTable(usize),

    /// An entry's offset/size range falls outside the image.
    #[error("entry {index} points outside the image ({offset:#x}+{size:#x})")]
    EntryOutOfBounds {
        /// Index of the offending entry.
        index: usize,
        /// Its declared blob offset.
        offset: usize,
        /// Its declared blob size.
        size: usize,
    },

    /// Writing an extracted blob failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[repr(C)]
#[derive(Debug, Copy, Clone, FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout)]
struct QcdtHeader {
    magic: little_endian::U32,
    version: little_endian::U32,
    num_entries: little_endian::U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout)]
struct EntryV1 {
    platform_id: little_endian::U32,
    variant_id: little_endian::U32,
    soc_rev: little_endian::U32,
    offset: little_endian::U32,
    size: little_endian::U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout)]
struct EntryV2 {
    platform_id: little_endian::U32,
    variant_id: little_endian::U32,
    subtype_id: little_endian::U32,
    soc_rev: little_endian::U32,
    offset: little_endian::U32,
    size: little_endian::U32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, FromBytes, IntoBytes, Unaligned, Immutable, KnownLayout)]
struct EntryV3 {
    platform_id: little_endian::U32,
    variant_id: little_endian::U32,
    subtype_id: little_endian::U32,
    soc_rev: little_endian::U32,
    pmic: [little_endian::U32; 4],
    offset: little_endian::U32,
    size: little_endian::U32,
}

/// One table entry, normalized across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DtEntry {
    /// Platform (board) id.
    pub platform_id: u32,
    /// Raw variant id word.
    pub variant_id: u32,
    /// Platform subtype; see [`parse_table`] for how it is derived.
    pub subtype: u32,
    /// SoC silicon revision.
    pub soc_rev: u32,
    /// PMIC revisions, zero below v3.
    pub pmic: [u32; 4],
    /// Blob offset within the image.
    pub offset: usize,
    /// Blob size in bytes.
    pub size: usize,
}

/// Decodes the header and entry table of a QCDT image.
///
/// v1 entries carry no subtype field, so the subtype is recovered from
/// the top byte of `variant_id`; v2/v3 entries fall back to that byte
/// only when their own subtype word is zero.
///
/// # Errors
///
/// Fails on a bad magic, an unknown version, or a truncated table.
pub fn parse_table(image: &[u8]) -> Result<Vec<DtEntry>, QcdtError> {
    let (header, mut rest) = QcdtHeader::ref_from_prefix(image).map_err(|_| QcdtError::BadMagic)?;
    if header.magic.get() != QCDT_MAGIC {
        return Err(QcdtError::BadMagic);
    }
    let version = header.version.get();
    if !(1..=3).contains(&version) {
        return Err(QcdtError::UnsupportedVersion(version));
    }

    let count = header.num_entries.get() as usize;
    debug!("QCDT v{version} table with {count} entries");

    // The declared count is untrusted input; bound it against the bytes
    // actually present before it sizes anything.
    let entry_size = match version {
        1 => size_of::<EntryV1>(),
        2 => size_of::<EntryV2>(),
        _ => size_of::<EntryV3>(),
    };
    if count > rest.len() / entry_size {
        return Err(QcdtError::TruncatedTable(rest.len() / entry_size));
    }

    let mut entries = Vec::with_capacity(count);
    for index in 0..count {
        let entry = match version {
            1 => {
                let (e, tail) = EntryV1::ref_from_prefix(rest)
                    .map_err(|_| QcdtError::TruncatedTable(index))?;
                rest = tail;
                DtEntry {
                    platform_id: e.platform_id.get(),
                    variant_id: e.variant_id.get(),
                    subtype: e.variant_id.get() >> 24,
                    soc_rev: e.soc_rev.get(),
                    pmic: [0; 4],
                    offset: e.offset.get() as usize,
                    size: e.size.get() as usize,
                }
            }
            2 => {
                let (e, tail) = EntryV2::ref_from_prefix(rest)
                    .map_err(|_| QcdtError::TruncatedTable(index))?;
                rest = tail;
                DtEntry {
                    platform_id: e.platform_id.get(),
                    variant_id: e.variant_id.get(),
                    subtype: derive_subtype(e.subtype_id.get(), e.variant_id.get()),
                    soc_rev: e.soc_rev.get(),
                    pmic: [0; 4],
                    offset: e.offset.get() as usize,
                    size: e.size.get() as usize,
                }
            }
            _ => {
                let (e, tail) = EntryV3::ref_from_prefix(rest)
                    .map_err(|_| QcdtError::TruncatedTable(index))?;
                rest = tail;
                DtEntry {
                    platform_id: e.platform_id.get(),
                    variant_id: e.variant_id.get(),
                    subtype: derive_subtype(e.subtype_id.get(), e.variant_id.get()),
                    soc_rev: e.soc_rev.get(),
                    pmic: e.pmic.map(|p| p.get()),
                    offset: e.offset.get() as usize,
                    size: e.size.get() as usize,
                }
            }
        };
        entries.push(entry);
    }
    Ok(entries)
}

fn derive_subtype(subtype_id: u32, variant_id: u32) -> u32 {
    if subtype_id == 0 { variant_id >> 24 } else { subtype_id }
}

/// Extracts every blob referenced by the table into
/// `<outdir>/<entry-index>.dtb`. Entries sharing a blob offset are
/// written once, under the first entry's index. Returns the number of
/// files written.
///
/// # Errors
///
/// Fails on any table decode error, an out-of-bounds blob range, or a
/// write failure.
pub fn extract(image: &[u8], outdir: &Path) -> Result<u32, QcdtError> {
    let entries = parse_table(image)?;
    let mut seen = HashSet::new();
    let mut written = 0;
    for (index, entry) in entries.iter().enumerate() {
        if !seen.insert(entry.offset) {
            debug!("entry {index} shares offset {:#x}, skipped", entry.offset);
            continue;
        }
        let end = entry
            .offset
            .checked_add(entry.size)
            .filter(|end| *end <= image.len())
            .ok_or(QcdtError::EntryOutOfBounds {
                index,
                offset: entry.offset,
                size: entry.size,
            })?;
        fs::write(
            outdir.join(format!("{index}.dtb")),
            &image[entry.offset..end],
        )?;
        info!(
            "entry {index}: platform {:#x} subtype {:#x} rev {:#x}, {} bytes",
            entry.platform_id, entry.subtype, entry.soc_rev, entry.size,
        );
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    fn image(version: u32, entry_words: &[&[u32]], payload: &[u8]) -> Vec<u8> {
        let mut image = le(&[QCDT_MAGIC, version, entry_words.len() as u32]);
        for words in entry_words {
            image.extend_from_slice(&le(words));
        }
        image.extend_from_slice(payload);
        image
    }

    #[test]
    fn v1_subtype_comes_from_variant_id() {
        let image = image(1, &[&[8, 0x0700_0001, 2, 32, 4]], &[0u8; 16]);
        let entries = parse_table(&image).unwrap();
        assert_eq!(
            entries,
            [DtEntry {
                platform_id: 8,
                variant_id: 0x0700_0001,
                subtype: 7,
                soc_rev: 2,
                pmic: [0; 4],
                offset: 32,
                size: 4,
            }]
        );
    }

    #[test]
    fn v2_subtype_field_wins_unless_zero() {
        let image = image(
            2,
            &[&[8, 0x0700_0001, 5, 2, 60, 4], &[8, 0x0700_0001, 0, 2, 60, 4]],
            &[0u8; 16],
        );
        let entries = parse_table(&image).unwrap();
        assert_eq!(entries[0].subtype, 5);
        assert_eq!(entries[1].subtype, 7);
    }

    #[test]
    fn v3_entries_carry_pmic_revisions() {
        let image = image(3, &[&[8, 1, 5, 2, 11, 12, 13, 14, 52, 4]], &[0u8; 16]);
        let entries = parse_table(&image).unwrap();
        assert_eq!(entries[0].pmic, [11, 12, 13, 14]);
    }

    #[test]
    fn bad_magic_and_bad_version_are_rejected() {
        assert!(matches!(parse_table(b"FDTQ"), Err(QcdtError::BadMagic)));
        let image = image(4, &[], &[]);
        assert!(matches!(
            parse_table(&image),
            Err(QcdtError::UnsupportedVersion(4))
        ));
    }

    #[test]
    fn huge_entry_count_is_an_error_not_an_allocation() {
        // A bare header whose count field promises four billion entries.
        let image = le(&[QCDT_MAGIC, 2, u32::MAX]);
        assert!(matches!(
            parse_table(&image),
            Err(QcdtError::TruncatedTable(0))
        ));
    }

    #[test]
    fn short_table_is_truncated() {
        let mut image = image(1, &[&[8, 1, 2, 32, 4]], &[]);
        image.truncate(20);
        assert!(matches!(
            parse_table(&image),
            Err(QcdtError::TruncatedTable(0))
        ));
    }
}
