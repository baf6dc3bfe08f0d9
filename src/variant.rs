// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoding of Qualcomm identifier properties into variant records.
//!
//! A source blob tags itself with up to three flat cell arrays at the
//! root. Which of them are present decides the encoding format:
//!
//! - format 1: `qcom,msm-id` alone, entries of 3 or 4 words, one variant
//!   per entry;
//! - format 2: `qcom,msm-id` as `(chipset, revision)` pairs plus
//!   `qcom,board-id` as `(platform, subtype)` pairs, variants being the
//!   cross product of the two lists;
//! - format 3: format 2 plus `qcom,pmic-id` quads, a three-way cross
//!   product.
//!
//! The enumeration order is load-bearing: output files are numbered by
//! it, and downstream consumers index them positionally. The cross
//! product iterates chipset-major, board-mid, pmic-minor, each list in
//! source order.

use log::debug;
use qcdt_device_tree::fdt::Fdt;

use crate::error::Error;

/// Root property holding chipset identifier entries.
pub const MSM_ID: &str = "qcom,msm-id";
/// Root property holding board variant pairs (formats 2 and 3).
pub const BOARD_ID: &str = "qcom,board-id";
/// Root property holding PMIC revision quads (format 3 only).
pub const PMIC_ID: &str = "qcom,pmic-id";

/// The identifier encoding format of a source blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdFormat {
    /// `qcom,msm-id` only, self-contained entries.
    V1,
    /// `qcom,msm-id` and `qcom,board-id` pair lists.
    V2,
    /// All three identifier properties.
    V3,
}

impl IdFormat {
    /// The wire-format version number of this format.
    #[must_use]
    pub fn number(self) -> u32 {
        match self {
            IdFormat::V1 => 1,
            IdFormat::V2 => 2,
            IdFormat::V3 => 3,
        }
    }
}

/// One decoded chipset identifier entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipIdentifier {
    /// Chipset (SoC) id.
    pub chipset: u32,
    /// SoC silicon revision.
    pub revision: u32,
    /// Extra revision word, present only for 4-word format-1 entries.
    pub extended_revision: Option<u32>,
}

/// One decoded board variant pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardVariant {
    /// Platform (board) id.
    pub platform: u32,
    /// Platform subtype.
    pub subtype: u32,
}

/// One decoded PMIC revision quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerVariant {
    /// The four PMIC revision slots.
    pub pmic: [u32; 4],
}

/// One concrete hardware variant, normalized across formats.
///
/// The optional fields mirror the format: `extended_revision` is `Some`
/// only for 4-word format-1 entries, `pmic` only for format 3. The
/// patcher rejects records whose options contradict their format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVariant {
    /// The encoding format this record was decoded from.
    pub format: IdFormat,
    /// Chipset (SoC) id.
    pub chipset: u32,
    /// Platform (board) id.
    pub platform: u32,
    /// Platform subtype.
    pub subtype: u32,
    /// SoC silicon revision.
    pub revision: u32,
    /// Extra revision word (format 1, 4-word stride only).
    pub extended_revision: Option<u32>,
    /// PMIC revision quad (format 3 only).
    pub pmic: Option<[u32; 4]>,
}

/// A source of variant records for the emission pipeline.
///
/// The built-in decoder is [`QcomVariantParser`]; vendors with their own
/// identifier layout provide an implementation honoring the same
/// ordering contract (records in enumeration order, one output file
/// each).
pub trait VariantParser {
    /// Decodes the identifier properties of `fdt` into an ordered list
    /// of variant records.
    ///
    /// # Errors
    ///
    /// Fails when no known identifier layout matches or a property is
    /// malformed or empty.
    fn enumerate(&self, fdt: &Fdt<'_>) -> Result<Vec<ResolvedVariant>, Error>;
}

/// The standard Qualcomm identifier decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct QcomVariantParser;

impl VariantParser for QcomVariantParser {
    fn enumerate(&self, fdt: &Fdt<'_>) -> Result<Vec<ResolvedVariant>, Error> {
        enumerate_variants(fdt)
    }
}

/// Decides the encoding format from which identifier properties the root
/// carries.
///
/// # Errors
///
/// Fails with [`Error::Format`] when the combination matches no format,
/// e.g. a board id without a chipset id.
pub fn detect_format(fdt: &Fdt<'_>) -> Result<IdFormat, Error> {
    let root = fdt.root()?;
    let msm = root.property(MSM_ID)?.is_some();
    let board = root.property(BOARD_ID)?.is_some();
    let pmic = root.property(PMIC_ID)?.is_some();
    match (msm, board, pmic) {
        (true, false, false) => Ok(IdFormat::V1),
        (true, true, false) => Ok(IdFormat::V2),
        (true, true, true) => Ok(IdFormat::V3),
        _ => Err(Error::Format),
    }
}

/// Decodes the identifier properties of `fdt` into variant records, in
/// enumeration order.
///
/// # Errors
///
/// Fails when the format is unrecognizable, an array length does not
/// match its stride, or a required list is empty.
pub fn enumerate_variants(fdt: &Fdt<'_>) -> Result<Vec<ResolvedVariant>, Error> {
    let format = detect_format(fdt)?;
    debug!("identifier format {}", format.number());
    let variants = match format {
        IdFormat::V1 => decode_v1(&root_cells(fdt, MSM_ID)?)?,
        IdFormat::V2 | IdFormat::V3 => {
            let chips = decode_chips(&root_cells(fdt, MSM_ID)?)?;
            let boards = decode_boards(&root_cells(fdt, BOARD_ID)?)?;
            let power = if format == IdFormat::V3 {
                Some(decode_power(&root_cells(fdt, PMIC_ID)?)?)
            } else {
                None
            };
            cross_product(format, &chips, &boards, power.as_deref())
        }
    };
    debug!("decoded {} variants", variants.len());
    Ok(variants)
}

fn root_cells(fdt: &Fdt<'_>, name: &'static str) -> Result<Vec<u32>, Error> {
    let prop = fdt.root()?.property(name)?.ok_or(Error::Format)?;
    let cells = prop.cells().map_err(|_| Error::MalformedProperty {
        name,
        len: prop.value().len(),
    })?;
    Ok(cells.collect())
}

/// Format 1: self-contained entries of `(chipset, platform, revision)`
/// or `(chipset, platform, revision, extended_revision)`.
fn decode_v1(cells: &[u32]) -> Result<Vec<ResolvedVariant>, Error> {
    if cells.is_empty() {
        return Err(Error::EmptyVariantSet(MSM_ID));
    }
    // A length divisible by both strides decodes as the short one.
    let stride = if cells.len().is_multiple_of(3) {
        3
    } else if cells.len().is_multiple_of(4) {
        4
    } else {
        return Err(Error::MalformedProperty {
            name: MSM_ID,
            len: cells.len() * 4,
        });
    };
    Ok(cells
        .chunks_exact(stride)
        .map(|entry| ResolvedVariant {
            format: IdFormat::V1,
            chipset: entry[0],
            platform: entry[1],
            subtype: 0,
            revision: entry[2],
            extended_revision: (stride == 4).then(|| entry[3]),
            pmic: None,
        })
        .collect())
}

fn decode_chips(cells: &[u32]) -> Result<Vec<ChipIdentifier>, Error> {
    if !cells.len().is_multiple_of(2) {
        return Err(Error::MalformedProperty {
            name: MSM_ID,
            len: cells.len() * 4,
        });
    }
    if cells.is_empty() {
        return Err(Error::EmptyVariantSet(MSM_ID));
    }
    Ok(cells
        .chunks_exact(2)
        .map(|pair| ChipIdentifier {
            chipset: pair[0],
            revision: pair[1],
            extended_revision: None,
        })
        .collect())
}

fn decode_boards(cells: &[u32]) -> Result<Vec<BoardVariant>, Error> {
    if !cells.len().is_multiple_of(2) {
        return Err(Error::MalformedProperty {
            name: BOARD_ID,
            len: cells.len() * 4,
        });
    }
    if cells.is_empty() {
        return Err(Error::EmptyVariantSet(BOARD_ID));
    }
    Ok(cells
        .chunks_exact(2)
        .map(|pair| BoardVariant {
            platform: pair[0],
            subtype: pair[1],
        })
        .collect())
}

fn decode_power(cells: &[u32]) -> Result<Vec<PowerVariant>, Error> {
    if !cells.len().is_multiple_of(4) {
        return Err(Error::MalformedProperty {
            name: PMIC_ID,
            len: cells.len() * 4,
        });
    }
    if cells.is_empty() {
        return Err(Error::EmptyVariantSet(PMIC_ID));
    }
    Ok(cells
        .chunks_exact(4)
        .map(|quad| PowerVariant {
            pmic: [quad[0], quad[1], quad[2], quad[3]],
        })
        .collect())
}

/// Chipset-major, board-mid, pmic-minor; the board and pmic loops
/// restart for every outer entry.
fn cross_product(
    format: IdFormat,
    chips: &[ChipIdentifier],
    boards: &[BoardVariant],
    power: Option<&[PowerVariant]>,
) -> Vec<ResolvedVariant> {
    let mut variants = Vec::new();
    for chip in chips {
        for board in boards {
            match power {
                Some(power) => {
                    for quad in power {
                        variants.push(resolve(format, chip, board, Some(quad)));
                    }
                }
                None => variants.push(resolve(format, chip, board, None)),
            }
        }
    }
    variants
}

fn resolve(
    format: IdFormat,
    chip: &ChipIdentifier,
    board: &BoardVariant,
    power: Option<&PowerVariant>,
) -> ResolvedVariant {
    ResolvedVariant {
        format,
        chipset: chip.chipset,
        platform: board.platform,
        subtype: board.subtype,
        revision: chip.revision,
        extended_revision: chip.extended_revision,
        pmic: power.map(|quad| quad.pmic),
    }
}
