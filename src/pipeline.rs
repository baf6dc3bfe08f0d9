// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The per-tree driver: decode, prune once, then patch and emit one
//! blob per variant.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use qcdt_device_tree::fdt::Fdt;
use qcdt_device_tree::model::DeviceTree;

use crate::error::Error;
use crate::patch::patch_variant;
use crate::prune::{self, BOOT_WHITELIST};
use crate::variant::VariantParser;

/// Confirms `outdir` is an existing, writable directory by creating and
/// removing a scratch file in it.
///
/// Emission happens long after inputs were read and decoded, so callers
/// run this before touching any input.
///
/// # Errors
///
/// Fails when `outdir` is not a directory or cannot be written to.
pub fn ensure_output_dir(outdir: &Path) -> Result<(), Error> {
    if !outdir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotADirectory,
            format!("{} is not a directory", outdir.display()),
        )));
    }
    let scratch = outdir.join(format!(".writecheck-{}", std::process::id()));
    fs::write(&scratch, [])?;
    fs::remove_file(&scratch)?;
    Ok(())
}

/// Processes one source blob: enumerates its variants, optionally prunes
/// the working copy, and writes one `<counter>.dtb` file per variant
/// into `outdir`, advancing `counter` for each.
///
/// The counter is owned by the invocation, not the input tree, so
/// output indices stay contiguous across a whole batch.
///
/// # Errors
///
/// Any decode, prune, patch or write failure aborts immediately; a
/// partially specialized output set must not pass as complete.
pub fn process_tree(
    blob: &[u8],
    outdir: &Path,
    counter: &mut u32,
    prune_tree: bool,
    parser: &dyn VariantParser,
) -> Result<(), Error> {
    let fdt = Fdt::new(blob)?;
    let variants = parser.enumerate(&fdt)?;
    let mut tree = DeviceTree::from_fdt(&fdt)?;

    if prune_tree {
        // Classification queries the original blob; removal mutates the
        // copy. Runs once, before any variant is emitted.
        let decisions = prune::classify(&fdt, &BOOT_WHITELIST)?;
        prune::prune(&mut tree, &decisions)?;
    }

    for variant in &variants {
        patch_variant(&mut tree, variant)?;
        let out_path = outdir.join(format!("{counter}.dtb"));
        fs::write(&out_path, tree.to_dtb())?;
        info!(
            "wrote {} (chipset {:#x} platform {:#x} subtype {:#x} rev {:#x})",
            out_path.display(),
            variant.chipset,
            variant.platform,
            variant.subtype,
            variant.revision,
        );
        *counter += 1;
    }
    Ok(())
}

/// Processes a `.dtb` file, or every `.dtb` file in a directory (in
/// sorted name order, for stable output indices). Returns the number of
/// blobs emitted.
///
/// # Errors
///
/// One input's failure aborts the whole batch.
pub fn process_path(
    input: &Path,
    outdir: &Path,
    prune_tree: bool,
    parser: &dyn VariantParser,
) -> Result<u32, Error> {
    let mut counter = 0;
    if input.is_dir() {
        let mut paths: Vec<PathBuf> = fs::read_dir(input)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        paths.sort();
        for path in paths {
            if path.extension().is_some_and(|ext| ext == "dtb") {
                debug!("processing {}", path.display());
                let blob = fs::read(&path)?;
                process_tree(&blob, outdir, &mut counter, prune_tree, parser)?;
            }
        }
    } else {
        let blob = fs::read(input)?;
        process_tree(&blob, outdir, &mut counter, prune_tree, parser)?;
    }
    Ok(counter)
}
