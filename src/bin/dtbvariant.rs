// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Expands multi-variant Qualcomm device tree blobs into one specialized
//! blob per hardware variant.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use qcdt_tools::pipeline;
use qcdt_tools::variant::QcomVariantParser;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// A .dtb file, or a directory of .dtb files.
    input: PathBuf,
    /// Existing directory receiving the numbered output blobs.
    output_dir: PathBuf,
    /// Pass "1" to prune the trees down to the early-boot whitelist;
    /// anything else skips pruning.
    prune: String,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    pipeline::ensure_output_dir(&args.output_dir).with_context(|| {
        format!("output directory {} is not usable", args.output_dir.display())
    })?;

    let count = pipeline::process_path(
        &args.input,
        &args.output_dir,
        args.prune == "1",
        &QcomVariantParser,
    )
    .with_context(|| format!("failed to process {}", args.input.display()))?;
    log::info!("emitted {count} device tree blobs");
    Ok(())
}
