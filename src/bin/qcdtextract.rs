// Copyright 2026 The qcdt-tools Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Extracts the device tree blobs referenced by a QCDT container table.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use qcdt_tools::{pipeline, qcdt};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// A QCDT image.
    image: PathBuf,
    /// Existing directory receiving the extracted blobs.
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    pipeline::ensure_output_dir(&args.output_dir).with_context(|| {
        format!("output directory {} is not usable", args.output_dir.display())
    })?;

    let image = fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;
    let count = qcdt::extract(&image, &args.output_dir)?;
    log::info!("extracted {count} device tree blobs");
    Ok(())
}
