// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! qos-demo-install - install the quality_of_service_demo package data
//!
//! # Usage
//!
//! ```bash
//! # Install the resource-index marker and package.xml under /opt/ros
//! qos-demo-install --prefix /opt/ros
//!
//! # Show the console commands the package provides
//! qos-demo-install --list
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use quality_of_service_demo::manifest::{install_data_files, PackageManifest, ENTRY_POINTS};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "qos-demo-install")]
#[command(author = "naskel.com")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install the quality_of_service_demo data files")]
struct Cli {
    /// Install prefix (data files go under <prefix>/share)
    #[arg(short, long, required_unless_present = "list")]
    prefix: Option<PathBuf>,

    /// List the console entry points and exit
    #[arg(short, long)]
    list: bool,

    /// Verbose mode (log progress, print each installed file)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.list {
        let manifest = PackageManifest::bundled().context("Failed to read package.xml")?;
        println!("{} {}", manifest.name, manifest.version);
        for entry in ENTRY_POINTS.iter() {
            println!("  {}", entry);
        }
        return Ok(());
    }

    let prefix = cli.prefix.context("--prefix is required")?;
    let installed = install_data_files(&prefix)
        .with_context(|| format!("Failed to install under {}", prefix.display()))?;
    tracing::info!(count = installed.len(), prefix = %prefix.display(), "Installed data files");
    if cli.verbose {
        for path in &installed {
            println!("{}", path.display());
        }
    }
    Ok(())
}
