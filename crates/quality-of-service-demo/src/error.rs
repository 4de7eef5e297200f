// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Demo error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while wiring or running a demo.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The runtime refused an operation.
    #[error("runtime error: {0}")]
    Runtime(#[from] hdds_qos::Error),

    /// Installing the Ctrl+C handler failed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    /// Logging was already initialized or the filter did not parse.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

/// Errors raised while reading the package descriptor or installing data files.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package.xml: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("package.xml is missing <{0}>")]
    MissingElement(&'static str),

    #[error("package.xml declares '{found}', expected '{expected}'")]
    NameMismatch { expected: String, found: String },
}

pub type Result<T> = std::result::Result<T, DemoError>;
