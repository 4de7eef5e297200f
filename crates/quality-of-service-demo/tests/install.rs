// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure

//! Installed data files: resource-index marker and package descriptor.

use quality_of_service_demo::manifest::{install_data_files, PackageManifest, PACKAGE_NAME};
use std::fs;

#[test]
fn test_install_writes_marker_and_descriptor() {
    let prefix = tempfile::tempdir().expect("temp dir");
    let installed = install_data_files(prefix.path()).expect("install");
    assert_eq!(installed.len(), 2);

    let marker = prefix
        .path()
        .join("share/ament_index/resource_index/packages")
        .join(PACKAGE_NAME);
    assert!(marker.is_file());
    assert_eq!(fs::metadata(&marker).expect("marker").len(), 0);

    let descriptor = prefix
        .path()
        .join("share")
        .join(PACKAGE_NAME)
        .join("package.xml");
    let xml = fs::read_to_string(&descriptor).expect("descriptor");
    let manifest = PackageManifest::parse(&xml).expect("valid descriptor");
    assert_eq!(manifest.name, PACKAGE_NAME);

    assert!(installed.contains(&marker));
    assert!(installed.contains(&descriptor));
}

#[test]
fn test_install_is_repeatable() {
    let prefix = tempfile::tempdir().expect("temp dir");
    let first = install_data_files(prefix.path()).expect("install");
    let second = install_data_files(prefix.path()).expect("reinstall");
    assert_eq!(first, second);
}

#[test]
fn test_install_into_file_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("prefix");
    fs::write(&blocker, b"not a directory").expect("write");
    assert!(install_data_files(&blocker).is_err());
}
