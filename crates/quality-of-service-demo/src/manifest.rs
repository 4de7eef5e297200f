// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Package manifest: console entry points and installed data files.
//!
//! The package registers exactly three commands and installs two data
//! files under the install prefix:
//!
//! ```text
//! <prefix>/share/ament_index/resource_index/packages/quality_of_service_demo
//! <prefix>/share/quality_of_service_demo/package.xml
//! ```

use crate::error::ManifestError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const PACKAGE_NAME: &str = "quality_of_service_demo";

/// The package descriptor, bundled at build time.
pub const PACKAGE_XML: &str = include_str!("../package.xml");

/// Console command mapped to a module-level `main`.
#[derive(Clone, Copy)]
pub struct EntryPoint {
    pub command: &'static str,
    pub target: &'static str,
    pub main: fn() -> anyhow::Result<()>,
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("command", &self.command)
            .field("target", &self.target)
            .finish()
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.command, self.target)
    }
}

pub static ENTRY_POINTS: [EntryPoint; 3] = [
    EntryPoint {
        command: "lifespan",
        target: "quality_of_service_demo::lifespan::main",
        main: crate::lifespan::main,
    },
    EntryPoint {
        command: "liveliness",
        target: "quality_of_service_demo::liveliness::main",
        main: crate::liveliness::main,
    },
    EntryPoint {
        command: "deadline",
        target: "quality_of_service_demo::deadline::main",
        main: crate::deadline::main,
    },
];

/// Look up an entry point by command name.
pub fn entry_point(command: &str) -> Option<&'static EntryPoint> {
    ENTRY_POINTS.iter().find(|e| e.command == command)
}

/// A file installed relative to the install prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFile {
    pub destination: &'static str,
    pub contents: &'static str,
}

pub static DATA_FILES: [DataFile; 2] = [
    // Resource-index marker; empty, its presence is what matters.
    DataFile {
        destination: "share/ament_index/resource_index/packages/quality_of_service_demo",
        contents: include_str!("../resource/quality_of_service_demo"),
    },
    DataFile {
        destination: "share/quality_of_service_demo/package.xml",
        contents: PACKAGE_XML,
    },
];

/// Fields of `package.xml` the install step relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,
    pub maintainers: Vec<String>,
    pub buildtool_depends: Vec<String>,
    pub test_depends: Vec<String>,
}

impl PackageManifest {
    pub fn parse(xml: &str) -> Result<Self, ManifestError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        if !root.has_tag_name("package") {
            return Err(ManifestError::MissingElement("package"));
        }

        let text_of = |tag: &'static str| -> Result<String, ManifestError> {
            root.children()
                .find(|n| n.has_tag_name(tag))
                .and_then(|n| n.text())
                .map(|t| t.trim().to_string())
                .ok_or(ManifestError::MissingElement(tag))
        };
        let all_of = |tag: &str| -> Vec<String> {
            root.children()
                .filter(|n| n.has_tag_name(tag))
                .filter_map(|n| n.text())
                .map(|t| t.trim().to_string())
                .collect()
        };

        Ok(Self {
            name: text_of("name")?,
            version: text_of("version")?,
            description: text_of("description")?,
            license: text_of("license")?,
            maintainers: all_of("maintainer"),
            buildtool_depends: all_of("buildtool_depend"),
            test_depends: all_of("test_depend"),
        })
    }

    /// The descriptor shipped with this package.
    pub fn bundled() -> Result<Self, ManifestError> {
        Self::parse(PACKAGE_XML)
    }
}

/// Install [`DATA_FILES`] under `prefix` and return the written paths.
pub fn install_data_files(prefix: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let manifest = PackageManifest::bundled()?;
    if manifest.name != PACKAGE_NAME {
        return Err(ManifestError::NameMismatch {
            expected: PACKAGE_NAME.to_string(),
            found: manifest.name,
        });
    }

    let mut installed = Vec::with_capacity(DATA_FILES.len());
    for file in &DATA_FILES {
        let path = prefix.join(file.destination);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ManifestError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, file.contents).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("[install] {}", path.display());
        installed.push(path);
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_three_entry_points() {
        let commands: Vec<&str> = ENTRY_POINTS.iter().map(|e| e.command).collect();
        assert_eq!(commands, vec!["lifespan", "liveliness", "deadline"]);
        for entry in &ENTRY_POINTS {
            assert!(entry.target.ends_with(&format!("::{}::main", entry.command)));
        }
        assert!(entry_point("deadline").is_some());
        assert!(entry_point("talker").is_none());
        assert_eq!(
            ENTRY_POINTS[0].to_string(),
            "lifespan = quality_of_service_demo::lifespan::main"
        );
    }

    #[test]
    fn test_bundled_manifest() {
        let manifest = PackageManifest::bundled().expect("valid package.xml");
        assert_eq!(manifest.name, PACKAGE_NAME);
        assert_eq!(manifest.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(manifest.license, "Apache-2.0");
        assert_eq!(manifest.license, env!("CARGO_PKG_LICENSE"));
        assert_eq!(manifest.buildtool_depends, vec!["cargo".to_string()]);
        assert_eq!(manifest.test_depends.len(), 1);
    }

    #[test]
    fn test_parse_rejects_incomplete_manifest() {
        let xml = r#"<package format="3"><name>x</name></package>"#;
        assert!(matches!(
            PackageManifest::parse(xml),
            Err(ManifestError::MissingElement("version"))
        ));
        assert!(matches!(
            PackageManifest::parse("<not-closed>"),
            Err(ManifestError::Xml(_))
        ));
        assert!(matches!(
            PackageManifest::parse("<project/>"),
            Err(ManifestError::MissingElement("package"))
        ));
    }

    #[test]
    fn test_resource_marker_is_empty() {
        assert!(DATA_FILES[0].contents.is_empty());
        assert!(DATA_FILES[1].contents.contains("<name>quality_of_service_demo</name>"));
    }
}
