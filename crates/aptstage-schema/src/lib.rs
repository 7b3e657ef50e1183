//! Manifest parsing and package classification for aptstage.
//!
//! This crate defines the schema layer: YAML manifest parsing (`Manifest`),
//! the dual-shape repository declaration (`Repository`), and the split of
//! declared package identifiers into direct `.deb` artifacts and
//! repository-resolved names (`PackageSet`).

pub mod manifest;
pub mod types;

pub use manifest::{parse_manifest_file, parse_manifest_str, Manifest, ManifestError, Repository};
pub use types::{ArtifactUrl, PackageName, PackageRef, PackageSet, DEB_SUFFIX};
