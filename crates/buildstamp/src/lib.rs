//! Build metadata from packaging manifests.
//!
//! Locates the `META-INF/MANIFEST.MF` that governs a compiled unit, loaded
//! either from a loose directory or from inside an archive, and reads its
//! `Implementation-Version` and `Build-Time` attributes.

pub mod error;
pub mod locator;
pub mod manifest;
pub mod resolver;
pub mod source;

pub use error::{ManifestError, ManifestResult};
pub use locator::{manifest_location, resolve_manifest_path, ArtifactRef, ManifestPath};
pub use manifest::{parse_manifest, Attributes, Manifest};
pub use resolver::{
    BuildInfo, ManifestResolver, MissingManifestPolicy, ResolverConfig, NO_MANIFEST_PLACEHOLDER,
};
pub use source::read_manifest;
