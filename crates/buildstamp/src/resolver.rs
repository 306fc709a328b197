//! Manifest Resolver
//!
//! Resolves the implementation version and build timestamp recorded in the
//! packaging manifest of a compiled unit. Resolution runs on construction and
//! never fails: every error degrades to a sentinel value plus a log line.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info_span};

use crate::error::ManifestError;
use crate::locator::{resolve_manifest_path, ArtifactRef, ManifestPath};
use crate::manifest::{BUILD_TIME, IMPLEMENTATION_VERSION};
use crate::source::read_manifest;

/// Value reported for a manifest that does not exist, under
/// [`MissingManifestPolicy::Placeholder`]
pub const NO_MANIFEST_PLACEHOLDER: &str = "Read {JUnitTestMode}: {?}";

/// How a manifest that does not exist is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingManifestPolicy {
    /// Report [`NO_MANIFEST_PLACEHOLDER`], e.g. when running from unpackaged
    /// test output
    #[default]
    Placeholder,
    /// Treat it like any other read failure: log it and report `""`
    Empty,
}

/// Resolver settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    pub missing_manifest: MissingManifestPolicy,
    /// Prepended to every log message
    pub log_prefix: Option<String>,
}

impl ResolverConfig {
    pub fn with_missing_manifest(mut self, policy: MissingManifestPolicy) -> Self {
        self.missing_manifest = policy;
        self
    }

    pub fn with_log_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_prefix = Some(prefix.into());
        self
    }
}

/// Snapshot of resolved build metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: Option<String>,
    pub timestamp: Option<String>,
}

impl BuildInfo {
    /// Build timestamp parsed as RFC 3339, if it is one
    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        let timestamp = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(timestamp.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Reads version metadata from the manifest governing an artifact
#[derive(Debug)]
pub struct ManifestResolver {
    artifact: ArtifactRef,
    config: ResolverConfig,
    version: Option<String>,
    timestamp: Option<String>,
    manifest_reads: usize,
}

impl ManifestResolver {
    /// Create a resolver and resolve immediately
    pub fn new(artifact: ArtifactRef, config: ResolverConfig) -> Self {
        let mut resolver = Self {
            artifact,
            config,
            version: None,
            timestamp: None,
            manifest_reads: 0,
        };
        resolver.resolve();
        resolver
    }

    /// Resolve version and timestamp unless the version is already known
    ///
    /// A blank version (absent or whitespace) triggers a fresh lookup;
    /// otherwise this does no I/O.
    pub fn resolve(&mut self) {
        if !is_blank(self.version.as_deref()) {
            return;
        }
        // Lines logged by the source and parser layers carry the prefix as a span field.
        let _span = info_span!("resolve_manifest", prefix = %self.prefix()).entered();

        let path = match resolve_manifest_path(&self.artifact) {
            Ok(path) => path,
            Err(e) => {
                error!("{}{}", self.prefix(), e);
                return;
            }
        };
        debug!("{}manifestPath={{{}}}", self.prefix(), path);

        self.version = self.read_variable_from_manifest(&path, IMPLEMENTATION_VERSION);
        self.timestamp = self.read_variable_from_manifest(&path, BUILD_TIME);
    }

    /// Read one main-section attribute from the manifest at `path`
    ///
    /// Returns `None` when the manifest has no such attribute. A manifest
    /// that does not exist yields [`NO_MANIFEST_PLACEHOLDER`] under
    /// [`MissingManifestPolicy::Placeholder`]; any other failure is logged
    /// and yields an empty string.
    pub fn read_variable_from_manifest(&mut self, path: &ManifestPath, name: &str) -> Option<String> {
        self.manifest_reads += 1;

        match read_manifest(path) {
            Ok(manifest) => {
                let value = manifest.main_attributes().get(name).map(str::to_string);
                debug!(
                    "{}Read {{{}}}: {{{}}}",
                    self.prefix(),
                    name,
                    value.as_deref().unwrap_or("null")
                );
                value
            }
            Err(ManifestError::NotFound { .. })
                if self.config.missing_manifest == MissingManifestPolicy::Placeholder =>
            {
                Some(NO_MANIFEST_PLACEHOLDER.to_string())
            }
            Err(e) => {
                error!("{}Failed to read {} from manifest: {}", self.prefix(), name, e);
                Some(String::new())
            }
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn build_info(&self) -> BuildInfo {
        BuildInfo {
            version: self.version.clone(),
            timestamp: self.timestamp.clone(),
        }
    }

    pub fn artifact(&self) -> &ArtifactRef {
        &self.artifact
    }

    /// Number of manifest streams opened so far
    pub fn manifest_reads(&self) -> usize {
        self.manifest_reads
    }

    fn prefix(&self) -> &str {
        self.config.log_prefix.as_deref().unwrap_or("")
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
