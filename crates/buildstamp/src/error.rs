//! Error Types
//!
//! Failures raised while locating, opening, or parsing a packaging manifest.
//! The resolver never surfaces these to its caller; they exist so the
//! lower-level helpers can report what went wrong before it is degraded.

use std::io;

use thiserror::Error;

/// Manifest lookup error
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The artifact locator does not yield a manifest location
    #[error("cannot resolve manifest location: {0}")]
    PathResolution(String),

    /// Nothing exists at the derived path (file, archive, or archive entry)
    #[error("manifest not found: {path}")]
    NotFound { path: String },

    /// The stream opened but its contents are not a valid manifest
    #[error("malformed manifest at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// Manifest exceeds the read limit
    #[error("manifest too large: {path} (max {limit} bytes)")]
    TooLarge { path: String, limit: u64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read archive {path}: {source}")]
    Archive {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
}

impl ManifestError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            reason: reason.into(),
        }
    }

    /// Whether this error means the manifest is simply absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;
