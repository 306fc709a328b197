//! Manifest Source
//!
//! Opens the byte stream behind a [`ManifestPath`] and parses it. Every file
//! or archive handle is scoped to the call and released before it returns,
//! error paths included.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ManifestError, ManifestResult};
use crate::locator::ManifestPath;
use crate::manifest::{parse_manifest_bytes, Manifest};

/// Largest manifest accepted (1MB)
pub const MAX_MANIFEST_BYTES: u64 = 1_000_000;

/// Read and parse the manifest at `path`
pub fn read_manifest(path: &ManifestPath) -> ManifestResult<Manifest> {
    let bytes = read_manifest_bytes(path)?;
    debug!("Read {} manifest bytes from {}", bytes.len(), path);
    parse_manifest_bytes(&bytes)
}

/// Read the raw manifest bytes at `path`
pub fn read_manifest_bytes(path: &ManifestPath) -> ManifestResult<Vec<u8>> {
    match path {
        ManifestPath::File(file) => read_file(file),
        ManifestPath::ArchiveEntry { archive, entry } => read_archive_entry(archive, entry),
    }
}

fn read_file(path: &Path) -> ManifestResult<Vec<u8>> {
    let file = open_file(path)?;
    read_limited(file, &path.display().to_string())
}

fn read_archive_entry(archive: &Path, entry: &str) -> ManifestResult<Vec<u8>> {
    let location = ManifestPath::ArchiveEntry {
        archive: archive.to_path_buf(),
        entry: entry.to_string(),
    }
    .to_string();

    let file = open_file(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|source| archive_error(archive, source))?;

    let zip_entry = match zip.by_name(entry) {
        Ok(zip_entry) => zip_entry,
        Err(ZipError::FileNotFound) => return Err(ManifestError::NotFound { path: location }),
        Err(source) => return Err(archive_error(archive, source)),
    };

    read_limited(zip_entry, &location)
}

fn open_file(path: &Path) -> ManifestResult<File> {
    File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ManifestError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            ManifestError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })
}

fn read_limited<R: Read>(reader: R, location: &str) -> ManifestResult<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(MAX_MANIFEST_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|source| ManifestError::Io {
            path: location.to_string(),
            source,
        })?;

    if bytes.len() as u64 > MAX_MANIFEST_BYTES {
        return Err(ManifestError::TooLarge {
            path: location.to_string(),
            limit: MAX_MANIFEST_BYTES,
        });
    }
    Ok(bytes)
}

fn archive_error(archive: &Path, source: ZipError) -> ManifestError {
    ManifestError::Archive {
        path: archive.display().to_string(),
        source,
    }
}
