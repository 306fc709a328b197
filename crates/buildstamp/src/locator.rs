//! Manifest Locator
//!
//! Derives where the packaging manifest of a compiled unit lives. A unit is
//! loaded either from a loose directory of compiled artifacts or from inside
//! an archive; which one applies is read off the shape of its resource
//! location.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use crate::error::{ManifestError, ManifestResult};

/// Resource-location prefix of units loaded from inside an archive
pub const ARCHIVE_SCHEME: &str = "jar:";

/// Separates the archive location from the entry inside it
pub const ARCHIVE_SEPARATOR: char = '!';

/// Manifest location relative to an artifact root
pub const MANIFEST_SUBPATH: &str = "/META-INF/MANIFEST.MF";

/// Suffix of a compiled artifact file
pub const COMPILED_SUFFIX: &str = ".class";

const PACKAGE_SEPARATOR: char = '.';

const FILE_SCHEME: &str = "file:";

/// Identifies the compiled unit whose manifest should be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    /// A loaded type: its fully qualified name plus the resource location
    /// it was loaded from (`file:/…/Foo.class` or `jar:file:/…!/…/Foo.class`)
    Type {
        qualified_name: String,
        resource_location: String,
    },
    /// An archive file; the manifest is its `META-INF/MANIFEST.MF` entry
    Archive(PathBuf),
    /// Root directory of compiled output
    Directory(PathBuf),
}

impl ArtifactRef {
    pub fn for_type(qualified_name: impl Into<String>, resource_location: impl Into<String>) -> Self {
        Self::Type {
            qualified_name: qualified_name.into(),
            resource_location: resource_location.into(),
        }
    }

    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self::Archive(path.into())
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory(path.into())
    }
}

/// Resolved manifest location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestPath {
    /// Manifest file on disk
    File(PathBuf),
    /// Manifest stored as an entry of an archive
    ArchiveEntry { archive: PathBuf, entry: String },
}

impl ManifestPath {
    /// Parse a manifest location string as produced by [`manifest_location`]
    pub fn parse(location: &str) -> ManifestResult<Self> {
        match location.strip_prefix(ARCHIVE_SCHEME) {
            Some(rest) => {
                let Some((archive, entry)) = rest.rsplit_once(ARCHIVE_SEPARATOR) else {
                    return Err(ManifestError::PathResolution(format!(
                        "archive location has no '{}' separator: {}",
                        ARCHIVE_SEPARATOR, location
                    )));
                };

                let entry = entry.trim_start_matches('/');
                if entry.is_empty() {
                    return Err(ManifestError::PathResolution(format!(
                        "archive location names no entry: {}",
                        location
                    )));
                }

                Ok(Self::ArchiveEntry {
                    archive: location_to_path(archive)?,
                    entry: entry.to_string(),
                })
            }
            None => Ok(Self::File(location_to_path(location)?)),
        }
    }
}

impl fmt::Display for ManifestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::ArchiveEntry { archive, entry } => write!(
                f,
                "{}{}{}/{}",
                ARCHIVE_SCHEME,
                archive.display(),
                ARCHIVE_SEPARATOR,
                entry
            ),
        }
    }
}

/// Derive the manifest location string from a type's resource location
///
/// Loose directory: decode the location, then drop the trailing
/// `<package path>/<Name>.class` components to find the output root. Archive:
/// keep everything up to and including the last `!`. Both then append
/// [`MANIFEST_SUBPATH`]. A `file:` input yields a `file:` URL.
pub fn manifest_location(qualified_name: &str, resource_location: &str) -> ManifestResult<String> {
    if resource_location.is_empty() {
        return Err(ManifestError::PathResolution(format!(
            "no resource location for {}",
            qualified_name
        )));
    }

    if resource_location.starts_with(ARCHIVE_SCHEME) {
        let Some(idx) = resource_location.rfind(ARCHIVE_SEPARATOR) else {
            return Err(ManifestError::PathResolution(format!(
                "archive location has no '{}' separator: {}",
                ARCHIVE_SEPARATOR, resource_location
            )));
        };
        return Ok(format!("{}{}", &resource_location[..=idx], MANIFEST_SUBPATH));
    }

    let location = location_to_path(resource_location)?;
    let relative = relative_artifact_path(qualified_name);
    let root = location
        .ends_with(&relative)
        .then(|| location.ancestors().nth(relative.components().count()))
        .flatten()
        .ok_or_else(|| {
            ManifestError::PathResolution(format!(
                "{} does not end with {}",
                resource_location,
                relative.display()
            ))
        })?;

    let manifest = join_manifest(root);
    if resource_location.starts_with(FILE_SCHEME) {
        let url = Url::from_file_path(&manifest).map_err(|_| {
            ManifestError::PathResolution(format!(
                "cannot express {} as a file URL",
                manifest.display()
            ))
        })?;
        return Ok(url.to_string());
    }
    Ok(manifest.display().to_string())
}

/// Resolve the manifest path of an artifact
pub fn resolve_manifest_path(artifact: &ArtifactRef) -> ManifestResult<ManifestPath> {
    match artifact {
        ArtifactRef::Type {
            qualified_name,
            resource_location,
        } => ManifestPath::parse(&manifest_location(qualified_name, resource_location)?),
        ArtifactRef::Archive(archive) => Ok(ManifestPath::ArchiveEntry {
            archive: archive.clone(),
            entry: MANIFEST_SUBPATH.trim_start_matches('/').to_string(),
        }),
        ArtifactRef::Directory(root) => Ok(ManifestPath::File(join_manifest(root))),
    }
}

fn relative_artifact_path(qualified_name: &str) -> PathBuf {
    let mut segments: Vec<&str> = qualified_name.split(PACKAGE_SEPARATOR).collect();
    let name = segments.pop().unwrap_or_default();
    let mut relative: PathBuf = segments.into_iter().collect();
    relative.push(format!("{}{}", name, COMPILED_SUFFIX));
    relative
}

fn join_manifest(root: &Path) -> PathBuf {
    MANIFEST_SUBPATH
        .trim_start_matches('/')
        .split('/')
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

/// Convert a `file:` URL or plain filesystem path into a path
fn location_to_path(location: &str) -> ManifestResult<PathBuf> {
    match Url::parse(location) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().map_err(|_| {
            ManifestError::PathResolution(format!("not a local file URL: {}", location))
        }),
        // Single-letter schemes are Windows drive letters.
        Ok(url) if url.scheme().len() > 1 => Err(ManifestError::PathResolution(format!(
            "unsupported location scheme '{}': {}",
            url.scheme(),
            location
        ))),
        _ => Ok(PathBuf::from(location)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_directory_location() {
        let location = manifest_location(
            "com.apache.service.ManifestReader",
            "file:/home/dev/app/target/classes/com/apache/service/ManifestReader.class",
        )
        .unwrap();
        assert_eq!(location, "file:///home/dev/app/target/classes/META-INF/MANIFEST.MF");
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_location_is_percent_decoded() {
        let location = manifest_location(
            "com.example.Über",
            "file:/srv/classes/com/example/%C3%9Cber.class",
        )
        .unwrap();
        assert_eq!(location, "file:///srv/classes/META-INF/MANIFEST.MF");

        let location = manifest_location(
            "com.example.App",
            "file:/srv/my%20app/classes/com/example/App.class",
        )
        .unwrap();
        assert_eq!(location, "file:///srv/my%20app/classes/META-INF/MANIFEST.MF");
        assert_eq!(
            ManifestPath::parse(&location).unwrap(),
            ManifestPath::File(PathBuf::from("/srv/my app/classes/META-INF/MANIFEST.MF"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_plain_directory_location() {
        let location = manifest_location("com.example.App", "/srv/classes/com/example/App.class").unwrap();
        assert_eq!(location, "/srv/classes/META-INF/MANIFEST.MF");
    }

    #[test]
    fn test_partial_segment_is_resolution_failure() {
        let err = manifest_location("example.App", "file:/srv/classes/myexample/App.class").unwrap_err();
        assert!(matches!(err, ManifestError::PathResolution(_)));
    }

    #[test]
    fn test_archive_location() {
        let location = manifest_location(
            "com.apache.service.ManifestReader",
            "jar:file:/opt/app/service.jar!/com/apache/service/ManifestReader.class",
        )
        .unwrap();
        assert_eq!(location, "jar:file:/opt/app/service.jar!/META-INF/MANIFEST.MF");
    }

    #[test]
    fn test_archive_location_uses_last_separator() {
        let location = manifest_location(
            "a.B",
            "jar:file:/opt/outer.jar!/lib/inner.jar!/a/B.class",
        )
        .unwrap();
        assert_eq!(location, "jar:file:/opt/outer.jar!/lib/inner.jar!/META-INF/MANIFEST.MF");
    }

    #[cfg(unix)]
    #[test]
    fn test_default_package() {
        let location = manifest_location("Main", "file:/srv/classes/Main.class").unwrap();
        assert_eq!(location, "file:///srv/classes/META-INF/MANIFEST.MF");
    }

    #[test]
    fn test_mismatched_location_is_resolution_failure() {
        let err = manifest_location("com.example.App", "file:/srv/classes/Other.class").unwrap_err();
        assert!(matches!(err, ManifestError::PathResolution(_)));
    }

    #[test]
    fn test_empty_location_is_resolution_failure() {
        let err = manifest_location("com.example.App", "").unwrap_err();
        assert!(matches!(err, ManifestError::PathResolution(_)));
    }

    #[test]
    fn test_archive_without_separator_fails() {
        assert!(manifest_location("a.B", "jar:file:/opt/app.jar").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_file_url() {
        let path = ManifestPath::parse("file:/srv/my%20app/META-INF/MANIFEST.MF").unwrap();
        assert_eq!(
            path,
            ManifestPath::File(PathBuf::from("/srv/my app/META-INF/MANIFEST.MF"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_archive_url() {
        let path = ManifestPath::parse("jar:file:/opt/app.jar!/META-INF/MANIFEST.MF").unwrap();
        assert_eq!(
            path,
            ManifestPath::ArchiveEntry {
                archive: PathBuf::from("/opt/app.jar"),
                entry: "META-INF/MANIFEST.MF".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_plain_path() {
        let path = ManifestPath::parse("build/classes/META-INF/MANIFEST.MF").unwrap();
        assert_eq!(
            path,
            ManifestPath::File(PathBuf::from("build/classes/META-INF/MANIFEST.MF"))
        );
    }

    #[test]
    fn test_parse_rejects_remote_scheme() {
        let err = ManifestPath::parse("https://example.com/META-INF/MANIFEST.MF").unwrap_err();
        assert!(matches!(err, ManifestError::PathResolution(_)));
    }

    #[test]
    fn test_display_round_trips_archive_entry() {
        let path = ManifestPath::ArchiveEntry {
            archive: PathBuf::from("/opt/app.jar"),
            entry: "META-INF/MANIFEST.MF".to_string(),
        };
        assert_eq!(path.to_string(), "jar:/opt/app.jar!/META-INF/MANIFEST.MF");
        assert_eq!(ManifestPath::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_resolve_direct_locators() {
        let archive = resolve_manifest_path(&ArtifactRef::archive("/opt/app.jar")).unwrap();
        assert_eq!(
            archive,
            ManifestPath::ArchiveEntry {
                archive: PathBuf::from("/opt/app.jar"),
                entry: "META-INF/MANIFEST.MF".to_string(),
            }
        );

        let dir = resolve_manifest_path(&ArtifactRef::directory("out")).unwrap();
        assert_eq!(
            dir,
            ManifestPath::File(Path::new("out").join("META-INF").join("MANIFEST.MF"))
        );
    }
}
