//! Output rendering for resolved build metadata.

use buildstamp::manifest::{BUILD_TIME, IMPLEMENTATION_VERSION};
use buildstamp::{read_manifest, resolve_manifest_path, ArtifactRef, BuildInfo};
use serde::{Serialize, Serializer};
use tracing::warn;

/// Resolved metadata plus any extra attributes requested on the command line
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(flatten)]
    pub build: BuildInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_at: Option<String>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_attributes"
    )]
    pub attributes: Vec<(String, Option<String>)>,
}

impl Report {
    pub fn new(build: BuildInfo) -> Self {
        let built_at = build.built_at().map(|dt| dt.to_rfc3339());
        Self {
            build,
            built_at,
            attributes: Vec::new(),
        }
    }

    /// Look up extra main-section attributes; failures are logged, not raised
    pub fn with_attributes(mut self, artifact: &ArtifactRef, names: &[String]) -> Self {
        if names.is_empty() {
            return self;
        }

        let manifest = resolve_manifest_path(artifact).and_then(|path| read_manifest(&path));
        let manifest = match manifest {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("Extra attributes unavailable: {}", e);
                None
            }
        };

        self.attributes = names
            .iter()
            .map(|name| {
                let value = manifest
                    .as_ref()
                    .and_then(|m| m.main_attributes().get(name))
                    .map(str::to_string);
                (name.clone(), value)
            })
            .collect();
        self
    }

    pub fn render_text(&self) -> String {
        let mut lines = vec![
            text_line(IMPLEMENTATION_VERSION, self.build.version.as_deref()),
            text_line(BUILD_TIME, self.build.timestamp.as_deref()),
        ];
        lines.extend(
            self.attributes
                .iter()
                .map(|(name, value)| text_line(name, value.as_deref())),
        );
        lines.join("\n")
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Attributes serialize as a name → value object, in request order
fn serialize_attributes<S: Serializer>(
    attributes: &[(String, Option<String>)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(attributes.iter().map(|(name, value)| (name, value)))
}

fn text_line(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("{}: {}", name, value),
        None => format!("{}: <absent>", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;

    fn build() -> BuildInfo {
        BuildInfo {
            version: Some("1.4.2".to_string()),
            timestamp: Some("2024-03-01T10:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_render_text() {
        let report = Report::new(BuildInfo {
            version: Some("1.4.2".to_string()),
            timestamp: None,
        });
        assert_eq!(
            report.render_text(),
            "Implementation-Version: 1.4.2\nBuild-Time: <absent>"
        );
    }

    #[test]
    fn test_render_json_includes_parsed_time() {
        let report = Report::new(build());
        let value: Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "1.4.2",
                "timestamp": "2024-03-01T10:00:00Z",
                "built_at": "2024-03-01T10:00:00+00:00"
            })
        );
    }

    #[test]
    fn test_extra_attributes_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("META-INF")).unwrap();
        fs::write(
            dir.path().join("META-INF").join("MANIFEST.MF"),
            "Implementation-Version: 1.4.2\nCreated-By: 17.0.2 (Eclipse Adoptium)\n",
        )
        .unwrap();

        let names = vec!["Created-By".to_string(), "Main-Class".to_string()];
        let report = Report::new(build()).with_attributes(&ArtifactRef::directory(dir.path()), &names);

        assert_eq!(
            report.attributes,
            vec![
                (
                    "Created-By".to_string(),
                    Some("17.0.2 (Eclipse Adoptium)".to_string())
                ),
                ("Main-Class".to_string(), None),
            ]
        );
        assert!(report
            .render_text()
            .ends_with("Created-By: 17.0.2 (Eclipse Adoptium)\nMain-Class: <absent>"));
    }

    #[test]
    fn test_render_json_with_attributes_and_unparsed_time() {
        let report = Report {
            build: BuildInfo {
                version: Some("1.4.2".to_string()),
                timestamp: Some("20240301-1000".to_string()),
            },
            built_at: None,
            attributes: vec![
                ("Created-By".to_string(), Some("Maven".to_string())),
                ("Main-Class".to_string(), None),
            ],
        };
        let value: Value = serde_json::from_str(&report.render_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "1.4.2",
                "timestamp": "20240301-1000",
                "attributes": {"Created-By": "Maven", "Main-Class": null}
            })
        );
    }

    #[test]
    fn test_unparsable_timestamp_has_no_built_at() {
        let report = Report::new(BuildInfo {
            version: None,
            timestamp: Some("yesterday".to_string()),
        });
        assert!(report.built_at.is_none());
        assert!(!report.render_json().unwrap().contains("built_at"));
    }

    #[test]
    fn test_extra_attributes_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let names = vec!["Created-By".to_string()];
        let report = Report::new(build()).with_attributes(&ArtifactRef::directory(dir.path()), &names);
        assert_eq!(report.attributes, vec![("Created-By".to_string(), None)]);
    }
}
