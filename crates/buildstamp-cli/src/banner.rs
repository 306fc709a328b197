//! Startup banner written to the log once build metadata is resolved.

use buildstamp::BuildInfo;
use tracing::info;

const UNKNOWN: &str = "unknown";

pub fn format_banner(build: &BuildInfo) -> String {
    format!(
        "\t\t Version:  {}\n\t\t Date built:  {}",
        build.version.as_deref().unwrap_or(UNKNOWN),
        build.timestamp.as_deref().unwrap_or(UNKNOWN)
    )
}

pub fn log_banner(prefix: &str, build: &BuildInfo) {
    info!("{}Started\n{}", prefix, format_banner(build));
}
