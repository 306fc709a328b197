//! Manifest Format
//!
//! Parsing and in-memory representation of packaging manifests.

pub mod parser;
pub mod types;

pub use parser::{parse_manifest, parse_manifest_bytes};
pub use types::{Attributes, Manifest, BUILD_TIME, ENTRY_NAME, IMPLEMENTATION_VERSION};
