//! Manifest Parser
//!
//! Reads the `Name: Value` manifest text format. Sections are separated by
//! blank lines, and a line starting with a single space continues the
//! previous value.

use std::collections::BTreeMap;

use tracing::warn;

use super::types::{Attributes, Manifest, ENTRY_NAME};
use crate::error::{ManifestError, ManifestResult};

/// Longest attribute name accepted
const MAX_NAME_LEN: usize = 70;

/// Parse raw manifest bytes (must be UTF-8)
pub fn parse_manifest_bytes(bytes: &[u8]) -> ManifestResult<Manifest> {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_manifest(text),
        Err(e) => {
            let line = bytes[..e.valid_up_to()]
                .iter()
                .filter(|&&b| b == b'\n')
                .count()
                + 1;
            Err(ManifestError::malformed(line, "invalid UTF-8"))
        }
    }
}

/// Parse manifest text
pub fn parse_manifest(text: &str) -> ManifestResult<Manifest> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut parser = SectionParser::default();
    for (idx, line) in normalized.split('\n').enumerate() {
        parser.feed(idx + 1, line)?;
    }
    parser.finish()
}

#[derive(Default)]
struct SectionParser {
    main: Option<Attributes>,
    entries: BTreeMap<String, Attributes>,
    current: Attributes,
    /// Header still accumulating continuation lines: (name, value, line)
    pending: Option<(String, String, usize)>,
    section_start: usize,
}

impl SectionParser {
    fn feed(&mut self, line_no: usize, line: &str) -> ManifestResult<()> {
        if line.is_empty() {
            return self.end_section();
        }

        if let Some(rest) = line.strip_prefix(' ') {
            let Some((_, value, _)) = self.pending.as_mut() else {
                return Err(ManifestError::malformed(
                    line_no,
                    "continuation line without a preceding header",
                ));
            };
            value.push_str(rest);
            return Ok(());
        }

        self.flush_pending();
        if self.current.is_empty() {
            self.section_start = line_no;
        }

        let (name, value) = parse_header(line_no, line)?;
        self.pending = Some((name.to_string(), value.to_string(), line_no));
        Ok(())
    }

    fn flush_pending(&mut self) {
        if let Some((name, value, line_no)) = self.pending.take() {
            if self.current.insert(name.as_str(), value).is_some() {
                warn!("Duplicate manifest attribute {} at line {}", name, line_no);
            }
        }
    }

    fn end_section(&mut self) -> ManifestResult<()> {
        self.flush_pending();
        let section = std::mem::take(&mut self.current);

        if self.main.is_none() {
            // The main section may legitimately be empty.
            self.main = Some(section);
            return Ok(());
        }

        if section.is_empty() {
            return Ok(());
        }

        let name = section
            .iter()
            .next()
            .filter(|(key, _)| key.eq_ignore_ascii_case(ENTRY_NAME))
            .map(|(_, value)| value.to_string());
        let Some(name) = name else {
            return Err(ManifestError::malformed(
                self.section_start,
                "entry section does not start with a Name attribute",
            ));
        };

        let merged = self.entries.entry(name).or_default();
        for (key, value) in section.iter() {
            merged.insert(key, value);
        }
        Ok(())
    }

    fn finish(mut self) -> ManifestResult<Manifest> {
        // Lenient on purpose: a last header without a terminating newline is
        // kept rather than rejected.
        self.end_section()?;
        Ok(Manifest::new(self.main.unwrap_or_default(), self.entries))
    }
}

fn parse_header(line_no: usize, line: &str) -> ManifestResult<(&str, &str)> {
    let Some((name, rest)) = line.split_once(':') else {
        return Err(ManifestError::malformed(line_no, "invalid header field"));
    };

    if !is_valid_name(name) {
        return Err(ManifestError::malformed(
            line_no,
            format!("invalid attribute name: {:?}", name),
        ));
    }

    let Some(value) = rest.strip_prefix(' ') else {
        return Err(ManifestError::malformed(
            line_no,
            "expected a space after ':'",
        ));
    };

    Ok((name, value))
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
