/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::sources
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Render repository descriptors as deb822 `.sources` files
    and read such files back into fetchable entries.

  Security / Safety Notes:
    Files are written only inside the ephemeral working root.

  Dependencies:
    debian-packaging for deb822 paragraphs.

  Operational Scope:
    Written by the catalog builder, read by the index fetcher.

  Revision History:
    2026-10-18 COD  Authored source file generator.
    2026-10-18 COD  Read-back moved onto debian-packaging paragraphs.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic rendering for reproducible runs
    - Explicit validation of files read back
============================================================*/

use debian_packaging::control::ControlParagraph;

use crate::catalog::FetchOptions;
use crate::error::{AuditError, Result};
use crate::repos::RepositoryDescriptor;

/// Directory, relative to the working root, holding generated sources.
pub const SOURCES_DIR: &str = "etc/apt/sources.list.d";

/// Render the `.sources` body for `descriptor`.
pub fn render_sources_file(descriptor: &RepositoryDescriptor, options: &FetchOptions) -> String {
    let mut lines = vec![
        format!("X-Repolib-Name: {}", descriptor.name),
        "Enabled: yes".to_string(),
        "Types: deb".to_string(),
        format!("URIs: {}", descriptor.url),
        format!("Suites: {}", descriptor.suites.join(" ")),
        format!("Components: {}", descriptor.components.join(" ")),
    ];
    if options.allow_insecure {
        lines.push("Allow-Insecure: yes".to_string());
    }
    lines.push(format!("X-Expected-Origin: {}", descriptor.origin));

    let mut body = lines.join("\n");
    body.push('\n');
    body
}

/// A source entry read back from a `.sources` paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub name: String,
    pub uris: Vec<String>,
    pub suites: Vec<String>,
    pub components: Vec<String>,
    pub allow_insecure: bool,
    pub expected_origin: Option<String>,
}

impl SourceEntry {
    /// Build an entry from a paragraph; `file` names the origin of the text for errors.
    ///
    /// Returns `None` for disabled or non-binary entries.
    pub fn from_paragraph(paragraph: &ControlParagraph<'_>, file: &str) -> Result<Option<Self>> {
        if paragraph.field_bool("Enabled") == Some(false) {
            return Ok(None);
        }
        if !words(paragraph, "Types").contains(&"deb") {
            return Ok(None);
        }

        let require = |field: &str| -> Result<Vec<String>> {
            let values = words(paragraph, field);
            if values.is_empty() {
                return Err(AuditError::Parse(format!("{file}: missing `{field}`")));
            }
            Ok(values.into_iter().map(str::to_string).collect())
        };

        Ok(Some(Self {
            name: paragraph
                .field_str("X-Repolib-Name")
                .unwrap_or(file)
                .to_string(),
            uris: require("URIs")?,
            suites: require("Suites")?,
            components: require("Components")?,
            allow_insecure: paragraph.field_bool("Allow-Insecure").unwrap_or(false),
            expected_origin: paragraph
                .field_str("X-Expected-Origin")
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        }))
    }
}

fn words<'p>(paragraph: &'p ControlParagraph<'_>, field: &str) -> Vec<&'p str> {
    paragraph
        .iter_field_words(field)
        .map(Iterator::collect)
        .unwrap_or_default()
}
