/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::report
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Render classifier findings as the terminal report and,
    on request, as a JSON document.

  Security / Safety Notes:
    Report files are written to operator-controlled paths; no
    privileged operations are performed.

  Dependencies:
    serde + serde_json for the JSON document, chrono for its
    timestamp.

  Operational Scope:
    Final stage of every successful audit run.

  Revision History:
    2026-10-18 COD  Authored discrepancy report renderer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering for reproducible reports
    - Whole report computed before anything is printed
============================================================*/

use std::fs::File;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::classify::Findings;
use crate::error::{AuditError, Result};
use crate::repos::Mode;

const BOLD: &str = "\x1B[1m";
const RESET: &str = "\x1B[0m";

/// Render the human-readable report.
///
/// Kinds appear in declaration order and sources in ascending order, so
/// the same findings always render to the same text.
pub fn render_report(findings: &Findings, styled: bool) -> String {
    let (bold, reset) = if styled { (BOLD, RESET) } else { ("", "") };
    let mut out = String::new();

    if findings.is_clean() {
        out.push_str(&format!(
            "{bold}0 source package(s) with discrepancies{reset}\n"
        ));
        return out;
    }

    for (kind, sources) in findings.kinds() {
        out.push_str(&format!(
            "{bold}{} source package(s): {kind}{reset}\n",
            sources.len()
        ));
        for (source_name, version) in sources {
            out.push_str(&format!("  - {source_name}: {}\n", version.source_version));
        }
    }
    out
}

/// JSON form of one run.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub metadata: ReportMetadata,
    pub findings: &'a Findings,
}

#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub generated_by: String,
    pub suite: String,
    pub mode: Mode,
    pub total_packages: usize,
    pub discrepancies: usize,
}

impl<'a> ReportDocument<'a> {
    pub fn new(suite: &str, mode: Mode, total_packages: usize, findings: &'a Findings) -> Self {
        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                generated_by: "popaudit_core".to_string(),
                suite: suite.to_string(),
                mode,
                total_packages,
                discrepancies: findings.total(),
            },
            findings,
        }
    }
}

/// Persist the report document to `path`.
pub fn write_report(document: &ReportDocument<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| {
            AuditError::Filesystem(format!(
                "Failed to create report directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    let file = File::create(path).map_err(|err| {
        AuditError::Filesystem(format!(
            "Failed to create report file {}: {err}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, document).map_err(|err| {
        AuditError::Serialization(format!("Failed to write report {}: {err}", path.display()))
    })
}
