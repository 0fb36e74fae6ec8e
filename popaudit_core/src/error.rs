/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Pop-Audit error types so every fatal path shares
    one taxonomy and one exit status.

  Security / Safety Notes:
    Error contexts carry repository URLs and file paths only;
    no credentials are ever embedded in repository sources.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate fatal failures up to the
    binary entry point.

  Revision History:
    2026-10-18 COD  Established audit error taxonomy.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Pop-Audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;

/// Enumerates high-level error domains surfaced by Pop-Audit.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Parse: {0}")]
    Parse(String),
    #[error("Fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AuditError {
    /// Convenience constructor for repository retrieval failures.
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        AuditError::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Every fatal error aborts the run with status 1, the same
    /// status used for a report containing discrepancies.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(1)
    }
}
