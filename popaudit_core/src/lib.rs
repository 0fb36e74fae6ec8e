/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Library surface of Pop-Audit: Debian version ordering,
    repository sets, the package catalog, discrepancy rules
    and report rendering.

  Security / Safety Notes:
    No privileged operations; network access is confined to
    the `index` module.

  Dependencies:
    See individual modules.

  Operational Scope:
    Consumed by the `popaudit` binary and by integrators that
    embed the audit in other release tooling.

  Revision History:
    2026-10-18 COD  Split library surface from the runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit module boundaries
    - Result-first error handling throughout
============================================================*/

pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod index;
pub mod logger;
pub mod package_info;
pub mod report;
pub mod repos;
pub mod sources;
pub mod version;
