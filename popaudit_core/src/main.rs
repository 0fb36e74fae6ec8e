/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Pop-Audit. Builds the repository set for a
    suite, fetches every repository into one catalog, applies
    the mode's rules and prints the discrepancy report.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTP(S) GET
    requests only and writes to a private temporary root, the
    session log and an optional report file.

  Dependencies:
    clap for CLI parsing, chrono for timestamps, tokio for the
    async runtime.

  Operational Scope:
    Invoked by release engineers before promoting packages or
    as a CI gate; a non-zero exit status blocks promotion.

  Revision History:
    2026-10-18 COD  Authored Pop-Audit runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use popaudit_core::catalog::{build_catalog, FetchOptions};
use popaudit_core::classify::{ruleset, Classifier};
use popaudit_core::config::AuditConfig;
use popaudit_core::error::Result;
use popaudit_core::index::IndexFetcher;
use popaudit_core::logger::Logger;
use popaudit_core::report::{render_report, write_report, ReportDocument};
use popaudit_core::repos::{build_repository_set, Mode};

/// Command-line arguments for Pop-Audit.
#[derive(Debug, Parser)]
#[command(
    name = "popaudit",
    version,
    author = "Synavera Systems",
    about = "Audit Pop!_OS package repositories against Ubuntu and staging"
)]
struct Cli {
    /// Distribution suite to audit (defaults to the configured suite).
    #[arg(value_name = "SUITE")]
    suite: Option<String>,
    /// Audit the development pipeline instead of the stable release.
    #[arg(long, action = ArgAction::SetTrue)]
    dev: bool,
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Limit the audit to specific binary packages.
    #[arg(long = "package", value_name = "PKG", action = ArgAction::Append)]
    packages: Vec<String>,
    /// Also write the findings as JSON.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Pop-Audit] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = AuditConfig::load_from_optional_path(cli.config.as_deref())?;

    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| Logger::session_path(&config.log_dir(), Utc::now()));
    let logger = Logger::new(Some(log_path), cli.verbose)?;

    let outcome = audit(&cli, &config, &logger).await;
    if let Err(err) = &outcome {
        logger.error("ABORT", err.to_string());
    }
    logger.finalize()?;
    outcome
}

async fn audit(cli: &Cli, config: &AuditConfig, logger: &Logger) -> Result<ExitCode> {
    let suite = cli
        .suite
        .clone()
        .unwrap_or_else(|| config.general.default_suite.clone());
    let mode = Mode::from_dev_flag(cli.dev);
    logger.info("INIT", format!("Auditing suite={suite} mode={mode}"));

    let descriptors = build_repository_set(&suite, mode, &config.repositories)?;
    for descriptor in &descriptors {
        logger.debug(
            "REPO",
            format!(
                "{} {} suites=[{}] origin={}",
                descriptor.name,
                descriptor.url,
                descriptor.suites.join(" "),
                descriptor.origin
            ),
        );
    }

    let fetcher = IndexFetcher::new(&config.fetch, logger)?;
    let options = FetchOptions {
        allow_insecure: config.fetch.allow_insecure,
    };
    let catalog = build_catalog(&descriptors, &options, &fetcher, logger).await?;
    if catalog.is_empty() {
        logger.warn("EMPTY", "No packages were found in any repository");
    }

    let only: BTreeSet<String> = cli.packages.iter().cloned().collect();
    let findings = Classifier::new(ruleset(mode), &descriptors).classify(&catalog, &only, logger);

    for record in findings.records() {
        logger.info(
            "FINDING",
            format!(
                "{}: {} {} ({})",
                record.kind,
                record.source_name,
                record.version.source_version,
                record.version.version
            ),
        );
    }

    print!(
        "{}",
        render_report(&findings, std::io::stdout().is_terminal())
    );

    if let Some(path) = &cli.report {
        let document = ReportDocument::new(&suite, mode, catalog.len(), &findings);
        write_report(&document, path)?;
        logger.info("REPORT", format!("Report written to {}", path.display()));
    }

    logger.info(
        "SUMMARY",
        format!(
            "packages={} discrepancies={}",
            catalog.len(),
            findings.total()
        ),
    );
    Ok(findings.exit_code())
}
