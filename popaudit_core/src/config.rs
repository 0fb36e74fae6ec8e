/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration: default suite, fetch options
    and per-feed repository URLs and origin labels.

  Security / Safety Notes:
    Reads a single TOML file chosen by the operator; values are
    validated before any network access happens.

  Dependencies:
    serde + toml for parsing, dirs for platform directories.

  Operational Scope:
    Consulted once at start-up by the entry point.

  Revision History:
    2026-10-18 COD  Authored audit configuration loader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Every key optional with documented defaults
    - Explicit failure for unreadable operator input
============================================================*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AuditError, Result};
use crate::repos::Feed;

pub const DEFAULT_SUITE: &str = "jammy";
pub const DEFAULT_ARCHITECTURE: &str = "amd64";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER_AGENT: &str = "Pop-Audit/0.1 (linux)";

const APP_DIR: &str = "popaudit";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub general: GeneralConfig,
    pub fetch: FetchConfig,
    pub repositories: RepositoriesConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    /// Suite audited when none is given on the command line.
    pub default_suite: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_suite: DEFAULT_SUITE.to_string(),
            log_dir: None,
        }
    }
}

/// Options handed to the package index fetcher.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub architecture: String,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Accept repositories without an InRelease file.
    pub allow_insecure: bool,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            architecture: DEFAULT_ARCHITECTURE.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
            allow_insecure: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Per-feed overrides; anything left out keeps the built-in value.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoriesConfig {
    pub ubuntu: RepositoryOverride,
    pub pop_release: RepositoryOverride,
    pub pop_staging: RepositoryOverride,
    pub ppa_stable: RepositoryOverride,
    pub ppa_pre_stable: RepositoryOverride,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryOverride {
    pub url: Option<String>,
    pub origin: Option<String>,
}

/// Effective URL and origin label for one feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub url: String,
    pub origin: String,
}

impl RepositoriesConfig {
    /// Resolve the effective repository for `feed`.
    pub fn repository(&self, feed: Feed) -> RepositoryConfig {
        let (entry, url, origin) = match feed {
            Feed::Upstream => (&self.ubuntu, "http://us.archive.ubuntu.com/ubuntu", "Ubuntu"),
            Feed::Release => (
                &self.pop_release,
                "http://apt.pop-os.org/release",
                "pop-os-release",
            ),
            Feed::Staging => (
                &self.pop_staging,
                "http://apt.pop-os.org/staging/master",
                "pop-os-staging-master",
            ),
            Feed::BuildStable => (
                &self.ppa_stable,
                "https://ppa.launchpadcontent.net/system76-dev/stable/ubuntu",
                "LP-PPA-system76-dev-stable",
            ),
            Feed::BuildPreStable => (
                &self.ppa_pre_stable,
                "https://ppa.launchpadcontent.net/system76-dev/pre-stable/ubuntu",
                "LP-PPA-system76-dev-pre-stable",
            ),
        };

        RepositoryConfig {
            url: entry.url.clone().unwrap_or_else(|| url.to_string()),
            origin: entry.origin.clone().unwrap_or_else(|| origin.to_string()),
        }
    }
}

impl AuditConfig {
    /// Load from an explicit path, or from the default location if one exists.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse and validate the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            AuditError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|err| AuditError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_toml_str(raw: &str) -> std::result::Result<Self, String> {
        let config: AuditConfig = toml::from_str(raw).map_err(|err| err.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.general.default_suite.trim().is_empty() {
            return Err("general.default_suite must not be empty".into());
        }
        if self.fetch.architecture.trim().is_empty() {
            return Err("fetch.architecture must not be empty".into());
        }
        if self.fetch.timeout == 0 {
            return Err("fetch.timeout must be at least one second".into());
        }
        for feed in Feed::ALL {
            let repo = self.repositories.repository(feed);
            if !(repo.url.starts_with("http://") || repo.url.starts_with("https://")) {
                return Err(format!(
                    "repository URL for {} must be http(s): {}",
                    feed.name(),
                    repo.url
                ));
            }
            if repo.origin.trim().is_empty() {
                return Err(format!("origin label for {} must not be empty", feed.name()));
            }
        }
        Ok(())
    }

    /// Directory receiving session logs.
    pub fn log_dir(&self) -> PathBuf {
        self.general.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR).join("logs"))
                .unwrap_or_else(|| PathBuf::from(".popaudit-logs"))
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
