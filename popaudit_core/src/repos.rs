/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::repos
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Build the ordered list of repositories queried for a run
    from the target suite and the run mode.

  Security / Safety Notes:
    Produces descriptors only; no network or filesystem access.

  Dependencies:
    serde for report metadata.

  Operational Scope:
    Feeds the catalog builder; the classifier resolves feed
    roles to origin labels through the same descriptors.

  Revision History:
    2026-10-18 COD  Authored repository set builder.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fixed, declarative repository sets per mode
    - Inputs validated before use
============================================================*/

use std::fmt;

use serde::Serialize;

use crate::config::RepositoriesConfig;
use crate::error::{AuditError, Result};

/// Rule configuration selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Stable,
    Dev,
}

impl Mode {
    pub fn from_dev_flag(dev: bool) -> Self {
        if dev {
            Mode::Dev
        } else {
            Mode::Stable
        }
    }

    /// Feeds fetched in this mode, upstream first.
    pub fn feeds(self) -> &'static [Feed] {
        match self {
            Mode::Stable => &[Feed::Upstream, Feed::Release],
            Mode::Dev => &[
                Feed::Upstream,
                Feed::Release,
                Feed::Staging,
                Feed::BuildStable,
                Feed::BuildPreStable,
            ],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Stable => "stable",
            Mode::Dev => "dev",
        })
    }
}

/// Role a repository plays in the audit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Feed {
    Upstream,
    Release,
    Staging,
    BuildStable,
    BuildPreStable,
}

impl Feed {
    pub const ALL: [Feed; 5] = [
        Feed::Upstream,
        Feed::Release,
        Feed::Staging,
        Feed::BuildStable,
        Feed::BuildPreStable,
    ];

    /// Name of the generated source file for this feed.
    pub fn name(self) -> &'static str {
        match self {
            Feed::Upstream => "ubuntu",
            Feed::Release => "pop-os-release",
            Feed::Staging => "pop-os-staging-master",
            Feed::BuildStable => "system76-dev-stable",
            Feed::BuildPreStable => "system76-dev-pre-stable",
        }
    }
}

/// One repository to query, with the origin label expected from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub name: String,
    pub feed: Feed,
    pub url: String,
    pub suites: Vec<String>,
    pub components: Vec<String>,
    pub origin: String,
}

const UPSTREAM_COMPONENTS: [&str; 4] = ["main", "restricted", "universe", "multiverse"];
const UPSTREAM_POCKETS: [&str; 3] = ["security", "updates", "backports"];

/// Construct the repository set for `suite` in `mode`.
pub fn build_repository_set(
    suite: &str,
    mode: Mode,
    repositories: &RepositoriesConfig,
) -> Result<Vec<RepositoryDescriptor>> {
    validate_suite(suite)?;

    let descriptors = mode
        .feeds()
        .iter()
        .map(|&feed| {
            let repo = repositories.repository(feed);
            let (suites, components) = match feed {
                Feed::Upstream => (
                    std::iter::once(suite.to_string())
                        .chain(UPSTREAM_POCKETS.iter().map(|pocket| format!("{suite}-{pocket}")))
                        .collect(),
                    UPSTREAM_COMPONENTS.iter().map(|c| c.to_string()).collect(),
                ),
                _ => (vec![suite.to_string()], vec!["main".to_string()]),
            };
            RepositoryDescriptor {
                name: feed.name().to_string(),
                feed,
                url: repo.url,
                suites,
                components,
                origin: repo.origin,
            }
        })
        .collect();

    Ok(descriptors)
}

fn validate_suite(suite: &str) -> Result<()> {
    let valid = !suite.is_empty()
        && suite
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(AuditError::Parse(format!("invalid suite name `{suite}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_mode_queries_upstream_and_release() {
        let set = build_repository_set("jammy", Mode::Stable, &RepositoriesConfig::default())
            .unwrap();
        assert_eq!(set.len(), 2);

        let ubuntu = &set[0];
        assert_eq!(ubuntu.feed, Feed::Upstream);
        assert_eq!(ubuntu.origin, "Ubuntu");
        assert_eq!(
            ubuntu.suites,
            vec!["jammy", "jammy-security", "jammy-updates", "jammy-backports"]
        );
        assert_eq!(
            ubuntu.components,
            vec!["main", "restricted", "universe", "multiverse"]
        );

        let release = &set[1];
        assert_eq!(release.name, "pop-os-release");
        assert_eq!(release.url, "http://apt.pop-os.org/release");
        assert_eq!(release.suites, vec!["jammy"]);
        assert_eq!(release.components, vec!["main"]);
    }

    #[test]
    fn dev_mode_adds_staging_and_build_service_channels() {
        let set =
            build_repository_set("noble", Mode::Dev, &RepositoriesConfig::default()).unwrap();
        let origins: Vec<&str> = set.iter().map(|d| d.origin.as_str()).collect();
        assert_eq!(
            origins,
            vec![
                "Ubuntu",
                "pop-os-release",
                "pop-os-staging-master",
                "LP-PPA-system76-dev-stable",
                "LP-PPA-system76-dev-pre-stable",
            ]
        );
        assert!(set[1..].iter().all(|d| d.suites == vec!["noble"]));
    }

    #[test]
    fn suite_names_are_validated() {
        let repos = RepositoriesConfig::default();
        assert!(matches!(
            build_repository_set("", Mode::Stable, &repos),
            Err(AuditError::Parse(_))
        ));
        assert!(build_repository_set("jammy main", Mode::Stable, &repos).is_err());
        assert!(build_repository_set("../jammy", Mode::Dev, &repos).is_err());
    }
}
