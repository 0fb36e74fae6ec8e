/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::classify
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Apply the per-mode rule table to every package in the
    catalog and collect discrepancies by kind.

  Security / Safety Notes:
    Pure computation over an immutable catalog.

  Dependencies:
    serde for report serialization.

  Operational Scope:
    The decision core of Pop-Audit; consumed by the report
    renderer and the exit status.

  Revision History:
    2026-10-18 COD  Unified per-mode checks into one rule table.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Rules as data, evaluated generically
    - Deterministic ordering for reproducible reports
    - Comparisons only within one source package
============================================================*/

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::process::ExitCode;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::logger::Logger;
use crate::package_info::PackageVersion;
use crate::repos::{Feed, Mode, RepositoryDescriptor};

/// Kind of discrepancy, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    ReleaseOlderThanUpstream,
    InPreStableNotStaging,
    InStableNotPreStable,
    StableOlderThanUpstream,
}

impl ViolationKind {
    pub fn description(self) -> &'static str {
        match self {
            ViolationKind::ReleaseOlderThanUpstream => "release older than upstream",
            ViolationKind::InPreStableNotStaging => "in pre-stable but not staging",
            ViolationKind::InStableNotPreStable => "in stable but not pre-stable",
            ViolationKind::StableOlderThanUpstream => "stable older than upstream",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single check evaluated against every package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `reference` carries a strictly newer version of the same source
    /// package than `downstream`. Reports the reference version.
    Older {
        downstream: Feed,
        reference: Feed,
        kind: ViolationKind,
    },
    /// The package is published in `present` but not in `absent`.
    /// Reports the present version.
    Missing {
        present: Feed,
        absent: Feed,
        kind: ViolationKind,
    },
}

impl Rule {
    pub fn kind(&self) -> ViolationKind {
        match *self {
            Rule::Older { kind, .. } | Rule::Missing { kind, .. } => kind,
        }
    }

    fn feeds(&self) -> [Feed; 2] {
        match *self {
            Rule::Older {
                downstream,
                reference,
                ..
            } => [downstream, reference],
            Rule::Missing { present, absent, .. } => [present, absent],
        }
    }
}

const STABLE_RULES: &[Rule] = &[Rule::Older {
    downstream: Feed::Release,
    reference: Feed::Upstream,
    kind: ViolationKind::ReleaseOlderThanUpstream,
}];

const DEV_RULES: &[Rule] = &[
    Rule::Missing {
        present: Feed::BuildPreStable,
        absent: Feed::Staging,
        kind: ViolationKind::InPreStableNotStaging,
    },
    Rule::Missing {
        present: Feed::BuildStable,
        absent: Feed::BuildPreStable,
        kind: ViolationKind::InStableNotPreStable,
    },
    Rule::Older {
        downstream: Feed::BuildStable,
        reference: Feed::Upstream,
        kind: ViolationKind::StableOlderThanUpstream,
    },
];

/// Rule table for `mode`.
pub fn ruleset(mode: Mode) -> &'static [Rule] {
    match mode {
        Mode::Stable => STABLE_RULES,
        Mode::Dev => DEV_RULES,
    }
}

/// Offending version of one source package for one kind.
#[derive(Debug, Clone)]
pub struct ViolationRecord<'a> {
    pub kind: ViolationKind,
    pub source_name: &'a str,
    pub version: &'a PackageVersion,
}

/// Discrepancies found in one run: kind, then source name, to version.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Findings {
    by_kind: BTreeMap<ViolationKind, BTreeMap<String, PackageVersion>>,
}

impl Findings {
    /// Record a violation; a repeat for the same kind and source replaces the earlier one.
    pub fn record(&mut self, kind: ViolationKind, version: PackageVersion) {
        self.by_kind
            .entry(kind)
            .or_default()
            .insert(version.source_name.clone(), version);
    }

    pub fn is_clean(&self) -> bool {
        self.by_kind.values().all(BTreeMap::is_empty)
    }

    /// Number of (kind, source) findings.
    pub fn total(&self) -> usize {
        self.by_kind.values().map(BTreeMap::len).sum()
    }

    /// Kinds present, each with its sources in ascending order.
    pub fn kinds(&self) -> impl Iterator<Item = (ViolationKind, &BTreeMap<String, PackageVersion>)> {
        self.by_kind
            .iter()
            .filter(|(_, sources)| !sources.is_empty())
            .map(|(kind, sources)| (*kind, sources))
    }

    pub fn get(&self, kind: ViolationKind) -> Option<&BTreeMap<String, PackageVersion>> {
        self.by_kind.get(&kind)
    }

    pub fn records(&self) -> impl Iterator<Item = ViolationRecord<'_>> {
        self.kinds().flat_map(|(kind, sources)| {
            sources.iter().map(move |(source_name, version)| ViolationRecord {
                kind,
                source_name,
                version,
            })
        })
    }

    /// 0 when clean, 1 when any discrepancy was found.
    pub fn status(&self) -> u8 {
        if self.is_clean() {
            0
        } else {
            1
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

/// Applies a rule table to a catalog.
pub struct Classifier<'a> {
    rules: &'a [Rule],
    labels: HashMap<Feed, String>,
}

impl<'a> Classifier<'a> {
    /// Bind `rules` to the origin labels assigned in `descriptors`.
    pub fn new(rules: &'a [Rule], descriptors: &[RepositoryDescriptor]) -> Self {
        let labels = descriptors
            .iter()
            .map(|descriptor| (descriptor.feed, descriptor.origin.clone()))
            .collect();
        Self { rules, labels }
    }

    /// Evaluate every rule for every package, or only for `only` when non-empty.
    pub fn classify(
        &self,
        catalog: &Catalog,
        only: &BTreeSet<String>,
        logger: &Logger,
    ) -> Findings {
        if !only.is_empty() {
            let missing: Vec<&str> = only
                .iter()
                .map(String::as_str)
                .filter(|name| !catalog.contains(name))
                .collect();
            if !missing.is_empty() {
                logger.warn(
                    "PKG404",
                    format!("Requested packages not in any repository: {}", missing.join(", ")),
                );
            }
        }

        let mut findings = Findings::default();
        for package in catalog.packages() {
            if !only.is_empty() && !only.contains(package) {
                continue;
            }
            self.classify_package(catalog, package, &mut findings, logger);
        }
        findings
    }

    fn classify_package(
        &self,
        catalog: &Catalog,
        package: &str,
        findings: &mut Findings,
        logger: &Logger,
    ) {
        // Each feed's maximum is computed at most once per package.
        let mut maxima: HashMap<Feed, Option<PackageVersion>> = HashMap::new();
        let mut max_for = |feed: Feed| -> Option<PackageVersion> {
            maxima
                .entry(feed)
                .or_insert_with(|| {
                    self.labels
                        .get(&feed)
                        .and_then(|label| catalog.max_version_under_origin(package, label))
                })
                .clone()
        };

        for rule in self.rules {
            let [first, second] = rule.feeds();
            let (first_ver, second_ver) = (max_for(first), max_for(second));

            let offending = match *rule {
                Rule::Older { .. } => match (first_ver.as_ref(), second_ver.as_ref()) {
                    (Some(downstream), Some(reference))
                        if reference.source_name == downstream.source_name
                            && reference > downstream =>
                    {
                        Some(reference.clone())
                    }
                    _ => None,
                },
                Rule::Missing { .. } => match (first_ver.as_ref(), second_ver.as_ref()) {
                    (Some(present), None) => Some(present.clone()),
                    _ => None,
                },
            };

            if let Some(version) = offending {
                logger.debug(
                    "DISCREPANCY",
                    format!(
                        "{package}: {} | {} | {}",
                        rule.kind(),
                        self.describe(first, first_ver.as_ref()),
                        self.describe(second, second_ver.as_ref())
                    ),
                );
                findings.record(rule.kind(), version);
            }
        }
    }

    fn describe(&self, feed: Feed, version: Option<&PackageVersion>) -> String {
        let label = self.labels.get(&feed).map(String::as_str).unwrap_or("?");
        match version {
            None => format!("{label}: absent"),
            Some(version) => {
                let shown = version
                    .display_origin(label)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| label.to_string());
                format!(
                    "{shown}: {} {} ({})",
                    version.source_name, version.source_version, version.version
                )
            }
        }
    }
}
