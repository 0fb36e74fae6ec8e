/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::package_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing a published package version
    and the repository origins it was observed under.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    serde for report serialization.

  Operational Scope:
    Produced by the index fetcher, stored by the catalog and
    read by the classifier and report renderer.

  Revision History:
    2026-10-18 COD  Introduced origin-aware PackageVersion.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Deterministic ordering of origin sets
============================================================*/

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::version::DebianVersion;

/// One repository origin record, as apt describes it.
///
/// Field order defines the ordering, so the smallest record for a given
/// label is the one whose site, archive and component sort first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Origin {
    /// Origin label assigned to the feed, e.g. `Ubuntu`.
    pub label: String,
    /// Host serving the repository.
    pub site: String,
    /// Suite the index belongs to, e.g. `jammy-updates`.
    pub archive: String,
    pub component: String,
}

impl Origin {
    pub fn new(
        label: impl Into<String>,
        site: impl Into<String>,
        archive: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            site: site.into(),
            archive: archive.into(),
            component: component.into(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}/{})",
            self.label, self.site, self.archive, self.component
        )
    }
}

/// A binary package version together with its source package and origins.
///
/// Equality and ordering look at the binary version only; two records for
/// the same version are the same logical version whatever their origins.
#[derive(Debug, Clone, Serialize)]
pub struct PackageVersion {
    pub source_name: String,
    #[serde(serialize_with = "serialize_version")]
    pub version: DebianVersion,
    pub source_version: String,
    pub origins: BTreeSet<Origin>,
}

impl PackageVersion {
    pub fn new(
        source_name: impl Into<String>,
        version: DebianVersion,
        source_version: impl Into<String>,
        origin: Origin,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            version,
            source_version: source_version.into(),
            origins: BTreeSet::from([origin]),
        }
    }

    /// True when any origin record carries `label`.
    pub fn has_origin(&self, label: &str) -> bool {
        self.origins.iter().any(|origin| origin.label == label)
    }

    /// Distinct origin labels, sorted.
    pub fn origin_labels(&self) -> BTreeSet<&str> {
        self.origins
            .iter()
            .map(|origin| origin.label.as_str())
            .collect()
    }

    /// The origin record shown for `label`: the smallest one carrying it.
    pub fn display_origin(&self, label: &str) -> Option<&Origin> {
        self.origins.iter().find(|origin| origin.label == label)
    }

    /// Fold another observation of the same version into this one.
    pub fn merge_origins(&mut self, other: &PackageVersion) {
        self.origins.extend(other.origins.iter().cloned());
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}

fn serialize_version<S: Serializer>(
    version: &DebianVersion,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(version.as_str())
}

/// Maximal version of `versions`, merging the origins of every version
/// that compares equal to it. `None` for an empty input.
pub fn max_version<'a, I>(versions: I) -> Option<PackageVersion>
where
    I: IntoIterator<Item = &'a PackageVersion>,
{
    let mut best: Option<PackageVersion> = None;
    for candidate in versions {
        match best.as_mut() {
            None => best = Some(candidate.clone()),
            Some(current) => match candidate.cmp(current) {
                Ordering::Greater => *current = candidate.clone(),
                Ordering::Equal => current.merge_origins(candidate),
                Ordering::Less => {}
            },
        }
    }
    best
}
