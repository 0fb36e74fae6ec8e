/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::version
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Parse Debian package version strings and order them the
    way dpkg does.

  Security / Safety Notes:
    Pure computation; no I/O performed in this module.

  Dependencies:
    debian-packaging for the version grammar, thiserror for
    grammar errors.

  Operational Scope:
    Every version comparison made by the catalog and the
    classifier goes through `DebianVersion`.

  Revision History:
    2026-10-18 COD  Authored native dpkg version ordering.
    2026-10-18 COD  Grammar checks delegated to debian-packaging;
                    colons accepted in upstream after an epoch.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Total ordering consistent with equality
    - Malformed metadata rejected, never skipped
============================================================*/

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use debian_packaging::package_version::PackageVersion as PolicyVersion;
use thiserror::Error;

/// Grammar violations in a Debian version string.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,
    #[error("upstream version of `{0}` is empty or does not start with a digit")]
    UpstreamNotDigit(String),
    #[error("revision of `{0}` is empty")]
    EmptyRevision(String),
    #[error("`{version}` is not a valid Debian version: {reason}")]
    Grammar { version: String, reason: String },
}

/// A Debian package version, `[epoch:]upstream_version[-debian_revision]`.
///
/// Character grammar is checked by `debian_packaging`; ordering is dpkg's,
/// computed here. Equality follows the ordering, so `1.0` and `1.00` are
/// equal even though their strings differ. The original text is kept for
/// display.
#[derive(Clone, Debug)]
pub struct DebianVersion {
    raw: String,
    epoch: u32,
    upstream: String,
    revision: Option<String>,
}

impl DebianVersion {
    /// Parse a version string, rejecting anything outside Debian policy.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let (epoch, remainder) = match trimmed.split_once(':') {
            Some((epoch, rest)) => (Some(epoch), rest),
            None => (None, trimmed),
        };
        let (upstream, revision) = match remainder.rsplit_once('-') {
            Some((upstream, revision)) => (upstream, Some(revision)),
            None => (remainder, None),
        };

        if !upstream.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(VersionError::UpstreamNotDigit(trimmed.to_string()));
        }
        if revision == Some("") {
            return Err(VersionError::EmptyRevision(trimmed.to_string()));
        }

        let checked = PolicyVersion::parse(&grammar_form(epoch, upstream, revision)).map_err(
            |err| VersionError::Grammar {
                version: trimmed.to_string(),
                reason: err.to_string(),
            },
        )?;

        Ok(Self {
            raw: trimmed.to_string(),
            epoch: checked.epoch_assumed(),
            upstream: upstream.to_string(),
            revision: revision.map(str::to_string),
        })
    }

    /// The version exactly as it appeared in repository metadata.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }
}

impl FromStr for DebianVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for DebianVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for DebianVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DebianVersion {}

impl PartialOrd for DebianVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DebianVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_part(&self.upstream, &other.upstream))
            .then_with(|| {
                // An absent revision sorts as `0`.
                compare_part(
                    self.revision.as_deref().unwrap_or("0"),
                    other.revision.as_deref().unwrap_or("0"),
                )
            })
    }
}

/// The string handed to the grammar check.
///
/// Policy permits `:` in the upstream version once an epoch is present.
/// `PolicyVersion` splits on the first colon only, so later colons are
/// checked as `.`, which is legal in the same places.
fn grammar_form(epoch: Option<&str>, upstream: &str, revision: Option<&str>) -> String {
    let mut form = String::new();
    if let Some(epoch) = epoch {
        form.push_str(epoch);
        form.push(':');
        form.push_str(&upstream.replace(':', "."));
    } else {
        form.push_str(upstream);
    }
    if let Some(revision) = revision {
        form.push('-');
        form.push_str(revision);
    }
    form
}

/// Compare two version strings with dpkg semantics.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(DebianVersion::parse(a)?.cmp(&DebianVersion::parse(b)?))
}

/// Weight of one character inside a non-digit run.
///
/// `~` sorts before the end of the run, letters after it, everything
/// else after letters.
fn char_weight(c: Option<u8>) -> i32 {
    match c {
        Some(b'~') => -1,
        None => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(c) => i32::from(c) + 256,
    }
}

/// Compare an upstream version or revision by alternating non-digit and digit runs.
fn compare_part(a: &str, b: &str) -> Ordering {
    let mut a = a.as_bytes();
    let mut b = b.as_bytes();

    while !a.is_empty() || !b.is_empty() {
        let (a_text, a_rest) = split_run(a, |c| !c.is_ascii_digit());
        let (b_text, b_rest) = split_run(b, |c| !c.is_ascii_digit());
        let ordering = compare_text_run(a_text, b_text);
        if ordering != Ordering::Equal {
            return ordering;
        }

        let (a_digits, a_rest) = split_run(a_rest, |c| c.is_ascii_digit());
        let (b_digits, b_rest) = split_run(b_rest, |c| c.is_ascii_digit());
        let ordering = compare_digit_run(a_digits, b_digits);
        if ordering != Ordering::Equal {
            return ordering;
        }

        a = a_rest;
        b = b_rest;
    }

    Ordering::Equal
}

fn split_run(s: &[u8], keep: impl Fn(u8) -> bool) -> (&[u8], &[u8]) {
    let end = s.iter().position(|&c| !keep(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn compare_text_run(a: &[u8], b: &[u8]) -> Ordering {
    for idx in 0..a.len().max(b.len()) {
        let ordering = char_weight(a.get(idx).copied()).cmp(&char_weight(b.get(idx).copied()));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Numeric comparison of digit runs without overflow; an empty run counts as zero.
fn compare_digit_run(a: &[u8], b: &[u8]) -> Ordering {
    let strip = |s: &[u8]| -> usize { s.iter().position(|&c| c != b'0').unwrap_or(s.len()) };
    let a = &a[strip(a)..];
    let b = &b[strip(b)..];
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(a: &str, b: &str) -> Ordering {
        compare(a, b).unwrap()
    }

    #[test]
    fn parse_splits_components() {
        let v = DebianVersion::parse("1:4.7.0+dfsg1-2").unwrap();
        assert_eq!(v.epoch(), 1);
        assert_eq!(v.upstream(), "4.7.0+dfsg1");
        assert_eq!(v.revision(), Some("2"));

        let v = DebianVersion::parse("0.18.0+dfsg-2+b1").unwrap();
        assert_eq!(v.upstream(), "0.18.0+dfsg");
        assert_eq!(v.revision(), Some("2+b1"));

        let v = DebianVersion::parse("1.2-3-4").unwrap();
        assert_eq!(v.upstream(), "1.2-3");
        assert_eq!(v.revision(), Some("4"));
        assert_eq!(v.to_string(), "1.2-3-4");
    }

    #[test]
    fn parse_rejects_malformed_strings() {
        assert_eq!(DebianVersion::parse(""), Err(VersionError::Empty));
        assert!(matches!(
            DebianVersion::parse("a:1.0"),
            Err(VersionError::Grammar { .. })
        ));
        assert!(matches!(
            DebianVersion::parse(":1.0"),
            Err(VersionError::Grammar { .. })
        ));
        assert!(matches!(
            DebianVersion::parse("beta1"),
            Err(VersionError::UpstreamNotDigit(_))
        ));
        assert!(matches!(
            DebianVersion::parse("1.0_rc1"),
            Err(VersionError::Grammar { .. })
        ));
        assert!(matches!(
            DebianVersion::parse("1.0-"),
            Err(VersionError::EmptyRevision(_))
        ));
        assert!(matches!(
            DebianVersion::parse("1.0 beta-1"),
            Err(VersionError::Grammar { .. })
        ));
        assert!(matches!(
            DebianVersion::parse("1:2.0-3:1"),
            Err(VersionError::Grammar { .. })
        ));
    }

    #[test]
    fn colon_in_upstream_needs_an_epoch() {
        let v = DebianVersion::parse("1:2.0:3-1").unwrap();
        assert_eq!(v.epoch(), 1);
        assert_eq!(v.upstream(), "2.0:3");
        assert_eq!(v.revision(), Some("1"));
        assert_eq!(v.to_string(), "1:2.0:3-1");

        assert_eq!(cmp("1:2.0:3-1", "1:2.0:2-1"), Ordering::Greater);
        assert_eq!(cmp("1:2.0:3-1", "1:2.0.3-1"), Ordering::Greater);
        assert!(DebianVersion::parse("2.0:3-1").is_err());
    }

    #[test]
    fn revision_and_epoch_ordering() {
        assert_eq!(cmp("1.0-1", "1.0-2"), Ordering::Less);
        assert_eq!(cmp("2:1.0-1", "1.5-1"), Ordering::Greater);
        assert_eq!(cmp("1.0", "1.0-0"), Ordering::Equal);
        assert_eq!(cmp("2.0-1ubuntu1", "2.0-1"), Ordering::Greater);
    }

    #[test]
    fn tilde_sorts_before_everything() {
        assert_eq!(cmp("1.0~rc1", "1.0"), Ordering::Less);
        assert_eq!(cmp("1.0~beta1~svn1245", "1.0~beta1"), Ordering::Less);
        assert_eq!(cmp("1.0~~", "1.0~~a"), Ordering::Less);
        assert_eq!(cmp("1.0~", "1.0~~a"), Ordering::Greater);
    }

    #[test]
    fn letters_sort_before_other_characters() {
        assert_eq!(cmp("1.0a", "1.0"), Ordering::Greater);
        assert_eq!(cmp("1.0a", "1.0b"), Ordering::Less);
        assert_eq!(cmp("1.0-1ubuntu1", "1.0-1pop1"), Ordering::Greater);
        assert_eq!(cmp("1.0a", "1.0+"), Ordering::Less);
        assert_eq!(cmp("1.0+b1", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn numeric_runs_compare_by_value() {
        assert_eq!(cmp("1.10", "1.9"), Ordering::Greater);
        assert_eq!(cmp("1.00", "1.0"), Ordering::Equal);
        assert_eq!(
            cmp("1.99999999999999999999999", "1.100000000000000000000000"),
            Ordering::Less
        );
        assert_eq!(
            DebianVersion::parse("1.00").unwrap(),
            DebianVersion::parse("1.0").unwrap()
        );
    }

    #[test]
    fn ordering_is_transitive_and_antisymmetric_over_sample() {
        let samples = [
            "1.0~rc1",
            "1.0",
            "1.0-1",
            "1.0-1ubuntu1",
            "1.0-2",
            "1.0a",
            "1.0+dfsg-1",
            "1.1~alpha",
            "1.10",
            "1:0.1",
            "2:0.0.1~pre",
        ];
        let parsed: Vec<DebianVersion> = samples
            .iter()
            .map(|s| DebianVersion::parse(s).unwrap())
            .collect();

        for a in &parsed {
            for b in &parsed {
                assert_eq!(a.cmp(b), b.cmp(a).reverse(), "{a} vs {b}");
                for c in &parsed {
                    if a < b && b < c {
                        assert!(a < c, "{a} < {b} < {c}");
                    }
                }
            }
        }

        let mut sorted = parsed.clone();
        sorted.sort();
        let order: Vec<&str> = sorted.iter().map(DebianVersion::as_str).collect();
        assert_eq!(order, samples.to_vec());
    }
}
