/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::catalog
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Build the in-memory package catalog for a run and answer
    per-origin maximum version queries against it.

  Security / Safety Notes:
    Repository source files live in a temporary working root
    that is removed on every exit path; the host's own apt
    state is never read or written.

  Dependencies:
    tempfile for the working root, async-trait for the
    fetcher seam.

  Operational Scope:
    Sits between the repository set builder and the
    discrepancy classifier.

  Revision History:
    2026-10-18 COD  Authored catalog query engine.
  ------------------------------------------------------------
  SSE Principles Observed:
    - No partial catalogs: any fetch failure aborts the run
    - Read-only after construction
    - Scoped acquisition and release of temporary state
============================================================*/

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use crate::error::{AuditError, Result};
use crate::logger::Logger;
use crate::package_info::{max_version, Origin, PackageVersion};
use crate::repos::RepositoryDescriptor;
use crate::sources::{render_sources_file, SOURCES_DIR};
use crate::version::DebianVersion;

/// Options governing how repositories are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Accept repositories that publish no signed InRelease file.
    pub allow_insecure: bool,
}

/// Retrieves every repository described under a working root.
#[async_trait]
pub trait PackageIndexFetcher: Sync {
    /// Read the `.sources` files under `root`, fetch their metadata and
    /// return the merged catalog. Any failure is fatal.
    async fn fetch_and_open(&self, root: &Path) -> Result<Catalog>;
}

/// One observed `(package, version, origin)` triple from an index.
#[derive(Debug, Clone)]
pub struct PackageRecord {
    pub package: String,
    pub version: String,
    pub source_name: String,
    pub source_version: String,
    pub origin: Origin,
}

/// Package name to observed versions, merged across all repositories.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    packages: BTreeMap<String, Vec<PackageVersion>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation. A version already present for the package
    /// gains the record's origin; a malformed version is a `Parse` error.
    pub fn insert(&mut self, record: PackageRecord) -> Result<()> {
        let version = DebianVersion::parse(&record.version).map_err(|err| {
            AuditError::Parse(format!(
                "package {} from {}: {err}",
                record.package, record.origin
            ))
        })?;

        let versions = self.packages.entry(record.package).or_default();
        let observed = PackageVersion::new(
            record.source_name,
            version,
            record.source_version,
            record.origin,
        );
        match versions
            .iter()
            .position(|known| known.version.as_str() == observed.version.as_str())
        {
            Some(idx) => versions[idx].merge_origins(&observed),
            None => versions.push(observed),
        }
        Ok(())
    }

    /// Build a catalog from a batch of records.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = PackageRecord>,
    {
        let mut catalog = Self::new();
        for record in records {
            catalog.insert(record)?;
        }
        Ok(catalog)
    }

    /// All known binary package names, sorted.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    /// Every version observed for `package`, in discovery order.
    pub fn versions(&self, package: &str) -> &[PackageVersion] {
        self.packages
            .get(package)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Highest version of `package` published under `label`, if any.
    pub fn max_version_under_origin(&self, package: &str, label: &str) -> Option<PackageVersion> {
        max_version(
            self.versions(package)
                .iter()
                .filter(|version| version.has_origin(label)),
        )
    }

    /// Highest version of `package` from any origin.
    pub fn max_version_overall(&self, package: &str) -> Option<PackageVersion> {
        max_version(self.versions(package))
    }
}

/// Fetch every repository in `descriptors` into one catalog.
///
/// Source files are staged in a fresh temporary root which is removed
/// when this function returns, whether the fetch succeeded or not.
pub async fn build_catalog<F>(
    descriptors: &[RepositoryDescriptor],
    options: &FetchOptions,
    fetcher: &F,
    logger: &Logger,
) -> Result<Catalog>
where
    F: PackageIndexFetcher + ?Sized,
{
    let root = tempfile::Builder::new()
        .prefix("popaudit-")
        .tempdir()
        .map_err(|err| {
            AuditError::Filesystem(format!("Failed to create working root: {err}"))
        })?;
    logger.debug(
        "ROOT",
        format!("Working root {}", root.path().display()),
    );

    stage_sources(root.path(), descriptors, options)?;
    logger.info(
        "SOURCES",
        format!("Staged {} repository source file(s)", descriptors.len()),
    );

    let fetched = fetcher.fetch_and_open(root.path()).await;
    let root_path = root.path().to_path_buf();
    let released = root.close();

    let catalog = fetched?;
    released.map_err(|err| {
        AuditError::Filesystem(format!(
            "Failed to remove working root {}: {err}",
            root_path.display()
        ))
    })?;
    logger.info(
        "CATALOG",
        format!("Catalog holds {} binary package(s)", catalog.len()),
    );
    Ok(catalog)
}

fn stage_sources(
    root: &Path,
    descriptors: &[RepositoryDescriptor],
    options: &FetchOptions,
) -> Result<()> {
    let source_dir = root.join(SOURCES_DIR);
    std::fs::create_dir_all(&source_dir).map_err(|err| {
        AuditError::Filesystem(format!(
            "Failed to create {}: {err}",
            source_dir.display()
        ))
    })?;

    for descriptor in descriptors {
        let path = source_dir.join(format!("{}.sources", descriptor.name));
        std::fs::write(&path, render_sources_file(descriptor, options)).map_err(|err| {
            AuditError::Filesystem(format!("Failed to write {}: {err}", path.display()))
        })?;
    }
    Ok(())
}
