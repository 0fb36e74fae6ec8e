/*============================================================
  Synavera Project: Pop-Audit
  Module: popaudit_core::index
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Fetch APT repository metadata for every source file staged
    in the working root and merge the Packages indices into one
    catalog, filed under each source's assigned origin label.

  Security / Safety Notes:
    Performs read-only GET requests. Index files are checked
    against the digests listed in the Release file. InRelease
    signatures are parsed, not verified; unsigned repositories
    are only accepted when the source permits it.

  Dependencies:
    debian-packaging for Release parsing, index selection,
    digest checks, decompression and Packages paragraphs;
    reqwest for HTTP; futures for the readers handed back.

  Operational Scope:
    The shipped implementation of `PackageIndexFetcher`.

  Revision History:
    2026-10-18 COD  Authored APT index retrieval.
    2026-10-18 COD  Retrieval moved behind RepositoryTransport and
                    onto debian-packaging readers; records filed
                    under the expected origin.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Any unreachable repository aborts the run
    - No retries; failures are reported with their URL
    - Sequential retrieval for predictable load
============================================================*/


use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use std::pin::Pin;

use async_trait::async_trait;
use debian_packaging::binary_package_control::BinaryPackageControlFile;
use debian_packaging::control::ControlParagraphReader;
use debian_packaging::error::{DebianError, Result as DebianResult};
use debian_packaging::io::{Compression, DataResolver};
use debian_packaging::repository::release::ReleaseFile;
use debian_packaging::repository::ReleaseReader;
use futures::AsyncRead;
use reqwest::{StatusCode, Url};

use crate::catalog::{Catalog, PackageIndexFetcher, PackageRecord};
use crate::config::FetchConfig;
use crate::error::{AuditError, Result};
use crate::logger::Logger;
use crate::package_info::Origin;
use crate::sources::{SourceEntry, SOURCES_DIR};

/// Raw file retrieval underneath the index fetcher.
#[async_trait]
pub trait RepositoryTransport: Sync {
    /// Body of `url`, or `Ok(None)` when the server has no such file.
    async fn get(&self, url: &Url) -> Result<Option<Vec<u8>>>;
}

/// HTTP(S) transport built from the `[fetch]` configuration.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| {
                AuditError::Config(format!("Failed to build HTTP client: {err}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RepositoryTransport for HttpTransport {
    /// 404 maps to `Ok(None)`; any other failure is an error.
    async fn get(&self, url: &Url) -> Result<Option<Vec<u8>>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| AuditError::fetch(url.as_str(), format!("request failed: {err}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AuditError::fetch(
                url.as_str(),
                format!("HTTP status {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| AuditError::fetch(url.as_str(), format!("read failed: {err}")))?;
        Ok(Some(bytes.to_vec()))
    }
}

/// Fetches APT metadata for the staged sources.
pub struct IndexFetcher<'a, T = HttpTransport> {
    transport: T,
    architecture: String,
    logger: &'a Logger,
}

impl<'a> IndexFetcher<'a, HttpTransport> {
    /// Construct an HTTP fetcher from configuration.
    pub fn new(config: &FetchConfig, logger: &'a Logger) -> Result<Self> {
        Ok(Self::with_transport(
            HttpTransport::new(config)?,
            config.architecture.clone(),
            logger,
        ))
    }
}

impl<'a, T: RepositoryTransport> IndexFetcher<'a, T> {
    pub fn with_transport(transport: T, architecture: impl Into<String>, logger: &'a Logger) -> Self {
        Self {
            transport,
            architecture: architecture.into(),
            logger,
        }
    }

    async fn fetch_suite(
        &self,
        entry: &SourceEntry,
        uri: &str,
        suite: &str,
        catalog: &mut Catalog,
    ) -> Result<()> {
        let base = base_url(uri)?;
        let dist = join(&base, &format!("dists/{suite}/"))?;

        let release = self.fetch_release(&dist, entry.allow_insecure).await?;
        let label = self.origin_label(&dist, &release, entry)?;
        let site = base.host_str().unwrap_or_default().to_string();
        let archive = release
            .suite()
            .filter(|value| !value.is_empty())
            .unwrap_or(suite)
            .to_string();

        let reader = SuiteReader {
            transport: &self.transport,
            dist: dist.clone(),
            release,
            compression: Compression::Xz,
        };

        for component in &entry.components {
            let index = match reader.packages_entry(component, &self.architecture, false) {
                Ok(index) => index,
                Err(DebianError::RepositoryReadPackagesIndicesEntryNotFound) => {
                    self.logger.warn(
                        "NOINDEX",
                        format!(
                            "{dist} lists no {component}/binary-{} Packages index; skipping",
                            self.architecture
                        ),
                    );
                    continue;
                }
                Err(err) => return Err(AuditError::fetch(dist.as_str(), err.to_string())),
            };

            let url = join(&dist, index.path)?;
            let packages = reader
                .resolve_packages_from_entry(&index)
                .await
                .map_err(|err| AuditError::fetch(url.as_str(), err.to_string()))?;

            let origin = Origin::new(label.clone(), site.clone(), archive.clone(), component.clone());
            let mut stanzas = 0usize;
            for control in packages.iter() {
                let record = package_record(control, &origin)
                    .map_err(|reason| AuditError::fetch(url.as_str(), reason))?;
                catalog.insert(record)?;
                stanzas += 1;
            }
            self.logger.debug(
                "INDEX",
                format!("{url}: {stanzas} package stanza(s) under {label}"),
            );
        }
        Ok(())
    }

    /// Prefer `InRelease`; fall back to `Release` only for insecure sources.
    async fn fetch_release(&self, dist: &Url, allow_insecure: bool) -> Result<ReleaseFile<'static>> {
        let in_release = join(dist, "InRelease")?;
        if let Some(bytes) = self.transport.get(&in_release).await? {
            return ReleaseFile::from_armored_reader(Cursor::new(bytes))
                .map_err(|err| AuditError::fetch(in_release.as_str(), err.to_string()));
        }

        if !allow_insecure {
            return Err(AuditError::fetch(
                in_release.as_str(),
                "repository has no InRelease file and insecure repositories are not allowed",
            ));
        }

        let release = join(dist, "Release")?;
        self.logger.warn(
            "INSECURE",
            format!("{dist} has no InRelease; using unsigned Release"),
        );
        let bytes = self
            .transport
            .get(&release)
            .await?
            .ok_or_else(|| AuditError::fetch(release.as_str(), "no Release file"))?;
        ReleaseFile::from_reader(Cursor::new(bytes))
            .map_err(|err| AuditError::fetch(release.as_str(), err.to_string()))
    }

    /// The label records are filed under.
    ///
    /// The classifier looks feeds up by their assigned origin, so
    /// `X-Expected-Origin` wins over whatever the Release file declares.
    fn origin_label(
        &self,
        dist: &Url,
        release: &ReleaseFile<'_>,
        entry: &SourceEntry,
    ) -> Result<String> {
        let declared = release.origin().filter(|value| !value.is_empty());
        match (entry.expected_origin.as_deref(), declared) {
            (Some(expected), Some(found)) => {
                if found != expected {
                    self.logger.warn(
                        "ORIGIN",
                        format!("{dist} declares origin `{found}`; filing under `{expected}`"),
                    );
                }
                Ok(expected.to_string())
            }
            (Some(expected), None) => Ok(expected.to_string()),
            (None, Some(found)) => Ok(found.to_string()),
            (None, None) => Err(AuditError::fetch(
                dist.as_str(),
                "Release file has no Origin field and the source names no expected origin",
            )),
        }
    }
}

#[async_trait]
impl<'a, T: RepositoryTransport> PackageIndexFetcher for IndexFetcher<'a, T> {
    async fn fetch_and_open(&self, root: &Path) -> Result<Catalog> {
        let entries = read_source_entries(root)?;
        let mut catalog = Catalog::new();

        for entry in &entries {
            self.logger.info("FETCH", format!("Updating {}", entry.name));
            for uri in &entry.uris {
                for suite in &entry.suites {
                    self.fetch_suite(entry, uri, suite, &mut catalog).await?;
                }
            }
        }
        Ok(catalog)
    }
}

/// One `dists/<suite>/` directory, read through a transport.
struct SuiteReader<'t, T> {
    transport: &'t T,
    dist: Url,
    release: ReleaseFile<'static>,
    compression: Compression,
}

#[async_trait]
impl<'t, T: RepositoryTransport> DataResolver for SuiteReader<'t, T> {
    async fn get_path(&self, path: &str) -> DebianResult<Pin<Box<dyn AsyncRead + Send>>> {
        let url = self
            .dist
            .join(path)
            .map_err(|err| repository_io(path, err))?;
        match self.transport.get(&url).await {
            Ok(Some(bytes)) => Ok(Box::pin(futures::io::Cursor::new(bytes))),
            Ok(None) => Err(repository_io(path, "listed in Release but not found")),
            Err(err) => Err(repository_io(path, err)),
        }
    }
}

#[async_trait]
impl<'t, T: RepositoryTransport> ReleaseReader for SuiteReader<'t, T> {
    fn url(&self) -> DebianResult<Url> {
        Ok(self.dist.clone())
    }

    fn release_file(&self) -> &ReleaseFile<'_> {
        &self.release
    }

    fn preferred_compression(&self) -> Compression {
        self.compression
    }

    fn set_preferred_compression(&mut self, compression: Compression) {
        self.compression = compression;
    }
}

fn repository_io(path: &str, reason: impl ToString) -> DebianError {
    DebianError::RepositoryIoPath(
        path.to_string(),
        std::io::Error::new(std::io::ErrorKind::Other, reason.to_string()),
    )
}

/// Read every `*.sources` file under `root`, in file-name order.
pub fn read_source_entries(root: &Path) -> Result<Vec<SourceEntry>> {
    let dir = root.join(SOURCES_DIR);
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(|err| {
        AuditError::Filesystem(format!("Failed to list {}: {err}", dir.display()))
    })? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "sources") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut entries = Vec::new();
    for path in paths {
        let display = path.display().to_string();
        let file = File::open(&path).map_err(|err| {
            AuditError::Filesystem(format!("Failed to read {display}: {err}"))
        })?;
        for paragraph in ControlParagraphReader::new(BufReader::new(file)) {
            let paragraph =
                paragraph.map_err(|err| AuditError::Parse(format!("{display}: {err}")))?;
            if let Some(source) = SourceEntry::from_paragraph(&paragraph, &display)? {
                entries.push(source);
            }
        }
    }
    Ok(entries)
}

/// Turn one Packages stanza into a catalog record attributed to `origin`.
pub fn package_record(
    control: &BinaryPackageControlFile<'_>,
    origin: &Origin,
) -> std::result::Result<PackageRecord, String> {
    let package = control.package().map_err(|err| err.to_string())?.to_string();
    let version = control
        .version_str()
        .map_err(|err| format!("package {package}: {err}"))?
        .to_string();
    let (source_name, source_version) = split_source_field(control.source(), &package, &version);

    Ok(PackageRecord {
        package,
        version,
        source_name,
        source_version,
        origin: origin.clone(),
    })
}

/// `Source: name (version)` names the source package and, optionally,
/// its version; both default to the binary's own.
fn split_source_field(field: Option<&str>, package: &str, version: &str) -> (String, String) {
    match field.map(str::trim).filter(|value| !value.is_empty()) {
        None => (package.to_string(), version.to_string()),
        Some(value) => match value.split_once('(') {
            Some((name, rest)) => (
                name.trim().to_string(),
                rest.trim_end().trim_end_matches(')').trim().to_string(),
            ),
            None => (value.to_string(), version.to_string()),
        },
    }
}

fn base_url(uri: &str) -> Result<Url> {
    let mut url =
        Url::parse(uri).map_err(|err| AuditError::Parse(format!("invalid URI `{uri}`: {err}")))?;
    // Url::join replaces the last segment unless the path ends in a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|err| AuditError::fetch(base.as_str(), format!("invalid path {path}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Mutex;

    use sha2::{Digest, Sha256};

    use crate::catalog::{build_catalog, FetchOptions};
    use crate::classify::{ruleset, Classifier, ViolationKind};
    use crate::repos::{Feed, Mode, RepositoryDescriptor};
    use crate::sources::render_sources_file;

    const DIST: &str = "http://repo.example/ubuntu/dists/jammy/";
    const MAIN_INDEX: &str = "main/binary-amd64/Packages";
    const PACKAGES: &str = "\
Package: foo
Version: 1.0-1
Architecture: amd64

Package: libbar1
Source: bar (2.0-1)
Version: 2.0-1build1
Architecture: amd64
";

    /// In-memory repository host; records every requested URL.
    #[derive(Default)]
    struct MemoryTransport {
        files: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl MemoryTransport {
        fn serve(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
            self.files.insert(url.into(), body.into());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RepositoryTransport for MemoryTransport {
        async fn get(&self, url: &Url) -> Result<Option<Vec<u8>>> {
            self.requests.lock().unwrap().push(url.to_string());
            Ok(self.files.get(url.as_str()).cloned())
        }
    }

    /// A plain Release file listing `indices` by SHA-256.
    fn release(origin: Option<&str>, indices: &[(&str, &[u8])]) -> String {
        let mut text = String::new();
        if let Some(origin) = origin {
            text.push_str(&format!("Origin: {origin}\n"));
        }
        text.push_str("Suite: jammy\nComponents: main universe\nSHA256:\n");
        for (path, body) in indices {
            text.push_str(&format!(
                " {:x} {} {path}\n",
                Sha256::digest(body),
                body.len()
            ));
        }
        text
    }

    fn descriptor(name: &str, feed: Feed, url: &str, origin: &str) -> RepositoryDescriptor {
        RepositoryDescriptor {
            name: name.into(),
            feed,
            url: url.into(),
            suites: vec!["jammy".into()],
            components: vec!["main".into()],
            origin: origin.into(),
        }
    }

    /// Write `descriptor` into a fresh working root.
    fn staged(descriptor: &RepositoryDescriptor, allow_insecure: bool) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(SOURCES_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{}.sources", descriptor.name)),
            render_sources_file(descriptor, &FetchOptions { allow_insecure }),
        )
        .unwrap();
        root
    }

    fn ubuntu() -> RepositoryDescriptor {
        descriptor("ubuntu", Feed::Upstream, "http://repo.example/ubuntu", "Ubuntu")
    }

    fn plain_repository(origin: Option<&str>) -> MemoryTransport {
        MemoryTransport::default()
            .serve(
                format!("{DIST}Release"),
                release(origin, &[(MAIN_INDEX, PACKAGES.as_bytes())]),
            )
            .serve(format!("{DIST}{MAIN_INDEX}"), PACKAGES)
    }

    async fn open(
        transport: MemoryTransport,
        descriptor: &RepositoryDescriptor,
        allow_insecure: bool,
    ) -> (Result<Catalog>, Vec<String>) {
        let logger = Logger::stderr_only(false);
        let root = staged(descriptor, allow_insecure);
        let fetcher = IndexFetcher::with_transport(transport, "amd64", &logger);
        let outcome = fetcher.fetch_and_open(root.path()).await;
        (outcome, fetcher.transport.requested())
    }

    #[tokio::test]
    async fn insecure_source_falls_back_to_plain_release() {
        let (catalog, requested) = open(plain_repository(Some("Ubuntu")), &ubuntu(), true).await;
        let catalog = catalog.unwrap();

        assert_eq!(
            requested,
            vec![
                format!("{DIST}InRelease"),
                format!("{DIST}Release"),
                format!("{DIST}{MAIN_INDEX}"),
            ]
        );
        let foo = catalog.max_version_under_origin("foo", "Ubuntu").unwrap();
        assert_eq!(foo.version.as_str(), "1.0-1");
        let libbar = catalog.max_version_under_origin("libbar1", "Ubuntu").unwrap();
        assert_eq!(libbar.source_name, "bar");
        assert_eq!(libbar.source_version, "2.0-1");
    }

    #[tokio::test]
    async fn secure_source_without_inrelease_is_fatal() {
        let (outcome, requested) = open(plain_repository(Some("Ubuntu")), &ubuntu(), false).await;

        let err = outcome.unwrap_err();
        assert!(matches!(&err, AuditError::Fetch { url, .. } if url.ends_with("/InRelease")));
        assert_eq!(requested, vec![format!("{DIST}InRelease")]);
    }

    #[tokio::test]
    async fn records_are_filed_under_the_expected_origin() {
        let stable = descriptor(
            "system76-dev-stable",
            Feed::BuildStable,
            "http://repo.example/ubuntu",
            "custom-stable",
        );
        let (catalog, _) = open(
            plain_repository(Some("LP-PPA-system76-dev-stable")),
            &stable,
            true,
        )
        .await;
        let catalog = catalog.unwrap();

        assert!(catalog.max_version_under_origin("foo", "custom-stable").is_some());
        assert!(catalog
            .max_version_under_origin("foo", "LP-PPA-system76-dev-stable")
            .is_none());
    }

    #[tokio::test]
    async fn release_without_origin_uses_expected_origin() {
        let (catalog, _) = open(plain_repository(None), &ubuntu(), true).await;
        let catalog = catalog.unwrap();

        let foo = catalog.max_version_under_origin("foo", "Ubuntu").unwrap();
        let origin = foo.origins.iter().next().unwrap();
        assert_eq!(origin.archive, "jammy");
        assert_eq!(origin.site, "repo.example");
    }

    #[tokio::test]
    async fn release_origin_labels_sources_without_expectation() {
        let logger = Logger::stderr_only(false);
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(SOURCES_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("ubuntu.sources"),
            "X-Repolib-Name: ubuntu\nTypes: deb\nURIs: http://repo.example/ubuntu\n\
             Suites: jammy\nComponents: main\nAllow-Insecure: yes\n",
        )
        .unwrap();

        let fetcher =
            IndexFetcher::with_transport(plain_repository(Some("Ubuntu")), "amd64", &logger);
        let catalog = fetcher.fetch_and_open(root.path()).await.unwrap();
        assert!(catalog.max_version_under_origin("foo", "Ubuntu").is_some());

        let fetcher = IndexFetcher::with_transport(plain_repository(None), "amd64", &logger);
        let err = fetcher.fetch_and_open(root.path()).await.unwrap_err();
        assert!(matches!(err, AuditError::Fetch { reason, .. } if reason.contains("Origin")));
    }

    #[tokio::test]
    async fn component_without_index_is_skipped() {
        let mut both = ubuntu();
        both.components = vec!["main".into(), "universe".into()];

        let (catalog, requested) = open(plain_repository(Some("Ubuntu")), &both, true).await;
        let catalog = catalog.unwrap();

        assert!(catalog.contains("foo"));
        assert!(!requested.iter().any(|url| url.contains("/universe/")));
    }

    #[tokio::test]
    async fn digest_mismatch_is_fatal() {
        let tampered = PACKAGES.replace("1.0-1", "9.9-9");
        assert_eq!(tampered.len(), PACKAGES.len());
        let transport = MemoryTransport::default()
            .serve(
                format!("{DIST}Release"),
                release(Some("Ubuntu"), &[(MAIN_INDEX, PACKAGES.as_bytes())]),
            )
            .serve(format!("{DIST}{MAIN_INDEX}"), tampered);

        let (outcome, _) = open(transport, &ubuntu(), true).await;
        let err = outcome.unwrap_err();
        assert!(matches!(&err, AuditError::Fetch { url, .. } if url.ends_with(MAIN_INDEX)));
    }

    #[tokio::test]
    async fn listed_index_that_is_missing_is_fatal() {
        let transport = MemoryTransport::default().serve(
            format!("{DIST}Release"),
            release(Some("Ubuntu"), &[(MAIN_INDEX, PACKAGES.as_bytes())]),
        );

        let (outcome, _) = open(transport, &ubuntu(), true).await;
        assert!(matches!(outcome, Err(AuditError::Fetch { .. })));
    }

    #[tokio::test]
    async fn mismatched_release_origin_still_reaches_the_classifier() {
        let stable = descriptor(
            "system76-dev-stable",
            Feed::BuildStable,
            "http://stable.example/ubuntu",
            "custom-stable",
        );
        let pre_stable = descriptor(
            "system76-dev-pre-stable",
            Feed::BuildPreStable,
            "http://prestable.example/ubuntu",
            "LP-PPA-system76-dev-pre-stable",
        );
        let stable_packages = "Package: foo\nVersion: 1.0\n\nPackage: bar\nVersion: 2.0\n";
        let stable_dist = "http://stable.example/ubuntu/dists/jammy/";
        let pre_stable_dist = "http://prestable.example/ubuntu/dists/jammy/";
        let transport = MemoryTransport::default()
            .serve(
                format!("{stable_dist}Release"),
                release(
                    Some("LP-PPA-system76-dev-stable"),
                    &[(MAIN_INDEX, stable_packages.as_bytes())],
                ),
            )
            .serve(format!("{stable_dist}{MAIN_INDEX}"), stable_packages)
            .serve(
                format!("{pre_stable_dist}Release"),
                release(Some("LP-PPA-system76-dev-pre-stable"), &[(MAIN_INDEX, "".as_bytes())]),
            )
            .serve(format!("{pre_stable_dist}{MAIN_INDEX}"), "");

        let logger = Logger::stderr_only(false);
        let descriptors = vec![stable, pre_stable];
        let fetcher = IndexFetcher::with_transport(transport, "amd64", &logger);
        let catalog = build_catalog(
            &descriptors,
            &FetchOptions {
                allow_insecure: true,
            },
            &fetcher,
            &logger,
        )
        .await
        .unwrap();

        let findings = Classifier::new(ruleset(Mode::Dev), &descriptors).classify(
            &catalog,
            &BTreeSet::new(),
            &logger,
        );
        let flagged: Vec<&str> = findings
            .get(ViolationKind::InStableNotPreStable)
            .map(|sources| sources.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(flagged, vec!["bar", "foo"]);
        assert_eq!(findings.total(), 2);
        assert_eq!(findings.status(), 1);
    }

    #[test]
    fn packages_carry_source_names_and_versions() {
        let text = "\
Package: foo
Version: 2.0-1
Architecture: amd64

Package: libfoo1
Source: foo (2.0-1)
Version: 2.0-1build1

Package: bar-data
Source: bar
Version: 1:1.2-3
";
        let origin = Origin::new("Ubuntu", "archive.ubuntu.com", "jammy-updates", "main");
        let records: Vec<PackageRecord> = ControlParagraphReader::new(Cursor::new(text))
            .map(|paragraph| {
                package_record(&BinaryPackageControlFile::from(paragraph.unwrap()), &origin)
                    .unwrap()
            })
            .collect();
        let summary: Vec<(&str, &str, &str, &str)> = records
            .iter()
            .map(|r| {
                (
                    r.package.as_str(),
                    r.version.as_str(),
                    r.source_name.as_str(),
                    r.source_version.as_str(),
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("foo", "2.0-1", "foo", "2.0-1"),
                ("libfoo1", "2.0-1build1", "foo", "2.0-1"),
                ("bar-data", "1:1.2-3", "bar", "1:1.2-3"),
            ]
        );
        assert!(records.iter().all(|r| r.origin == origin));
    }

    #[test]
    fn stanza_without_version_is_an_error() {
        let paragraph = ControlParagraphReader::new(Cursor::new("Package: foo\nArchitecture: all\n"))
            .next()
            .unwrap()
            .unwrap();
        let origin = Origin::new("Ubuntu", "archive.ubuntu.com", "jammy", "main");
        let err = package_record(&BinaryPackageControlFile::from(paragraph), &origin).unwrap_err();
        assert!(err.contains("foo"));
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = base_url("http://apt.pop-os.org/staging/master").unwrap();
        assert_eq!(
            url.join("dists/jammy/InRelease").unwrap().as_str(),
            "http://apt.pop-os.org/staging/master/dists/jammy/InRelease"
        );
        assert!(matches!(base_url("not a url"), Err(AuditError::Parse(_))));
    }

    #[test]
    fn source_entries_are_read_in_name_order() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(SOURCES_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("ubuntu.sources"),
            "X-Repolib-Name: ubuntu\nTypes: deb\nURIs: http://u\nSuites: jammy\nComponents: main\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("pop-os-release.sources"),
            "X-Repolib-Name: pop-os-release\nTypes: deb\nURIs: http://p\nSuites: jammy\n\
             Components: main\nAllow-Insecure: yes\n",
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let entries = read_source_entries(root.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["pop-os-release", "ubuntu"]);
        assert!(entries[0].allow_insecure);
        assert!(!entries[1].allow_insecure);
    }
}
