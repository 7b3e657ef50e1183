use crate::report::{DownloadReport, RunReport};
use crate::CoreError;
use aptstage_remote::{needs_download, write_artifact, ArtifactSource, HttpSource};
use aptstage_runtime::tools::{self, APT_GET, APT_KEY, DPKG, TOOL_WORKDIR};
use aptstage_runtime::CommandRunner;
use aptstage_schema::{parse_manifest_file, Manifest};
use aptstage_store::{append_pins, append_sources, AptLayout, ArchiveCache, HostAptFiles, SeedReport};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Stages the packages of one manifest into an install directory through an
/// isolated APT root.
///
/// Every step runs sequentially and stops at the first failure. The manifest
/// is only available after [`setup`](Self::setup); before that the pipeline
/// behaves as if the manifest were empty.
pub struct Pipeline {
    runner: Box<dyn CommandRunner>,
    source: Box<dyn ArtifactSource>,
    host: HostAptFiles,
    layout: AptLayout,
    archives: ArchiveCache,
    manifest_path: PathBuf,
    install_dir: PathBuf,
    manifest: Manifest,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after the download step and leave the install directory untouched.
    pub skip_install: bool,
}

impl Pipeline {
    /// Create a pipeline that keeps its APT root under `cache_dir` and unpacks
    /// into `install_dir`. Direct artifacts are fetched over HTTP and the host
    /// templates are read from `/etc/apt`.
    pub fn new(
        manifest_path: impl Into<PathBuf>,
        cache_dir: impl Into<PathBuf>,
        install_dir: impl Into<PathBuf>,
        runner: Box<dyn CommandRunner>,
    ) -> Self {
        let layout = AptLayout::new(cache_dir);
        let archives = ArchiveCache::new(&layout);
        Self {
            runner,
            source: Box::new(HttpSource::new()),
            host: HostAptFiles::system(),
            layout,
            archives,
            manifest_path: manifest_path.into(),
            install_dir: install_dir.into(),
            manifest: Manifest::default(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Box<dyn ArtifactSource>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: HostAptFiles) -> Self {
        self.host = host;
        self
    }

    pub fn layout(&self) -> &AptLayout {
        &self.layout
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    /// Create the isolated root, seed it from the host and load the manifest.
    pub fn setup(&mut self) -> Result<SeedReport, CoreError> {
        info!("preparing isolated apt root in {}", self.layout.apt_dir().display());
        self.layout.initialize()?;

        let seeded = self.host.seed(&self.layout)?;
        debug!(
            "seeded from {}: trusted.gpg={} preferences={}",
            self.host.dir().display(),
            seeded.trusted_keys,
            seeded.preferences
        );

        self.manifest = parse_manifest_file(&self.manifest_path)?;
        debug!(
            "loaded {}: {} keys, {} gpg options, {} repos, {} packages",
            self.manifest_path.display(),
            self.manifest.keys.len(),
            self.manifest.gpg_advanced_options.len(),
            self.manifest.repos.len(),
            self.manifest.packages.len()
        );
        Ok(seeded)
    }

    pub fn has_keys(&self) -> bool {
        self.manifest.has_keys()
    }

    pub fn has_repos(&self) -> bool {
        self.manifest.has_repos()
    }

    /// Append the manifest's repositories to the isolated source list and
    /// write their pins. Returns the number of pin stanzas written.
    pub fn add_repos(&self) -> Result<usize, CoreError> {
        append_sources(&self.layout, &self.manifest.repos)?;
        let pins = append_pins(&self.layout, &self.manifest.repos)?;
        info!(
            "added {} repositories ({pins} pinned)",
            self.manifest.repos.len()
        );
        Ok(pins)
    }

    /// Import advanced gpg options first, then key URLs, into the isolated
    /// keyring. Returns the number of `apt-key` calls made.
    pub fn add_keys(&self) -> Result<usize, CoreError> {
        let keyring = self.layout.trusted_keys();
        let mut calls = 0;

        for option in &self.manifest.gpg_advanced_options {
            debug!("apt-key adv {option}");
            self.run_tool(APT_KEY, &tools::apt_key_adv_args(&keyring, option))
                .map_err(|source| CoreError::KeyOption {
                    option: option.clone(),
                    source,
                })?;
            calls += 1;
        }

        for url in &self.manifest.keys {
            info!("adding apt key {url}");
            self.run_tool(APT_KEY, &tools::apt_key_fetch_args(&keyring, url))
                .map_err(|source| CoreError::KeyUrl {
                    url: url.clone(),
                    source,
                })?;
            calls += 1;
        }

        Ok(calls)
    }

    /// Refresh package indexes for the isolated root and return the tool output.
    pub fn update(&self) -> Result<String, CoreError> {
        info!("updating package lists");
        let args = tools::apt_get_update_args(&self.layout.apt_options());
        Ok(self.run_tool(APT_GET, &args)?)
    }

    /// Fetch direct artifacts into the archive cache when the remote copy is
    /// not older than the cached one, then download all repository packages
    /// in a single `apt-get` call. That call is skipped when the manifest
    /// declares no repository packages.
    pub fn download(&self) -> Result<DownloadReport, CoreError> {
        let packages = self.manifest.package_set();
        self.archives.ensure()?;
        let mut report = DownloadReport::default();

        for url in &packages.direct {
            let file_name = url.file_name();
            let dest = self.archives.entry_path(file_name);
            let local = self.archives.local_timestamp(&dest)?;

            let artifact = self.source.fetch(url.as_str())?;
            if !needs_download(artifact.remote_timestamp(), local) {
                debug!("{file_name} is newer locally, skipping {url}");
                report.skipped.push(file_name.to_owned());
                continue;
            }

            info!("downloading {url}");
            let written = write_artifact(artifact, &dest)?;
            debug!("{file_name}: {written} bytes");
            report.downloaded.push(file_name.to_owned());
        }

        if packages.repository.is_empty() {
            debug!("no repository packages to download");
        } else {
            let args = tools::apt_get_download_args(&self.layout.apt_options(), &packages.repository);
            let output = self.run_tool(APT_GET, &args)?;
            info!("{}", output.trim_end());
            report.repository = packages
                .repository
                .iter()
                .map(|p| p.as_str().to_owned())
                .collect();
        }

        Ok(report)
    }

    /// Unpack every cached archive into the install directory, in file name
    /// order. Returns the archive file names that were unpacked.
    pub fn install(&self) -> Result<Vec<String>, CoreError> {
        let mut installed = Vec::new();
        for deb in self.archives.list_debs()? {
            let package = deb
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!("installing {package}");

            let args = tools::dpkg_extract_args(&deb, &self.install_dir);
            if let Err(source) = self.run_tool(DPKG, &args) {
                error!(
                    "error installing {package}: {}",
                    source.output().unwrap_or_default()
                );
                return Err(CoreError::Install { package, source });
            }
            installed.push(package);
        }
        Ok(installed)
    }

    /// Run every step in order, halting on the first failure.
    pub fn run(&mut self, options: RunOptions) -> Result<RunReport, CoreError> {
        self.setup()?;

        let keys = if self.has_keys() { self.add_keys()? } else { 0 };
        let (repos, pins) = if self.has_repos() {
            (self.manifest.repos.len(), self.add_repos()?)
        } else {
            (0, 0)
        };

        let output = self.update()?;
        debug!("{}", output.trim_end());

        let download = self.download()?;
        let installed = if options.skip_install {
            Vec::new()
        } else {
            self.install()?
        };

        Ok(RunReport {
            cache_dir: self.layout.root().to_string_lossy().into_owned(),
            install_dir: self.install_dir.to_string_lossy().into_owned(),
            keys,
            repos,
            pins,
            download,
            installed,
        })
    }

    fn run_tool(
        &self,
        program: &str,
        args: &[String],
    ) -> Result<String, aptstage_runtime::RuntimeError> {
        self.runner.output(Path::new(TOOL_WORKDIR), program, args)
    }
}
