use crate::layout::AptLayout;
use crate::StoreError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the host's APT configuration.
pub const SYSTEM_APT_DIR: &str = "/etc/apt";

/// Host APT files used as read-only templates for the isolated root.
#[derive(Debug, Clone)]
pub struct HostAptFiles {
    dir: PathBuf,
}

/// What [`HostAptFiles::seed`] found on the host besides the source list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub trusted_keys: bool,
    pub preferences: bool,
}

impl Default for HostAptFiles {
    fn default() -> Self {
        Self::system()
    }
}

impl HostAptFiles {
    pub fn system() -> Self {
        Self::new(SYSTEM_APT_DIR)
    }

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sources_list(&self) -> PathBuf {
        self.dir.join("sources.list")
    }

    pub fn trusted_keys(&self) -> PathBuf {
        self.dir.join("trusted.gpg")
    }

    pub fn preferences(&self) -> PathBuf {
        self.dir.join("preferences")
    }

    /// Copy the host templates into `layout`.
    ///
    /// The source list is mandatory. The keyring and preferences are copied
    /// when present; without host preferences only the parent directory of the
    /// isolated preferences file is created.
    pub fn seed(&self, layout: &AptLayout) -> Result<SeedReport, StoreError> {
        let sources = self.sources_list();
        if !sources.try_exists()? {
            return Err(StoreError::MissingHostFile(sources));
        }
        copy_file(&sources, &layout.sources_list())?;

        let mut report = SeedReport::default();

        let trusted = self.trusted_keys();
        if trusted.try_exists()? {
            copy_file(&trusted, &layout.trusted_keys())?;
            report.trusted_keys = true;
        }

        let preferences = self.preferences();
        if preferences.try_exists()? {
            copy_file(&preferences, &layout.preferences())?;
            report.preferences = true;
        } else if let Some(parent) = layout.preferences().parent() {
            fs::create_dir_all(parent)?;
        }

        debug!(
            "seeded apt root from {} (trusted.gpg: {}, preferences: {})",
            self.dir.display(),
            report.trusted_keys,
            report.preferences
        );
        Ok(report)
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<(), StoreError> {
    let wrap = |source| StoreError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::copy(from, to).map_err(wrap)?;
    Ok(())
}
