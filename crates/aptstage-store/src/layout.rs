use crate::StoreError;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory layout of the isolated APT root under a build cache directory.
///
/// Everything lives below `<cache root>/apt` so the host's APT database is
/// never touched. Only the cache and state directories are created by
/// [`initialize`](Self::initialize); the `sources` and `etc` files are
/// produced by host seeding and overlay writes.
#[derive(Debug, Clone)]
pub struct AptLayout {
    root: PathBuf,
}

impl AptLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn apt_dir(&self) -> PathBuf {
        self.root.join("apt")
    }

    #[inline]
    pub fn cache_dir(&self) -> PathBuf {
        self.apt_dir().join("cache")
    }

    /// Where both direct downloads and `apt-get -d` place `.deb` files.
    #[inline]
    pub fn archives_dir(&self) -> PathBuf {
        self.cache_dir().join("archives")
    }

    #[inline]
    pub fn state_dir(&self) -> PathBuf {
        self.apt_dir().join("state")
    }

    #[inline]
    pub fn sources_list(&self) -> PathBuf {
        self.apt_dir().join("sources").join("sources.list")
    }

    #[inline]
    pub fn etc_dir(&self) -> PathBuf {
        self.apt_dir().join("etc")
    }

    #[inline]
    pub fn trusted_keys(&self) -> PathBuf {
        self.etc_dir().join("trusted.gpg")
    }

    #[inline]
    pub fn preferences(&self) -> PathBuf {
        self.etc_dir().join("preferences")
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.cache_dir())?;
        fs::create_dir_all(self.state_dir())?;
        Ok(())
    }

    /// `-o key=value` pairs that point `apt-get` at this root instead of the host's.
    pub fn apt_options(&self) -> Vec<String> {
        let pairs = [
            "debug::nolocking=true".to_owned(),
            format!("dir::cache={}", self.cache_dir().display()),
            format!("dir::state={}", self.state_dir().display()),
            format!("dir::etc::sourcelist={}", self.sources_list().display()),
            format!("dir::etc::trusted={}", self.trusted_keys().display()),
            format!("Dir::Etc::preferences={}", self.preferences().display()),
        ];
        let mut options = Vec::with_capacity(pairs.len() * 2);
        for pair in pairs {
            options.push("-o".to_owned());
            options.push(pair);
        }
        options
    }
}
