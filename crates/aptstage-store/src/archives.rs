use crate::layout::AptLayout;
use crate::StoreError;
use aptstage_schema::DEB_SUFFIX;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// The shared `archives` directory holding every downloaded `.deb`.
///
/// Entries are keyed by file name only. Direct downloads and `apt-get -d`
/// both write here, and the installer unpacks whatever it finds.
#[derive(Debug, Clone)]
pub struct ArchiveCache {
    dir: PathBuf,
}

impl ArchiveCache {
    pub fn new(layout: &AptLayout) -> Self {
        Self {
            dir: layout.archives_dir(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn entry_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Modification time of a cached entry, or the UNIX epoch when it does not exist.
    pub fn local_timestamp(&self, path: &Path) -> Result<SystemTime, StoreError> {
        match fs::metadata(path) {
            Ok(meta) => Ok(meta.modified()?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(UNIX_EPOCH),
            Err(e) => Err(e.into()),
        }
    }

    /// Every `*.deb` file in the cache, sorted by file name.
    ///
    /// A missing directory yields an empty list.
    pub fn list_debs(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut debs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let is_deb = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(DEB_SUFFIX));
            if is_deb && path.is_file() {
                debs.push(path);
            }
        }
        debs.sort();
        Ok(debs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cache_in(dir: &Path) -> ArchiveCache {
        let cache = ArchiveCache::new(&AptLayout::new(dir));
        cache.ensure().unwrap();
        cache
    }

    #[test]
    fn missing_entry_has_epoch_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let ts = cache
            .local_timestamp(&cache.entry_path("absent.deb"))
            .unwrap();
        assert_eq!(ts, UNIX_EPOCH);
    }

    #[test]
    fn existing_entry_reports_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        let path = cache.entry_path("foo.deb");
        let file = fs::File::create(&path).unwrap();
        let when = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        file.set_modified(when).unwrap();
        drop(file);

        assert_eq!(cache.local_timestamp(&path).unwrap(), when);
    }

    #[test]
    fn list_debs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let cache = cache_in(dir.path());
        fs::write(cache.entry_path("zlib.deb"), "z").unwrap();
        fs::write(cache.entry_path("curl.deb"), "c").unwrap();
        fs::write(cache.entry_path("lock"), "").unwrap();
        fs::create_dir_all(cache.entry_path("partial")).unwrap();
        fs::create_dir_all(cache.entry_path("dir.deb")).unwrap();

        let debs = cache.list_debs().unwrap();
        let names: Vec<_> = debs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["curl.deb", "zlib.deb"]);
    }

    #[test]
    fn list_debs_on_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArchiveCache::new(&AptLayout::new(dir.path()));
        assert!(cache.list_debs().unwrap().is_empty());
    }
}
