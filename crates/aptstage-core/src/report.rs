use serde::Serialize;

/// Outcome of [`Pipeline::download`](crate::Pipeline::download).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    /// Cache file names fetched from direct URLs during this run.
    pub downloaded: Vec<String>,
    /// Cache file names whose local copy was newer than the remote one.
    pub skipped: Vec<String>,
    /// Repository package names handed to `apt-get` in one batch.
    pub repository: Vec<String>,
}

/// Summary of a full [`Pipeline::run`](crate::Pipeline::run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub cache_dir: String,
    pub install_dir: String,
    /// `apt-key` invocations issued (advanced options plus key URLs).
    pub keys: usize,
    /// Repository lines appended to the isolated source list.
    pub repos: usize,
    /// Pin stanzas appended to the isolated preferences file.
    pub pins: usize,
    pub download: DownloadReport,
    /// Archive file names unpacked into the install directory, in order.
    pub installed: Vec<String>,
}
