//! Staging pipeline for aptstage.
//!
//! This crate ties together manifest parsing, the isolated APT root, external
//! tool execution and direct artifact retrieval into the `Pipeline`: the
//! sequence of setup, key import, repository overlay, index update, download
//! and unpack that stages a manifest's packages into an install directory.

pub mod pipeline;
pub mod report;

pub use pipeline::{Pipeline, RunOptions};
pub use report::{DownloadReport, RunReport};

use aptstage_runtime::RuntimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("manifest error: {0}")]
    Manifest(#[from] aptstage_schema::ManifestError),
    #[error("store error: {0}")]
    Store(#[from] aptstage_store::StoreError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("remote error: {0}")]
    Remote(#[from] aptstage_remote::RemoteError),
    #[error("could not pass gpg advanced options `{option}`: {source}")]
    KeyOption {
        option: String,
        #[source]
        source: RuntimeError,
    },
    #[error("could not add apt key {url}: {source}")]
    KeyUrl {
        url: String,
        #[source]
        source: RuntimeError,
    },
    #[error("error installing {package}: {source}")]
    Install {
        package: String,
        #[source]
        source: RuntimeError,
    },
}

impl CoreError {
    /// Combined output of the external tool that failed, when there is one.
    pub fn output(&self) -> Option<&str> {
        match self {
            CoreError::Runtime(e)
            | CoreError::KeyOption { source: e, .. }
            | CoreError::KeyUrl { source: e, .. }
            | CoreError::Install { source: e, .. } => e.output(),
            _ => None,
        }
    }
}
