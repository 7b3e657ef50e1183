//! Direct artifact retrieval for aptstage.
//!
//! This crate fetches single `.deb` files over HTTP (`HttpSource`), parses the
//! `Last-Modified` header (`parse_http_date`), decides whether a cached copy
//! must be replaced (`needs_download`), and writes the body into the archive cache
//! with a byte-count check against `Content-Length` (`write_artifact`).

pub mod date;
pub mod http;
pub mod transfer;

pub use date::parse_http_date;
pub use http::HttpSource;
pub use transfer::{needs_download, write_artifact};

use std::fmt;
use std::io::Read;
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("could only write {written} bytes of total {expected} for pkg {package}")]
    ShortWrite {
        package: String,
        written: u64,
        expected: u64,
    },
}

/// An open response for a single artifact.
///
/// The body is streamed; dropping the artifact releases the connection.
pub struct RemoteArtifact {
    pub url: String,
    /// Parsed `Last-Modified`, `None` when the header is absent or malformed.
    pub last_modified: Option<SystemTime>,
    /// Declared `Content-Length`, `None` when the server did not send one.
    pub content_length: Option<u64>,
    pub body: Box<dyn Read>,
}

impl RemoteArtifact {
    /// Timestamp used for the freshness comparison.
    ///
    /// A missing or unparseable `Last-Modified` counts as "now", so it is
    /// never older than a cached copy.
    pub fn remote_timestamp(&self) -> SystemTime {
        self.last_modified.unwrap_or_else(SystemTime::now)
    }
}

impl fmt::Debug for RemoteArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteArtifact")
            .field("url", &self.url)
            .field("last_modified", &self.last_modified)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Trait for artifact sources.
pub trait ArtifactSource: Send + Sync {
    /// Issue the request and return the response headers with an unread body.
    fn fetch(&self, url: &str) -> Result<RemoteArtifact, RemoteError>;
}
