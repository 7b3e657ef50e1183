use crate::date::parse_http_date;
use crate::{ArtifactSource, RemoteArtifact, RemoteError};
use tracing::{debug, warn};

/// Plain `GET` retrieval of package archives.
///
/// No timeout is configured: a stalled server blocks the caller.
pub struct HttpSource {
    agent: ureq::Agent,
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpSource {
    pub fn new() -> Self {
        let agent = ureq::Agent::new_with_defaults();
        Self { agent }
    }
}

impl ArtifactSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<RemoteArtifact, RemoteError> {
        debug!("GET {url}");
        let resp = match self.agent.get(url).call() {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(404)) => {
                return Err(RemoteError::NotFound(url.to_owned()));
            }
            Err(ureq::Error::StatusCode(code)) => {
                return Err(RemoteError::Http(format!("HTTP {code} for {url}")));
            }
            Err(e) => {
                return Err(RemoteError::Http(e.to_string()));
            }
        };

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let raw_modified = header("last-modified");
        let last_modified = raw_modified.as_deref().and_then(parse_http_date);
        if last_modified.is_none() {
            warn!(
                "unusable Last-Modified {:?} for {url}; treating remote copy as newest",
                raw_modified.as_deref().unwrap_or("")
            );
        }
        let content_length = header("content-length").and_then(|v| v.trim().parse::<u64>().ok());

        Ok(RemoteArtifact {
            url: url.to_owned(),
            last_modified,
            content_length,
            body: Box::new(resp.into_body().into_reader()),
        })
    }
}
