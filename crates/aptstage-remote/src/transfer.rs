use crate::{RemoteArtifact, RemoteError};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

/// Whether a remote copy should replace the local one.
///
/// Equal timestamps count as "replace": an artifact downloaded in the same
/// second it was published is fetched again on the next run.
pub fn needs_download(remote: SystemTime, local: SystemTime) -> bool {
    remote >= local
}

/// Stream `artifact` into `dest`, truncating any previous content.
///
/// Fails with [`RemoteError::ShortWrite`] when fewer bytes than the declared
/// `Content-Length` arrive, whether the body ends early or the connection
/// drops mid-transfer. The partially written file is left in place.
/// Returns the number of bytes written.
pub fn write_artifact(artifact: RemoteArtifact, dest: &Path) -> Result<u64, RemoteError> {
    let RemoteArtifact {
        url,
        content_length,
        mut body,
        ..
    } = artifact;

    let mut file = File::create(dest)?;
    let copied = copy_counted(&mut body, &mut file);
    let written = match copied {
        Ok(n) => n,
        Err((n, e)) if content_length.is_some() && is_truncation(&e) => {
            debug!("body of {url} ended after {n} bytes: {e}");
            n
        }
        Err((_, e)) => return Err(e.into()),
    };
    file.flush()?;
    debug!("wrote {written} bytes from {url} to {}", dest.display());

    if let Some(expected) = content_length {
        if written < expected {
            return Err(RemoteError::ShortWrite {
                package: dest
                    .file_name()
                    .map_or_else(|| url.clone(), |n| n.to_string_lossy().into_owned()),
                written,
                expected,
            });
        }
    }
    Ok(written)
}

// Like `io::copy`, but the byte count survives a failed read.
fn copy_counted(reader: &mut dyn Read, writer: &mut impl Write) -> Result<u64, (u64, io::Error)> {
    let mut buf = [0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err((total, e)),
        };
        writer.write_all(&buf[..n]).map_err(|e| (total, e))?;
        total += n as u64;
    }
}

fn is_truncation(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, UNIX_EPOCH};

    fn artifact(body: &'static [u8], content_length: Option<u64>) -> RemoteArtifact {
        RemoteArtifact {
            url: "http://example.com/foo.deb".to_owned(),
            last_modified: None,
            content_length,
            body: Box::new(Cursor::new(body)),
        }
    }

    #[test]
    fn newer_remote_downloads() {
        let local = UNIX_EPOCH + Duration::from_secs(100);
        assert!(needs_download(local + Duration::from_secs(1), local));
    }

    #[test]
    fn older_remote_skips() {
        let local = UNIX_EPOCH + Duration::from_secs(100);
        assert!(!needs_download(local - Duration::from_secs(1), local));
    }

    #[test]
    fn equal_timestamps_download() {
        let t = UNIX_EPOCH + Duration::from_secs(100);
        assert!(needs_download(t, t));
    }

    #[test]
    fn any_remote_beats_missing_local() {
        assert!(needs_download(UNIX_EPOCH, UNIX_EPOCH));
        assert!(needs_download(SystemTime::now(), UNIX_EPOCH));
    }

    #[test]
    fn writes_full_body() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo.deb");
        let n = write_artifact(artifact(b"debian-binary", Some(13)), &dest).unwrap();
        assert_eq!(n, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"debian-binary");
    }

    #[test]
    fn truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo.deb");
        std::fs::write(&dest, b"a much longer stale archive").unwrap();
        write_artifact(artifact(b"new", None), &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn short_body_is_reported_and_left_partial() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo.deb");
        let err = write_artifact(artifact(b"half", Some(8)), &dest).unwrap_err();
        match err {
            RemoteError::ShortWrite {
                package,
                written,
                expected,
            } => {
                assert_eq!(package, "foo.deb");
                assert_eq!(written, 4);
                assert_eq!(expected, 8);
            }
            other => panic!("expected short write, got {other:?}"),
        }
        assert_eq!(std::fs::read(&dest).unwrap(), b"half");
    }

    /// Yields its bytes, then fails the way a dropped HTTP connection does.
    struct DroppedConnection(Cursor<&'static [u8]>);

    impl Read for DroppedConnection {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.read(buf)? {
                0 => Err(io::Error::new(ErrorKind::UnexpectedEof, "Peer disconnected")),
                n => Ok(n),
            }
        }
    }

    fn dropped(body: &'static [u8], content_length: Option<u64>) -> RemoteArtifact {
        RemoteArtifact {
            url: "http://example.com/pool/foo.deb".to_owned(),
            last_modified: None,
            content_length,
            body: Box::new(DroppedConnection(Cursor::new(body))),
        }
    }

    #[test]
    fn dropped_connection_is_short_write() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo.deb");
        let err = write_artifact(dropped(b"partial", Some(20)), &dest).unwrap_err();
        assert!(matches!(
            err,
            RemoteError::ShortWrite { ref package, written: 7, expected: 20 } if package == "foo.deb"
        ));
        assert_eq!(std::fs::read(&dest).unwrap(), b"partial");
    }

    #[test]
    fn read_error_without_length_stays_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo.deb");
        let err = write_artifact(dropped(b"partial", None), &dest).unwrap_err();
        assert!(matches!(err, RemoteError::Io(_)));
    }

    #[test]
    fn unknown_length_accepts_any_body() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("foo.deb");
        assert_eq!(write_artifact(artifact(b"", None), &dest).unwrap(), 0);
    }
}
