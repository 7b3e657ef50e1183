//! Isolated APT root for aptstage.
//!
//! This crate owns everything aptstage keeps on disk: the `AptLayout` of the
//! private cache/state/etc tree, seeding it from the host's `/etc/apt`
//! (`HostAptFiles`), appending repository lines and pin stanzas to the overlay,
//! and the `ArchiveCache` of downloaded `.deb` files.

pub mod archives;
pub mod host;
pub mod layout;
pub mod overlay;

pub use archives::ArchiveCache;
pub use host::{HostAptFiles, SeedReport, SYSTEM_APT_DIR};
pub use layout::AptLayout;
pub use overlay::{append_pins, append_sources, pin_stanza};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("required host file not found: {}", .0.display())]
    MissingHostFile(PathBuf),
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
