//! Append-only writes to the isolated source list and preferences file.

use crate::layout::AptLayout;
use crate::StoreError;
use aptstage_schema::Repository;
use std::fs::OpenOptions;
use std::io::Write;

/// Append one line per repository to the isolated source list.
///
/// The source list must already exist (it is seeded from the host).
pub fn append_sources(layout: &AptLayout, repos: &[Repository]) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(layout.sources_list())?;
    for repo in repos {
        file.write_all(format!("\n{}", repo.name).as_bytes())?;
    }
    Ok(())
}

/// Append a pin stanza for every repository that declares a priority.
/// Creates the preferences file if needed. Returns the number of stanzas written.
pub fn append_pins(layout: &AptLayout, repos: &[Repository]) -> Result<usize, StoreError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(layout.preferences())?;
    let mut written = 0;
    for repo in repos {
        if let Some(priority) = repo.pin_priority() {
            file.write_all(pin_stanza(&repo.name, priority).as_bytes())?;
            written += 1;
        }
    }
    Ok(written)
}

pub fn pin_stanza(name: &str, priority: &str) -> String {
    format!("\nPackage: *\nPin: release a={name}\nPin-Priority: {priority}\n")
}
