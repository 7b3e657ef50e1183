use crate::types::PackageSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    ParseYaml(#[from] serde_yaml::Error),
}

/// Declared APT inputs: trusted keys, extra repositories and the package set.
///
/// Unknown top-level keys are ignored so the manifest can live alongside other
/// build configuration in the same document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub gpg_advanced_options: Vec<String>,
    #[serde(default)]
    pub repos: Vec<Repository>,
    #[serde(default)]
    pub packages: Vec<String>,
}

impl Manifest {
    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty() || !self.gpg_advanced_options.is_empty()
    }

    pub fn has_repos(&self) -> bool {
        !self.repos.is_empty()
    }

    pub fn package_set(&self) -> PackageSet {
        PackageSet::classify(self.packages.as_slice())
    }
}

/// An extra APT source line, optionally pinned.
///
/// Accepts either a bare string (`- deb http://... stable main`) or a mapping
/// with `name` and `priority`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RepositoryDecl")]
pub struct Repository {
    pub name: String,
    pub priority: Option<String>,
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        let priority = priority.into();
        self.priority = (!priority.is_empty()).then_some(priority);
        self
    }

    /// Pin priority to emit, if any. Empty priorities never produce a pin.
    pub fn pin_priority(&self) -> Option<&str> {
        self.priority.as_deref().filter(|p| !p.is_empty())
    }
}

// Variant order matters: untagged decoding tries the bare string first.
#[derive(Deserialize)]
#[serde(untagged)]
enum RepositoryDecl {
    Bare(String),
    Pinned {
        name: String,
        #[serde(default)]
        priority: Option<PriorityDecl>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriorityDecl {
    Text(String),
    Number(i64),
}

impl From<RepositoryDecl> for Repository {
    fn from(decl: RepositoryDecl) -> Self {
        match decl {
            RepositoryDecl::Bare(name) => Repository::new(name),
            RepositoryDecl::Pinned { name, priority } => {
                let priority = match priority {
                    Some(PriorityDecl::Text(p)) => p,
                    Some(PriorityDecl::Number(n)) => n.to_string(),
                    None => String::new(),
                };
                Repository::new(name).with_priority(priority)
            }
        }
    }
}

pub fn parse_manifest_str(input: &str) -> Result<Manifest, ManifestError> {
    if input.trim().is_empty() {
        return Ok(Manifest::default());
    }
    Ok(serde_yaml::from_str(input)?)
}

pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_manifest_str(&content)
}
