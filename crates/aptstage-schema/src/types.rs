//! Newtype wrappers for package identifiers and the direct/repository split.

use std::fmt;
use std::ops::Deref;

/// Suffix that marks a package identifier as a directly downloadable archive.
pub const DEB_SUFFIX: &str = ".deb";

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_newtype!(
    /// URL of a `.deb` archive fetched directly over HTTP.
    ArtifactUrl
);

string_newtype!(
    /// Package name resolved by `apt-get` against the configured repositories.
    PackageName
);

impl ArtifactUrl {
    /// Base file name used as the archive cache key.
    ///
    /// Two URLs sharing a base name map to the same cache entry.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageRef {
    Direct(ArtifactUrl),
    Repository(PackageName),
}

impl PackageRef {
    /// Classify a declared identifier purely by suffix. Empty identifiers yield `None`.
    pub fn classify(identifier: &str) -> Option<Self> {
        if identifier.ends_with(DEB_SUFFIX) {
            Some(PackageRef::Direct(ArtifactUrl::new(identifier)))
        } else if identifier.is_empty() {
            None
        } else {
            Some(PackageRef::Repository(PackageName::new(identifier)))
        }
    }
}

/// Declared packages split into direct artifacts and repository packages,
/// each keeping declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSet {
    pub direct: Vec<ArtifactUrl>,
    pub repository: Vec<PackageName>,
}

impl PackageSet {
    pub fn classify<S: AsRef<str>>(identifiers: &[S]) -> Self {
        let mut set = PackageSet::default();
        for id in identifiers {
            match PackageRef::classify(id.as_ref()) {
                Some(PackageRef::Direct(url)) => set.direct.push(url),
                Some(PackageRef::Repository(name)) => set.repository.push(name),
                None => {}
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.repository.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deb_suffix_is_direct() {
        assert_eq!(
            PackageRef::classify("http://example.com/pool/foo_1.0_amd64.deb"),
            Some(PackageRef::Direct(ArtifactUrl::new(
                "http://example.com/pool/foo_1.0_amd64.deb"
            )))
        );
    }

    #[test]
    fn bare_name_is_repository() {
        assert_eq!(
            PackageRef::classify("libpq5"),
            Some(PackageRef::Repository(PackageName::new("libpq5")))
        );
    }

    #[test]
    fn empty_identifier_is_dropped() {
        assert_eq!(PackageRef::classify(""), None);
    }

    #[test]
    fn classification_is_suffix_only() {
        // A URL without the suffix still goes to the repository batch.
        let set = PackageSet::classify(&["http://example.com/download?pkg=foo", "x.deb"]);
        assert_eq!(set.repository, vec!["http://example.com/download?pkg=foo"]);
        assert_eq!(set.direct, vec!["x.deb"]);
    }

    #[test]
    fn partition_preserves_order() {
        let set = PackageSet::classify(&[
            "http://a/one.deb",
            "bar",
            "",
            "http://b/two.deb",
            "baz",
        ]);
        assert_eq!(set.direct, vec!["http://a/one.deb", "http://b/two.deb"]);
        assert_eq!(set.repository, vec!["bar", "baz"]);
    }

    #[test]
    fn empty_set() {
        let set = PackageSet::classify::<&str>(&["", ""]);
        assert!(set.is_empty());
    }

    #[test]
    fn artifact_file_name_is_last_segment() {
        let url = ArtifactUrl::new("https://example.com/pool/main/f/foo/foo_2.1_amd64.deb");
        assert_eq!(url.file_name(), "foo_2.1_amd64.deb");
        assert_eq!(ArtifactUrl::new("local.deb").file_name(), "local.deb");
    }
}
