//! Semantic versions as they appear in git tags.
//!
//! A tag is an optional free-text prefix followed by a SemVer 2.0 version,
//! for example `v1.2.3`, `api-2.0.0-rc.1` or `1.0.0+20240101`. The prefix and
//! the build metadata are carried along for rendering but never take part in
//! precedence, so `v1.2.3`, `1.2.3` and `1.2.3+ci.7` all compare equal.
//!
//! [`Version`] deliberately does not implement [`Ord`]: its derived
//! [`PartialEq`] is structural (prefix and build included), while precedence
//! ignores both. Use [`compare`] or [`Version::cmp_precedence`] instead.

mod parse;
pub mod select;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use select::select_latest;

/// Errors from version parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The input does not follow `[prefix]MAJOR.MINOR.PATCH[-PRE][+BUILD]`.
    #[error("invalid version format '{input}': {reason}")]
    InvalidFormat {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },
}

/// Result alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// One dot-separated pre-release identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Digits only, compared numerically.
    Numeric(u64),
    /// Anything containing a letter or hyphen, compared by ASCII byte order.
    AlphaNumeric(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Numeric(_), Self::AlphaNumeric(_)) => Ordering::Less,
            (Self::AlphaNumeric(_), Self::Numeric(_)) => Ordering::Greater,
            (Self::AlphaNumeric(a), Self::AlphaNumeric(b)) => a.as_bytes().cmp(b.as_bytes()),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::AlphaNumeric(s) => f.write_str(s),
        }
    }
}

/// A parsed version tag.
///
/// Values are never mutated by the bump functions in [`crate::bump`]; every
/// operation there returns a fresh `Version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    /// Free text before the numeric core, such as `v` or `some-component-`.
    pub prefix: Option<String>,
    /// Major version number.
    pub major: u64,
    /// Minor version number.
    pub minor: u64,
    /// Patch version number.
    pub patch: u64,
    /// Pre-release identifiers; empty for a release.
    pub pre_release: Vec<Identifier>,
    /// Build metadata without the leading `+`.
    pub build: Option<String>,
}

impl Version {
    /// A release version with no prefix, pre-release, or build metadata.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            prefix: None,
            major,
            minor,
            patch,
            pre_release: Vec::new(),
            build: None,
        }
    }

    /// The implicit baseline `0.0.0` used when a repository has no version tags.
    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    /// Parse a tag such as `v1.2.3-rc.1+build.5`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidFormat`] when the input does not match
    /// the strict SemVer grammar preceded by an optional non-digit prefix.
    pub fn parse(input: &str) -> VersionResult<Self> {
        parse::parse(input)
    }

    /// Whether this version carries pre-release identifiers.
    pub fn is_pre_release(&self) -> bool {
        !self.pre_release.is_empty()
    }

    /// Replace the prefix. An empty string clears it.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into()).filter(|p| !p.is_empty());
        self
    }

    /// Replace the build metadata. An empty string clears it.
    #[must_use]
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into()).filter(|b| !b.is_empty());
        self
    }

    /// Compare by SemVer precedence, ignoring prefix and build metadata.
    pub fn cmp_precedence(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| {
                match (self.pre_release.is_empty(), other.pre_release.is_empty()) {
                    (true, true) => Ordering::Equal,
                    // a release outranks any of its pre-releases
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    // lexicographic, and a shorter run of equal identifiers sorts first
                    (false, false) => self.pre_release.cmp(&other.pre_release),
                }
            })
    }
}

/// Compare two versions by SemVer precedence.
///
/// Shorthand for [`Version::cmp_precedence`].
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp_precedence(b)
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            f.write_str(prefix)?;
        }
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, id) in self.pre_release.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            write!(f, "{id}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
