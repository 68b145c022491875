//! Next-version computation.
//!
//! Every function here is pure: it takes the current [`Version`] and returns
//! a new one, or an error when no next version exists. Prefix and build
//! metadata are copied through untouched; whether they survive into the next
//! tag is decided by [`crate::release`].

use serde::Serialize;
use thiserror::Error;

use crate::version::{Identifier, Version};

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors from bump operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BumpError {
    /// A pre-release bump was requested for a release version.
    #[error(
        "{version} is not a pre-release; \
         bump patch, minor or major with --alpha, --beta or --rc first"
    )]
    NoPreRelease {
        /// The rendered version that has no pre-release identifiers.
        version: String,
    },

    /// The number to increment is already the largest one representable.
    #[error("cannot bump {version}: {part} is at its maximum")]
    Overflow {
        /// The rendered version that cannot be bumped.
        version: String,
        /// Which number overflowed.
        part: &'static str,
    },
}

fn increment(value: u64, current: &Version, part: &'static str) -> BumpResult<u64> {
    value.checked_add(1).ok_or_else(|| BumpError::Overflow {
        version: current.to_string(),
        part,
    })
}

/// Result alias for bump operations.
pub type BumpResult<T> = Result<T, BumpError>;

// ──────────────────────────────────────────────
// Kinds and tracks
// ──────────────────────────────────────────────

/// Which part of the version to increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpKind {
    /// `x.y.Z`
    Patch,
    /// `x.Y.0`
    Minor,
    /// `X.0.0`
    Major,
    /// Advance the trailing pre-release counter.
    #[serde(rename = "prerelease")]
    PreRelease,
}

impl BumpKind {
    /// Apply this bump to `current`.
    ///
    /// # Errors
    ///
    /// Returns [`BumpError::Overflow`] when the incremented number is at
    /// `u64::MAX`, and [`BumpError::NoPreRelease`] for a pre-release bump of
    /// a release.
    pub fn apply(self, current: &Version) -> BumpResult<Version> {
        match self {
            Self::Patch => bump_patch(current),
            Self::Minor => bump_minor(current),
            Self::Major => bump_major(current),
            Self::PreRelease => bump_pre_release(current),
        }
    }
}

impl std::fmt::Display for BumpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
            Self::PreRelease => write!(f, "prerelease"),
        }
    }
}

/// A named pre-release stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreReleaseTrack {
    /// `-alpha.1`
    Alpha,
    /// `-beta.1`
    Beta,
    /// `-rc.1`
    Rc,
}

impl PreReleaseTrack {
    /// The identifier that starts the pre-release section.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Rc => "rc",
        }
    }
}

impl std::fmt::Display for PreReleaseTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ──────────────────────────────────────────────
// Bumps
// ──────────────────────────────────────────────

/// `1.2.3-rc.1` becomes `1.2.4`.
///
/// # Errors
///
/// Returns [`BumpError::Overflow`] when the patch number is `u64::MAX`.
pub fn bump_patch(current: &Version) -> BumpResult<Version> {
    Ok(Version {
        patch: increment(current.patch, current, "patch")?,
        pre_release: Vec::new(),
        ..current.clone()
    })
}

/// `1.2.3` becomes `1.3.0`.
///
/// # Errors
///
/// Returns [`BumpError::Overflow`] when the minor number is `u64::MAX`.
pub fn bump_minor(current: &Version) -> BumpResult<Version> {
    Ok(Version {
        minor: increment(current.minor, current, "minor")?,
        patch: 0,
        pre_release: Vec::new(),
        ..current.clone()
    })
}

/// `1.2.3` becomes `2.0.0`.
///
/// # Errors
///
/// Returns [`BumpError::Overflow`] when the major number is `u64::MAX`.
pub fn bump_major(current: &Version) -> BumpResult<Version> {
    Ok(Version {
        major: increment(current.major, current, "major")?,
        minor: 0,
        patch: 0,
        pre_release: Vec::new(),
        ..current.clone()
    })
}

/// Advance the pre-release counter.
///
/// A trailing numeric identifier is incremented (`alpha.1` to `alpha.2`);
/// otherwise `1` is appended (`alpha.beta` to `alpha.beta.1`).
///
/// # Errors
///
/// Returns [`BumpError::NoPreRelease`] when `current` is a release and
/// [`BumpError::Overflow`] when the trailing counter is `u64::MAX`.
pub fn bump_pre_release(current: &Version) -> BumpResult<Version> {
    if !current.is_pre_release() {
        return Err(BumpError::NoPreRelease {
            version: current.to_string(),
        });
    }
    let mut next = current.clone();
    match next.pre_release.last_mut() {
        Some(Identifier::Numeric(n)) => *n = increment(*n, current, "pre-release counter")?,
        _ => next.pre_release.push(Identifier::Numeric(1)),
    }
    Ok(next)
}

/// Start `track` at `1`, replacing any existing pre-release identifiers.
pub fn to_track(current: &Version, track: PreReleaseTrack) -> Version {
    Version {
        pre_release: vec![
            Identifier::AlphaNumeric(track.label().to_string()),
            Identifier::Numeric(1),
        ],
        ..current.clone()
    }
}

/// `1.2.3` becomes `1.2.3-alpha.1`.
pub fn to_alpha(current: &Version) -> Version {
    to_track(current, PreReleaseTrack::Alpha)
}

/// `1.2.3` becomes `1.2.3-beta.1`.
pub fn to_beta(current: &Version) -> Version {
    to_track(current, PreReleaseTrack::Beta)
}

/// `1.2.3` becomes `1.2.3-rc.1`.
pub fn to_rc(current: &Version) -> Version {
    to_track(current, PreReleaseTrack::Rc)
}
