//! Strict `x.y.z` versions and the release bump arithmetic.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("malformed version '{0}': expected <major>.<minor>.<patch> with integer components")]
    MalformedVersion(String),
    #[error("exactly one of major, minor, patch must be selected (got {selected})")]
    InvalidBumpSelection { selected: usize },
    #[error("bumping {axis} of {version} overflows")]
    VersionOverflow { version: String, axis: BumpAxis },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses a strict `int.int.int` string. Signs, whitespace, pre-release
    /// or build suffixes are rejected.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError::MalformedVersion(raw.to_string());
        let mut parts = raw.split('.');
        let mut next = || -> Result<u64, VersionError> {
            let part = parts.next().ok_or_else(malformed)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u64>().map_err(|_| malformed())
        };
        let major = next()?;
        let minor = next()?;
        let patch = next()?;
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self::new(major, minor, patch))
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumpAxis {
    Major,
    Minor,
    Patch,
}

impl BumpAxis {
    /// Turns three boolean switches into an axis; exactly one must be set.
    pub fn from_flags(major: bool, minor: bool, patch: bool) -> Result<Self, VersionError> {
        let selected = [major, minor, patch].iter().filter(|flag| **flag).count();
        if selected != 1 {
            return Err(VersionError::InvalidBumpSelection { selected });
        }
        Ok(if major {
            Self::Major
        } else if minor {
            Self::Minor
        } else {
            Self::Patch
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for BumpAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values the lower-order components restart from after a bump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BumpFloors {
    pub minor: u64,
    pub patch: u64,
}

pub fn bump(
    version: SemanticVersion,
    axis: BumpAxis,
    floors: BumpFloors,
) -> Result<SemanticVersion, VersionError> {
    let overflow = || VersionError::VersionOverflow {
        version: version.to_string(),
        axis,
    };
    let next = match axis {
        BumpAxis::Major => SemanticVersion::new(
            version.major.checked_add(1).ok_or_else(overflow)?,
            floors.minor,
            floors.patch,
        ),
        BumpAxis::Minor => SemanticVersion::new(
            version.major,
            version.minor.checked_add(1).ok_or_else(overflow)?,
            floors.patch,
        ),
        BumpAxis::Patch => SemanticVersion::new(
            version.major,
            version.minor,
            version.patch.checked_add(1).ok_or_else(overflow)?,
        ),
    };
    Ok(next)
}

/// Flag-style bump on a version string.
///
/// The axis selection is validated first, then the version is parsed; no
/// arithmetic happens unless both succeed.
pub fn bump_version_str(
    current: &str,
    major: bool,
    minor: bool,
    patch: bool,
    minor_floor: u64,
    patch_floor: u64,
) -> Result<String, VersionError> {
    let axis = BumpAxis::from_flags(major, minor, patch)?;
    let version = SemanticVersion::parse(current)?;
    let floors = BumpFloors {
        minor: minor_floor,
        patch: patch_floor,
    };
    Ok(bump(version, axis, floors)?.to_string())
}
