//! Version and requirement value types.
//!
//! Versions are gem-style (`1`, `1.2`, `1.2.3`, `2.0.0-rc1`) and compare using
//! semantic-version precedence. Requirements are conjunctions of
//! operator/version constraints.

mod requirement;

pub use requirement::{Constraint, Op, Requirement};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An installed package version.
///
/// The original text is kept for display, while comparison and equality use
/// the zero-padded semantic version, so `1` and `1.0.0` are the same version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    raw: String,
    segments: usize,
    semver: semver::Version,
}

impl Version {
    pub fn zero() -> Version {
        Version {
            raw: "0".to_string(),
            segments: 1,
            semver: semver::Version::new(0, 0, 0),
        }
    }

    /// The exclusive upper bound used by the pessimistic operator.
    ///
    /// Drops the last written segment (unless it is the only one) and
    /// increments the new last one: `1` -> `2`, `1.2` -> `2`, `1.2.3` -> `1.3`.
    /// `None` when the incremented segment would overflow, meaning no upper bound.
    pub fn bump(&self) -> Option<Version> {
        let v = &self.semver;
        let (raw, semver, segments) = match self.segments {
            1 | 2 => {
                let major = v.major.checked_add(1)?;
                (major.to_string(), semver::Version::new(major, 0, 0), 1)
            }
            _ => {
                let minor = v.minor.checked_add(1)?;
                (
                    format!("{}.{}", v.major, minor),
                    semver::Version::new(v.major, minor, 0),
                    2,
                )
            }
        };
        Some(Version {
            raw,
            segments,
            semver,
        })
    }
}

impl FromStr for Version {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            bail!("Malformed version number string: empty");
        }

        let (core, pre) = match raw.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (raw, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            bail!("Malformed version number string {:?}: too many segments", raw);
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .with_context(|| format!("Malformed version number string {:?}", raw))?;
        }

        let mut semver = semver::Version::new(numbers[0], numbers[1], numbers[2]);
        if let Some(pre) = pre {
            semver.pre = semver::Prerelease::new(pre)
                .with_context(|| format!("Malformed prerelease in version {:?}", raw))?;
        }

        Ok(Version {
            raw: raw.to_string(),
            segments: parts.len(),
            semver,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.raw
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.semver == other.semver
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.semver.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver.cmp(&other.semver)
    }
}
