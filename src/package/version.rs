//! Package version parsing and ordering
//!
//! A version is an `(epoch, pkgver, pkgrel)` triple written as
//! `[epoch:]pkgver[-pkgrel]`. Ordering compares the epoch numerically, then
//! `pkgver` and `pkgrel` segment by segment.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Error returned when a version string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,

    #[error("invalid epoch in version {0:?}")]
    InvalidEpoch(String),
}

/// Structured package version
///
/// `Default` is the unknown version `(0, "", "")`, which sorts below every
/// version with a non-empty `pkgver`.
#[derive(Debug, Clone, Default)]
pub struct Version {
    pub epoch: u64,
    pub pkgver: String,
    pub pkgrel: String,
}

impl Version {
    pub fn new(epoch: u64, pkgver: impl Into<String>, pkgrel: impl Into<String>) -> Self {
        Self {
            epoch,
            pkgver: pkgver.into(),
            pkgrel: pkgrel.into(),
        }
    }

    /// Parse `[epoch:]pkgver[-pkgrel]`
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(VersionError::Empty);
        }

        let (epoch, rest) = match s.split_once(':') {
            Some((epoch, rest)) => {
                let epoch = epoch
                    .parse::<u64>()
                    .map_err(|_| VersionError::InvalidEpoch(s.to_string()))?;
                (epoch, rest)
            }
            None => (0, s),
        };

        let (pkgver, pkgrel) = match rest.rsplit_once('-') {
            Some((pkgver, pkgrel)) => (pkgver, pkgrel),
            None => (rest, ""),
        };

        if pkgver.is_empty() {
            return Err(VersionError::Empty);
        }

        Ok(Self::new(epoch, pkgver, pkgrel))
    }

    /// True if `self` sorts strictly below `other`
    pub fn older_than(&self, other: &Version) -> bool {
        self.cmp(other) == Ordering::Less
    }

    /// True if `self` sorts strictly above `other`
    pub fn newer_than(&self, other: &Version) -> bool {
        self.cmp(other) == Ordering::Greater
    }
}

/// Compare two versions. Same as `a.cmp(b)`.
pub fn compare(a: &Version, b: &Version) -> Ordering {
    a.cmp(b)
}

/// One alphanumeric run inside a version component
///
/// Variant order matters: at the same position a digit run beats a letter run.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Segment<'a> {
    Alpha(&'a str),
    Numeric(Digits<'a>),
}

/// Digit run with leading zeros stripped, compared by length first
#[derive(Debug, PartialEq, Eq)]
struct Digits<'a>(&'a str);

impl Ord for Digits<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(other.0))
    }
}

impl PartialOrd for Digits<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn segments(s: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = s;
    std::iter::from_fn(move || {
        rest = rest.trim_start_matches(|c: char| !c.is_ascii_alphanumeric());
        let first = rest.chars().next()?;

        let end = if first.is_ascii_digit() {
            rest.find(|c: char| !c.is_ascii_digit())
        } else {
            rest.find(|c: char| !c.is_ascii_alphabetic())
        }
        .unwrap_or(rest.len());

        let (run, tail) = rest.split_at(end);
        rest = tail;

        Some(if first.is_ascii_digit() {
            Segment::Numeric(Digits(run.trim_start_matches('0')))
        } else {
            Segment::Alpha(run)
        })
    })
}

/// Compare a single version component (`pkgver` or `pkgrel`)
fn compare_component<'a>(a: &'a str, b: &'a str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    segments(a).cmp(segments(b))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_component(&self.pkgver, &other.pkgver))
            .then_with(|| compare_component(&self.pkgrel, &other.pkgrel))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        f.write_str(&self.pkgver)?;
        if !self.pkgrel.is_empty() {
            write!(f, "-{}", self.pkgrel)?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
