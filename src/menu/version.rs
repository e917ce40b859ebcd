// SPDX-License-Identifier: MIT

//! Strict MAJOR.MINOR.PATCH version comparison
//!
//! Versions compared here are constants baked into rules or reported by our
//! own SDKs, so anything other than three dot-separated integers is a
//! broken rule or context and is reported as [`VersionFormatError`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version string that is not exactly three dot-separated integers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Version format error: '{0}' is not MAJOR.MINOR.PATCH")]
pub struct VersionFormatError(pub String);

/// A parsed three-component version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FromStr for Version {
    type Err = VersionFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionFormatError(s.to_string());
        let mut components = [0u64; 3];
        let mut parts = s.split('.');

        for slot in components.iter_mut() {
            let part = parts.next().ok_or_else(err)?;
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            *slot = part.parse().map_err(|_| err())?;
        }
        if parts.next().is_some() {
            return Err(err());
        }

        let [major, minor, patch] = components;
        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Compare two version strings numerically, component by component
pub fn compare(v1: &str, v2: &str) -> Result<Ordering, VersionFormatError> {
    let v1: Version = v1.parse()?;
    let v2: Version = v2.parse()?;
    Ok(v1.cmp(&v2))
}

/// `v1 >= v2`
pub fn ge(v1: &str, v2: &str) -> Result<bool, VersionFormatError> {
    Ok(compare(v1, v2)? != Ordering::Less)
}

/// `v1 < v2`
pub fn l(v1: &str, v2: &str) -> Result<bool, VersionFormatError> {
    Ok(compare(v1, v2)? == Ordering::Less)
}
