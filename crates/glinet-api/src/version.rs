// Firmware version handling
//
// GL.iNet firmware versions are `major.minor.patch` with an optional
// fourth build component (e.g. `4.7.0` or `4.3.25.104`), sometimes
// prefixed with `v`. Feature gating on firmware versions compares these
// as four-component tuples.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Firmware generation that replaced the legacy per-protocol VPN RPC
/// modules with the unified vpn-client interface.
pub const NEW_VPN_CLIENT_VERSION: Version = Version::new(4, 7, 0, 0);

/// A parsed firmware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Fourth component; 0 when the version string has only three parts.
    pub build: u64,
}

/// A version string that is not `major.minor.patch[.build]`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid version string: {input:?}")]
pub struct InvalidVersion {
    pub input: String,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64, build: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    pub const fn to_tuple(self) -> (u64, u64, u64, u64) {
        (self.major, self.minor, self.patch, self.build)
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersion {
            input: s.to_owned(),
        };

        let digits = s.trim().trim_start_matches('v');
        let parts: Vec<&str> = digits.split('.').collect();
        if !(parts.len() == 3 || parts.len() == 4) {
            return Err(invalid());
        }

        let mut numbers = [0u64; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| invalid())?;
        }
        let [major, minor, patch, build] = numbers;
        Ok(Self::new(major, minor, patch, build))
    }
}

impl fmt::Display for Version {
    /// The build component is omitted when zero, matching how the
    /// firmware prints three-part versions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.build != 0 {
            write!(f, ".{}", self.build)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Version {
    type Error = InvalidVersion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
