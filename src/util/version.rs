//! Semver helpers.

use std::fmt;

use semver::Version;
use serde::Serialize;

/// Half-open version interval `[min, max)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionsRange {
    pub min: Version,
    pub max: Version,
}

impl VersionsRange {
    pub fn new(min: Version, max: Version) -> Self {
        VersionsRange { min, max }
    }

    /// Membership test.
    ///
    /// Prereleases of `max` (e.g. `2.0.0-rc.1`) sort below `max` but belong
    /// to the next major line, so they are excluded.
    pub fn contains(&self, version: &Version) -> bool {
        if version < &self.min || version >= &self.max {
            return false;
        }

        let same_core = version.major == self.max.major
            && version.minor == self.max.minor
            && version.patch == self.max.patch;
        !(same_core && !version.pre.is_empty())
    }
}

impl fmt::Display for VersionsRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">={},<{}", self.min, self.max)
    }
}

/// Parse a version string, allowing for incomplete versions and a leading `v`.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    let s = s.trim();
    let s = s.strip_prefix('v').unwrap_or(s);

    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = s.split('.').collect();
    match parts.len() {
        1 => {
            let major: u64 = parts[0].parse().ok()?;
            Some(Version::new(major, 0, 0))
        }
        2 => {
            let major: u64 = parts[0].parse().ok()?;
            let minor: u64 = parts[1].parse().ok()?;
            Some(Version::new(major, minor, 0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yarn_classic() -> VersionsRange {
        VersionsRange::new(Version::new(1, 22, 0), Version::new(2, 0, 0))
    }

    #[test]
    fn test_range_bounds() {
        let range = yarn_classic();

        for accepted in ["1.22.0", "1.22.5", "1.99.9"] {
            assert!(range.contains(&accepted.parse().unwrap()), "{accepted}");
        }
        for rejected in ["1.21.9", "2.0.0", "3.0.0", "0.27.5"] {
            assert!(!range.contains(&rejected.parse().unwrap()), "{rejected}");
        }
    }

    #[test]
    fn test_upper_bound_prerelease_rejected() {
        let range = yarn_classic();
        assert!(!range.contains(&"2.0.0-rc.29".parse().unwrap()));
        assert!(range.contains(&"1.23.0-20220130.1630".parse().unwrap()));
    }

    #[test]
    fn test_range_display() {
        assert_eq!(yarn_classic().to_string(), ">=1.22.0,<2.0.0");
    }

    #[test]
    fn test_parse_version_lenient() {
        assert_eq!(parse_version_lenient("1.22.19\n"), Some(Version::new(1, 22, 19)));
        assert_eq!(parse_version_lenient("v1.22"), Some(Version::new(1, 22, 0)));
        assert_eq!(parse_version_lenient("4"), Some(Version::new(4, 0, 0)));
        assert_eq!(parse_version_lenient("not a version"), None);
        assert_eq!(parse_version_lenient(""), None);
    }
}
