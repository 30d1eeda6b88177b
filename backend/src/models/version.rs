//! Artifact version entity (spec §3, §4.14).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Major,
    Minor,
    Patch,
}

/// A parsed semantic version; orders the same way `semver` crates do, kept
/// minimal since the catalog only ever needs construction and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemVer {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SemVer {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        Some(Self { major, minor, patch })
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

/// A single versioned step in the invariant-artifact evolution graph.
/// `migrate`/`rollback`/`verify` procedures are supplied by the caller
/// (`crate::versioning`), the same way `crate::invariant::Invariant` keeps
/// its pre/post/rollback procedures separate from this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactVersion {
    pub version: SemVer,
    pub change_type: ChangeType,
    pub changes: Vec<String>,
    pub requires_downtime: bool,
    pub estimated_duration_minutes: u32,
}

impl ArtifactVersion {
    pub fn new(
        version: SemVer,
        change_type: ChangeType,
        changes: Vec<String>,
        requires_downtime: bool,
        estimated_duration_minutes: u32,
    ) -> Self {
        Self {
            version,
            change_type,
            changes,
            requires_downtime,
            estimated_duration_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_semver() {
        let a = SemVer::parse("1.0.0").unwrap();
        let b = SemVer::parse("2.1.0").unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "1.0.0");
    }
}
