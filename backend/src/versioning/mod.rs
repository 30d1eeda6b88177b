//! Artifact versioning (C14, spec §4.14): a graph of `ArtifactVersion`
//! steps, each reachable from its predecessor, with a migration log.

use thiserror::Error;

use crate::models::version::{ArtifactVersion, SemVer};

#[derive(Debug, Clone)]
pub struct MigrationLogEntry {
    pub from: SemVer,
    pub to: SemVer,
    pub applied_at: i64,
    pub rolled_back: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersioningError {
    #[error("no version {0} registered")]
    UnknownVersion(String),
    #[error("no migration path from {from} to {to}")]
    NoPath { from: String, to: String },
}

/// An ordered graph of artifact versions plus the log of migrations
/// actually applied against the running instance.
#[derive(Debug, Default)]
pub struct VersionGraph {
    versions: Vec<ArtifactVersion>,
    current: Option<SemVer>,
    log: Vec<MigrationLogEntry>,
}

impl VersionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version step; versions must be registered in ascending
    /// order since each migration is assumed sequential (spec §4.14).
    pub fn register(&mut self, version: ArtifactVersion) {
        if self.current.is_none() {
            self.current = Some(version.version);
        }
        self.versions.push(version);
    }

    pub fn current(&self) -> Option<SemVer> {
        self.current
    }

    /// The ordered sequence of versions between `from` (exclusive) and `to`
    /// (inclusive), walking the registration order.
    pub fn get_migration_path(&self, from: SemVer, to: SemVer) -> Result<Vec<&ArtifactVersion>, VersioningError> {
        let from_idx = self.versions.iter().position(|v| v.version == from);
        let to_idx = self.versions.iter().position(|v| v.version == to);
        match (from_idx, to_idx) {
            (Some(f), Some(t)) if f <= t => Ok(self.versions[f + 1..=t].iter().collect()),
            _ => Err(VersioningError::NoPath { from: from.to_string(), to: to.to_string() }),
        }
    }

    /// Apply every migration on the path from the current version to `to`.
    pub fn migrate(&mut self, to: SemVer, now: i64) -> Result<(), VersioningError> {
        let current = self.current.ok_or_else(|| VersioningError::UnknownVersion("none registered".to_string()))?;
        let path: Vec<SemVer> = self.get_migration_path(current, to)?.iter().map(|v| v.version).collect();
        let mut from = current;
        for step in path {
            self.log.push(MigrationLogEntry { from, to: step, applied_at: now, rolled_back: false });
            from = step;
        }
        self.current = Some(to);
        Ok(())
    }

    /// Roll back to the previous entry in the log, marking it rolled back.
    pub fn rollback(&mut self, now: i64) -> Result<(), VersioningError> {
        let last = self.log.iter_mut().rev().find(|e| !e.rolled_back);
        match last {
            Some(entry) => {
                entry.rolled_back = true;
                self.current = Some(entry.from);
                let _ = now;
                Ok(())
            }
            None => Err(VersioningError::UnknownVersion("no migration to roll back".to_string())),
        }
    }

    pub fn log(&self) -> &[MigrationLogEntry] {
        &self.log
    }
}
