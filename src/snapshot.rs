//! Backup of the entry-point document.
//!
//! The backup is the restore point for every run. Under the default policy it
//! is written once and then left alone, even if the entry changes later.

use std::fs;
use std::io;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// When an existing backup may be replaced.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotPolicy {
    /// Never replace an existing backup.
    #[default]
    Keep,
    /// Replace the backup when the entry differs from it and carries no marker.
    Stale,
}

impl SnapshotPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotPolicy::Keep => "keep",
            SnapshotPolicy::Stale => "stale",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BackupOutcome {
    Created,
    Kept,
    Refreshed,
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", err, skip_all, fields(entry = %entry.display(), backup = %backup.display()))
)]
pub fn ensure_backup(
    entry: &Path,
    backup: &Path,
    marker: &str,
    policy: SnapshotPolicy,
) -> io::Result<BackupOutcome> {
    if !backup.exists() {
        fs::copy(entry, backup)?;
        return Ok(BackupOutcome::Created);
    }
    match policy {
        SnapshotPolicy::Keep => Ok(BackupOutcome::Kept),
        SnapshotPolicy::Stale => {
            let current = fs::read(entry)?;
            let saved = fs::read(backup)?;
            // A marked entry is a leftover patch, never a baseline.
            if current == saved || contains_marker(&current, marker) {
                Ok(BackupOutcome::Kept)
            } else {
                fs::write(backup, &current)?;
                Ok(BackupOutcome::Refreshed)
            }
        }
    }
}

/// Overwrite the entry with the backup content.
pub fn restore(entry: &Path, backup: &Path) -> io::Result<()> {
    let saved = fs::read(backup)?;
    fs::write(entry, saved)
}

fn contains_marker(doc: &[u8], marker: &str) -> bool {
    let m = marker.as_bytes();
    !m.is_empty() && doc.windows(m.len()).any(|w| w == m)
}
