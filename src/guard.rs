use std::io;
use std::path::{Path, PathBuf};

/// Restores the entry-point document from its backup when dropped.
///
/// Every exit path of a run (normal return, error, interrupt) goes through this
/// guard, so a patched document never outlives the launcher.
#[derive(Debug)]
pub struct EntryGuard {
    entry: PathBuf,
    backup: PathBuf,
    restored: bool,
}

impl EntryGuard {
    pub fn arm(entry: &Path, backup: &Path) -> Self {
        Self {
            entry: entry.to_path_buf(),
            backup: backup.to_path_buf(),
            restored: false,
        }
    }

    pub fn entry(&self) -> &Path {
        &self.entry
    }

    /// Restore now and report failures. Later calls and the drop are no-ops.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        crate::snapshot::restore(&self.entry, &self.backup)
    }
}

impl Drop for EntryGuard {
    fn drop(&mut self) {
        // Best-effort; errors surface through restore() on the normal path
        if let Err(e) = self.restore() {
            let use_err = crate::color_enabled_stderr();
            crate::log_error_stderr(
                use_err,
                &format!(
                    "oceanix-dev: failed to restore {} from {}: {e}",
                    self.entry.display(),
                    self.backup.display()
                ),
            );
        }
    }
}
