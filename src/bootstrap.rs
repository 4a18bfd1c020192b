//! One launcher run: snapshot, patch, serve, restore.

use std::fs;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::DevConfig;
use crate::guard::EntryGuard;
use crate::inject::{build_fragment, inject, Injection};
use crate::serve::{self, ServeOutcome};
use crate::snapshot::{self, BackupOutcome};
use crate::{color_enabled_stderr, lock, log_info_stderr, log_warn_stderr, signals, DevError};

/// Render what a run would do without touching anything.
pub fn plan(config: &DevConfig, tenant: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("entry:      {}\n", config.entry_path.display()));
    out.push_str(&format!("backup:     {}", config.backup_path.display()));
    if config.backup_path.exists() {
        out.push_str(" (exists)\n");
    } else {
        out.push_str(" (will be created)\n");
    }
    out.push_str(&format!("resnapshot: {}\n", config.resnapshot.as_str()));
    out.push_str(&format!("dev server: {}\n", config.serve_cmd));
    out.push_str("fragment:\n");
    out.push_str(&build_fragment(&config.storage_key, tenant));
    out
}

/// Patch the entry for `tenant`, run the dev server and restore the entry.
///
/// Returns the exit code for the launcher: the dev server's own code, or 0
/// when shutdown was caused by SIGINT/SIGTERM/SIGHUP.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", err, skip(config), fields(entry = %config.entry_path.display()))
)]
pub fn run(config: &DevConfig, tenant: &str, verbose: bool) -> Result<i32, DevError> {
    let use_err = color_enabled_stderr();
    let entry = config.entry_path.as_path();
    let backup = config.backup_path.as_path();

    let _lock = lock::acquire_for_entry(entry)?;
    let document = fs::read_to_string(entry).map_err(|e| DevError::io(entry, e))?;
    signals::install();

    let outcome = snapshot::ensure_backup(entry, backup, &config.storage_key, config.resnapshot)
        .map_err(|e| DevError::io(backup, e))?;
    if verbose {
        let msg = match outcome {
            BackupOutcome::Created => format!("oceanix-dev: created backup {}", backup.display()),
            BackupOutcome::Kept => format!("oceanix-dev: using existing backup {}", backup.display()),
            BackupOutcome::Refreshed => format!(
                "oceanix-dev: refreshed stale backup {} from {}",
                backup.display(),
                entry.display()
            ),
        };
        log_info_stderr(use_err, &msg);
    }

    let mut guard = EntryGuard::arm(entry, backup);

    let fragment = build_fragment(&config.storage_key, tenant);
    match inject(&document, &config.storage_key, &fragment) {
        Injection::Injected(patched) => {
            fs::write(entry, patched).map_err(|e| DevError::io(entry, e))?;
            log_info_stderr(
                use_err,
                &format!(
                    "oceanix-dev: tenant '{tenant}' preloaded into {}",
                    entry.display()
                ),
            );
        }
        Injection::AlreadyPresent => log_warn_stderr(
            use_err,
            &format!(
                "oceanix-dev: {} already contains '{}'; leaving it unchanged",
                entry.display(),
                config.storage_key
            ),
        ),
        Injection::NoHeadClose => log_warn_stderr(
            use_err,
            &format!(
                "oceanix-dev: no </head> in {}; tenant was not injected",
                entry.display()
            ),
        ),
    }

    if verbose {
        if let Some(program) = config.serve_cmd.split_whitespace().next() {
            if which::which(program).is_err() {
                log_warn_stderr(
                    use_err,
                    &format!("oceanix-dev: '{program}' not found on PATH; relying on the shell"),
                );
            }
        }
        log_info_stderr(
            use_err,
            &format!("oceanix-dev: starting dev server: {}", config.serve_cmd),
        );
    }

    let mut child = serve::spawn(&config.serve_cmd)?;
    let served = serve::supervise(&mut child, config.grace, signals::pending)
        .map_err(|e| DevError::Message(format!("waiting for dev server: {e}")))?;

    guard.restore().map_err(|e| DevError::io(guard.entry(), e))?;
    log_info_stderr(
        use_err,
        &format!("oceanix-dev: restored {}", entry.display()),
    );

    let code = match served {
        ServeOutcome::Exited(code) => code,
        ServeOutcome::Interrupted(sig) => {
            if verbose {
                log_info_stderr(
                    use_err,
                    &format!("oceanix-dev: dev server stopped on {}", signals::name(sig)),
                );
            }
            0
        }
    };
    #[cfg(feature = "tracing")]
    tracing::info!(exit_code = code, "dev server finished");
    Ok(code)
}

/// Put the backup back over the entry without launching anything.
pub fn restore_only(config: &DevConfig) -> Result<(), DevError> {
    let entry = config.entry_path.as_path();
    let backup = config.backup_path.as_path();
    let _lock = lock::acquire_for_entry(entry)?;
    if !backup.exists() {
        return Err(DevError::Message(format!(
            "no backup at {}; nothing to restore",
            backup.display()
        )));
    }
    snapshot::restore(entry, backup).map_err(|e| DevError::io(entry, e))?;
    log_info_stderr(
        color_enabled_stderr(),
        &format!("oceanix-dev: restored {} from {}", entry.display(), backup.display()),
    );
    Ok(())
}
