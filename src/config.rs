//! Launcher configuration.
//!
//! Precedence: CLI flag > environment (`OCEANIX_DEV_*`, optionally from `.env`) >
//! project file `.oceanix-dev.yaml` > built-in defaults.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use crate::inject::DEFAULT_STORAGE_KEY;
use crate::snapshot::SnapshotPolicy;

pub const PROJECT_FILE: &str = ".oceanix-dev.yaml";
pub const DEFAULT_ENTRY: &str = "src/index.html";
pub const DEFAULT_SERVE_CMD: &str = "ng serve";
pub const DEFAULT_GRACE_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevConfig {
    pub entry_path: PathBuf,
    pub backup_path: PathBuf,
    pub serve_cmd: String,
    /// `localStorage` key, also used as the injection marker.
    pub storage_key: String,
    pub resnapshot: SnapshotPolicy,
    /// How long the dev server gets to exit after SIGTERM.
    pub grace: Duration,
}

impl Default for DevConfig {
    fn default() -> Self {
        let entry = PathBuf::from(DEFAULT_ENTRY);
        Self {
            backup_path: backup_path_for(&entry),
            entry_path: entry,
            serve_cmd: DEFAULT_SERVE_CMD.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            resnapshot: SnapshotPolicy::Keep,
            grace: Duration::from_secs(DEFAULT_GRACE_SECS),
        }
    }
}

/// `.oceanix-dev.yaml` contents; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectFile {
    pub entry: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub serve_cmd: Option<String>,
    pub storage_key: Option<String>,
    pub resnapshot: Option<SnapshotPolicy>,
    pub grace_secs: Option<u64>,
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub entry: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub serve_cmd: Option<String>,
    pub resnapshot: Option<SnapshotPolicy>,
}

/// Entry-point name plus a `.backup` suffix, in the same directory.
pub fn backup_path_for(entry: &Path) -> PathBuf {
    let mut s: OsString = entry.as_os_str().to_owned();
    s.push(".backup");
    PathBuf::from(s)
}

/// Read the project file in `dir`; a missing file is not an error.
pub fn read_project_file(dir: &Path) -> Result<Option<ProjectFile>> {
    let path = dir.join(PROJECT_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let text =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let parsed: ProjectFile =
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(parsed))
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_policy(s: &str, origin: &str) -> Result<SnapshotPolicy> {
    match SnapshotPolicy::from_str(s, true) {
        Ok(p) => Ok(p),
        Err(_) => bail!("{origin}: invalid resnapshot policy '{s}' (expected keep or stale)"),
    }
}

/// Merge the layers. `env` looks up a variable by name.
pub fn resolve<E>(file: Option<ProjectFile>, env: E, cli: &Overrides) -> Result<DevConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let file = file.unwrap_or_default();
    let defaults = DevConfig::default();

    let entry_path = cli
        .entry
        .clone()
        .or_else(|| non_empty(env("OCEANIX_DEV_ENTRY")).map(PathBuf::from))
        .or(file.entry)
        .unwrap_or(defaults.entry_path);

    // The backup follows the entry unless set explicitly
    let backup_path = cli
        .backup
        .clone()
        .or_else(|| non_empty(env("OCEANIX_DEV_BACKUP")).map(PathBuf::from))
        .or(file.backup)
        .unwrap_or_else(|| backup_path_for(&entry_path));

    let serve_cmd = cli
        .serve_cmd
        .clone()
        .or_else(|| non_empty(env("OCEANIX_DEV_SERVE_CMD")))
        .or(file.serve_cmd)
        .unwrap_or(defaults.serve_cmd);

    let storage_key = non_empty(env("OCEANIX_DEV_STORAGE_KEY"))
        .or(file.storage_key)
        .unwrap_or(defaults.storage_key);
    if storage_key.trim().is_empty() {
        bail!("storage key must not be empty");
    }

    let resnapshot = match (cli.resnapshot, non_empty(env("OCEANIX_DEV_RESNAPSHOT"))) {
        (Some(p), _) => p,
        (None, Some(s)) => parse_policy(&s, "OCEANIX_DEV_RESNAPSHOT")?,
        (None, None) => file.resnapshot.unwrap_or(defaults.resnapshot),
    };

    let grace = file
        .grace_secs
        .map(Duration::from_secs)
        .unwrap_or(defaults.grace);

    if serve_cmd.trim().is_empty() {
        bail!("dev-server command must not be empty");
    }

    Ok(DevConfig {
        entry_path,
        backup_path,
        serve_cmd,
        storage_key,
        resnapshot,
        grace,
    })
}

/// Load `.env`, the project file in the working directory and the process environment.
pub fn load(cli: &Overrides) -> Result<DevConfig> {
    let _ = dotenvy::dotenv();
    let cwd = std::env::current_dir().context("resolving working directory")?;
    let file = read_project_file(&cwd)?;
    resolve(file, |k| std::env::var(k).ok(), cli)
}
