//! Error mapping guide:
//! - Usage errors and file-system errors exit with 1.
//! - A dev-server shell that cannot be found exits with 127, like a shell would.
//! - Keep the display strings stable; integration tests match on them.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

#[derive(Debug)]
pub enum DevError {
    /// Missing or malformed command-line input.
    Usage(String),
    /// Reading or writing the entry-point document or its backup failed.
    Io { path: PathBuf, source: io::Error },
    /// The dev-server command could not be started.
    Spawn { command: String, source: io::Error },
    /// Another instance already holds the checkout lock.
    Locked(PathBuf),
    Message(String),
}

impl DevError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        DevError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for DevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevError::Usage(s) => write!(f, "{s}"),
            DevError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            DevError::Spawn { command, source } => {
                write!(f, "failed to start dev server '{command}': {source}")
            }
            DevError::Locked(path) => write!(
                f,
                "another oceanix-dev instance is already running for this checkout (lock: {})",
                path.display()
            ),
            DevError::Message(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for DevError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DevError::Io { source, .. } | DevError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convert DevError to a process exit code.
pub fn exit_code_for_dev_error(e: &DevError) -> u8 {
    match e {
        DevError::Spawn { source, .. } => exit_code_for_io_error(source),
        DevError::Usage(_) | DevError::Io { .. } | DevError::Locked(_) | DevError::Message(_) => 1,
    }
}

/// Launcher exit status for a dev-server exit code.
///
/// Unix codes are already 0..=255. Anything wider (Windows NTSTATUS values,
/// negative codes) cannot be carried through a u8 and becomes 1.
pub fn exit_code_for_child(code: i32) -> u8 {
    match u8::try_from(code) {
        Ok(c) => c,
        Err(_) => 1,
    }
}
