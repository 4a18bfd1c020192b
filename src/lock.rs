use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::DevError;

/// Checkout-scoped lock guard that removes the lock file on drop.
#[derive(Debug)]
pub struct CheckoutLock {
    file: File,
    path: PathBuf,
}

impl CheckoutLock {
    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CheckoutLock {
    fn drop(&mut self) {
        // Best-effort unlock; ignore errors
        let _ = self.file.unlock();
        let _ = fs::remove_file(&self.path);
    }
}

/// Lock file for the checkout owning `entry`:
/// `${TMPDIR}/oceanix-dev.<hash(canonical entry)>.lock`.
pub fn lock_path_for(entry: &Path) -> PathBuf {
    let key = normalized_key_for_hash(entry);
    std::env::temp_dir().join(format!("oceanix-dev.{}.lock", hash_key_hex(&key)))
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", err, skip_all, fields(entry = %entry.display()))
)]
/// Acquire a non-blocking exclusive lock for the checkout owning `entry`.
pub fn acquire_for_entry(entry: &Path) -> Result<CheckoutLock, DevError> {
    acquire_lock_at(&lock_path_for(entry))
}

/// Acquire a lock at a specific path (helper for tests).
pub fn acquire_lock_at(p: &Path) -> Result<CheckoutLock, DevError> {
    if let Some(parent) = p.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(true)
        .open(p)
        .map_err(|e| DevError::io(p, e))?;
    match f.try_lock_exclusive() {
        Ok(_) => Ok(CheckoutLock {
            file: f,
            path: p.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
            #[cfg(feature = "tracing")]
            tracing::error!("lock acquisition failed: lock held by another process");
            Err(DevError::Locked(p.to_path_buf()))
        }
        // fs2 reports contention through the raw OS error on some platforms
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
            Err(DevError::Locked(p.to_path_buf()))
        }
        Err(e) => Err(DevError::io(p, e)),
    }
}

/// Normalize a path to a stable key; falls back to the raw path when it cannot be canonicalized.
pub fn normalized_key_for_hash(p: &Path) -> String {
    let abs = fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    let s = abs.to_string_lossy().to_string();
    if cfg!(windows) {
        s.replace('/', "\\").to_ascii_lowercase()
    } else {
        s
    }
}

/// Simple stable 64-bit FNV-1a hash for strings; returns 16-hex lowercase id.
pub fn hash_key_hex(s: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 1099511628211;
    let mut h: u64 = FNV_OFFSET;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(FNV_PRIME);
    }
    format!("{:016x}", h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_key_hex_is_stable() {
        assert_eq!(hash_key_hex(""), "cbf29ce484222325");
        assert_eq!(hash_key_hex("a"), "af63dc4c8601ec8c");
        assert_eq!(hash_key_hex("x").len(), 16);
    }

    #[test]
    fn test_lock_path_differs_per_checkout() {
        let a = tempfile::tempdir().expect("tmpdir");
        let b = tempfile::tempdir().expect("tmpdir");
        let pa = lock_path_for(&a.path().join("src/index.html"));
        let pb = lock_path_for(&b.path().join("src/index.html"));
        assert_ne!(pa, pb);
        assert_eq!(pa, lock_path_for(&a.path().join("src/index.html")));
    }

    #[test]
    fn test_second_lock_is_refused_and_released_on_drop() {
        let td = tempfile::tempdir().expect("tmpdir");
        let p = td.path().join("oceanix-dev.test.lock");
        let first = acquire_lock_at(&p).expect("first lock");
        match acquire_lock_at(&p) {
            Err(DevError::Locked(held)) => assert_eq!(held, p),
            other => panic!("expected Locked, got {other:?}"),
        }
        drop(first);
        assert!(!p.exists(), "lock file should be removed on drop");
        let again = acquire_lock_at(&p).expect("lock after release");
        assert_eq!(again.path(), p.as_path());
    }
}
