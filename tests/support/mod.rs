/*!
Test support helpers shared across integration tests.

- checkout(): temp project with a minimal Angular-style src/index.html
- launcher(dir): Command for the built binary, rooted in `dir`
- read(path): file contents as String
*/

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const INDEX_HTML: &str = "<!doctype html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  <title>Oceanix CRM</title>\n  <base href=\"/\">\n</head>\n<body>\n  <app-root></app-root>\n</body>\n</html>\n";

/// Temp project directory with `src/index.html`.
pub fn checkout() -> tempfile::TempDir {
    let td = tempfile::tempdir().expect("tmpdir");
    fs::create_dir_all(td.path().join("src")).expect("mkdir src");
    fs::write(td.path().join("src/index.html"), INDEX_HTML).expect("write index.html");
    td
}

#[allow(dead_code)]
pub fn entry(dir: &Path) -> PathBuf {
    dir.join("src/index.html")
}

#[allow(dead_code)]
pub fn backup(dir: &Path) -> PathBuf {
    dir.join("src/index.html.backup")
}

/// Launcher command with cwd = `dir`, a clean OCEANIX_DEV_* environment and no color.
pub fn launcher(dir: &Path) -> Command {
    let bin = env!("CARGO_BIN_EXE_oceanix-dev");
    let mut cmd = Command::new(bin);
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("OCEANIX_DEV_ENTRY")
        .env_remove("OCEANIX_DEV_BACKUP")
        .env_remove("OCEANIX_DEV_SERVE_CMD")
        .env_remove("OCEANIX_DEV_STORAGE_KEY")
        .env_remove("OCEANIX_DEV_RESNAPSHOT")
        .stdin(Stdio::null());
    cmd
}

#[allow(dead_code)]
pub fn read(p: &Path) -> String {
    fs::read_to_string(p).unwrap_or_else(|e| panic!("read {}: {e}", p.display()))
}

/// Sorted relative file names under `dir` (recursive).
#[allow(dead_code)]
pub fn list_files(dir: &Path) -> Vec<String> {
    fn walk(base: &Path, d: &Path, out: &mut Vec<String>) {
        if let Ok(rd) = fs::read_dir(d) {
            for e in rd.flatten() {
                let p = e.path();
                if p.is_dir() {
                    walk(base, &p, out);
                } else if let Ok(rel) = p.strip_prefix(base) {
                    out.push(rel.display().to_string());
                }
            }
        }
    }
    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort();
    out
}
