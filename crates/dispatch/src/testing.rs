//! Stand-ins for the external print engine.

use spool_engine::PrintEngine;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// A shell script posing as the print engine, logging each invocation's
/// arguments (space-joined, one line per run).
pub(crate) struct FakeEngine {
    path: PathBuf,
    log: PathBuf,
}
impl FakeEngine {
    pub(crate) fn new(dir: &Path) -> Self {
        Self::with_tail(dir, "")
    }

    pub(crate) fn failing(dir: &Path, code: i32) -> Self {
        Self::with_tail(dir, &format!("exit {code}"))
    }

    pub(crate) fn hanging(dir: &Path) -> Self {
        Self::with_tail(dir, "sleep 5")
    }

    fn with_tail(dir: &Path, tail: &str) -> Self {
        let bin = dir.join(".engine");
        std::fs::create_dir_all(&bin).unwrap();
        let path = bin.join("SumatraPDF");
        let log = bin.join("invocations.log");
        std::fs::write(&path, format!("#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\n{tail}\n", log.display())).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { path, log }
    }

    pub(crate) fn engine(&self) -> PrintEngine {
        PrintEngine::new(&self.path)
    }

    pub(crate) fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log).map(|log| log.lines().map(String::from).collect()).unwrap_or_default()
    }
}

/// Creates a small document, and its folder if needed.
pub(crate) fn document(dir: &Path, name: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.7").unwrap();
    path
}
