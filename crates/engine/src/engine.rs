use crate::PrintArgs;
use crate::error::{ErrorKind, Result};
use spool_process::{Capture, Limits};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::instrument;

/// File name of an engine shipped next to our own executable.
#[cfg(windows)]
const BUNDLED_NAME: &str = "SumatraPDF.exe";
#[cfg(not(windows))]
const BUNDLED_NAME: &str = "SumatraPDF";

/// Names to look for in `PATH` (`which` appends `.exe` on Windows).
const EXECUTABLES: [&str; 2] = ["SumatraPDF", "sumatrapdf"];

/// A print engine executable.
///
/// Discovery only decides *where* to look. Whether the binary is actually
/// there is re-checked on every print, so an engine installed (or removed)
/// while we are running is picked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintEngine {
    path: PathBuf,
}
impl PrintEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locates the engine, in order of preference:
    ///
    /// 1. an explicitly configured path (used even if it doesn't exist yet),
    /// 2. the bundled engine next to the running executable,
    /// 3. a known engine name in `PATH`.
    ///
    /// Falls back to the bundled location when nothing is found, so that
    /// every dispatch reports the engine as missing rather than failing here.
    pub fn discover(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self::new(path);
        }
        let bundled = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(BUNDLED_NAME)))
            .unwrap_or_else(|| PathBuf::from(BUNDLED_NAME));
        if bundled.is_file() {
            return Self::new(bundled);
        }
        for exe in EXECUTABLES {
            if let Ok(path) = which::which(exe) {
                tracing::debug!(engine = %path.display(), "Discovered print engine in PATH");
                return Self::new(path);
            }
        }
        tracing::info!(expected = %bundled.display(), "Print engine not found next to executable or in PATH");
        Self::new(bundled)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::metadata(&self.path).await.is_ok_and(|m| m.is_file())
    }

    /// Runs the engine for one document and waits for it to exit.
    ///
    /// A non-zero exit status is returned, not raised: the engine was launched
    /// and the document handed over, which is all we can observe.
    ///
    /// # Errors
    /// - [`ErrorKind::EngineNotFound`] if the binary has gone missing.
    /// - [`ErrorKind::Process`] if it could not be launched or hit a limit.
    #[instrument(skip_all, fields(file = %args.file().display()))]
    pub async fn print(&self, args: &PrintArgs, limits: &Limits) -> Result<ExitStatus> {
        if !self.exists().await {
            exn::bail!(ErrorKind::EngineNotFound(self.path.clone()));
        }
        tracing::info!(arguments = %args, "Printing job");
        let mut command = Command::new(&self.path);
        args.apply(&mut command);
        let finished = spool_process::run(command, Capture::Inherit, limits).await.map_err(|e| {
            let reason = e.deref().to_string();
            e.raise(ErrorKind::Process(reason))
        })?;
        if !finished.status.success() {
            tracing::warn!(code = ?finished.status.code(), "Print engine exited unsuccessfully");
        }
        Ok(finished.status)
    }
}
