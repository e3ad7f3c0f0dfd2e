use crate::Occurrences;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use spool_process::{Capture, Limits};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::instrument;

/// Client for the external keyword-counting helper.
///
/// The helper is a script run by an interpreter as
/// `<interpreter> <script> <document> <keyword>` and must print a single
/// integer, and nothing else, on standard output.
#[derive(Clone, Debug)]
pub struct KeywordCounter {
    interpreter: Option<PathBuf>,
    script: PathBuf,
    limits: Limits,
}
impl KeywordCounter {
    pub fn new(interpreter: Option<PathBuf>, script: impl Into<PathBuf>, limits: Limits) -> Self {
        // An empty path in a config file means "not configured".
        let interpreter = interpreter.filter(|p| !p.as_os_str().is_empty());
        Self { interpreter, script: script.into(), limits }
    }

    /// Counts occurrences of `keyword` in `document`.
    ///
    /// Never fails: anything that goes wrong is logged and reported as
    /// [`Occurrences::Unavailable`]. Results are not cached, so counting the
    /// same document twice launches the helper twice.
    #[instrument(skip(self, document), fields(document = %document.display()))]
    pub async fn count(&self, document: &Path, keyword: &str) -> Occurrences {
        match self.try_count(document, keyword).await {
            Ok(count) => Occurrences::Counted(count),
            Err(e) => {
                tracing::warn!(error = %e.deref(), "Keyword count unavailable; continuing without it");
                tracing::debug!(error = ?e, "Keyword counter error tree");
                Occurrences::Unavailable
            },
        }
    }

    async fn try_count(&self, document: &Path, keyword: &str) -> Result<u32> {
        let interpreter = self.interpreter.as_deref().ok_or_raise(|| ErrorKind::NoInterpreter)?;
        if !tokio::fs::try_exists(&self.script).await.unwrap_or(false) {
            exn::bail!(ErrorKind::ScriptNotFound(self.script.clone()));
        }
        let mut command = Command::new(interpreter);
        command.arg(&self.script).arg(document).arg(keyword);
        let finished =
            spool_process::run(command, Capture::Stdout, &self.limits).await.or_raise(|| ErrorKind::Process)?;
        let output = finished.stdout_lossy();
        tracing::info!(result = %output.trim(), "Search result");
        parse_count(&output)
    }
}

/// The whole (trimmed) output must be one integer; a second line is garbage.
fn parse_count(output: &str) -> Result<u32> {
    let trimmed = output.trim();
    trimmed.parse::<u32>().or_raise(|| ErrorKind::Unparsable(trimmed.to_string()))
}
