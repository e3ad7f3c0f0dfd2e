use crate::PrintConfiguration;
use crate::error::{ErrorKind, Result};
use crate::relocate::relocate;
use spool_engine::{PrintArgs, PrintEngine};
use spool_keyword::{KeywordCounter, Occurrences, resolve_copies};
use spool_process::Limits;
use std::fmt;
use std::ops::{AddAssign, Deref};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// The outcome of dispatching a single document.
///
/// Only ever reported, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the engine and moved to `moved_to`.
    Printed { moved_to: PathBuf },
    /// The document does not exist (anymore). Nothing was touched.
    SkippedMissingFile,
    /// The print engine binary could not be found. Nothing was touched.
    SkippedMissingEngine,
    /// Stopping was requested before this document was started. Nothing was touched.
    SkippedCancelled,
    /// Launching the engine or moving the document failed.
    Failed(String),
}
impl DispatchOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed { .. })
    }
}
impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Printed { moved_to } => write!(f, "printed, moved to {}", moved_to.display()),
            Self::SkippedMissingFile => f.write_str("skipped, file does not exist"),
            Self::SkippedMissingEngine => f.write_str("skipped, print engine not found"),
            Self::SkippedCancelled => f.write_str("skipped, stopping"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Tally of a run's outcomes, for the final report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub printed: usize,
    pub skipped: usize,
    pub failed: usize,
}
impl<'a> Extend<&'a DispatchOutcome> for Summary {
    fn extend<I: IntoIterator<Item = &'a DispatchOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            match outcome {
                DispatchOutcome::Printed { .. } => self.printed += 1,
                DispatchOutcome::SkippedMissingFile
                | DispatchOutcome::SkippedMissingEngine
                | DispatchOutcome::SkippedCancelled => self.skipped += 1,
                DispatchOutcome::Failed(_) => self.failed += 1,
            }
        }
    }
}
impl<'a> FromIterator<&'a DispatchOutcome> for Summary {
    fn from_iter<I: IntoIterator<Item = &'a DispatchOutcome>>(iter: I) -> Self {
        let mut summary = Self::default();
        summary.extend(iter);
        summary
    }
}
impl AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        self.printed += other.printed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}
impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} printed, {} skipped, {} failed", self.printed, self.skipped, self.failed)
    }
}

/// Prints documents one at a time according to a fixed [`PrintConfiguration`].
///
/// Cheap to share: wrap it in an `Arc` and hand it to every timer tick or
/// watcher event. It holds no mutable state.
#[derive(Debug)]
pub struct Dispatcher {
    config: Arc<PrintConfiguration>,
    engine: PrintEngine,
    counter: Option<KeywordCounter>,
    limits: Limits,
}
impl Dispatcher {
    pub fn new(config: impl Into<Arc<PrintConfiguration>>, engine: PrintEngine) -> Self {
        Self { config: config.into(), engine, counter: None, limits: Limits::default() }
    }

    /// Required for keyword triggers to ever see a real count.
    #[must_use]
    pub fn with_counter(mut self, counter: KeywordCounter) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Limits applied to every print engine run.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn config(&self) -> &PrintConfiguration {
        &self.config
    }

    /// Whether stopping has been requested; no new document is started after that.
    pub fn is_cancelled(&self) -> bool {
        self.limits.cancel.is_cancelled()
    }

    /// Prints `file` and moves it to its destination folder.
    ///
    /// 1. Stopping, missing document or missing engine: skipped, nothing on
    ///    disk changes.
    /// 2. Count keyword occurrences, if a trigger is configured.
    /// 3. Resolve the copy count, build the engine arguments.
    /// 4. Run the engine and wait for it.
    /// 5. Move the document into the destination folder.
    ///
    /// Never fails: errors are logged and returned as
    /// [`DispatchOutcome::Failed`] so one bad document can't stop a batch.
    #[instrument(skip_all, fields(file = %file.display()))]
    pub async fn dispatch(&self, file: &Path) -> DispatchOutcome {
        if self.is_cancelled() {
            tracing::debug!("Not started, stopping");
            return DispatchOutcome::SkippedCancelled;
        }
        if !tokio::fs::metadata(file).await.is_ok_and(|m| m.is_file()) {
            tracing::error!("File does not exist");
            return DispatchOutcome::SkippedMissingFile;
        }
        if !self.engine.exists().await {
            tracing::error!(engine = %self.engine.path().display(), "Print engine not found");
            return DispatchOutcome::SkippedMissingEngine;
        }
        match self.print_and_relocate(file).await {
            Ok(moved_to) => {
                tracing::info!(moved_to = %moved_to.display(), "Document printed");
                DispatchOutcome::Printed { moved_to }
            },
            Err(e) => {
                tracing::error!(error = ?e, "Dispatch failed");
                DispatchOutcome::Failed(e.deref().to_string())
            },
        }
    }

    async fn print_and_relocate(&self, file: &Path) -> Result<PathBuf> {
        let occurrences = match (&self.config.trigger, &self.counter) {
            (Some(trigger), Some(counter)) => counter.count(file, &trigger.keyword).await,
            (Some(_), None) => {
                tracing::debug!("Keyword trigger configured without a counter");
                Occurrences::Unavailable
            },
            (None, _) => Occurrences::Unavailable,
        };
        let copies = resolve_copies(self.config.copies, occurrences, self.config.trigger.as_ref());
        tracing::debug!(%occurrences, copies, "Resolved copy count");

        let args = PrintArgs::build(&self.config.print, copies, file);
        self.engine.print(&args, &self.limits).await.map_err(|e| {
            let reason = e.deref().to_string();
            e.raise(ErrorKind::Print(reason))
        })?;

        let destination = self.config.destination_for(file);
        relocate(file, &destination, self.config.on_conflict).await.map_err(|e| {
            let reason = e.deref().to_string();
            e.raise(ErrorKind::Relocate(reason))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OnConflict;
    #[cfg(unix)]
    use crate::testing::{FakeEngine, document};
    use spool_keyword::KeywordTrigger;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_file_leaves_filesystem_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let dispatcher = Dispatcher::new(PrintConfiguration::default(), engine.engine());
        let outcome = dispatcher.dispatch(&dir.path().join("missing.pdf")).await;
        assert_eq!(outcome, DispatchOutcome::SkippedMissingFile);
        assert!(!dir.path().join("printed").exists());
        assert!(engine.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_missing_engine() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("report.pdf");
        std::fs::write(&file, b"%PDF-1.7").unwrap();
        let dispatcher = Dispatcher::new(PrintConfiguration::default(), PrintEngine::new(dir.path().join("nope")));
        assert_eq!(dispatcher.dispatch(&file).await, DispatchOutcome::SkippedMissingEngine);
        assert!(file.exists());
        assert!(!dir.path().join("printed").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_printed_and_moved() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let file = document(dir.path(), "report.pdf");
        let dispatcher = Dispatcher::new(PrintConfiguration::default(), engine.engine());

        let outcome = dispatcher.dispatch(&file).await;
        let moved_to = dir.path().join("printed").join("report.pdf");
        assert_eq!(outcome, DispatchOutcome::Printed { moved_to: moved_to.clone() });
        assert!(!file.exists());
        assert!(moved_to.exists());
        assert_eq!(engine.invocations(), vec![format!(
            "-print-to-default -print-settings monochrome,paper=A4 {} -silent",
            file.display()
        )]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_folder() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let file = document(dir.path(), "report.pdf");
        let output = dir.path().join("out/nested");
        let config = PrintConfiguration { output: Some(output.clone()), ..PrintConfiguration::default() };
        let outcome = Dispatcher::new(config, engine.engine()).dispatch(&file).await;
        assert_eq!(outcome, DispatchOutcome::Printed { moved_to: output.join("report.pdf") });
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_engine_exit_still_relocates() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::failing(dir.path(), 1);
        let file = document(dir.path(), "report.pdf");
        let outcome = Dispatcher::new(PrintConfiguration::default(), engine.engine()).dispatch(&file).await;
        assert!(outcome.is_printed());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_relocation_conflict_is_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let file = document(dir.path(), "report.pdf");
        document(&dir.path().join("printed"), "report.pdf");
        let config = PrintConfiguration { on_conflict: OnConflict::Fail, ..PrintConfiguration::default() };

        let outcome = Dispatcher::new(config, engine.engine()).dispatch(&file).await;
        let DispatchOutcome::Failed(reason) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(reason.starts_with("moving printed file failed"));
        assert!(file.exists());
        // The engine did run; only the move failed.
        assert_eq!(engine.invocations().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_timeout_is_failed_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::hanging(dir.path());
        let file = document(dir.path(), "report.pdf");
        let limits = Limits::default().with_timeout(Some(std::time::Duration::from_millis(50)));
        let dispatcher = Dispatcher::new(PrintConfiguration::default(), engine.engine()).with_limits(limits);

        let outcome = dispatcher.dispatch(&file).await;
        let DispatchOutcome::Failed(reason) = outcome else { panic!("expected failure, got {outcome:?}") };
        assert!(reason.starts_with("printing failed"), "{reason}");
        assert!(reason.contains("did not exit within"), "{reason}");
        assert!(file.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_dispatch_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let file = document(dir.path(), "report.pdf");
        let limits = Limits::default();
        limits.cancel.cancel();
        let dispatcher = Dispatcher::new(PrintConfiguration::default(), engine.engine()).with_limits(limits);

        assert!(dispatcher.is_cancelled());
        assert_eq!(dispatcher.dispatch(&file).await, DispatchOutcome::SkippedCancelled);
        assert!(engine.invocations().is_empty());
        assert!(file.exists());
        assert!(!dir.path().join("printed").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_keyword_trigger_overrides_copies() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let file = document(dir.path(), "urgent.pdf");
        let script = dir.path().join("count.sh");
        std::fs::write(&script, "echo 2\n").unwrap();
        let counter = KeywordCounter::new(Some("/bin/sh".into()), script, Limits::default());
        let config = PrintConfiguration {
            copies: 1,
            trigger: Some(KeywordTrigger { keyword: "urgent".to_string(), trigger_count: 2, override_copies: 5 }),
            ..PrintConfiguration::default()
        };

        let outcome = Dispatcher::new(config, engine.engine()).with_counter(counter).dispatch(&file).await;
        assert!(outcome.is_printed());
        assert!(engine.invocations()[0].contains("5x,monochrome,paper=A4"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_keyword_trigger_mismatch_keeps_copies() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let file = document(dir.path(), "urgent.pdf");
        let script = dir.path().join("count.sh");
        std::fs::write(&script, "echo 3\n").unwrap();
        let counter = KeywordCounter::new(Some("/bin/sh".into()), script, Limits::default());
        let config = PrintConfiguration {
            copies: 2,
            trigger: Some(KeywordTrigger { keyword: "urgent".to_string(), trigger_count: 2, override_copies: 5 }),
            ..PrintConfiguration::default()
        };

        Dispatcher::new(config, engine.engine()).with_counter(counter).dispatch(&file).await;
        assert!(engine.invocations()[0].contains("2x,monochrome,paper=A4"));
    }

    #[test]
    fn test_summary() {
        let outcomes = [
            DispatchOutcome::Printed { moved_to: "a".into() },
            DispatchOutcome::SkippedMissingFile,
            DispatchOutcome::SkippedMissingEngine,
            DispatchOutcome::Failed("boom".to_string()),
            DispatchOutcome::Printed { moved_to: "b".into() },
            DispatchOutcome::SkippedCancelled,
        ];
        let summary: Summary = outcomes.iter().collect();
        assert_eq!(summary, Summary { printed: 2, skipped: 3, failed: 1 });
        assert_eq!(summary.to_string(), "2 printed, 3 skipped, 1 failed");

        let mut total = summary;
        total += Summary { printed: 1, skipped: 0, failed: 3 };
        total.extend([&DispatchOutcome::SkippedMissingFile]);
        assert_eq!(total, Summary { printed: 3, skipped: 4, failed: 4 });
    }
}
