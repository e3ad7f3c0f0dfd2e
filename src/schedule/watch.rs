use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use spool_dispatch::{DispatchOutcome, Dispatcher, Summary};
use spool_process::CancellationToken;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Prints files as they are created in a folder.
///
/// Each new file is left alone for the settle delay (so whoever is writing
/// it can finish) and then dispatched on its own. There is no debouncing:
/// a file created twice is dispatched twice.
pub struct WatchTask {
    dispatcher: Arc<Dispatcher>,
    folder: PathBuf,
    settle: Duration,
    // Dropping the watcher stops events.
    _watcher: RecommendedWatcher,
    created: mpsc::UnboundedReceiver<PathBuf>,
}
impl WatchTask {
    /// Starts watching `folder` straight away; files created from here on
    /// are queued until [`run`](Self::run) picks them up.
    ///
    /// # Errors
    /// [`ErrorKind::Watch`] if the folder can't be watched (e.g. it doesn't exist).
    pub fn start(dispatcher: Arc<Dispatcher>, folder: PathBuf, settle: Duration) -> Result<Self> {
        let (tx, created) = mpsc::unbounded_channel();
        let filter = Arc::clone(&dispatcher);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if matches!(event.kind, EventKind::Create(_)) => {
                for path in event.paths.into_iter().filter(|p| filter.config().matches_extension(p)) {
                    // The receiver only goes away once we stop.
                    let _ = tx.send(path);
                }
            },
            Ok(_) => {},
            Err(e) => tracing::warn!(error = %e, "Folder watcher error"),
        })
        .or_raise(|| ErrorKind::Watch(folder.clone()))?;
        watcher.watch(&folder, RecursiveMode::NonRecursive).or_raise(|| ErrorKind::Watch(folder.clone()))?;
        tracing::info!(
            folder = %folder.display(),
            extension = %dispatcher.config().extension,
            "Watching folder, press Enter or Ctrl-C to stop"
        );
        Ok(Self { dispatcher, folder, settle, _watcher: watcher, created })
    }

    /// Dispatches new files until cancelled, then waits for the dispatches
    /// already in progress.
    pub async fn run(mut self, cancel: CancellationToken) -> Summary {
        let mut summary = Summary::default();
        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                Some(joined) = in_flight.join_next() => record(&mut summary, joined),
                Some(path) = self.created.recv() => {
                    tracing::info!(path = %path.display(), "New file detected");
                    in_flight.spawn(settle_then_dispatch(Arc::clone(&self.dispatcher), path, self.settle, cancel.clone()));
                },
                else => break,
            }
        }
        while let Some(joined) = in_flight.join_next().await {
            record(&mut summary, joined);
        }
        tracing::info!(folder = %self.folder.display(), "Watcher stopped");
        summary
    }
}

async fn settle_then_dispatch(
    dispatcher: Arc<Dispatcher>,
    path: PathBuf,
    settle: Duration,
    cancel: CancellationToken,
) -> Option<DispatchOutcome> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        () = tokio::time::sleep(settle) => Some(dispatcher.dispatch(&path).await),
    }
}

fn record(summary: &mut Summary, joined: std::result::Result<Option<DispatchOutcome>, tokio::task::JoinError>) {
    match joined {
        Ok(outcome) => summary.extend(outcome.as_ref()),
        Err(e) => tracing::error!(error = %e, "Dispatch task failed"),
    }
}
