use crate::error::{ErrorKind, Result};
use crate::{DispatchOutcome, Dispatcher};
use async_stream::stream;
use futures::{Stream, StreamExt};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Progress events emitted by [`dispatch_folder_stream`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of matching files.
/// 3. [`Dispatched`](Self::Dispatched): once per file, in discovery order,
///    until the dispatcher's cancellation token fires. Files left over after
///    that are not dispatched at all.
/// 4. [`Complete`](Self::Complete): exactly once.
///
/// A discovery failure (missing or unreadable folder) is yielded as an `Err`
/// and ends the stream early, without [`Complete`](Self::Complete).
#[derive(Debug)]
pub enum BatchEvent {
    Started,
    DiscoveryComplete(u64),
    Dispatched { path: PathBuf, outcome: DispatchOutcome },
    Complete,
}

/// Dispatches every matching file directly inside the configured folder,
/// one after the other, streaming progress as it goes.
///
/// Files are taken in whatever order the filesystem lists them, and only the
/// top level is searched (the default `printed` sub-folder is never revisited).
/// A configuration without a folder completes immediately with zero files.
pub fn dispatch_folder_stream(dispatcher: &Dispatcher) -> impl Stream<Item = Result<BatchEvent>> + '_ {
    stream!({
        yield Ok(BatchEvent::Started);
        let files = match &dispatcher.config().folder {
            Some(folder) => match discover(dispatcher, folder).await {
                Ok(files) => files,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            },
            None => Vec::new(),
        };
        yield Ok(BatchEvent::DiscoveryComplete(u64::try_from(files.len()).unwrap_or(0)));
        for path in files {
            if dispatcher.is_cancelled() {
                tracing::info!("Stopping, remaining files left in place");
                break;
            }
            let outcome = dispatcher.dispatch(&path).await;
            yield Ok(BatchEvent::Dispatched { path, outcome });
        }
        yield Ok(BatchEvent::Complete);
    })
}

/// Collects [`dispatch_folder_stream`] into the outcomes, in dispatch order.
///
/// A folder that doesn't exist is logged and yields no outcomes; it is not
/// an error for the caller.
pub async fn dispatch_folder(dispatcher: &Dispatcher) -> Vec<DispatchOutcome> {
    let mut outcomes = Vec::new();
    let mut events = std::pin::pin!(dispatch_folder_stream(dispatcher));
    while let Some(event) = events.next().await {
        match event {
            Ok(BatchEvent::DiscoveryComplete(count)) => tracing::debug!(count, "Folder discovery complete"),
            Ok(BatchEvent::Dispatched { outcome, .. }) => outcomes.push(outcome),
            Ok(BatchEvent::Started | BatchEvent::Complete) => {},
            Err(e) => tracing::error!(error = %e.deref(), "Folder could not be dispatched"),
        }
    }
    outcomes
}

/// One complete print job: the configured document (if any), then the
/// configured folder (if any).
pub async fn run_once(dispatcher: &Dispatcher) -> Vec<DispatchOutcome> {
    let mut outcomes = Vec::new();
    if let Some(document) = dispatcher.config().document.as_deref().filter(|p| !p.as_os_str().is_empty()) {
        outcomes.push(dispatcher.dispatch(document).await);
    }
    if dispatcher.config().folder.is_some() {
        outcomes.extend(dispatch_folder(dispatcher).await);
    }
    outcomes
}

async fn discover(dispatcher: &Dispatcher, folder: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match fs::read_dir(folder).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => exn::bail!(ErrorKind::FolderNotFound(folder.to_path_buf())),
        Err(e) => exn::bail!(ErrorKind::Io(e)),
    };
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(ErrorKind::Io)? {
        let path = entry.path();
        // Directories and broken symlinks.
        if !fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
            continue;
        }
        if dispatcher.config().matches_extension(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrintConfiguration;
    #[cfg(unix)]
    use crate::testing::{FakeEngine, document};
    use spool_engine::PrintEngine;

    #[tokio::test]
    async fn test_missing_folder_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = PrintConfiguration { folder: Some(dir.path().join("nope")), ..PrintConfiguration::default() };
        let dispatcher = Dispatcher::new(config, PrintEngine::new(dir.path().join("engine")));
        assert!(dispatch_folder(&dispatcher).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_folder_event() {
        let dir = tempfile::tempdir().unwrap();
        let config = PrintConfiguration { folder: Some(dir.path().join("nope")), ..PrintConfiguration::default() };
        let dispatcher = Dispatcher::new(config, PrintEngine::new(dir.path().join("engine")));
        let events: Vec<_> = dispatch_folder_stream(&dispatcher).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(BatchEvent::Started)));
        assert!(matches!(events[1].as_ref().unwrap_err().deref(), ErrorKind::FolderNotFound(_)));
    }

    #[tokio::test]
    async fn test_no_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();
        let config = PrintConfiguration { folder: Some(dir.path().to_path_buf()), ..PrintConfiguration::default() };
        let dispatcher = Dispatcher::new(config, PrintEngine::new(dir.path().join("engine")));

        let events: Vec<_> = dispatch_folder_stream(&dispatcher).collect().await;
        assert!(matches!(events[1], Ok(BatchEvent::DiscoveryComplete(0))));
        assert!(matches!(events.last(), Some(Ok(BatchEvent::Complete))));
        assert!(dispatch_folder(&dispatcher).await.is_empty());
    }

    #[tokio::test]
    async fn test_without_folder() {
        let dir = tempfile::tempdir().unwrap();
        let dispatcher = Dispatcher::new(PrintConfiguration::default(), PrintEngine::new(dir.path().join("engine")));
        let events: Vec<_> = dispatch_folder_stream(&dispatcher).collect().await;
        assert_eq!(events.len(), 3);
        assert!(run_once(&dispatcher).await.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dispatches_matching_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let inbox = dir.path().join("inbox");
        document(&inbox, "a.pdf");
        document(&inbox, "B.PDF");
        document(&inbox, "c.txt");
        document(&inbox.join("nested"), "d.pdf");
        let config = PrintConfiguration { folder: Some(inbox.clone()), ..PrintConfiguration::default() };
        let dispatcher = Dispatcher::new(config, engine.engine());

        let outcomes = dispatch_folder(&dispatcher).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(DispatchOutcome::is_printed));
        assert!(inbox.join("printed/a.pdf").exists());
        assert!(inbox.join("printed/B.PDF").exists());
        assert!(inbox.join("c.txt").exists());
        assert!(inbox.join("nested/d.pdf").exists());
        assert_eq!(engine.invocations().len(), 2);

        // Printed files are gone from the folder, so a second pass has nothing to do.
        assert!(dispatch_folder(&dispatcher).await.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let inbox = dir.path().join("inbox");
        let output = dir.path().join("done");
        document(&inbox, "a.pdf");
        document(&inbox, "b.pdf");
        // `a.pdf` can't be moved: a directory occupies its name in the output folder.
        std::fs::create_dir_all(output.join("a.pdf")).unwrap();
        let config = PrintConfiguration {
            folder: Some(inbox.clone()),
            output: Some(output.clone()),
            on_conflict: crate::OnConflict::Overwrite,
            ..PrintConfiguration::default()
        };
        let dispatcher = Dispatcher::new(config, engine.engine());

        let outcomes = dispatch_folder(&dispatcher).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes.iter().filter(|o| o.is_printed()).count(), 1);
        assert!(output.join("b.pdf").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancelled_batch_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let inbox = dir.path().join("inbox");
        let names = ["a.pdf", "b.pdf", "c.pdf", "d.pdf", "e.pdf"];
        for name in names {
            document(&inbox, name);
        }
        let config = PrintConfiguration { folder: Some(inbox.clone()), ..PrintConfiguration::default() };
        let limits = spool_process::Limits::default();
        limits.cancel.cancel();
        let dispatcher = Dispatcher::new(config, engine.engine()).with_limits(limits);

        let events: Vec<_> = dispatch_folder_stream(&dispatcher).collect().await;
        assert!(matches!(events[1], Ok(BatchEvent::DiscoveryComplete(5))));
        assert!(!events.iter().any(|e| matches!(e, Ok(BatchEvent::Dispatched { .. }))));
        assert!(matches!(events.last(), Some(Ok(BatchEvent::Complete))));
        assert!(engine.invocations().is_empty());
        for name in names {
            assert!(inbox.join(name).is_file());
        }
        assert!(!inbox.join("printed").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cancel_mid_batch_stops_after_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let inbox = dir.path().join("inbox");
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            document(&inbox, name);
        }
        let config = PrintConfiguration { folder: Some(inbox.clone()), ..PrintConfiguration::default() };
        let limits = spool_process::Limits::default();
        let cancel = limits.cancel.clone();
        let dispatcher = Dispatcher::new(config, engine.engine()).with_limits(limits);

        let mut events = std::pin::pin!(dispatch_folder_stream(&dispatcher));
        let mut dispatched = 0;
        while let Some(event) = events.next().await {
            if let Ok(BatchEvent::Dispatched { outcome, .. }) = event {
                assert!(outcome.is_printed());
                dispatched += 1;
                cancel.cancel();
            }
        }
        assert_eq!(dispatched, 1);
        assert_eq!(engine.invocations().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_once_document_then_folder() {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new(dir.path());
        let single = document(&dir.path().join("single"), "one.pdf");
        let inbox = dir.path().join("inbox");
        document(&inbox, "two.pdf");
        let config = PrintConfiguration {
            document: Some(single.clone()),
            folder: Some(inbox.clone()),
            ..PrintConfiguration::default()
        };
        let dispatcher = Dispatcher::new(config, engine.engine());

        let outcomes = run_once(&dispatcher).await;
        assert_eq!(outcomes.len(), 2);
        let invocations = engine.invocations();
        assert!(invocations[0].contains("one.pdf"));
        assert!(invocations[1].contains("two.pdf"));
    }
}
