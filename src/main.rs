mod cli;
mod error;
mod logging;
mod schedule;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use crate::logging::Verbosity;
use crate::schedule::{Mode, TimerTask, WatchTask};
use clap::Parser;
use exn::ResultExt;
use spool_config::{Settings, Sources};
use spool_dispatch::{Dispatcher, Summary, run_once};
use spool_engine::PrintEngine;
use spool_keyword::KeywordCounter;
use spool_process::{CancellationToken, Limits};
use std::io::IsTerminal;
use std::ops::Deref;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            pause_if_interactive();
            return ExitCode::from(2);
        },
        // --help and --version.
        Err(e) => e.exit(),
    };
    logging::init(Verbosity::from_flags(cli.verbose, cli.quiet));

    match run(cli).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            tracing::error!(error = ?e, "{}", e.deref());
            pause_if_interactive();
            e.deref().exit_code()
        },
    }
}

async fn run(cli: Cli) -> Result<Summary> {
    let settings = Settings::load(&Sources::discover(cli.config.as_deref())).or_raise(|| ErrorKind::Config)?;
    let config = Arc::new(cli.configuration(&settings)?);
    let mode = Mode::select(&config, cli.timer, cli.watcher);

    let cancel = CancellationToken::new();
    schedule::cancel_on_ctrl_c(&cancel);
    let limits = Limits::new(settings.engine_timeout(), cancel.clone());
    let engine = PrintEngine::discover(settings.engine_path());
    tracing::debug!(engine = %engine.path().display(), ?mode, "Starting");

    let mut dispatcher = Dispatcher::new(Arc::clone(&config), engine).with_limits(limits.clone());
    if config.trigger.is_some() {
        let counter = KeywordCounter::new(
            settings.python_path().map(Path::to_path_buf),
            settings.counter_script(),
            limits.with_timeout(settings.counter_timeout()),
        );
        dispatcher = dispatcher.with_counter(counter);
    }
    let dispatcher = Arc::new(dispatcher);

    // Watch before the initial run so nothing created during it is missed.
    let watch = match &mode {
        Mode::Watch { folder } => {
            Some(WatchTask::start(Arc::clone(&dispatcher), folder.clone(), settings.settle_delay())?)
        },
        _ => None,
    };

    let mut summary: Summary = run_once(&dispatcher).await.iter().collect();
    match (mode, watch) {
        (Mode::Timer { period, .. }, _) => {
            schedule::cancel_on_enter(&cancel);
            summary += TimerTask::new(dispatcher, period).run(cancel).await;
        },
        (Mode::Watch { .. }, Some(watch)) => {
            schedule::cancel_on_enter(&cancel);
            summary += watch.run(cancel).await;
        },
        _ => {},
    }
    Ok(summary)
}

/// Keeps a console window opened by double-click around long enough to read
/// the error.
fn pause_if_interactive() {
    if std::io::stdin().is_terminal() {
        eprintln!("Press Enter to exit...");
        let _ = std::io::stdin().read_line(&mut String::new());
    }
}
