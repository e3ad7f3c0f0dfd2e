//! Bounded execution of external helper processes.
//!
//! Both the print engine and the keyword counter are opaque programs that we
//! launch and then block on until they exit. Left alone, a wedged helper would
//! wedge the whole dispatcher, so every run goes through [`run`] which races
//! the child against an optional timeout and a [`CancellationToken`] handed
//! down from the scheduling layer. Children are spawned with `kill_on_drop`,
//! so losing the race kills the process instead of leaking it.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
pub use tokio_util::sync::CancellationToken;

/// Upper bounds applied to a single process run.
///
/// The default has no timeout and a token that is never cancelled, which
/// reproduces a plain blocking wait.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}
impl Limits {
    pub fn new(timeout: Option<Duration>, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Same cancellation scope, different time limit.
    #[must_use]
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self { timeout, cancel: self.cancel.clone() }
    }
}

/// What to do with the child's standard output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capture {
    /// Pipe standard output and hand it back in [`Finished::stdout`].
    Stdout,
    /// Let the child write to our own standard output.
    Inherit,
}

/// A process that ran to completion (successfully or not).
#[derive(Debug)]
pub struct Finished {
    pub status: ExitStatus,
    /// Empty unless [`Capture::Stdout`] was requested.
    pub stdout: Vec<u8>,
}
impl Finished {
    /// Captured standard output as (lossy) UTF-8.
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Spawns `command` and waits for it to exit, within `limits`.
///
/// Standard input is always closed; standard error is inherited.
///
/// # Errors
/// - [`ErrorKind::Launch`] if the program could not be started.
/// - [`ErrorKind::Timeout`] / [`ErrorKind::Cancelled`] if a limit was hit
///   first (the child is killed). An already cancelled token never spawns.
/// - [`ErrorKind::Io`] if waiting on the child failed.
pub async fn run(mut command: Command, capture: Capture, limits: &Limits) -> Result<Finished> {
    let program = command.as_std().get_program().to_string_lossy().into_owned();
    command.kill_on_drop(true).stdin(Stdio::null()).stderr(Stdio::inherit());
    match capture {
        Capture::Stdout => command.stdout(Stdio::piped()),
        Capture::Inherit => command.stdout(Stdio::inherit()),
    };
    if limits.cancel.is_cancelled() {
        exn::bail!(ErrorKind::Cancelled);
    }
    let child = command.spawn().or_raise(|| ErrorKind::Launch(program.clone()))?;
    tracing::trace!(program = %program, pid = child.id(), "Spawned external process");

    let output = tokio::select! {
        biased;
        _ = limits.cancel.cancelled() => {
            tracing::debug!(program = %program, "Cancellation requested; killing external process");
            exn::bail!(ErrorKind::Cancelled);
        },
        output = wait(child, limits.timeout) => output?,
    };
    Ok(Finished { status: output.status, stdout: output.stdout })
}

async fn wait(child: Child, timeout: Option<Duration>) -> Result<Output> {
    let waiting = child.wait_with_output();
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, waiting).await {
            Ok(output) => output.or_raise(|| ErrorKind::Io),
            // Dropping the future drops the child, and kill_on_drop does the rest.
            Err(_) => exn::bail!(ErrorKind::Timeout(limit)),
        },
        None => waiting.await.or_raise(|| ErrorKind::Io),
    }
}
