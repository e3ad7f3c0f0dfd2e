//! Repeating print jobs.
//!
//! After the initial run, a folder is either re-printed on a fixed
//! [`TimerTask`] or watched for new files by a [`WatchTask`]. Both run until
//! their [`CancellationToken`] is cancelled, which also kills whatever print
//! engine or counter is still running.

mod timer;
mod watch;

pub use self::timer::TimerTask;
pub use self::watch::WatchTask;

use spool_dispatch::PrintConfiguration;
use spool_process::CancellationToken;
use std::path::PathBuf;
use std::time::Duration;

/// What happens after the initial run; decided once at start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Once,
    Timer { folder: PathBuf, period: Duration },
    Watch { folder: PathBuf },
}
impl Mode {
    /// Timer and watcher only apply to a folder, and exclude each other:
    /// asking for both (or for either without a folder) runs once.
    pub fn select(config: &PrintConfiguration, timer_secs: u64, watcher: bool) -> Self {
        let Some(folder) = config.folder.clone() else {
            if timer_secs > 0 || watcher {
                tracing::warn!("Timer and watcher need a folder; printing once");
            }
            return Self::Once;
        };
        match (timer_secs, watcher) {
            (0, false) => Self::Once,
            (0, true) => Self::Watch { folder },
            (secs, false) => Self::Timer { folder, period: Duration::from_secs(secs) },
            (_, true) => {
                tracing::warn!("Timer and watcher are mutually exclusive; printing once");
                Self::Once
            },
        }
    }
}

/// Cancels `cancel` on Ctrl-C.
pub fn cancel_on_ctrl_c(cancel: &CancellationToken) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            cancel.cancel();
        }
    });
}

/// Cancels `cancel` when a line (usually just Enter) is read from stdin.
///
/// Reads on a plain thread: a blocked read would otherwise hold up runtime
/// shutdown. Does nothing unless stdin is a terminal, as a closed or
/// redirected stdin would stop everything straight away.
pub fn cancel_on_enter(cancel: &CancellationToken) {
    use std::io::IsTerminal;
    if !std::io::stdin().is_terminal() {
        return;
    }
    let cancel = cancel.clone();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        cancel.cancel();
    });
}
